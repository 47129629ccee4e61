//! Product documents and the typed request payloads that produce them.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// A stored product document.
///
/// Every persisted product carries all six fields; `id` is the
/// application-level key the store enforces uniqueness on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub price: f64,
    pub description: String,
    pub category: String,
    pub image: String,
}

/// Create/replace request body. All data fields are required; `id` is
/// optional and, when present, accepts a JSON integer, an integral float,
/// or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct ProductDraft {
    #[serde(default, deserialize_with = "coercible_id")]
    pub id: Option<i64>,
    pub title: String,
    pub price: f64,
    pub description: String,
    pub category: String,
    pub image: String,
}

impl ProductDraft {
    /// Materialize the draft under the given id. Any id carried in the
    /// draft itself has already been reconciled by the caller.
    pub fn into_product(self, id: i64) -> Product {
        Product {
            id,
            title: self.title,
            price: self.price,
            description: self.description,
            category: self.category,
            image: self.image,
        }
    }
}

/// Partial-update request body. Only supplied fields are applied; `null`
/// counts as not supplied.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct ProductPatch {
    #[serde(default, deserialize_with = "coercible_id")]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl ProductPatch {
    /// Overlay the supplied fields onto an existing product. The id is
    /// never patched; callers reject mismatching ids up front.
    pub fn apply(&self, product: &mut Product) {
        if let Some(title) = &self.title {
            product.title = title.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(category) = &self.category {
            product.category = category.clone();
        }
        if let Some(image) = &self.image {
            product.image = image.clone();
        }
    }
}

/// Accept `7`, `7.0`, or `"7"` as an id, the way loosely typed clients
/// send them. Fractional or out-of-range numbers and non-numeric strings
/// are rejected.
fn coercible_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Int(n)) => Ok(Some(n)),
        Some(Raw::Float(f)) if f.is_finite() && f.fract() == 0.0 => {
            // i64::MAX as f64 rounds up to 2^63, so the upper bound is
            // exclusive; casting anything past the range would saturate.
            if f >= i64::MIN as f64 && f < i64::MAX as f64 {
                Ok(Some(f as i64))
            } else {
                Err(de::Error::custom("product id out of range"))
            }
        }
        Some(Raw::Float(_)) => Err(de::Error::custom("product id must be an integer")),
        Some(Raw::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| de::Error::custom("product id must be an integer")),
    }
}
