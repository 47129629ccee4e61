//! Catalog server binary.
//!
//! Loads configuration from `catalog.toml` and `CATALOG_*` environment
//! variables, then serves the product API until shutdown.

use catalog::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A local .env is optional.
    dotenvy::dotenv().ok();

    let config = ServerConfig::load()?;
    catalog::start_server(config).await?;

    Ok(())
}
