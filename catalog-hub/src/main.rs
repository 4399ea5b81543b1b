//! Catalog Hub server
//!
//! Serves scoped, permission-filtered item search over a catalog loaded from
//! a JSON fixture.

use anyhow::Result;
use catalog_hub::api;
use catalog_hub_core::storage::CatalogStore;
use catalog_hub_core::{ScopedSearch, SearchConfig};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "catalog-hub")]
#[command(about = "Scoped item search over a permissioned catalog")]
struct Cli {
    /// Listen address
    #[arg(short, long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Catalog fixture to serve
    #[arg(short, long, default_value = "catalog.json")]
    catalog: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = SearchConfig::from_env()?;

    let store = if cli.catalog.exists() {
        CatalogStore::load(&cli.catalog, config.max_depth)?
    } else {
        warn!("catalog {} not found, serving an empty catalog", cli.catalog.display());
        CatalogStore::new().with_max_depth(config.max_depth)
    };
    let store = Arc::new(RwLock::new(store));
    let search = ScopedSearch::new(store.clone(), store).with_config(config)?;

    let listener = TcpListener::bind(&cli.addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, api::router(search)).await?;
    Ok(())
}
