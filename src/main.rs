//! Feedkeeper bootstrap.
//!
//! Connects to MongoDB and makes sure every fixed collection carries the
//! unique and TTL indexes its schema declares. Article partitions get theirs
//! when first opened.

use mongodb::bson::Document;
use tracing::info;
use tracing_subscriber::EnvFilter;

use feedkeeper::database::Database;
use feedkeeper::{Config, StorageContext};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("feedkeeper=info,mongodb=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    info!("Starting feedkeeper...");

    let config = Config::from_env()?;
    info!("Configuration loaded successfully");

    info!("Connecting to MongoDB...");
    let db = Database::connect(&config.mongodb_uri, &config.mongodb_database).await?;
    info!("Database connected");

    let ctx = StorageContext::new(config);

    for descriptor in ctx.schemas.iter() {
        let Some(name) = descriptor.collection() else {
            continue;
        };
        let collection = db.collection::<Document>(name);
        db.ensure_indexes(&collection, descriptor).await?;
        info!("Indexes ready on {}", name);
    }

    info!(
        "Article partitions live under {} ({} characters of namespace)",
        db.name(),
        ctx.partitions.namespace_len()
    );

    ctx.teardown();
    Ok(())
}
