//! MongoDB database wrapper.

use mongodb::bson::Document;
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, IndexModel};
use tracing::{debug, info};

use super::models::Record;
use crate::schema::SchemaDescriptor;

/// Database wrapper for MongoDB operations.
#[derive(Debug, Clone)]
pub struct Database {
    client: Client,
    db: mongodb::Database,
}

impl Database {
    /// Connect to MongoDB with the given URI and database name.
    ///
    /// # Errors
    /// Returns error if connection fails.
    pub async fn connect(uri: &str, db_name: &str) -> anyhow::Result<Self> {
        let options = ClientOptions::parse(uri).await?;
        let client = Client::with_options(options)?;

        // Ping the database to verify connection
        client
            .database("admin")
            .run_command(mongodb::bson::doc! { "ping": 1 })
            .await?;

        info!("Successfully connected to MongoDB");

        let db = client.database(db_name);

        Ok(Self { client, db })
    }

    /// Get a reference to the underlying MongoDB client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Name of the database, which prefixes every collection namespace.
    pub fn name(&self) -> &str {
        self.db.name()
    }

    /// Get a typed collection from the database.
    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    /// Collection holding records of type `T`.
    pub fn records<T: Record>(&self) -> Collection<T> {
        self.collection(T::COLLECTION)
    }

    /// Create the unique and TTL indexes a descriptor declares.
    pub async fn ensure_indexes<T: Send + Sync>(
        &self,
        collection: &Collection<T>,
        descriptor: &SchemaDescriptor,
    ) -> anyhow::Result<()> {
        let models = index_models(descriptor);
        if models.is_empty() {
            return Ok(());
        }

        let count = models.len();
        collection.create_indexes(models).await?;
        debug!("Ensured {} index(es) on {}", count, collection.name());
        Ok(())
    }
}

/// Index models for a descriptor: one unique index per unique field and a
/// TTL index (`expireAfterSeconds: 0`) per expiring field.
pub fn index_models(descriptor: &SchemaDescriptor) -> Vec<IndexModel> {
    let unique = descriptor.unique_fields().map(|field| {
        (field.name, IndexOptions::builder().unique(true).build())
    });
    let expiring = descriptor.expiring_fields().map(|field| {
        (
            field.name,
            IndexOptions::builder()
                .expire_after(std::time::Duration::ZERO)
                .build(),
        )
    });

    unique
        .chain(expiring)
        .map(|(name, options)| {
            let mut keys = Document::new();
            keys.insert(name, 1i32);
            IndexModel::builder().keys(keys).options(options).build()
        })
        .collect()
}
