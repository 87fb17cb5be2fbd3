//! Lazily opened article partitions.
//!
//! Partition names come from [`PartitionNamer`]; this registry only maps a
//! name to a collection handle and makes sure the partition's indexes exist
//! the first time it is opened.

use anyhow::Result;
use dashmap::DashSet;
use mongodb::Collection;
use tracing::debug;

use super::Database;
use super::models::Article;
use crate::cache::{CacheConfig, TypedCache};
use crate::context::StorageContext;
use crate::error::KeyResult;
use crate::partition::PartitionNamer;
use crate::schema::{EntityKind, SchemaDescriptor};

/// Partition name -> article collection.
pub struct PartitionRegistry {
    db: Database,
    namer: PartitionNamer,
    descriptor: SchemaDescriptor,
    handles: TypedCache<String, Collection<Article>>,
    indexed: DashSet<String>,
}

impl PartitionRegistry {
    pub fn new(db: &Database, ctx: &StorageContext) -> Self {
        Self {
            db: db.clone(),
            namer: ctx.partitions.clone(),
            descriptor: ctx.schemas.descriptor(EntityKind::Article).clone(),
            handles: ctx
                .caches
                .get_or_create("article_partitions", CacheConfig::partitions()),
            indexed: DashSet::new(),
        }
    }

    /// Partition name for a source. Pure; does not touch the store.
    pub fn name(&self, link: &str, shard_id: Option<u32>, prefix: &str) -> KeyResult<String> {
        self.namer.name(link, shard_id, prefix)
    }

    /// Open the article partition of a source.
    pub async fn open(
        &self,
        link: &str,
        shard_id: Option<u32>,
        prefix: &str,
    ) -> Result<Collection<Article>> {
        let name = self.name(link, shard_id, prefix)?;
        self.open_by_name(&name).await
    }

    /// Open a partition by its already computed name.
    pub async fn open_by_name(&self, name: &str) -> Result<Collection<Article>> {
        let collection = self
            .handles
            .get_or_insert_with(name.to_string(), || self.db.collection(name));

        if !self.indexed.contains(name) {
            self.db.ensure_indexes(&collection, &self.descriptor).await?;
            self.indexed.insert(name.to_string());
            debug!("Opened article partition {}", name);
        }

        Ok(collection)
    }

    /// Forget a partition handle, e.g. after the partition was dropped.
    pub fn forget(&self, name: &str) {
        self.handles.invalidate(&name.to_string());
        self.indexed.remove(name);
    }
}
