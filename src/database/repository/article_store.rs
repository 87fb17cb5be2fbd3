//! Article store over per-source partitions.

use anyhow::Result;
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use serde_json::Value;
use tracing::debug;

use crate::context::StorageContext;
use crate::database::dump::{self, ArticleDump};
use crate::database::models::Article;
use crate::database::{Database, PartitionRegistry};
use crate::expiry::ExpiryPolicy;

/// Reads and writes articles of one source at a time.
pub struct ArticleStore {
    partitions: PartitionRegistry,
    expiry: ExpiryPolicy,
}

impl ArticleStore {
    pub fn new(db: &Database, ctx: &StorageContext) -> Self {
        Self {
            partitions: PartitionRegistry::new(db, ctx),
            expiry: ctx.expiry,
        }
    }

    pub fn partitions(&self) -> &PartitionRegistry {
        &self.partitions
    }

    /// Store a newly seen article, stamped with the article expiry.
    pub async fn insert(
        &self,
        link: &str,
        shard_id: Option<u32>,
        prefix: &str,
        id: &str,
        title: Option<String>,
        comparisons: Option<Document>,
    ) -> Result<Article> {
        let collection = self.partitions.open(link, shard_id, prefix).await?;

        let mut article = Article::new(id, title, &self.expiry);
        article.custom_comparisons = comparisons;

        let inserted = collection.insert_one(&article).await?;
        article.oid = inserted.inserted_id.as_object_id();

        debug!("Stored article {} in {}", id, collection.name());
        Ok(article)
    }

    /// Whether an article id was already stored for a source.
    pub async fn contains(&self, link: &str, shard_id: Option<u32>, prefix: &str, id: &str) -> Result<bool> {
        let collection = self.partitions.open(link, shard_id, prefix).await?;
        Ok(collection.find_one(doc! { "id": id }).await?.is_some())
    }

    /// All stored articles of a source.
    pub async fn list(&self, link: &str, shard_id: Option<u32>, prefix: &str) -> Result<Vec<Article>> {
        let collection = self.partitions.open(link, shard_id, prefix).await?;
        let articles: Vec<Article> = collection.find(doc! {}).await?.try_collect().await?;
        Ok(articles)
    }

    /// Render every stored document of a source as a dump attachment.
    pub async fn dump(
        &self,
        link: &str,
        shard_id: Option<u32>,
        prefix: &str,
        raw: bool,
    ) -> Result<ArticleDump> {
        let collection = self
            .partitions
            .open(link, shard_id, prefix)
            .await?
            .clone_with_type::<Document>();

        let docs: Vec<Document> = collection.find(doc! {}).await?.try_collect().await?;
        let values: Vec<Value> = docs
            .into_iter()
            .map(|mut d| {
                d.remove("_id");
                Bson::Document(d).into_relaxed_extjson()
            })
            .collect();

        debug!("Dumping {} article(s) of {}", values.len(), link);
        Ok(dump::render(link, &values, raw)?)
    }
}
