//! Per-link bookkeeping shared by all guilds polling a source.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::Record;
use crate::schema::EntityKind;

/// A source link that keeps failing. Written by the polling pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedSource {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub oid: Option<ObjectId>,

    pub link: String,

    /// Consecutive failures.
    #[serde(default)]
    pub count: u32,

    /// Reason once the link is given up on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed: Option<String>,
}

impl Record for FailedSource {
    const ENTITY: EntityKind = EntityKind::FailedSource;
    const COLLECTION: &'static str = "failed_links";
}

impl FailedSource {
    pub fn new(link: impl Into<String>) -> Self {
        Self {
            oid: None,
            link: link.into(),
            count: 0,
            failed: None,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.failed.is_some()
    }
}

/// Which shard and schedule poll a link, and how many feeds reference it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceShardAssignment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub oid: Option<ObjectId>,

    pub link: String,

    /// Feeds referencing this link.
    #[serde(default)]
    pub count: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shard: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_name: Option<String>,
}

impl Record for SourceShardAssignment {
    const ENTITY: EntityKind = EntityKind::SourceShardAssignment;
    const COLLECTION: &'static str = "link_trackers";
}

impl SourceShardAssignment {
    pub fn new(link: impl Into<String>, shard: Option<u32>, schedule_name: Option<String>) -> Self {
        Self {
            oid: None,
            link: link.into(),
            count: 1,
            shard,
            schedule_name,
        }
    }

    /// Schedule prefix used when naming this link's article partition.
    pub fn partition_prefix(&self) -> &str {
        self.schedule_name.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::test_support::assert_fits;
    use crate::expiry::ExpiryPolicy;
    use crate::partition::partition_id;
    use crate::schema::SchemaRegistry;

    #[test]
    fn test_fit_schema() {
        let registry = SchemaRegistry::new(&ExpiryPolicy::default());

        let mut failed = FailedSource::new("https://example.com/feed");
        failed.count = 3;
        failed.failed = Some("Connection timed out".into());
        assert!(failed.is_failed());
        assert_fits(&failed, registry.descriptor(EntityKind::FailedSource));

        let assignment = SourceShardAssignment::new("https://example.com/feed", Some(1), Some("hourly".into()));
        assert_fits(&assignment, registry.descriptor(EntityKind::SourceShardAssignment));
    }

    #[test]
    fn test_assignment_names_partition() {
        let link = "https://example.com/feed";
        let assignment = SourceShardAssignment::new(link, Some(4), None);
        assert_eq!(assignment.partition_prefix(), "");

        let id = partition_id(link, assignment.shard, assignment.partition_prefix(), 10).unwrap();
        assert!(id.starts_with("4_"));
    }
}
