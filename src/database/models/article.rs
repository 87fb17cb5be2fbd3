//! Article stored in a per-source partition.

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{DateTime as BsonDateTime, Document};
use serde::{Deserialize, Serialize};

use super::bson_date;
use crate::expiry::{ExpiryKind, ExpiryPolicy};

/// An article already seen for a source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub oid: Option<ObjectId>,

    /// Article id assigned by the feed.
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// When the article was first stored.
    pub date: BsonDateTime,

    /// Extra fields compared to detect edits, keyed by field name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_comparisons: Option<Document>,

    /// Present only when article retention is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<BsonDateTime>,
}

impl Article {
    /// New article stamped with the current time and article expiry.
    pub fn new(id: impl Into<String>, title: Option<String>, policy: &ExpiryPolicy) -> Self {
        Self::created_at(id, title, policy, Utc::now())
    }

    /// New article as if created at `now`.
    pub fn created_at(
        id: impl Into<String>,
        title: Option<String>,
        policy: &ExpiryPolicy,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            oid: None,
            id: id.into(),
            title,
            date: bson_date(now),
            custom_comparisons: None,
            expires_at: policy
                .expiry_date_at(ExpiryKind::Article, now)
                .map(bson_date),
        }
    }

    /// Attach comparison fields.
    #[must_use]
    pub fn with_comparisons(mut self, comparisons: Document) -> Self {
        self.custom_comparisons = Some(comparisons);
        self
    }
}
