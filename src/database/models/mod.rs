//! Persisted record models.
//!
//! Field names match the descriptors in `crate::schema`. Optional fields are
//! left out of the stored document when unset, so "absent" and "empty" stay
//! distinguishable.

pub mod article;
pub mod guild;
pub mod source;
pub mod support;

pub use article::Article;
pub use guild::{GuildConfig, GuildConfigBackup, SourceConfig};
pub use source::{FailedSource, SourceShardAssignment};
pub use support::{BlacklistEntry, Feedback, Rating, Statistics, Vip};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::schema::EntityKind;

/// A record stored in a fixed, named collection.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
    const ENTITY: EntityKind;
    const COLLECTION: &'static str;
}

/// Convert a chrono timestamp into a BSON date, which TTL indexes require.
pub fn bson_date(at: DateTime<Utc>) -> mongodb::bson::DateTime {
    mongodb::bson::DateTime::from_millis(at.timestamp_millis())
}

#[cfg(test)]
pub(crate) mod test_support {
    use mongodb::bson::to_document;
    use serde::Serialize;

    use crate::schema::SchemaDescriptor;

    /// Assert every stored field of `record` is declared by `descriptor`.
    pub fn assert_fits<T: Serialize>(record: &T, descriptor: &SchemaDescriptor) {
        let doc = to_document(record).unwrap();
        for key in doc.keys() {
            assert!(
                key == "_id" || descriptor.has_field(key),
                "{:?} stores undeclared field {}",
                descriptor.entity,
                key
            );
        }
    }
}
