//! Auxiliary records: VIP status, blacklist, statistics, feedback, ratings.

use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Serialize};

use super::{Record, bson_date};
use crate::schema::EntityKind;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vip {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub oid: Option<ObjectId>,

    /// User ID (unique)
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fname: Option<String>,

    /// Guilds the perks apply to.
    #[serde(default)]
    pub servers: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permanent: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pledged: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pledged: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_feeds: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_servers: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_webhooks: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_cookies: Option<bool>,

    /// Record is deleted once this passes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_at: Option<BsonDateTime>,

    /// Grace period after the pledge lapses; deleted once this passes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graced_until: Option<BsonDateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#override: Option<bool>,
}

impl Record for Vip {
    const ENTITY: EntityKind = EntityKind::Vip;
    const COLLECTION: &'static str = "vips";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlacklistEntry {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub oid: Option<ObjectId>,

    pub is_guild: bool,

    /// User or guild ID (unique)
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub date: BsonDateTime,
}

impl Record for BlacklistEntry {
    const ENTITY: EntityKind = EntityKind::Blacklist;
    const COLLECTION: &'static str = "blacklists";
}

impl BlacklistEntry {
    pub fn user(id: impl Into<String>, name: Option<String>) -> Self {
        Self::new(false, id, name)
    }

    pub fn guild(id: impl Into<String>, name: Option<String>) -> Self {
        Self::new(true, id, name)
    }

    fn new(is_guild: bool, id: impl Into<String>, name: Option<String>) -> Self {
        Self {
            oid: None,
            is_guild,
            id: id.into(),
            name,
            date: bson_date(Utc::now()),
        }
    }
}

/// Per-shard cycle statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub oid: Option<ObjectId>,

    pub guilds: u64,
    pub feeds: u64,
    /// Seconds the last polling cycle took.
    pub cycle_time: f64,
    pub cycle_fails: u64,
    pub cycle_links: u64,

    /// Shard ID (unique)
    pub shard: u32,

    pub last_updated: BsonDateTime,
}

impl Record for Statistics {
    const ENTITY: EntityKind = EntityKind::Statistics;
    const COLLECTION: &'static str = "statistics";
}

impl Statistics {
    pub fn new(shard: u32) -> Self {
        Self {
            oid: None,
            guilds: 0,
            feeds: 0,
            cycle_time: 0.0,
            cycle_fails: 0,
            cycle_links: 0,
            shard,
            last_updated: bson_date(Utc::now()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub oid: Option<ObjectId>,

    #[serde(rename = "type")]
    pub kind: String,
    pub user_id: String,
    pub username: String,
    pub content: String,
    pub date: BsonDateTime,
}

impl Record for Feedback {
    const ENTITY: EntityKind = EntityKind::Feedback;
    const COLLECTION: &'static str = "feedbacks";
}

impl Feedback {
    pub fn new(
        kind: impl Into<String>,
        user_id: impl Into<String>,
        username: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            oid: None,
            kind: kind.into(),
            user_id: user_id.into(),
            username: username.into(),
            content: content.into(),
            date: bson_date(Utc::now()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub oid: Option<ObjectId>,

    #[serde(rename = "type")]
    pub kind: String,
    pub user_id: String,
    pub username: String,
    pub rating: i32,
    pub date: BsonDateTime,
}

impl Record for Rating {
    const ENTITY: EntityKind = EntityKind::Rating;
    const COLLECTION: &'static str = "ratings";
}

impl Rating {
    pub fn new(
        kind: impl Into<String>,
        user_id: impl Into<String>,
        username: impl Into<String>,
        rating: i32,
    ) -> Self {
        Self {
            oid: None,
            kind: kind.into(),
            user_id: user_id.into(),
            username: username.into(),
            rating,
            date: bson_date(Utc::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::test_support::assert_fits;
    use crate::expiry::ExpiryPolicy;
    use crate::schema::SchemaRegistry;
    use mongodb::bson::to_document;

    #[test]
    fn test_records_fit_schema() {
        let registry = SchemaRegistry::new(&ExpiryPolicy::default());

        let vip = Vip {
            id: "1".into(),
            max_feeds: Some(15),
            r#override: Some(true),
            expire_at: Some(bson_date(Utc::now())),
            ..Default::default()
        };
        assert_fits(&vip, registry.descriptor(EntityKind::Vip));
        assert_fits(&BlacklistEntry::guild("2", None), registry.descriptor(EntityKind::Blacklist));
        assert_fits(&Statistics::new(0), registry.descriptor(EntityKind::Statistics));
        assert_fits(
            &Feedback::new("general", "3", "reader", "Nice bot"),
            registry.descriptor(EntityKind::Feedback),
        );
        assert_fits(&Rating::new("general", "3", "reader", 5), registry.descriptor(EntityKind::Rating));
    }

    #[test]
    fn test_vip_servers_default_empty() {
        let stored = to_document(&Vip { id: "1".into(), ..Default::default() }).unwrap();
        assert!(stored.get_array("servers").unwrap().is_empty());
        assert!(!stored.contains_key("override"));
    }

    #[test]
    fn test_collections_match_schema() {
        fn check<T: Record>() {
            assert_eq!(T::ENTITY.collection(), Some(T::COLLECTION));
        }
        check::<crate::database::models::GuildConfig>();
        check::<crate::database::models::GuildConfigBackup>();
        check::<crate::database::models::FailedSource>();
        check::<crate::database::models::SourceShardAssignment>();
        check::<Vip>();
        check::<BlacklistEntry>();
        check::<Statistics>();
        check::<Feedback>();
        check::<Rating>();
    }
}
