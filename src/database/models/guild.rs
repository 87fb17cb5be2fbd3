//! Guild configuration and its backups.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{DateTime as BsonDateTime, Document};
use serde::{Deserialize, Serialize};

use super::{Record, bson_date};
use crate::expiry::{ExpiryKind, ExpiryPolicy};
use crate::schema::EntityKind;

/// One feed configured in a guild.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source link the feed polls.
    pub link: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Channel articles are sent to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    /// Formatting, filters and anything else this layer does not interpret.
    #[serde(flatten)]
    pub settings: Document,
}

/// Per-guild configuration. One document per guild.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuildConfig {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub oid: Option<ObjectId>,

    /// Guild ID (unique)
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Users alerted about failing feeds. Absent until first set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_alerts_to: Option<Vec<String>>,

    /// Feed name -> feed config
    #[serde(default)]
    pub sources: HashMap<String, SourceConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vip: Option<Document>,

    /// Command prefix override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Record for GuildConfig {
    const ENTITY: EntityKind = EntityKind::GuildConfig;
    const COLLECTION: &'static str = "guilds";
}

impl GuildConfig {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Feed names whose source polls `link`.
    pub fn feeds_for_link<'a>(&'a self, link: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.sources
            .iter()
            .filter(move |(_, source)| source.link == link)
            .map(|(name, _)| name.as_str())
    }
}

/// Point-in-time copy of a guild config. Expires with the backup retention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildConfigBackup {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub oid: Option<ObjectId>,

    /// Guild ID (unique)
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_alerts_to: Option<Vec<String>>,

    #[serde(default)]
    pub sources: HashMap<String, SourceConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// When the backup was taken.
    pub date: BsonDateTime,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<BsonDateTime>,
}

impl Record for GuildConfigBackup {
    const ENTITY: EntityKind = EntityKind::GuildConfigBackup;
    const COLLECTION: &'static str = "guild_backups";
}

impl GuildConfigBackup {
    /// Back up `config` now.
    pub fn from_config(config: &GuildConfig, policy: &ExpiryPolicy) -> Self {
        Self::taken_at(config, policy, Utc::now())
    }

    /// Back up `config` as if taken at `now`.
    pub fn taken_at(config: &GuildConfig, policy: &ExpiryPolicy, now: DateTime<Utc>) -> Self {
        Self {
            oid: None,
            id: config.id.clone(),
            name: config.name.clone(),
            send_alerts_to: config.send_alerts_to.clone(),
            sources: config.sources.clone(),
            date_format: config.date_format.clone(),
            date_language: config.date_language.clone(),
            timezone: config.timezone.clone(),
            version: config.version.clone(),
            date: bson_date(now),
            expires_at: policy
                .expiry_date_at(ExpiryKind::Backup, now)
                .map(bson_date),
        }
    }

    /// Rebuild a guild config. VIP info and prefix are not part of a backup,
    /// so they are carried over from `live` when given.
    pub fn restore(self, live: Option<&GuildConfig>) -> GuildConfig {
        GuildConfig {
            oid: live.and_then(|c| c.oid),
            id: self.id,
            name: self.name,
            send_alerts_to: self.send_alerts_to,
            sources: self.sources,
            date_format: self.date_format,
            date_language: self.date_language,
            timezone: self.timezone,
            vip: live.and_then(|c| c.vip.clone()),
            prefix: live.and_then(|c| c.prefix.clone()),
            version: self.version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::test_support::assert_fits;
    use crate::expiry::Retention;
    use crate::schema::{SchemaRegistry, EXPIRES_AT};
    use chrono::{Duration, TimeZone};
    use mongodb::bson::{doc, to_document};

    fn sample() -> GuildConfig {
        let mut config = GuildConfig::new("1234");
        config.name = Some("Readers".into());
        config.prefix = Some("?".into());
        config.vip = Some(doc! { "max_feeds": 20 });
        config.sources.insert(
            "rss_1".into(),
            SourceConfig {
                link: "https://example.com/feed".into(),
                title: Some("Example".into()),
                channel: Some("42".into()),
                settings: doc! { "message": "{title}" },
            },
        );
        config
    }

    #[test]
    fn test_unset_alert_list_is_absent() {
        let config = GuildConfig::new("1");
        let stored = to_document(&config).unwrap();
        assert!(!stored.contains_key("send_alerts_to"));
        assert!(stored.contains_key("sources"));

        let registry = SchemaRegistry::new(&ExpiryPolicy::default());
        assert_fits(&sample(), registry.descriptor(EntityKind::GuildConfig));
    }

    #[test]
    fn test_source_settings_flatten() {
        let stored = to_document(&sample()).unwrap();
        let source = stored.get_document("sources").unwrap().get_document("rss_1").unwrap();
        assert_eq!(source.get_str("message").unwrap(), "{title}");
        assert_eq!(source.get_str("link").unwrap(), "https://example.com/feed");
    }

    #[test]
    fn test_backup_round_trip_keeps_live_fields() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let policy = ExpiryPolicy::default();
        let live = sample();

        let backup = GuildConfigBackup::taken_at(&live, &policy, now);
        assert_eq!(backup.expires_at, Some(bson_date(now + Duration::days(7))));
        assert_fits(&backup, SchemaRegistry::new(&policy).descriptor(EntityKind::GuildConfigBackup));

        let restored = backup.restore(Some(&live));
        assert_eq!(restored, live);

        let backup = GuildConfigBackup::taken_at(&live, &policy, now);
        let restored = backup.restore(None);
        assert_eq!(restored.prefix, None);
        assert_eq!(restored.sources, live.sources);
    }

    #[test]
    fn test_backup_without_retention() {
        let policy = ExpiryPolicy::new(Retention::Disabled, Retention::Days(14));
        let backup = GuildConfigBackup::from_config(&sample(), &policy);
        assert!(!to_document(&backup).unwrap().contains_key(EXPIRES_AT));
    }

    #[test]
    fn test_feeds_for_link() {
        let config = sample();
        let feeds: Vec<_> = config.feeds_for_link("https://example.com/feed").collect();
        assert_eq!(feeds, vec!["rss_1"]);
        assert_eq!(config.feeds_for_link("https://other.org").count(), 0);
    }
}
