//! Canonical shape of every persisted entity.
//!
//! Descriptors are plain data. The store adapter turns them into indexes and
//! the record constructors in `database::models` follow them. A field bound
//! to a retention setting only exists when that retention stamps an expiry;
//! with a disabled retention the descriptor has no such field at all.

use crate::expiry::{ExpiryKind, ExpiryPolicy};

/// Name of the expiry field on time-limited records.
pub const EXPIRES_AT: &str = "expires_at";

/// Every persisted entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    GuildConfig,
    GuildConfigBackup,
    FailedSource,
    SourceShardAssignment,
    Article,
    Vip,
    Blacklist,
    Statistics,
    Feedback,
    Rating,
}

impl EntityKind {
    pub const ALL: [EntityKind; 10] = [
        Self::GuildConfig,
        Self::GuildConfigBackup,
        Self::FailedSource,
        Self::SourceShardAssignment,
        Self::Article,
        Self::Vip,
        Self::Blacklist,
        Self::Statistics,
        Self::Feedback,
        Self::Rating,
    ];

    /// Fixed collection name. Articles live in per-source partitions instead.
    pub fn collection(&self) -> Option<&'static str> {
        match self {
            Self::GuildConfig => Some("guilds"),
            Self::GuildConfigBackup => Some("guild_backups"),
            Self::FailedSource => Some("failed_links"),
            Self::SourceShardAssignment => Some("link_trackers"),
            Self::Article => None,
            Self::Vip => Some("vips"),
            Self::Blacklist => Some("blacklists"),
            Self::Statistics => Some("statistics"),
            Self::Feedback => Some("feedbacks"),
            Self::Rating => Some("ratings"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Date,
    StringList,
    /// Free-form embedded document.
    Object,
}

/// How a field is filled when a record is created without it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    /// Creation time.
    Now,
    EmptyList,
    /// Creation time plus the retention of this kind.
    Expiry(ExpiryKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub unique: bool,
    pub default: Option<FieldDefault>,
    /// Backed by a TTL index that deletes the record once this date passes.
    pub expires: bool,
}

impl FieldSpec {
    pub fn new(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            unique: false,
            default: None,
            expires: false,
        }
    }

    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    #[must_use]
    pub fn default(mut self, default: FieldDefault) -> Self {
        self.default = Some(default);
        self
    }

    #[must_use]
    pub fn expires(mut self) -> Self {
        self.expires = true;
        self
    }
}

/// Shape of one entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDescriptor {
    pub entity: EntityKind,
    pub fields: Vec<FieldSpec>,
}

impl SchemaDescriptor {
    pub fn collection(&self) -> Option<&'static str> {
        self.entity.collection()
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn unique_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.unique)
    }

    pub fn expiring_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.expires)
    }
}

/// Descriptors for every entity, built against one expiry policy.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    descriptors: Vec<SchemaDescriptor>,
}

use FieldType::{Boolean, Date, Number, Object, StringList};

fn text(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldType::String)
}

fn created_at(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, Date).default(FieldDefault::Now)
}

// The expiry field, or nothing when the retention is disabled.
fn expiry_field(policy: &ExpiryPolicy, kind: ExpiryKind) -> Option<FieldSpec> {
    policy.retention(kind).stamps_expiry().then(|| {
        FieldSpec::new(EXPIRES_AT, Date)
            .default(FieldDefault::Expiry(kind))
            .expires()
    })
}

fn guild_config_fields() -> Vec<FieldSpec> {
    vec![
        text("id").unique(),
        text("name"),
        // No default: an unset list stays absent rather than empty.
        FieldSpec::new("send_alerts_to", StringList),
        FieldSpec::new("sources", Object),
        text("date_format"),
        text("date_language"),
        text("timezone"),
        text("version"),
    ]
}

fn describe(kind: EntityKind, policy: &ExpiryPolicy) -> SchemaDescriptor {
    let fields = match kind {
        EntityKind::GuildConfig => {
            let mut fields = guild_config_fields();
            fields.push(FieldSpec::new("vip", Object));
            fields.push(text("prefix"));
            fields
        }
        EntityKind::GuildConfigBackup => {
            let mut fields = guild_config_fields();
            fields.push(created_at("date"));
            fields.extend(expiry_field(policy, ExpiryKind::Backup));
            fields
        }
        EntityKind::FailedSource => vec![
            text("link"),
            FieldSpec::new("count", Number),
            text("failed"),
        ],
        EntityKind::SourceShardAssignment => vec![
            text("link"),
            FieldSpec::new("count", Number),
            FieldSpec::new("shard", Number),
            text("schedule_name"),
        ],
        EntityKind::Article => {
            let mut fields = vec![
                text("id"),
                text("title"),
                created_at("date"),
                FieldSpec::new("custom_comparisons", Object),
            ];
            fields.extend(expiry_field(policy, ExpiryKind::Article));
            fields
        }
        EntityKind::Vip => vec![
            text("id").unique(),
            FieldSpec::new("invalid", Boolean),
            text("name"),
            text("fname"),
            FieldSpec::new("servers", StringList).default(FieldDefault::EmptyList),
            FieldSpec::new("permanent", Boolean),
            FieldSpec::new("pledged", Number),
            FieldSpec::new("total_pledged", Number),
            FieldSpec::new("max_feeds", Number),
            FieldSpec::new("max_servers", Number),
            FieldSpec::new("allow_webhooks", Boolean),
            FieldSpec::new("allow_cookies", Boolean),
            FieldSpec::new("expire_at", Date).expires(),
            FieldSpec::new("graced_until", Date).expires(),
            FieldSpec::new("override", Boolean),
        ],
        EntityKind::Blacklist => vec![
            FieldSpec::new("is_guild", Boolean),
            text("id").unique(),
            text("name"),
            created_at("date"),
        ],
        EntityKind::Statistics => vec![
            FieldSpec::new("guilds", Number),
            FieldSpec::new("feeds", Number),
            FieldSpec::new("cycle_time", Number),
            FieldSpec::new("cycle_fails", Number),
            FieldSpec::new("cycle_links", Number),
            FieldSpec::new("shard", Number).unique(),
            created_at("last_updated"),
        ],
        EntityKind::Feedback => vec![
            text("type"),
            text("user_id"),
            text("username"),
            text("content"),
            created_at("date"),
        ],
        EntityKind::Rating => vec![
            text("type"),
            text("user_id"),
            text("username"),
            FieldSpec::new("rating", Number),
            created_at("date"),
        ],
    };

    SchemaDescriptor {
        entity: kind,
        fields,
    }
}

impl SchemaRegistry {
    pub fn new(policy: &ExpiryPolicy) -> Self {
        Self {
            descriptors: EntityKind::ALL
                .iter()
                .map(|kind| describe(*kind, policy))
                .collect(),
        }
    }

    pub fn descriptor(&self, kind: EntityKind) -> &SchemaDescriptor {
        // Built from EntityKind::ALL, which lists variants in declaration order.
        &self.descriptors[kind as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchemaDescriptor> {
        self.descriptors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expiry::Retention;

    #[test]
    fn test_descriptor_lookup_matches_kind() {
        let registry = SchemaRegistry::new(&ExpiryPolicy::default());
        for kind in EntityKind::ALL {
            assert_eq!(registry.descriptor(kind).entity, kind);
        }
        assert_eq!(registry.iter().count(), EntityKind::ALL.len());
    }

    #[test]
    fn test_expiry_field_follows_retention() {
        let policy = ExpiryPolicy::new(Retention::Unlimited, Retention::Disabled);
        let registry = SchemaRegistry::new(&policy);

        let backup = registry.descriptor(EntityKind::GuildConfigBackup);
        let field = backup.field(EXPIRES_AT).unwrap();
        assert!(field.expires);
        assert_eq!(field.default, Some(FieldDefault::Expiry(ExpiryKind::Backup)));

        let article = registry.descriptor(EntityKind::Article);
        assert!(!article.has_field(EXPIRES_AT));
        assert_eq!(article.expiring_fields().count(), 0);
    }

    #[test]
    fn test_uniqueness() {
        let registry = SchemaRegistry::new(&ExpiryPolicy::default());
        let unique: Vec<_> = registry
            .descriptor(EntityKind::GuildConfig)
            .unique_fields()
            .map(|f| f.name)
            .collect();
        assert_eq!(unique, vec!["id"]);

        let stats = registry.descriptor(EntityKind::Statistics);
        assert!(stats.field("shard").unwrap().unique);
    }

    #[test]
    fn test_defaults() {
        let registry = SchemaRegistry::new(&ExpiryPolicy::default());
        let guild = registry.descriptor(EntityKind::GuildConfig);
        assert_eq!(guild.field("send_alerts_to").unwrap().default, None);

        let vip = registry.descriptor(EntityKind::Vip);
        assert_eq!(vip.field("servers").unwrap().default, Some(FieldDefault::EmptyList));
        assert_eq!(vip.expiring_fields().count(), 2);

        let feedback = registry.descriptor(EntityKind::Feedback);
        assert_eq!(feedback.field("date").unwrap().default, Some(FieldDefault::Now));
    }

    #[test]
    fn test_articles_have_no_fixed_collection() {
        let registry = SchemaRegistry::new(&ExpiryPolicy::default());
        assert_eq!(registry.descriptor(EntityKind::Article).collection(), None);
        assert_eq!(
            registry.descriptor(EntityKind::GuildConfigBackup).collection(),
            Some("guild_backups")
        );
    }
}
