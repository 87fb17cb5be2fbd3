//! Storage context shared by every worker of a shard.
//!
//! Holds the naming generators derived from configuration together with the
//! shard's mutable registries (command prefixes, deleted feeds, schedule
//! keywords, blacklists). Built once at startup, handed around as
//! `Arc<StorageContext>`, and emptied with [`StorageContext::teardown`].

use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::cache::{CacheKeys, CacheRegistry, MembershipCache};
use crate::config::Config;
use crate::error::KeyResult;
use crate::expiry::ExpiryPolicy;
use crate::partition::PartitionNamer;
use crate::schema::SchemaRegistry;

/// How far startup has progressed. Decides which commands may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum InitLevel {
    /// Some shards are still initializing.
    #[default]
    Booting,
    /// This shard is ready; others may not be.
    ShardReady,
    /// Every shard is ready.
    AllShardsReady,
}

/// Mutable per-shard registries.
#[derive(Debug, Default)]
pub struct ShardState {
    prefixes: DashMap<String, String>,
    init_level: RwLock<InitLevel>,
    deleted_feeds: DashSet<String>,
    schedule_words: RwLock<Vec<String>>,
    schedule_feed_names: DashSet<String>,
    blacklisted_users: DashSet<String>,
    blacklisted_guilds: DashSet<String>,
}

impl ShardState {
    pub fn prefix(&self, guild_id: &str) -> Option<String> {
        self.prefixes.get(guild_id).map(|p| p.value().clone())
    }

    pub fn set_prefix(&self, guild_id: &str, prefix: impl Into<String>) {
        self.prefixes.insert(guild_id.to_string(), prefix.into());
    }

    pub fn remove_prefix(&self, guild_id: &str) -> Option<String> {
        self.prefixes.remove(guild_id).map(|(_, p)| p)
    }

    pub fn init_level(&self) -> InitLevel {
        *self.init_level.read()
    }

    /// Move to `level`. Never goes backwards.
    pub fn advance_init_level(&self, level: InitLevel) {
        let mut current = self.init_level.write();
        if level > *current {
            debug!("Init level {:?} -> {:?}", *current, level);
            *current = level;
        }
    }

    /// Remember a feed deleted during the running cycle so pending articles
    /// for it are dropped.
    pub fn mark_feed_deleted(&self, feed_name: &str) {
        self.deleted_feeds.insert(feed_name.to_string());
    }

    pub fn is_feed_deleted(&self, feed_name: &str) -> bool {
        self.deleted_feeds.contains(feed_name)
    }

    /// Forget deleted feeds once a cycle finishes.
    pub fn finish_cycle(&self) {
        self.deleted_feeds.clear();
    }

    /// Replace the keywords and feed names of all schedules.
    pub fn set_schedules(&self, words: Vec<String>, feed_names: impl IntoIterator<Item = String>) {
        *self.schedule_words.write() = words;
        self.schedule_feed_names.clear();
        for name in feed_names {
            self.schedule_feed_names.insert(name);
        }
    }

    pub fn schedule_words(&self) -> Vec<String> {
        self.schedule_words.read().clone()
    }

    pub fn is_scheduled(&self, feed_name: &str) -> bool {
        self.schedule_feed_names.contains(feed_name)
    }

    pub fn blacklist_user(&self, user_id: &str) {
        self.blacklisted_users.insert(user_id.to_string());
    }

    pub fn blacklist_guild(&self, guild_id: &str) {
        self.blacklisted_guilds.insert(guild_id.to_string());
    }

    pub fn unblacklist(&self, id: &str) -> bool {
        let user = self.blacklisted_users.remove(id).is_some();
        let guild = self.blacklisted_guilds.remove(id).is_some();
        user || guild
    }

    pub fn is_user_blacklisted(&self, user_id: &str) -> bool {
        self.blacklisted_users.contains(user_id)
    }

    pub fn is_guild_blacklisted(&self, guild_id: &str) -> bool {
        self.blacklisted_guilds.contains(guild_id)
    }

    fn clear(&self) {
        self.prefixes.clear();
        *self.init_level.write() = InitLevel::Booting;
        self.deleted_feeds.clear();
        self.schedule_words.write().clear();
        self.schedule_feed_names.clear();
        self.blacklisted_users.clear();
        self.blacklisted_guilds.clear();
    }
}

/// Everything a worker needs to name, cache and expire state.
#[derive(Debug)]
pub struct StorageContext {
    pub config: Config,
    pub partitions: PartitionNamer,
    pub keys: CacheKeys,
    pub expiry: ExpiryPolicy,
    pub schemas: SchemaRegistry,
    pub caches: CacheRegistry,
    pub membership: MembershipCache,
    pub shard: ShardState,
}

impl StorageContext {
    pub fn new(config: Config) -> Arc<Self> {
        let partitions = PartitionNamer::for_database(&config.mongodb_database);
        let keys = CacheKeys::new(config.cache_namespace.clone());
        let expiry = config.expiry_policy();
        let schemas = SchemaRegistry::new(&expiry);
        let caches = CacheRegistry::new();
        let membership = MembershipCache::new(keys.clone(), &caches, config.cache_ttl);

        info!(
            "Storage context ready (namespace {}, backups {:?}, articles {:?})",
            keys.namespace(),
            expiry.backup,
            expiry.article
        );

        Arc::new(Self {
            config,
            partitions,
            keys,
            expiry,
            schemas,
            caches,
            membership,
            shard: ShardState::default(),
        })
    }

    /// Partition name for a source polled by `shard_id` under `schedule`.
    pub fn partition_id(&self, link: &str, shard_id: Option<u32>, schedule: &str) -> KeyResult<String> {
        self.partitions.name(link, shard_id, schedule)
    }

    /// Drop shard registries and cached facts. The context can be reused
    /// afterwards as if freshly built.
    pub fn teardown(&self) {
        self.shard.clear();
        self.caches.clear();
        info!("Storage context torn down");
    }
}
