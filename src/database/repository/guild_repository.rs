//! Guild config repository with cache-first reads.
//!
//! Cached under the guild record key, so the cache shares its naming with
//! every other guild fact.

use anyhow::Result;
use mongodb::Collection;
use mongodb::bson::doc;
use tracing::debug;

use crate::cache::{CacheConfig, CacheKeys, TypedCache};
use crate::context::StorageContext;
use crate::database::Database;
use crate::database::models::{GuildConfig, GuildConfigBackup};
use crate::expiry::ExpiryPolicy;

/// Repository for guild configs and their backups.
pub struct GuildConfigRepository {
    guilds: Collection<GuildConfig>,
    backups: Collection<GuildConfigBackup>,
    cache: TypedCache<String, GuildConfig>,
    keys: CacheKeys,
    expiry: ExpiryPolicy,
}

impl GuildConfigRepository {
    pub fn new(db: &Database, ctx: &StorageContext) -> Self {
        Self {
            guilds: db.records(),
            backups: db.records(),
            cache: ctx.caches.get_or_create("guild_configs", CacheConfig::guild_records()),
            keys: ctx.keys.clone(),
            expiry: ctx.expiry,
        }
    }

    /// Get a guild's config, if it has one.
    pub async fn get(&self, guild_id: &str) -> Result<Option<GuildConfig>> {
        let key = self.keys.guild(guild_id)?;
        if let Some(config) = self.cache.get(&key) {
            return Ok(Some(config));
        }

        let result = self.guilds.find_one(doc! { "id": guild_id }).await?;
        debug!("DB get guild config for {}: {:?}", guild_id, result.is_some());

        if let Some(config) = &result {
            self.cache.insert(key, config.clone());
        }

        Ok(result)
    }

    /// Get a guild's config, creating an empty one if missing.
    pub async fn get_or_create(&self, guild_id: &str) -> Result<GuildConfig> {
        if let Some(config) = self.get(guild_id).await? {
            return Ok(config);
        }

        let config = GuildConfig::new(guild_id);
        self.save(&config).await?;
        Ok(config)
    }

    /// Save a guild config (upsert by guild id).
    pub async fn save(&self, config: &GuildConfig) -> Result<()> {
        let key = self.keys.guild(&config.id)?;
        let options = mongodb::options::ReplaceOptions::builder()
            .upsert(true)
            .build();

        self.guilds
            .replace_one(doc! { "id": config.id.as_str() }, config)
            .with_options(options)
            .await?;

        self.cache.insert(key, config.clone());
        debug!("Saved guild config for {}", config.id);
        Ok(())
    }

    /// Delete a guild's config on guild removal.
    pub async fn delete(&self, guild_id: &str) -> Result<bool> {
        let key = self.keys.guild(guild_id)?;
        let result = self.guilds.delete_one(doc! { "id": guild_id }).await?;
        self.cache.invalidate(&key);

        debug!("Deleted guild config for {}: {}", guild_id, result.deleted_count > 0);
        Ok(result.deleted_count > 0)
    }

    /// Snapshot a guild's current config. Replaces any earlier backup.
    ///
    /// Returns `None` when the guild has no config to back up.
    pub async fn backup(&self, guild_id: &str) -> Result<Option<GuildConfigBackup>> {
        let Some(config) = self.get(guild_id).await? else {
            return Ok(None);
        };

        let backup = GuildConfigBackup::from_config(&config, &self.expiry);
        let options = mongodb::options::ReplaceOptions::builder()
            .upsert(true)
            .build();

        self.backups
            .replace_one(doc! { "id": guild_id }, &backup)
            .with_options(options)
            .await?;

        debug!(
            "Backed up guild config for {} (expires {:?})",
            guild_id, backup.expires_at
        );
        Ok(Some(backup))
    }

    /// Latest backup of a guild, if it has not expired yet.
    pub async fn get_backup(&self, guild_id: &str) -> Result<Option<GuildConfigBackup>> {
        self.keys.guild(guild_id)?;
        Ok(self.backups.find_one(doc! { "id": guild_id }).await?)
    }

    /// Replace a guild's config with its latest backup.
    ///
    /// Returns the restored config, or `None` when no backup exists.
    pub async fn restore(&self, guild_id: &str) -> Result<Option<GuildConfig>> {
        let Some(backup) = self.get_backup(guild_id).await? else {
            return Ok(None);
        };

        let live = self.get(guild_id).await?;
        let restored = backup.restore(live.as_ref());
        self.save(&restored).await?;

        debug!("Restored guild config for {} from backup", guild_id);
        Ok(Some(restored))
    }
}
