//! Namespaced cache keys.
//!
//! Every family takes exactly one id and refuses an empty one, so nobody
//! builds a global key by accident. The channel-name table is the only
//! family without an id.

use crate::error::{KeyError, KeyResult};

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "drss";

/// Builds cache keys under one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeys {
    namespace: String,
}

impl Default for CacheKeys {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

fn require<'a>(id: &'a str, family: &'static str) -> KeyResult<&'a str> {
    if id.is_empty() {
        return Err(KeyError::MissingId { family });
    }
    Ok(id)
}

impl CacheKeys {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Map of cached guild data.
    pub fn guild(&self, guild_id: &str) -> KeyResult<String> {
        let id = require(guild_id, "Guild")?;
        Ok(format!("{}_guild_{}", self.namespace, id))
    }

    /// Map of cached user data.
    pub fn user(&self, user_id: &str) -> KeyResult<String> {
        let id = require(user_id, "User")?;
        Ok(format!("{}_user_{}", self.namespace, id))
    }

    /// Map of cached role data.
    pub fn role(&self, role_id: &str) -> KeyResult<String> {
        let id = require(role_id, "Role")?;
        Ok(format!("{}_role_{}", self.namespace, id))
    }

    /// Set of members checked for validity. May hold members that turned
    /// out to be invalid.
    pub fn members_of_guild(&self, guild_id: &str) -> KeyResult<String> {
        self.guild_set(guild_id, "members")
    }

    /// Set of members checked and found to have management permission.
    pub fn managers_of_guild(&self, guild_id: &str) -> KeyResult<String> {
        self.guild_set(guild_id, "managers")
    }

    /// Set of members checked against the platform and found WITHOUT
    /// management permission.
    pub fn non_managers_of_guild(&self, guild_id: &str) -> KeyResult<String> {
        self.guild_set(guild_id, "nonmanagers")
    }

    pub fn channels_of_guild(&self, guild_id: &str) -> KeyResult<String> {
        self.guild_set(guild_id, "channels")
    }

    pub fn roles_of_guild(&self, guild_id: &str) -> KeyResult<String> {
        self.guild_set(guild_id, "roles")
    }

    pub fn role_managers_of_guild(&self, guild_id: &str) -> KeyResult<String> {
        self.guild_set(guild_id, "roles_managers")
    }

    /// Map of channel id to channel name.
    pub fn channel_names(&self) -> String {
        format!("{}_channels_name", self.namespace)
    }

    fn guild_set(&self, guild_id: &str, suffix: &str) -> KeyResult<String> {
        let id = require(guild_id, "Guild")?;
        Ok(format!("{}_guild_{}_{}", self.namespace, id, suffix))
    }
}
