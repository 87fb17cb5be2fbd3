//! Cached outcome of member permission checks.
//!
//! A member checked against the platform ends up in exactly one state:
//! valid member, manager, or confirmed non-manager. Keeping one status per
//! member in a single map makes it impossible for an id to sit in two states
//! after a missed removal. Entries fall out by TTL.

use std::time::Duration;

use tracing::debug;

use super::{CacheConfig, CacheKeys, CacheRegistry, TypedCache};
use crate::error::KeyResult;

/// Result of verifying a member against the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberStatus {
    /// Checked and present in the guild.
    Member,
    /// Checked and allowed to manage feeds.
    Manager,
    /// Checked and NOT allowed to manage feeds.
    NonManager,
}

impl MemberStatus {
    /// Legacy set key this status corresponds to.
    pub fn set_key(&self, keys: &CacheKeys, guild_id: &str) -> KeyResult<String> {
        match self {
            Self::Member => keys.members_of_guild(guild_id),
            Self::Manager => keys.managers_of_guild(guild_id),
            Self::NonManager => keys.non_managers_of_guild(guild_id),
        }
    }
}

/// (members-of-guild key, user id)
type MembershipKey = (String, String);

/// Per-guild member status cache.
#[derive(Clone, Debug)]
pub struct MembershipCache {
    keys: CacheKeys,
    statuses: TypedCache<MembershipKey, MemberStatus>,
}

impl MembershipCache {
    pub fn new(keys: CacheKeys, registry: &CacheRegistry, ttl: Duration) -> Self {
        let statuses = registry.get_or_create(
            "member_status",
            CacheConfig::with_capacity(50_000).ttl(ttl),
        );

        Self { keys, statuses }
    }

    fn key(&self, guild_id: &str, user_id: &str) -> KeyResult<MembershipKey> {
        let guild = self.keys.members_of_guild(guild_id)?;
        // Validates the user id the same way the user key family does.
        self.keys.user(user_id)?;
        Ok((guild, user_id.to_string()))
    }

    /// Cached status, if the member was checked recently.
    pub fn status(&self, guild_id: &str, user_id: &str) -> KeyResult<Option<MemberStatus>> {
        let key = self.key(guild_id, user_id)?;
        Ok(self.statuses.get(&key))
    }

    /// Whether the platform must be asked about this member.
    pub fn needs_verification(&self, guild_id: &str, user_id: &str) -> KeyResult<bool> {
        Ok(self.status(guild_id, user_id)?.is_none())
    }

    /// Record a verification result, replacing any earlier one.
    pub fn record(&self, guild_id: &str, user_id: &str, status: MemberStatus) -> KeyResult<()> {
        let key = self.key(guild_id, user_id)?;
        debug!("Member {} in guild {} verified as {:?}", user_id, guild_id, status);
        self.statuses.insert(key, status);
        Ok(())
    }

    /// Drop a cached result, e.g. after a role change.
    pub fn forget(&self, guild_id: &str, user_id: &str) -> KeyResult<()> {
        let key = self.key(guild_id, user_id)?;
        self.statuses.invalidate(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KeyError;

    fn cache() -> MembershipCache {
        MembershipCache::new(
            CacheKeys::default(),
            &CacheRegistry::new(),
            Duration::from_secs(60),
        )
    }

    #[test]
    fn test_unchecked_member_needs_verification() {
        let cache = cache();
        assert!(cache.needs_verification("1", "2").unwrap());
        assert_eq!(cache.status("1", "2").unwrap(), None);
    }

    #[test]
    fn test_record_replaces_previous_status() {
        let cache = cache();
        cache.record("1", "2", MemberStatus::Manager).unwrap();
        assert!(!cache.needs_verification("1", "2").unwrap());

        cache.record("1", "2", MemberStatus::NonManager).unwrap();
        assert_eq!(cache.status("1", "2").unwrap(), Some(MemberStatus::NonManager));

        // Other guilds are unaffected.
        assert_eq!(cache.status("3", "2").unwrap(), None);
    }

    #[test]
    fn test_forget() {
        let cache = cache();
        cache.record("1", "2", MemberStatus::Member).unwrap();
        cache.forget("1", "2").unwrap();
        assert!(cache.needs_verification("1", "2").unwrap());
    }

    #[test]
    fn test_empty_ids_rejected() {
        let cache = cache();
        assert!(matches!(
            cache.record("", "2", MemberStatus::Member),
            Err(KeyError::MissingId { family: "Guild" })
        ));
        assert!(matches!(
            cache.status("1", ""),
            Err(KeyError::MissingId { family: "User" })
        ));
    }

    #[test]
    fn test_status_maps_to_legacy_set() {
        let keys = CacheKeys::default();
        assert_eq!(
            MemberStatus::NonManager.set_key(&keys, "5").unwrap(),
            "drss_guild_5_nonmanagers"
        );
        assert_eq!(MemberStatus::Member.set_key(&keys, "5").unwrap(), "drss_guild_5_members");
    }
}
