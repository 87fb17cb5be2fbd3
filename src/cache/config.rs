//! Cache configuration.

use std::time::Duration;

/// Configuration for a cache instance.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries in the cache.
    pub max_capacity: u64,

    /// Time-to-live for cache entries.
    /// After this duration, entries are automatically evicted.
    pub ttl: Option<Duration>,

    /// Time-to-idle for cache entries.
    /// Entries are evicted if not accessed within this duration.
    pub tti: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            ttl: Some(Duration::from_secs(300)), // 5 minutes
            tti: None,
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with the given max capacity.
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self {
            max_capacity,
            ..Default::default()
        }
    }

    /// Set time-to-live for cache entries.
    #[must_use]
    pub fn ttl(mut self, duration: Duration) -> Self {
        self.ttl = Some(duration);
        self
    }

    /// Guild configs: read on every command, rewritten on config commands.
    pub fn guild_records() -> Self {
        Self {
            max_capacity: 5_000,
            ttl: Some(Duration::from_secs(600)), // 10 minutes
            tti: Some(Duration::from_secs(300)), // 5 minutes idle
        }
    }

    /// Partition handles: one per active source link, cheap to rebuild.
    pub fn partitions() -> Self {
        Self {
            max_capacity: 20_000,
            ttl: None,
            tti: Some(Duration::from_secs(3600)), // 1 hour idle
        }
    }
}
