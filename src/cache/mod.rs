//! Cache module - key naming plus in-process caches backed by Moka.
//!
//! ## Architecture
//!
//! - `CacheKeys` - Namespaced key families for every cached fact
//! - `CacheRegistry` - Central registry holding all named caches
//! - `TypedCache` - Thin typed wrapper over a Moka cache
//! - `MembershipCache` - One verification status per guild member
//!
//! ## Usage
//!
//! ```rust,ignore
//! let keys = CacheKeys::new("drss");
//! let guilds = registry.get_or_create::<String, GuildConfig>("guilds", CacheConfig::default());
//!
//! guilds.insert(keys.guild("123")?, config);
//! ```

mod config;
pub mod keys;
mod membership;
mod registry;
mod typed;

pub use config::CacheConfig;
pub use keys::CacheKeys;
pub use membership::{MemberStatus, MembershipCache};
pub use registry::CacheRegistry;
pub use typed::TypedCache;
