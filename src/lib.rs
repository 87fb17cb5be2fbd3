//! Feedkeeper - storage addressing for a multi-shard feed dispatcher.
//!
//! Decides where state lives and how long it lives, without fetching or
//! rendering anything itself.
//!
//! ## Architecture
//!
//! - `partition` - Article partition names per source link, shard and schedule
//! - `schema` - Canonical shape and defaults of every persisted entity
//! - `cache` - Namespaced cache keys and Moka-backed caches
//! - `expiry` - Retention settings and expiry timestamps
//! - `config` - Environment configuration
//! - `context` - Shared per-shard storage context
//! - `database` - MongoDB models, partitions and repositories

pub mod cache;
pub mod config;
pub mod context;
pub mod database;
pub mod error;
pub mod expiry;
pub mod partition;
pub mod schema;

pub use cache::{CacheKeys, MemberStatus};
pub use config::Config;
pub use context::StorageContext;
pub use error::{ConfigError, KeyError, KeyResult};
pub use expiry::{ExpiryKind, ExpiryPolicy, Retention};
pub use partition::{PartitionNamer, link_hash, partition_id};
pub use schema::{EntityKind, SchemaRegistry};
