//! Database module exports.

pub mod dump;
pub mod models;
mod mongo;
mod partitions;
mod repository;

pub use models::*;
pub use mongo::{Database, index_models};
pub use partitions::PartitionRegistry;
pub use repository::{ArticleStore, GuildConfigRepository};
