//! Repository module - data access built on the naming core.

mod article_store;
mod guild_repository;

pub use article_store::ArticleStore;
pub use guild_repository::GuildConfigRepository;
