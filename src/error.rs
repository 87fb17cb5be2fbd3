//! Error types for key and identifier construction.

use thiserror::Error;

/// Result alias for the naming core.
pub type KeyResult<T> = Result<T, KeyError>;

/// Invalid input handed to a partition or cache key generator.
///
/// These are returned synchronously and never retried; the caller decides
/// what the user sees.
#[derive(Debug, Error)]
pub enum KeyError {
    /// A required identifier was empty.
    #[error("{family} ID must be provided")]
    MissingId { family: &'static str },

    /// The source link is not an absolute URL.
    #[error("invalid source link {link:?}: {source}")]
    InvalidLink {
        link: String,
        #[source]
        source: url::ParseError,
    },

    /// The store namespace leaves no room for a partition name.
    #[error("store namespace of {len} characters exceeds the partition name limit")]
    NamespaceTooLong { len: usize },
}

/// Configuration could not be loaded from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}
