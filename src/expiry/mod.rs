//! Expiry policy for time-limited records.
//!
//! Backups and articles each carry a retention setting. A record created
//! under a positive or unlimited retention gets an absolute `expires_at`
//! stamped at creation time; the store's TTL index deletes it afterwards.
//! A disabled retention means the field does not exist at all, because the
//! presence of the field is what schedules deletion.

use chrono::{DateTime, Duration, Utc};

/// Offset used for "unlimited" retention. The TTL index is still created,
/// but the deadline is never practically reached.
pub const UNLIMITED_DAYS: i64 = 36_500;

/// Retention window for one kind of record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retention {
    /// Delete this many days after creation. Always positive.
    Days(u32),
    /// Keep the expiry index but push the deadline out of reach.
    Unlimited,
    /// No expiry field on the record.
    Disabled,
}

impl Retention {
    /// Parse a retention setting.
    ///
    /// Accepts a positive day count, `-1`/`unlimited`, or `0`/`disabled`/`off`.
    /// Anything else yields `None` so the caller can fall back to a default.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_lowercase();
        match raw.as_str() {
            "-1" | "unlimited" => Some(Self::Unlimited),
            "0" | "disabled" | "off" => Some(Self::Disabled),
            _ => match raw.parse::<u32>() {
                Ok(days) if days > 0 => Some(Self::Days(days)),
                _ => None,
            },
        }
    }

    /// Whether records under this retention carry an expiry field.
    pub fn stamps_expiry(&self) -> bool {
        self.offset().is_some()
    }

    fn offset(&self) -> Option<Duration> {
        match self {
            // A zero-day window is treated like a disabled one.
            Self::Days(0) | Self::Disabled => None,
            Self::Days(days) => Some(Duration::days(i64::from(*days))),
            Self::Unlimited => Some(Duration::days(UNLIMITED_DAYS)),
        }
    }
}

/// Which retention setting applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpiryKind {
    Backup,
    Article,
}

/// Retention settings for every time-limited record kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    pub backup: Retention,
    pub article: Retention,
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self {
            backup: Retention::Days(7),
            article: Retention::Days(14),
        }
    }
}

impl ExpiryPolicy {
    pub fn new(backup: Retention, article: Retention) -> Self {
        Self { backup, article }
    }

    /// Retention configured for a kind.
    pub fn retention(&self, kind: ExpiryKind) -> Retention {
        match kind {
            ExpiryKind::Backup => self.backup,
            ExpiryKind::Article => self.article,
        }
    }

    /// Expiry for a record created right now, or `None` when disabled.
    pub fn expiry_date(&self, kind: ExpiryKind) -> Option<DateTime<Utc>> {
        self.expiry_date_at(kind, Utc::now())
    }

    /// Expiry for a record created at `now`.
    pub fn expiry_date_at(&self, kind: ExpiryKind, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.retention(kind).offset().map(|offset| now + offset)
    }

    /// Deferred form of [`expiry_date`](Self::expiry_date).
    ///
    /// The returned closure reads the clock each time it is called, so a
    /// stamper built at startup still gives every record its own deadline.
    pub fn stamper(&self, kind: ExpiryKind) -> Option<impl Fn() -> DateTime<Utc> + Send + Sync + use<>> {
        let offset = self.retention(kind).offset()?;
        Some(move || Utc::now() + offset)
    }
}
