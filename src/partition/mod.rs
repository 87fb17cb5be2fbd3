//! Article partition naming.
//!
//! Every source link gets its own article collection. The collection name is
//! derived from the link, the shard that polls it and the schedule prefix, so
//! that workers sharing a shard id and prefix agree on a name without
//! talking to each other.
//!
//! Two links with the same hostname whose hashes collide map to the same
//! partition. That is not detected here.

use url::Url;

use crate::error::{KeyError, KeyResult};

/// Longest full collection name (`<database>.<collection>`) the store accepts.
pub const MAX_NAMESPACE_LEN: usize = 115;

/// Schedule prefix that means "no prefix".
pub const DEFAULT_PREFIX: &str = "default";

const PREFIX_MAX_CHARS: usize = 10;

/// 32-bit signed rolling hash over the UTF-16 code units of `s`.
///
/// `acc = (acc << 5) - acc + unit`, wrapping on every step. The result may be
/// negative; the sign is part of the partition name.
pub fn link_hash(s: &str) -> i32 {
    s.encode_utf16().fold(0i32, |acc, unit| {
        (acc << 5).wrapping_sub(acc).wrapping_add(i32::from(unit))
    })
}

/// Build the partition name for `link`.
///
/// `namespace_len` is the length of the database name the collection lives
/// under (0 when there is none). The result is cut so that
/// `<database>.<collection>` never exceeds [`MAX_NAMESPACE_LEN`].
pub fn partition_id(
    link: &str,
    shard_id: Option<u32>,
    prefix: &str,
    namespace_len: usize,
) -> KeyResult<String> {
    let url = Url::parse(link).map_err(|source| KeyError::InvalidLink {
        link: link.to_string(),
        source,
    })?;

    let host: String = url
        .host_str()
        .unwrap_or_default()
        .chars()
        .filter(|c| *c != '.' && *c != '$')
        .collect();

    let mut id = String::new();
    if let Some(shard) = shard_id {
        id.push_str(&shard.to_string());
        id.push('_');
    }
    id.push_str(normalize_prefix(prefix));
    id.push_str(&link_hash(link).to_string());
    id.push_str(&host);

    let budget = MAX_NAMESPACE_LEN
        .checked_sub(namespace_len + 1)
        .filter(|budget| *budget > 0)
        .ok_or(KeyError::NamespaceTooLong { len: namespace_len })?;

    truncate_to(&mut id, budget);
    Ok(id)
}

fn normalize_prefix(prefix: &str) -> &str {
    if prefix == DEFAULT_PREFIX {
        return "";
    }
    match prefix.char_indices().nth(PREFIX_MAX_CHARS) {
        Some((end, _)) => &prefix[..end],
        None => prefix,
    }
}

// Cut at a char boundary so that the byte length is at most `max`.
fn truncate_to(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}

/// Partition namer bound to one store namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionNamer {
    namespace_len: usize,
}

impl PartitionNamer {
    /// Namer for collections under the database called `database`.
    pub fn for_database(database: &str) -> Self {
        Self {
            namespace_len: database.len(),
        }
    }

    pub fn namespace_len(&self) -> usize {
        self.namespace_len
    }

    /// See [`partition_id`].
    pub fn name(&self, link: &str, shard_id: Option<u32>, prefix: &str) -> KeyResult<String> {
        partition_id(link, shard_id, prefix, self.namespace_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_stable_and_signed() {
        assert_eq!(link_hash(""), 0);
        assert_eq!(link_hash("a"), 97);
        assert_eq!(link_hash("ab"), 97 * 31 + 98);
        assert_eq!(link_hash("hello"), 99_162_322);
        assert_eq!(link_hash("polygenelubricants"), i32::MIN);

        let link = "https://example.com/feed";
        assert_eq!(link_hash(link), link_hash(link));
    }

    #[test]
    fn test_hash_uses_utf16_units() {
        // U+1F600 is a surrogate pair in UTF-16.
        let expected = (0xD83D_i32 * 31).wrapping_add(0xDE00);
        assert_eq!(link_hash("\u{1F600}"), expected);
    }

    #[test]
    fn test_end_to_end_example() {
        let link = "https://example.com/feed";
        let id = partition_id(link, Some(2), "myprefix12345", 8).unwrap();
        assert_eq!(id, format!("2_myprefix12{}examplecom", link_hash(link)));
    }

    #[test]
    fn test_default_prefix_is_empty() {
        let link = "https://news.example.org/rss.xml";
        assert_eq!(
            partition_id(link, Some(0), "default", 5).unwrap(),
            partition_id(link, Some(0), "", 5).unwrap()
        );
        assert_eq!(
            partition_id(link, None, "default", 5).unwrap(),
            format!("{}newsexampleorg", link_hash(link))
        );
    }

    #[test]
    fn test_host_strips_dots() {
        let id = partition_id("http://a.b.c.d/feed", None, "", 0).unwrap();
        assert!(id.ends_with("abcd"));
    }

    #[test]
    fn test_invalid_link() {
        let err = partition_id("not a url", Some(1), "", 4).unwrap_err();
        assert!(matches!(err, KeyError::InvalidLink { .. }));
    }

    #[test]
    fn test_different_hashes_differ() {
        let a = "https://example.com/a";
        let b = "https://example.com/b";
        assert_ne!(link_hash(a), link_hash(b));
        assert_ne!(
            partition_id(a, Some(3), "pre", 8).unwrap(),
            partition_id(b, Some(3), "pre", 8).unwrap()
        );
    }

    #[test]
    fn test_long_names_truncate_to_limit() {
        let host = format!("{0}.{0}.{0}.example.com", "x".repeat(50));
        let link = format!("https://{}/feed", host);
        let db = "feedkeeper";

        let untruncated = format!("12_sched{}{}", link_hash(&link), host.replace('.', ""));

        let id = partition_id(&link, Some(12), "sched", db.len()).unwrap();
        assert_eq!(db.len() + 1 + id.len(), MAX_NAMESPACE_LEN);
        assert!(untruncated.starts_with(&id));
        assert_eq!(id, partition_id(&link, Some(12), "sched", db.len()).unwrap());
    }

    #[test]
    fn test_exact_limit_boundary() {
        let link = "https://example.com/feed";
        let full = format!("3_{}examplecom", link_hash(link));

        // Total of exactly 115 is left alone.
        let fits = MAX_NAMESPACE_LEN - 1 - full.len();
        let id = partition_id(link, Some(3), "", fits).unwrap();
        assert_eq!(id, full);
        assert_eq!(fits + 1 + id.len(), MAX_NAMESPACE_LEN);

        // One byte over is cut back to 115.
        let id = partition_id(link, Some(3), "", fits + 1).unwrap();
        assert_eq!(id, &full[..full.len() - 1]);
        assert_eq!(fits + 2 + id.len(), MAX_NAMESPACE_LEN);
    }

    #[test]
    fn test_no_namespace_still_counts_separator() {
        let link = format!("https://{0}.{0}.example.com/feed", "x".repeat(60));
        let id = partition_id(&link, None, "", 0).unwrap();
        assert_eq!(id.len(), MAX_NAMESPACE_LEN - 1);
    }

    #[test]
    fn test_negative_hash_keeps_sign() {
        let link = "https://example.com/rss";
        assert_eq!(link_hash(link), -649_820_783);
        assert_eq!(
            partition_id(link, Some(4), "", 8).unwrap(),
            "4_-649820783examplecom"
        );
    }

    #[test]
    fn test_short_names_untouched() {
        let link = "https://example.com/feed";
        let id = partition_id(link, Some(2), "", 10).unwrap();
        assert_eq!(id, format!("2_{}examplecom", link_hash(link)));
    }

    #[test]
    fn test_namespace_too_long() {
        let err = partition_id("https://example.com", None, "", 114).unwrap_err();
        assert!(matches!(err, KeyError::NamespaceTooLong { len: 114 }));
    }

    #[test]
    fn test_namer_uses_database_length() {
        let namer = PartitionNamer::for_database("rss");
        let link = "https://example.com/feed";
        assert_eq!(namer.namespace_len(), 3);
        assert_eq!(
            namer.name(link, Some(1), "").unwrap(),
            partition_id(link, Some(1), "", 3).unwrap()
        );
    }
}
