//! Rendering of a partition's stored articles for a dump attachment.

use serde_json::Value;

/// A rendered dump ready to be attached as a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleDump {
    pub file_name: String,
    pub contents: String,
}

/// Attachment name for a dump of `link`.
pub fn dump_file_name(link: &str, raw: bool) -> String {
    format!("{}.{}", link, if raw { "json" } else { "txt" })
}

/// Render articles either as pretty JSON (`raw`) or as flattened text blocks.
pub fn render(link: &str, articles: &[Value], raw: bool) -> serde_json::Result<ArticleDump> {
    let contents = if raw {
        serde_json::to_string_pretty(articles)?
    } else {
        articles
            .iter()
            .map(flatten_text)
            .collect::<Vec<_>>()
            .join("\r\n\r\n")
            .trim()
            .to_string()
    };

    Ok(ArticleDump {
        file_name: dump_file_name(link, raw),
        contents,
    })
}

/// One `key: value` line per leaf, nested keys joined by `_`.
pub fn flatten_text(value: &Value) -> String {
    let mut lines = Vec::new();
    flatten_into(value, String::new(), &mut lines);
    lines.join("\r\n")
}

fn flatten_into(value: &Value, path: String, lines: &mut Vec<String>) {
    let join = |key: &str| {
        if path.is_empty() {
            key.to_string()
        } else {
            format!("{}_{}", path, key)
        }
    };

    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(child, join(key), lines);
            }
        }
        Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                flatten_into(child, join(&idx.to_string()), lines);
            }
        }
        Value::Null => {}
        Value::String(s) => {
            let s = s.trim();
            if !s.is_empty() {
                lines.push(format!("{}: {}", path, s));
            }
        }
        other => lines.push(format!("{}: {}", path, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_nested() {
        let article = json!({
            "title": "Release",
            "meta": { "author": "Ana", "tags": ["rust", "feeds"] },
            "empty": "   ",
            "skipped": null,
            "score": 3
        });

        let text = flatten_text(&article);
        let lines: Vec<_> = text.split("\r\n").collect();
        assert!(lines.contains(&"title: Release"));
        assert!(lines.contains(&"meta_author: Ana"));
        assert!(lines.contains(&"meta_tags_1: feeds"));
        assert!(lines.contains(&"score: 3"));
        assert!(!text.contains("empty"));
        assert!(!text.contains("skipped"));
    }

    #[test]
    fn test_render_text_and_raw() {
        let link = "https://example.com/feed";
        let articles = vec![json!({ "title": "A" }), json!({ "title": "B" })];

        let text = render(link, &articles, false).unwrap();
        assert_eq!(text.file_name, "https://example.com/feed.txt");
        assert_eq!(text.contents, "title: A\r\n\r\ntitle: B");

        let raw = render(link, &articles, true).unwrap();
        assert_eq!(raw.file_name, "https://example.com/feed.json");
        let parsed: Vec<Value> = serde_json::from_str(&raw.contents).unwrap();
        assert_eq!(parsed, articles);
    }

    #[test]
    fn test_render_empty() {
        let dump = render("https://example.com", &[], false).unwrap();
        assert!(dump.contents.is_empty());
    }
}
