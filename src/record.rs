//! Backlink records as delivered by the upstream feed.
//!
//! The feed is loose about types: any field may be missing, `null`, or carry
//! a value of an unexpected JSON type. Decoding never fails on a single field;
//! it falls back to the field's default (empty string, `0`, `false`).

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One inbound link, with wire names matching the upstream API.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BacklinkRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub url_from: String,
    #[serde(deserialize_with = "lenient_string")]
    pub url_to: String,
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub anchor: String,
    #[serde(deserialize_with = "lenient_string")]
    pub alt: String,
    #[serde(deserialize_with = "lenient_bool")]
    pub nofollow: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub image: bool,
    #[serde(deserialize_with = "lenient_string")]
    pub image_source: String,
    #[serde(deserialize_with = "lenient_number")]
    pub inlink_rank: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub domain_inlink_rank: f64,
    #[serde(deserialize_with = "lenient_string")]
    pub first_seen: String,
    #[serde(deserialize_with = "lenient_string")]
    pub last_visited: String,
}

impl BacklinkRecord {
    /// Decode a single array element. Anything that is not a JSON object
    /// becomes an all-default record so it is still counted.
    pub fn from_value(value: Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        serde_json::from_value(value).unwrap_or_default()
    }
}

/// A decoded upstream response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BacklinksPage {
    pub backlinks: Vec<BacklinkRecord>,
    /// The payload carried a `next` marker.
    pub has_more: bool,
}

impl BacklinksPage {
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut payload) = value else {
            return Self::default();
        };

        let has_more = payload.contains_key("next");
        let backlinks = match payload.remove("backlinks") {
            Some(Value::Array(items)) => items.into_iter().map(BacklinkRecord::from_value).collect(),
            _ => Vec::new(),
        };

        Self {
            backlinks,
            has_more,
        }
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_value(value))
    }
}

impl From<Vec<BacklinkRecord>> for BacklinksPage {
    fn from(backlinks: Vec<BacklinkRecord>) -> Self {
        Self {
            backlinks,
            has_more: false,
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
        _ => false,
    })
}

fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(if number.is_finite() { number } else { 0.0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn decodes_full_record() {
        let record = BacklinkRecord::from_value(json!({
            "url_from": "https://blog.example.org/post",
            "url_to": "https://target.com/",
            "title": "A post",
            "anchor": "target",
            "alt": "",
            "nofollow": true,
            "image": false,
            "image_source": "",
            "inlink_rank": 12,
            "domain_inlink_rank": 47.5,
            "first_seen": "2023-01-15",
            "last_visited": "2024-02-01"
        }));

        assert_eq!(record.url_from, "https://blog.example.org/post");
        assert_eq!(record.anchor, "target");
        assert!(record.nofollow);
        assert!(!record.image);
        assert_eq!(record.inlink_rank, 12.0);
        assert_eq!(record.domain_inlink_rank, 47.5);
        assert_eq!(record.first_seen, "2023-01-15");
    }

    #[test]
    fn missing_and_null_fields_take_defaults() {
        let record = BacklinkRecord::from_value(json!({
            "url_from": null,
            "nofollow": null,
            "domain_inlink_rank": null
        }));
        assert_eq!(record, BacklinkRecord::default());
    }

    #[test]
    fn wrong_types_take_defaults() {
        let record = BacklinkRecord::from_value(json!({
            "url_from": ["not", "a", "string"],
            "nofollow": {"nested": true},
            "inlink_rank": "n/a",
            "domain_inlink_rank": "31"
        }));
        assert_eq!(record.url_from, "");
        assert!(!record.nofollow);
        assert_eq!(record.inlink_rank, 0.0);
        assert_eq!(record.domain_inlink_rank, 31.0);
    }

    #[test]
    fn numeric_flags_are_truthy() {
        let record = BacklinkRecord::from_value(json!({"nofollow": 1, "image": 0}));
        assert!(record.nofollow);
        assert!(!record.image);
    }

    #[test]
    fn non_object_elements_become_default_records() {
        let page = BacklinksPage::from_value(json!({
            "backlinks": [42, "text", [1, 2], {"anchor": "ok"}]
        }));
        assert_eq!(page.backlinks.len(), 4);
        assert_eq!(page.backlinks[0], BacklinkRecord::default());
        assert_eq!(page.backlinks[2], BacklinkRecord::default());
        assert_eq!(page.backlinks[3].anchor, "ok");
    }

    #[test]
    fn page_without_backlinks_is_empty() {
        let page = BacklinksPage::from_value(json!({"error": "quota"}));
        assert!(page.backlinks.is_empty());
        assert!(!page.has_more);

        let page = BacklinksPage::from_value(json!({"backlinks": "oops"}));
        assert!(page.backlinks.is_empty());

        let page = BacklinksPage::from_value(json!([1, 2, 3]));
        assert_eq!(page, BacklinksPage::default());
    }

    #[test]
    fn next_key_presence_sets_has_more() {
        let page = BacklinksPage::from_json(r#"{"backlinks": [], "next": null}"#).unwrap();
        assert!(page.has_more);

        let page = BacklinksPage::from_json(r#"{"backlinks": [], "next": "abc"}"#).unwrap();
        assert!(page.has_more);

        let page = BacklinksPage::from_json(r#"{"backlinks": []}"#).unwrap();
        assert!(!page.has_more);
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(BacklinksPage::from_json("<html>").is_err());
    }
}
