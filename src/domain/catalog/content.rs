//! Upstream catalog content types

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// The three content collections exposed by an Xtream-style provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Live,
    Vod,
    Series,
}

impl ContentKind {
    pub const ALL: [ContentKind; 3] = [Self::Live, Self::Vod, Self::Series];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Vod => "vod",
            Self::Series => "series",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "live" => Some(Self::Live),
            "vod" => Some(Self::Vod),
            "series" => Some(Self::Series),
            _ => None,
        }
    }

    /// Upstream action listing this collection's categories
    pub fn categories_action(&self) -> &'static str {
        match self {
            Self::Live => "get_live_categories",
            Self::Vod => "get_vod_categories",
            Self::Series => "get_series_categories",
        }
    }

    /// Upstream action listing this collection's items
    pub fn list_action(&self) -> &'static str {
        match self {
            Self::Live => "get_live_streams",
            Self::Vod => "get_vod_streams",
            Self::Series => "get_series",
        }
    }

    /// Field carrying the item's date, used for sorting
    pub fn date_field(&self) -> &'static str {
        match self {
            Self::Live | Self::Vod => "added",
            Self::Series => "last_modified",
        }
    }

    pub fn id_field(&self) -> &'static str {
        match self {
            Self::Live | Self::Vod => "stream_id",
            Self::Series => "series_id",
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn deserialize_number_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(D::Error::custom("expected string or number")),
    }
}

pub(crate) fn deserialize_optional_number_as_string<'de, D>(
    deserializer: D,
) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        _ => Err(D::Error::custom("expected string, number, or null")),
    }
}

/// A content category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "deserialize_number_as_string")]
    pub category_id: String,
    #[serde(default)]
    pub category_name: String,
    #[serde(default, deserialize_with = "deserialize_optional_number_as_string")]
    pub parent_id: Option<String>,
}

/// One stream or series entry, kept as the provider sent it
///
/// Providers disagree on field types (numbers as strings and the reverse),
/// so items stay untyped and expose the few fields the gateway reads.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogItem(Map<String, Value>);

impl CatalogItem {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// The item's id rendered as a string, whatever JSON type it had
    pub fn id(&self, kind: ContentKind) -> Option<String> {
        match self.0.get(kind.id_field())? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn category_id(&self) -> Option<String> {
        match self.0.get("category_id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Unix timestamp of the collection's date field, if it parses
    pub fn timestamp(&self, kind: ContentKind) -> Option<i64> {
        self.0.get(kind.date_field()).and_then(parse_timestamp)
    }
}

/// Interpret a date-like JSON value as unix seconds
///
/// Accepts integers, numeric strings, RFC 3339, `YYYY-MM-DD HH:MM:SS` and
/// `YYYY-MM-DD`.
pub fn parse_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();

            if s.is_empty() {
                return None;
            }

            if let Ok(secs) = s.parse::<i64>() {
                return Some(secs);
            }

            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.timestamp());
            }

            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt.and_utc().timestamp());
            }

            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc().timestamp())
        }
        _ => None,
    }
}

/// Ordering applied to a collection before pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Keep the provider's order
    #[default]
    Default,
    #[serde(alias = "newest")]
    AddedDesc,
    #[serde(alias = "oldest")]
    AddedAsc,
    #[serde(alias = "name")]
    NameAsc,
    NameDesc,
}

impl SortOrder {
    /// Stable in-place sort; items lacking the sort field always go last
    pub fn apply(&self, items: &mut [CatalogItem], kind: ContentKind) {
        match self {
            Self::Default => {}
            Self::AddedDesc => items.sort_by(|a, b| {
                missing_last(a.timestamp(kind), b.timestamp(kind), |x, y| y.cmp(x))
            }),
            Self::AddedAsc => items.sort_by(|a, b| {
                missing_last(a.timestamp(kind), b.timestamp(kind), |x, y| x.cmp(y))
            }),
            Self::NameAsc => items.sort_by(|a, b| {
                missing_last(sort_name(a), sort_name(b), |x, y| x.cmp(y))
            }),
            Self::NameDesc => items.sort_by(|a, b| {
                missing_last(sort_name(a), sort_name(b), |x, y| y.cmp(x))
            }),
        }
    }
}

fn sort_name(item: &CatalogItem) -> Option<String> {
    item.name()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_lowercase)
}

fn missing_last<T>(a: Option<T>, b: Option<T>, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(&a, &b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(value: Value) -> CatalogItem {
        serde_json::from_value(value).unwrap()
    }

    fn names(items: &[CatalogItem]) -> Vec<&str> {
        items.iter().map(|i| i.name().unwrap_or("-")).collect()
    }

    #[test]
    fn test_kind_actions() {
        assert_eq!(ContentKind::Live.list_action(), "get_live_streams");
        assert_eq!(ContentKind::Vod.categories_action(), "get_vod_categories");
        assert_eq!(ContentKind::Series.list_action(), "get_series");
        assert_eq!(ContentKind::Series.date_field(), "last_modified");
        assert_eq!(ContentKind::parse("vod"), Some(ContentKind::Vod));
        assert_eq!(ContentKind::parse("radio"), None);
    }

    #[test]
    fn test_category_accepts_numeric_ids() {
        let category: Category = serde_json::from_value(json!({
            "category_id": 12,
            "category_name": "News",
            "parent_id": 0
        }))
        .unwrap();

        assert_eq!(category.category_id, "12");
        assert_eq!(category.parent_id.as_deref(), Some("0"));
    }

    #[test]
    fn test_item_accessors() {
        let live = item(json!({"name": "BBC One", "stream_id": 7, "category_id": "3", "added": "1700000000"}));

        assert_eq!(live.name(), Some("BBC One"));
        assert_eq!(live.id(ContentKind::Live).as_deref(), Some("7"));
        assert_eq!(live.category_id().as_deref(), Some("3"));
        assert_eq!(live.timestamp(ContentKind::Live), Some(1_700_000_000));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert_eq!(parse_timestamp(&json!(1_600_000_000)), Some(1_600_000_000));
        assert_eq!(parse_timestamp(&json!("1600000000")), Some(1_600_000_000));
        assert_eq!(parse_timestamp(&json!("1970-01-02")), Some(86_400));
        assert_eq!(parse_timestamp(&json!("1970-01-01 00:01:00")), Some(60));
        assert_eq!(parse_timestamp(&json!("1970-01-01T00:00:10Z")), Some(10));
        assert_eq!(parse_timestamp(&json!("")), None);
        assert_eq!(parse_timestamp(&json!("yesterday")), None);
        assert_eq!(parse_timestamp(&Value::Null), None);
    }

    #[test]
    fn test_sort_added_desc_puts_undated_last() {
        let mut items = vec![
            item(json!({"name": "old", "added": "100"})),
            item(json!({"name": "undated"})),
            item(json!({"name": "new", "added": 300})),
            item(json!({"name": "mid", "added": "200"})),
        ];

        SortOrder::AddedDesc.apply(&mut items, ContentKind::Vod);
        assert_eq!(names(&items), vec!["new", "mid", "old", "undated"]);

        SortOrder::AddedAsc.apply(&mut items, ContentKind::Vod);
        assert_eq!(names(&items), vec!["old", "mid", "new", "undated"]);
    }

    #[test]
    fn test_series_sort_uses_last_modified() {
        let mut items = vec![
            item(json!({"name": "a", "added": "999", "last_modified": "1"})),
            item(json!({"name": "b", "added": "1", "last_modified": "2"})),
        ];

        SortOrder::AddedDesc.apply(&mut items, ContentKind::Series);
        assert_eq!(names(&items), vec!["b", "a"]);
    }

    #[test]
    fn test_sort_by_name_is_case_insensitive_and_stable() {
        let mut items = vec![
            item(json!({"name": "beta", "stream_id": 1})),
            item(json!({"name": "Alpha", "stream_id": 2})),
            item(json!({"name": "alpha", "stream_id": 3})),
        ];

        SortOrder::NameAsc.apply(&mut items, ContentKind::Live);
        let ids: Vec<_> = items.iter().map(|i| i.id(ContentKind::Live).unwrap()).collect();
        assert_eq!(ids, vec!["2", "3", "1"]);

        SortOrder::NameDesc.apply(&mut items, ContentKind::Live);
        assert_eq!(items[0].name(), Some("beta"));
    }

    #[test]
    fn test_default_sort_keeps_order() {
        let mut items = vec![
            item(json!({"name": "z"})),
            item(json!({"name": "a"})),
        ];

        SortOrder::Default.apply(&mut items, ContentKind::Live);
        assert_eq!(names(&items), vec!["z", "a"]);
    }

    #[test]
    fn test_sort_order_aliases() {
        let order: SortOrder = serde_json::from_value(json!("newest")).unwrap();
        assert_eq!(order, SortOrder::AddedDesc);
        let order: SortOrder = serde_json::from_value(json!("name_desc")).unwrap();
        assert_eq!(order, SortOrder::NameDesc);
    }
}
