use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A document as listed by the remote reading service.
///
/// Only `tags` is interpreted; every other field is carried through untouched
/// in `extra`, whatever its JSON type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteDocument {
    /// Tag name -> tag metadata, keyed as stored remotely.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RemoteDocument {
    /// Document carrying only the given tag keys.
    #[must_use]
    pub fn with_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags
                .into_iter()
                .map(|tag| (tag.into(), Value::Object(Map::new())))
                .collect(),
            ..Self::default()
        }
    }

    pub fn tag_keys(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// One page of a cursor-paginated listing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPage {
    pub results: Vec<RemoteDocument>,
    #[serde(default)]
    pub next_page_cursor: Option<String>,
}

impl DocumentPage {
    /// Cursor for the following page; an empty string counts as absent.
    #[must_use]
    pub fn next_cursor(&self) -> Option<&str> {
        self.next_page_cursor
            .as_deref()
            .filter(|cursor| !cursor.is_empty())
    }
}

/// Buckets the remote service files documents under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DocumentLocation {
    New,
    Later,
    Shortlist,
    Archive,
    Feed,
}

impl DocumentLocation {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Later => "later",
            Self::Shortlist => "shortlist",
            Self::Archive => "archive",
            Self::Feed => "feed",
        }
    }
}

/// Constant filter parameters sent with every page request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocumentFilter {
    pub updated_after: Option<DateTime<Utc>>,
    pub location: Option<DocumentLocation>,
}

impl DocumentFilter {
    /// Archived documents updated at or after `year_start`.
    ///
    /// Pass the user's local start of year (see `Clock::year_start`) so the
    /// count covers the same year the pacing is computed for.
    #[must_use]
    pub fn archived_since(year_start: DateTime<Utc>) -> Self {
        Self {
            updated_after: Some(year_start),
            location: Some(DocumentLocation::Archive),
        }
    }

    /// `updatedAfter` query value, e.g. `2024-01-01T00:00:00.000Z`.
    #[must_use]
    pub fn updated_after_param(&self) -> Option<String> {
        self.updated_after
            .map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{fixed_now, start_of_year};
    use chrono::{FixedOffset, TimeZone};
    use serde_json::json;

    #[test]
    fn page_parses_wire_shape_and_keeps_extra_fields() {
        let page: DocumentPage = serde_json::from_value(json!({
            "count": 2,
            "nextPageCursor": "abc",
            "results": [
                {
                    "id": "01",
                    "title": "Essay",
                    "location": "archive",
                    "word_count": 1200,
                    "tags": { "2024_read": { "name": "2024_READ", "type": "manual" } }
                },
                { "id": "02", "tags": null }
            ]
        }))
        .unwrap();

        assert_eq!(page.next_cursor(), Some("abc"));
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].tag_keys().collect::<Vec<_>>(), ["2024_read"]);
        assert_eq!(page.results[0].extra.get("word_count"), Some(&json!(1200)));
        assert_eq!(page.results[0].extra.get("id"), Some(&json!("01")));
        assert!(page.results[1].tags.is_empty());
    }

    #[test]
    fn untyped_fields_of_any_json_type_pass_through() {
        let page: DocumentPage = serde_json::from_value(json!({
            "results": [
                {
                    "id": 42,
                    "title": ["not", "a", "string"],
                    "location": null,
                    "tags": { "2024_read": {} }
                }
            ]
        }))
        .unwrap();

        let doc = &page.results[0];
        assert_eq!(doc.extra.get("id"), Some(&json!(42)));
        assert_eq!(doc.extra.get("title"), Some(&json!(["not", "a", "string"])));
        assert_eq!(doc.extra.get("location"), Some(&Value::Null));
        assert_eq!(doc.tag_keys().collect::<Vec<_>>(), ["2024_read"]);
    }

    #[test]
    fn page_without_results_is_rejected() {
        let parsed = serde_json::from_value::<DocumentPage>(json!({ "nextPageCursor": null }));
        assert!(parsed.is_err());
    }

    #[test]
    fn empty_or_null_cursor_means_last_page() {
        let page: DocumentPage =
            serde_json::from_value(json!({ "results": [], "nextPageCursor": "" })).unwrap();
        assert_eq!(page.next_cursor(), None);
        let page: DocumentPage =
            serde_json::from_value(json!({ "results": [], "nextPageCursor": null })).unwrap();
        assert_eq!(page.next_cursor(), None);
        let page: DocumentPage = serde_json::from_value(json!({ "results": [] })).unwrap();
        assert_eq!(page.next_cursor(), None);
    }

    #[test]
    fn archived_since_formats_like_iso_string() {
        let filter = DocumentFilter::archived_since(start_of_year(&fixed_now()));
        assert_eq!(filter.location, Some(DocumentLocation::Archive));
        assert_eq!(
            filter.updated_after_param().as_deref(),
            Some("2023-01-01T00:00:00.000Z")
        );
    }

    #[test]
    fn local_year_start_is_sent_in_utc() {
        let east = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = east.with_ymd_and_hms(2025, 1, 1, 1, 30, 0).unwrap();
        let filter = DocumentFilter::archived_since(start_of_year(&local));
        assert_eq!(
            filter.updated_after_param().as_deref(),
            Some("2024-12-31T22:00:00.000Z")
        );
    }
}
