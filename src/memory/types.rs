//! Diary entry type and its date handling.
//!
//! [`DiaryEntry`] is the canonical in-memory shape shared by the local store,
//! the remote client, and the legacy importer. Its `date` is a free-text display
//! string; [`date_sort_key`] is the one place that tries to read it as a time.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// One diary record: a photo plus the narrative distilled from a conversation about it.
///
/// Field names serialize in camelCase so legacy dumps (`imageUrl`) deserialize directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryEntry {
    /// Caller-assigned identifier, usually epoch milliseconds. Merge key across stores.
    pub id: String,
    pub title: String,
    /// Display date, not necessarily ISO 8601.
    pub date: String,
    /// Free text. Embedded newlines are kept verbatim.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Either an inline `data:` URI or a remote URL; stored as-is.
    pub image_url: String,
}

impl DiaryEntry {
    /// Tags, treating an absent list as empty.
    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }
}

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y.%m.%d %H:%M:%S",
    "%Y.%m.%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y, %I:%M:%S %p",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y.%m.%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%a %b %d %Y",
];

/// Best-effort read of a display date as a point in time.
///
/// Returns `None` when no accepted format matches; callers decide where such
/// entries land in an ordering.
pub fn date_sort_key(date: &str) -> Option<NaiveDateTime> {
    let date = date.trim();
    if date.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Some(dt.naive_utc());
    }
    for fmt in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Render a timestamp the way entries display their date (`M/D/YYYY`).
pub fn display_date<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%-m/%-d/%Y").to_string()
}

/// Today's date in the local timezone, in display form.
pub fn today() -> String {
    display_date(&chrono::Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_json() -> &'static str {
        r#"{"id":"1","title":"Rain","date":"2024.05.01","content":"a\nb","imageUrl":"data:image/png;base64,AA=="}"#
    }

    #[test]
    fn deserializes_camel_case_without_tags() {
        let entry: DiaryEntry = serde_json::from_str(entry_json()).unwrap();
        assert_eq!(entry.image_url, "data:image/png;base64,AA==");
        assert_eq!(entry.content, "a\nb");
        assert!(entry.tags.is_none());
        assert!(entry.tags().is_empty());
    }

    #[test]
    fn absent_tags_are_not_serialized() {
        let entry: DiaryEntry = serde_json::from_str(entry_json()).unwrap();
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("tags").is_none());
        assert!(json.get("imageUrl").is_some());
    }

    #[test]
    fn sort_key_accepts_common_shapes() {
        let may_first = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(date_sort_key("2024.05.01"), Some(may_first));
        assert_eq!(date_sort_key("2024-05-01"), Some(may_first));
        assert_eq!(date_sort_key("2024/05/01"), Some(may_first));
        assert_eq!(date_sort_key("05/01/2024"), Some(may_first));
        assert_eq!(date_sort_key("2024-05-01T00:00:00Z"), Some(may_first));
        assert!(date_sort_key("2024-05-01 13:30").unwrap() > may_first);
    }

    #[test]
    fn sort_key_accepts_month_names() {
        let may_first = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(date_sort_key("May 1, 2024"), Some(may_first));
        assert_eq!(
            date_sort_key("January 15, 2024").map(|d| d.date()),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(date_sort_key("Wed May 01 2024"), Some(may_first));
    }

    #[test]
    fn sort_key_rejects_free_text() {
        assert_eq!(date_sort_key("last rainy tuesday"), None);
        assert_eq!(date_sort_key(""), None);
    }

    #[test]
    fn display_date_is_unpadded() {
        let at = chrono::Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(display_date(&at), "5/1/2024");
    }
}
