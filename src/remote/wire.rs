//! Translation between [`DiaryEntry`] and the remote service's record shape.
//!
//! The remote stores a list of conversation turns per record. A diary entry
//! travels as a single synthetic turn whose `ai` field carries the entry's
//! title, date, content, and tags as a JSON string; the image URL sits at the
//! top level. Reading reverses that, and a record whose metadata cannot be
//! recovered is reported as a [`WireError`] so the caller can drop it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::memory::types::{display_date, DiaryEntry};

/// `user` value of the turn that carries entry metadata.
pub const METADATA_TURN: &str = "DIARY_METADATA";

const UNTITLED: &str = "Untitled Memory";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub ai: String,
}

/// Body of `POST /api/memories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateMemoryRequest {
    pub image_url: String,
    pub conversations: Vec<ConversationTurn>,
}

/// Remote ids arrive as strings or integers depending on the backing table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RemoteId {
    Text(String),
    Number(i64),
}

impl std::fmt::Display for RemoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// One record from `GET /api/memories`.
#[derive(Debug, Clone, Deserialize)]
pub struct WireMemory {
    pub id: RemoteId,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub conversations: Option<Vec<ConversationTurn>>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Envelope of `GET /api/memories`. Records stay untyped here so one bad
/// record cannot fail the whole batch. A missing or `null` list is empty.
#[derive(Debug, Default, Deserialize)]
pub struct ListMemoriesResponse {
    #[serde(default)]
    pub memories: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EntryMetadata {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

#[derive(Debug, Error)]
pub enum WireError {
    #[error("record is not a memory: {0}")]
    Record(serde_json::Error),
    #[error("memory {id} has no metadata turn")]
    MissingMetadata { id: String },
    #[error("memory {id} has unreadable metadata: {source}")]
    Metadata {
        id: String,
        source: serde_json::Error,
    },
}

/// Build the remote payload for `entry`.
pub fn to_wire_format(entry: &DiaryEntry) -> Result<CreateMemoryRequest, serde_json::Error> {
    let metadata = EntryMetadata {
        title: Some(entry.title.clone()),
        date: Some(entry.date.clone()),
        content: Some(entry.content.clone()),
        tags: Some(entry.tags().to_vec()),
    };

    Ok(CreateMemoryRequest {
        image_url: entry.image_url.clone(),
        conversations: vec![ConversationTurn {
            user: METADATA_TURN.into(),
            ai: serde_json::to_string(&metadata)?,
        }],
    })
}

/// Recover a diary entry from a remote record.
pub fn from_wire_format(memory: &WireMemory) -> Result<DiaryEntry, WireError> {
    let id = memory.id.to_string();
    let blob = memory
        .conversations
        .as_ref()
        .and_then(|turns| turns.first())
        .map(|turn| turn.ai.as_str())
        .filter(|ai| !ai.is_empty())
        .ok_or_else(|| WireError::MissingMetadata { id: id.clone() })?;

    let metadata: EntryMetadata = serde_json::from_str(blob).map_err(|source| {
        WireError::Metadata {
            id: id.clone(),
            source,
        }
    })?;

    let title = non_empty(metadata.title).unwrap_or_else(|| UNTITLED.into());
    let date = non_empty(metadata.date).unwrap_or_else(|| created_date(memory));

    Ok(DiaryEntry {
        id,
        title,
        date,
        content: metadata.content.unwrap_or_default(),
        tags: Some(metadata.tags.unwrap_or_default()),
        image_url: memory.image_url.clone(),
    })
}

/// Decode one untyped record from a list response.
pub fn decode_record(value: serde_json::Value) -> Result<DiaryEntry, WireError> {
    let memory: WireMemory = serde_json::from_value(value).map_err(WireError::Record)?;
    from_wire_format(&memory)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Display date for a record whose metadata carries none: its creation time,
/// or the raw `created_at` text when that does not parse.
fn created_date(memory: &WireMemory) -> String {
    let raw = memory.created_at.as_deref().unwrap_or_default();
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|at| display_date(&at.with_timezone(&chrono::Local)))
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry() -> DiaryEntry {
        DiaryEntry {
            id: "1700000000000".into(),
            title: "Rain".into(),
            date: "2024.05.01".into(),
            content: "line1\nline2".into(),
            tags: Some(vec!["calm".into()]),
            image_url: "https://img.example.com/rain.jpg".into(),
        }
    }

    #[test]
    fn write_wraps_metadata_in_single_turn() {
        let payload = to_wire_format(&entry()).unwrap();
        assert_eq!(payload.image_url, "https://img.example.com/rain.jpg");
        assert_eq!(payload.conversations.len(), 1);
        assert_eq!(payload.conversations[0].user, METADATA_TURN);

        let meta: serde_json::Value = serde_json::from_str(&payload.conversations[0].ai).unwrap();
        assert_eq!(
            meta,
            json!({"title": "Rain", "date": "2024.05.01", "content": "line1\nline2", "tags": ["calm"]})
        );
    }

    #[test]
    fn null_memories_list_is_empty() {
        let body: ListMemoriesResponse = serde_json::from_value(json!({"memories": null})).unwrap();
        assert!(body.memories.unwrap_or_default().is_empty());
        let body: ListMemoriesResponse = serde_json::from_value(json!({})).unwrap();
        assert!(body.memories.is_none());
    }

    #[test]
    fn write_sends_empty_tags_when_absent() {
        let mut e = entry();
        e.tags = None;
        let payload = to_wire_format(&e).unwrap();
        let meta: serde_json::Value = serde_json::from_str(&payload.conversations[0].ai).unwrap();
        assert_eq!(meta["tags"], json!([]));
    }

    #[test]
    fn read_reverses_write() {
        let payload = to_wire_format(&entry()).unwrap();
        let record = json!({
            "id": "1700000000000",
            "image_url": payload.image_url,
            "conversations": payload.conversations,
            "created_at": "2024-05-01T10:00:00Z",
        });
        assert_eq!(decode_record(record).unwrap(), entry());
    }

    #[test]
    fn read_fills_defaults() {
        let record = json!({
            "id": 42,
            "image_url": "https://img.example.com/x.jpg",
            "conversations": [{"user": METADATA_TURN, "ai": "{}"}],
            "created_at": "not a timestamp",
        });
        let e = decode_record(record).unwrap();
        assert_eq!(e.id, "42");
        assert_eq!(e.title, UNTITLED);
        assert_eq!(e.date, "not a timestamp");
        assert_eq!(e.content, "");
        assert_eq!(e.tags, Some(vec![]));
    }

    #[test]
    fn read_uses_creation_time_when_date_missing() {
        let record = json!({
            "id": "a",
            "conversations": [{"user": METADATA_TURN, "ai": "{\"title\":\"T\"}"}],
            "created_at": "2024-05-01T12:00:00Z",
        });
        let e = decode_record(record).unwrap();
        assert!(e.date.ends_with("/2024"), "got {}", e.date);
    }

    #[test]
    fn read_rejects_unparsable_metadata() {
        let record = json!({
            "id": "bad",
            "image_url": "",
            "conversations": [{"user": METADATA_TURN, "ai": "{not json"}],
        });
        assert!(matches!(
            decode_record(record),
            Err(WireError::Metadata { ref id, .. }) if id == "bad"
        ));
    }

    #[test]
    fn read_rejects_missing_turns() {
        let no_turns = json!({"id": "a", "image_url": "", "conversations": []});
        assert!(matches!(
            decode_record(no_turns),
            Err(WireError::MissingMetadata { .. })
        ));

        let empty_ai = json!({"id": "b", "conversations": [{"user": "hi", "ai": ""}]});
        assert!(matches!(
            decode_record(empty_ai),
            Err(WireError::MissingMetadata { .. })
        ));
    }

    #[test]
    fn read_rejects_non_record() {
        assert!(matches!(
            decode_record(json!("just a string")),
            Err(WireError::Record(_))
        ));
    }
}
