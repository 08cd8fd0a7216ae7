//! Record shapes served by the oracle sources and their mapping to [`DiaryEntry`].

use serde::{Deserialize, Serialize};

use crate::memory::types::{display_date, today, DiaryEntry};

const DEFAULT_IMAGE: &str =
    "https://images.unsplash.com/photo-1534447677768-be436bb09401?q=80&w=2000&auto=format&fit=crop";
const DEMO_IMAGE: &str =
    "https://images.unsplash.com/photo-1519681393784-d120267933ba?q=80&w=2000&auto=format&fit=crop";

/// Flattened report returned by the live proxy (`GET {proxy}?code=`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProxyReport {
    pub access_code: Option<String>,
    pub client_name: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub report_type: Option<String>,
    pub birth_time: Option<String>,
    pub birth_place: Option<String>,
    pub image_url: Option<String>,
}

impl ProxyReport {
    /// The proxy signals a hit by echoing a non-empty access code.
    pub fn is_hit(&self) -> bool {
        self.access_code.as_deref().is_some_and(|c| !c.is_empty())
    }
}

/// A row of the `oracle_reports` registry table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleReport {
    pub id: Option<i64>,
    pub access_code: String,
    pub client_name: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    #[serde(rename = "type")]
    pub report_type: Option<String>,
    pub created_at: Option<String>,
}

/// Body used to publish (upsert) a registry row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOracleReport {
    pub access_code: String,
    pub client_name: String,
    pub title: String,
    pub content: String,
    pub image_url: String,
    #[serde(rename = "type")]
    pub report_type: String,
}

fn upper_or(value: Option<&str>, fallback: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
        .to_uppercase()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

pub fn from_proxy(report: &ProxyReport) -> DiaryEntry {
    let birth_time = non_empty(report.birth_time.as_deref());
    let birth_place = non_empty(report.birth_place.as_deref());

    let mut content = String::new();
    if birth_time.is_some() || birth_place.is_some() {
        content.push_str("[Birth chart]\n");
        if let Some(time) = birth_time {
            content.push_str(&format!("Time: {time}\n"));
        }
        if let Some(place) = birth_place {
            content.push_str(&format!("Place: {place}\n"));
        }
        content.push_str("\n------------------\n\n");
    }
    content.push_str(non_empty(report.content.as_deref()).unwrap_or("..."));

    DiaryEntry {
        id: format!("notion-{}", report.access_code.as_deref().unwrap_or_default()),
        title: non_empty(report.title.as_deref())
            .unwrap_or("Notion Transmission")
            .to_string(),
        date: today(),
        content,
        tags: Some(vec![
            "ORACLE".into(),
            "LIVE".into(),
            upper_or(report.client_name.as_deref(), "seeker"),
            upper_or(report.report_type.as_deref(), "fate"),
        ]),
        image_url: non_empty(report.image_url.as_deref())
            .unwrap_or(DEFAULT_IMAGE)
            .to_string(),
    }
}

pub fn from_registry(report: &OracleReport) -> DiaryEntry {
    let date = report
        .created_at
        .as_deref()
        .and_then(|raw| chrono::DateTime::parse_from_rfc3339(raw).ok())
        .map(|at| display_date(&at.with_timezone(&chrono::Local)))
        .unwrap_or_else(today);

    DiaryEntry {
        id: report
            .id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "unknown".into()),
        title: non_empty(report.title.as_deref())
            .unwrap_or("The Oracle Speaks")
            .to_string(),
        date,
        content: non_empty(report.content.as_deref())
            .unwrap_or("Content missing...")
            .to_string(),
        tags: Some(vec![
            "ORACLE".into(),
            upper_or(report.report_type.as_deref(), "fate"),
            upper_or(report.client_name.as_deref(), "seeker"),
        ]),
        image_url: non_empty(report.image_url.as_deref())
            .unwrap_or(DEFAULT_IMAGE)
            .to_string(),
    }
}

/// The canned entry served for the demonstration code.
pub fn demo_entry() -> DiaryEntry {
    DiaryEntry {
        id: "demo-report".into(),
        title: "DEMO: The Starry Night".into(),
        date: today(),
        content: "[System notice: reading local demo data]\n\n\
                  The stars are whispering. The ground colour of your soul is a deep black. \
                  This card stands for the awakening of the subconscious..."
            .into(),
        tags: Some(vec!["Demo".into(), "Oracle".into()]),
        image_url: DEMO_IMAGE.into(),
    }
}
