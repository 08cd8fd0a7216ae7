//! Client for the remote memory service.
//!
//! [`RemoteClient`] speaks the service's JSON API (`/api/memories`) and converts
//! records with the functions in [`wire`]. Every call carries its own timeout, and
//! an unconfigured base URL short-circuits to [`RemoteError::NotConfigured`]
//! without touching the network.

pub mod wire;

use reqwest::Url;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::RemoteConfig;
use crate::memory::types::DiaryEntry;
use wire::ListMemoriesResponse;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote memory service is not configured")]
    NotConfigured,
    #[error("invalid remote address {0}")]
    InvalidUrl(String),
    #[error("request timed out")]
    Timeout,
    #[error("remote returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("network error: {0}")]
    Network(reqwest::Error),
    #[error("unreadable response: {0}")]
    Decode(String),
    #[error("failed to encode request: {0}")]
    Encode(String),
    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Network(e)
        }
    }
}

/// HTTP client for the remote memory service.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    config: RemoteConfig,
}

impl RemoteClient {
    pub fn new(config: RemoteConfig) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(RemoteError::Client)?;
        Ok(Self { http, config })
    }

    /// Whether calls will reach the network at all.
    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// `{base}/api/memories[/{id}]`, with `id` encoded as one path segment.
    fn endpoint(&self, id: Option<&str>) -> Result<Url, RemoteError> {
        if !self.is_configured() {
            return Err(RemoteError::NotConfigured);
        }
        let base = self.config.base_url.trim();
        let mut url = Url::parse(base).map_err(|_| RemoteError::InvalidUrl(base.to_string()))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| RemoteError::InvalidUrl(base.to_string()))?;
            segments.pop_if_empty().extend(["api", "memories"]);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    /// Store `entry` remotely.
    pub async fn create(&self, entry: &DiaryEntry) -> Result<(), RemoteError> {
        let url = self.endpoint(None)?;
        let payload =
            wire::to_wire_format(entry).map_err(|e| RemoteError::Encode(e.to_string()))?;

        let response = self
            .http
            .post(url)
            .timeout(self.config.create_timeout())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status));
        }
        debug!(id = %entry.id, "remote create accepted");
        Ok(())
    }

    /// Every remote record that translates into a diary entry. Records that
    /// do not are logged and left out; they never fail the batch.
    pub async fn list_all(&self) -> Result<Vec<DiaryEntry>, RemoteError> {
        let url = self.endpoint(None)?;

        let response = self
            .http
            .get(url)
            .timeout(self.config.list_timeout())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status));
        }

        let body: ListMemoriesResponse = response.json().await?;
        let memories = body.memories.unwrap_or_default();
        let total = memories.len();
        let entries: Vec<DiaryEntry> = memories
            .into_iter()
            .filter_map(|record| match wire::decode_record(record) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "dropping unreadable remote memory");
                    None
                }
            })
            .collect();

        debug!(total, kept = entries.len(), "remote list received");
        Ok(entries)
    }

    /// Remove the remote record with `id`.
    pub async fn delete(&self, id: &str) -> Result<(), RemoteError> {
        let url = self.endpoint(Some(id))?;

        let response = self
            .http
            .delete(url)
            .timeout(self.config.delete_timeout())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status));
        }
        debug!(id, "remote delete accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> RemoteClient {
        RemoteClient::new(RemoteConfig {
            base_url: base_url.into(),
            ..RemoteConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn endpoint_appends_api_path() {
        let c = client("https://diary.example.com");
        assert_eq!(
            c.endpoint(None).unwrap().as_str(),
            "https://diary.example.com/api/memories"
        );
    }

    #[test]
    fn endpoint_keeps_base_path_and_encodes_id() {
        let c = client("https://diary.example.com/v0/");
        assert_eq!(
            c.endpoint(Some("a b/c")).unwrap().as_str(),
            "https://diary.example.com/v0/api/memories/a%20b%2Fc"
        );
    }

    #[test]
    fn placeholder_short_circuits() {
        let c = client(crate::config::PLACEHOLDER_BASE_URL);
        assert!(!c.is_configured());
        assert!(matches!(c.endpoint(None), Err(RemoteError::NotConfigured)));
    }

    #[test]
    fn garbage_base_is_invalid() {
        let c = client("not a url");
        assert!(matches!(c.endpoint(None), Err(RemoteError::InvalidUrl(_))));
    }

    #[test]
    fn encode_failure_is_not_reported_as_bad_response() {
        let e = RemoteError::Encode("key must be a string".into());
        assert_eq!(e.to_string(), "failed to encode request: key must be a string");
        assert!(!matches!(e, RemoteError::Decode(_)));
    }

    #[tokio::test]
    async fn unconfigured_calls_fail_fast() {
        let c = client(crate::config::PLACEHOLDER_BASE_URL);
        assert!(matches!(c.list_all().await, Err(RemoteError::NotConfigured)));
        assert!(matches!(c.delete("1").await, Err(RemoteError::NotConfigured)));
    }
}
