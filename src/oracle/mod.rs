//! Code-keyed report lookup across a live proxy, a registry table, and a demo fallback.
//!
//! [`OracleClient::lookup`] tries each source in turn and never fails: every
//! source fault is logged and the next one is tried. The registry admin calls
//! (`list_reports`, `publish_report`, `remove_report`) do return errors, so the
//! operator sees a failed publish.

pub mod mappers;

use reqwest::{Method, RequestBuilder, Url};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::OracleConfig;
use crate::memory::types::DiaryEntry;
use mappers::{NewOracleReport, OracleReport, ProxyReport};

const REGISTRY_TABLE: &str = "oracle_reports";

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle registry is not configured")]
    NotConfigured,
    #[error("invalid oracle address {0}")]
    InvalidUrl(String),
    #[error("oracle returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("oracle request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct OracleClient {
    http: reqwest::Client,
    config: OracleConfig,
}

impl OracleClient {
    pub fn new(config: OracleConfig) -> Result<Self, OracleError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    fn proxy_url(&self) -> Option<&str> {
        self.config.proxy_url.as_deref().filter(|u| !u.is_empty())
    }

    fn registry(&self) -> Option<(&str, &str)> {
        let url = self.config.registry_url.as_deref().filter(|u| !u.is_empty())?;
        let key = self.config.registry_key.as_deref().filter(|k| !k.is_empty())?;
        Some((url, key))
    }

    /// A request against the registry table, authenticated with the anon key.
    fn registry_request(
        &self,
        method: Method,
        query: &[(&str, &str)],
    ) -> Result<RequestBuilder, OracleError> {
        let (base, key) = self.registry().ok_or(OracleError::NotConfigured)?;
        let mut url = Url::parse(base).map_err(|_| OracleError::InvalidUrl(base.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| OracleError::InvalidUrl(base.to_string()))?
            .pop_if_empty()
            .extend(["rest", "v1", REGISTRY_TABLE]);
        url.query_pairs_mut().extend_pairs(query);

        Ok(self
            .http
            .request(method, url)
            .header("apikey", key)
            .bearer_auth(key))
    }

    /// Resolve `code` to an entry: live proxy, then registry, then the demo code.
    pub async fn lookup(&self, code: &str) -> Option<DiaryEntry> {
        if let Some(proxy) = self.proxy_url() {
            match self.lookup_proxy(proxy, code).await {
                Ok(Some(entry)) => {
                    info!(code, "oracle answered from live proxy");
                    return Some(entry);
                }
                Ok(None) => debug!(code, "live proxy has no report"),
                Err(e) => warn!(code, error = %e, "live proxy failed, trying registry"),
            }
        }

        if self.registry().is_some() {
            match self.lookup_registry(code).await {
                Ok(Some(entry)) => {
                    info!(code, "oracle answered from registry");
                    return Some(entry);
                }
                Ok(None) => debug!(code, "registry has no report"),
                Err(e) => warn!(code, error = %e, "registry lookup failed"),
            }
        }

        if code == self.config.demo_code {
            return Some(mappers::demo_entry());
        }
        None
    }

    async fn lookup_proxy(&self, proxy: &str, code: &str) -> Result<Option<DiaryEntry>, OracleError> {
        let mut url = Url::parse(proxy).map_err(|_| OracleError::InvalidUrl(proxy.to_string()))?;
        url.query_pairs_mut().append_pair("code", code);

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::Status(status));
        }

        let report: ProxyReport = response.json().await?;
        Ok(report.is_hit().then(|| mappers::from_proxy(&report)))
    }

    async fn lookup_registry(&self, code: &str) -> Result<Option<DiaryEntry>, OracleError> {
        let filter = format!("eq.{code}");
        let rows: Vec<OracleReport> = self
            .send_registry(self.registry_request(
                Method::GET,
                &[("select", "*"), ("access_code", filter.as_str()), ("limit", "1")],
            )?)
            .await?
            .json()
            .await?;
        Ok(rows.first().map(mappers::from_registry))
    }

    async fn send_registry(&self, request: RequestBuilder) -> Result<reqwest::Response, OracleError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::Status(status));
        }
        Ok(response)
    }

    /// Whether any live source is reachable: a configured proxy counts as
    /// reachable, otherwise one registry row is probed.
    pub async fn check_connection(&self) -> bool {
        if self.proxy_url().is_some() {
            return true;
        }
        let request = match self.registry_request(Method::GET, &[("select", "id"), ("limit", "1")]) {
            Ok(request) => request,
            Err(_) => return false,
        };
        self.send_registry(request).await.is_ok()
    }

    /// All registry rows, newest first.
    pub async fn list_reports(&self) -> Result<Vec<OracleReport>, OracleError> {
        let request = self.registry_request(
            Method::GET,
            &[("select", "*"), ("order", "created_at.desc")],
        )?;
        Ok(self.send_registry(request).await?.json().await?)
    }

    /// Insert or update the row with the same access code.
    pub async fn publish_report(&self, report: &NewOracleReport) -> Result<(), OracleError> {
        let request = self
            .registry_request(Method::POST, &[("on_conflict", "access_code")])?
            .header("Prefer", "resolution=merge-duplicates")
            .json(&[report]);
        self.send_registry(request).await?;
        info!(code = %report.access_code, "oracle report published");
        Ok(())
    }

    pub async fn remove_report(&self, access_code: &str) -> Result<(), OracleError> {
        let filter = format!("eq.{access_code}");
        let request =
            self.registry_request(Method::DELETE, &[("access_code", filter.as_str())])?;
        self.send_registry(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(config: OracleConfig) -> OracleClient {
        OracleClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn demo_code_resolves_offline() {
        let c = client(OracleConfig::default());
        let entry = c.lookup("8888").await.unwrap();
        assert_eq!(entry.id, "demo-report");
    }

    #[tokio::test]
    async fn unknown_code_without_sources_is_none() {
        let c = client(OracleConfig::default());
        assert!(c.lookup("1234").await.is_none());
    }

    #[tokio::test]
    async fn no_sources_means_disconnected() {
        let c = client(OracleConfig::default());
        assert!(!c.check_connection().await);
    }

    #[tokio::test]
    async fn admin_calls_need_registry() {
        let c = client(OracleConfig::default());
        assert!(matches!(c.list_reports().await, Err(OracleError::NotConfigured)));
        assert!(matches!(c.remove_report("1").await, Err(OracleError::NotConfigured)));
    }

    #[test]
    fn registry_key_alone_is_not_enough() {
        let c = client(OracleConfig {
            registry_key: Some("k".into()),
            ..OracleConfig::default()
        });
        assert!(c.registry().is_none());
    }
}
