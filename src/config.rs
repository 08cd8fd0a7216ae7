use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Base URL shipped in the default config. Pointing the remote at it means
/// "not configured yet": every remote call short-circuits.
pub const PLACEHOLDER_BASE_URL: &str = "https://your-app.vercel.app";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ReverieConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub remote: RemoteConfig,
    pub oracle: OracleConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
    pub legacy_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RemoteConfig {
    pub base_url: String,
    pub placeholder_marker: String,
    pub create_timeout_secs: u64,
    pub list_timeout_secs: u64,
    pub delete_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OracleConfig {
    pub proxy_url: Option<String>,
    pub registry_url: Option<String>,
    pub registry_key: Option<String>,
    pub timeout_secs: u64,
    pub demo_code: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let dir = default_reverie_dir();
        Self {
            db_path: dir.join("diary.db").to_string_lossy().into_owned(),
            legacy_path: dir.join("legacy.json").to_string_lossy().into_owned(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: PLACEHOLDER_BASE_URL.into(),
            placeholder_marker: "your-app.vercel.app".into(),
            create_timeout_secs: 15,
            list_timeout_secs: 15,
            delete_timeout_secs: 10,
        }
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            proxy_url: None,
            registry_url: None,
            registry_key: None,
            timeout_secs: 10,
            demo_code: "8888".into(),
        }
    }
}

impl RemoteConfig {
    /// A remote is usable only when its base URL is set and is not the shipped placeholder.
    pub fn is_configured(&self) -> bool {
        let base = self.base_url.trim();
        !base.is_empty()
            && (self.placeholder_marker.is_empty() || !base.contains(&self.placeholder_marker))
    }

    pub fn create_timeout(&self) -> Duration {
        Duration::from_secs(self.create_timeout_secs)
    }

    pub fn list_timeout(&self) -> Duration {
        Duration::from_secs(self.list_timeout_secs)
    }

    pub fn delete_timeout(&self) -> Duration {
        Duration::from_secs(self.delete_timeout_secs)
    }
}

/// Returns `~/.reverie/`, or `./.reverie/` when no home directory is known.
pub fn default_reverie_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".reverie")
}

/// Returns the default config file path: `~/.reverie/config.toml`
pub fn default_config_path() -> PathBuf {
    default_reverie_dir().join("config.toml")
}

/// Environment variables consulted for each overridable setting, highest priority first.
const LOG_LEVEL_VARS: &[&str] = &["REVERIE_LOG_LEVEL"];
const DB_PATH_VARS: &[&str] = &["REVERIE_DB"];
const LEGACY_PATH_VARS: &[&str] = &["REVERIE_LEGACY_PATH"];
const REMOTE_BASE_VARS: &[&str] = &["REVERIE_API_URL", "API_BASE_URL"];
const ORACLE_PROXY_VARS: &[&str] = &["NOTION_PROXY_URL", "VITE_NOTION_PROXY_URL"];
const REGISTRY_URL_VARS: &[&str] = &["SUPABASE_URL", "VITE_SUPABASE_URL"];
const REGISTRY_KEY_VARS: &[&str] = &["SUPABASE_ANON_KEY", "VITE_SUPABASE_ANON_KEY"];

/// First non-empty value among `names`, in order.
fn first_set(lookup: &impl Fn(&str) -> Option<String>, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| lookup(name))
        .find(|val| !val.trim().is_empty())
}

impl ReverieConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            ReverieConfig::default()
        };

        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Apply overrides from a named-variable source. Each setting checks its
    /// variable names in priority order and takes the first non-empty one.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = first_set(&lookup, LOG_LEVEL_VARS) {
            self.server.log_level = val;
        }
        if let Some(val) = first_set(&lookup, DB_PATH_VARS) {
            self.storage.db_path = val;
        }
        if let Some(val) = first_set(&lookup, LEGACY_PATH_VARS) {
            self.storage.legacy_path = val;
        }
        if let Some(val) = first_set(&lookup, REMOTE_BASE_VARS) {
            self.remote.base_url = val;
        }
        if let Some(val) = first_set(&lookup, ORACLE_PROXY_VARS) {
            self.oracle.proxy_url = Some(val);
        }
        if let Some(val) = first_set(&lookup, REGISTRY_URL_VARS) {
            self.oracle.registry_url = Some(val);
        }
        if let Some(val) = first_set(&lookup, REGISTRY_KEY_VARS) {
            self.oracle.registry_key = Some(val);
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    /// Resolve the legacy key-value file path, expanding `~` if needed.
    pub fn resolved_legacy_path(&self) -> PathBuf {
        expand_tilde(&self.storage.legacy_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = ReverieConfig::default();
        assert_eq!(config.server.log_level, "info");
        assert!(config.storage.db_path.ends_with("diary.db"));
        assert!(config.storage.legacy_path.ends_with("legacy.json"));
        assert_eq!(config.remote.create_timeout_secs, 15);
        assert_eq!(config.remote.list_timeout_secs, 15);
        assert_eq!(config.remote.delete_timeout_secs, 10);
        assert_eq!(config.oracle.demo_code, "8888");
    }

    #[test]
    fn default_remote_is_placeholder() {
        let config = ReverieConfig::default();
        assert!(!config.remote.is_configured());
    }

    #[test]
    fn empty_base_url_is_unconfigured() {
        let remote = RemoteConfig {
            base_url: "   ".into(),
            ..RemoteConfig::default()
        };
        assert!(!remote.is_configured());
    }

    #[test]
    fn real_base_url_is_configured() {
        let remote = RemoteConfig {
            base_url: "https://diary.example.com".into(),
            ..RemoteConfig::default()
        };
        assert!(remote.is_configured());
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
log_level = "debug"

[storage]
db_path = "/tmp/test.db"

[remote]
base_url = "https://diary.example.com"
list_timeout_secs = 3

[oracle]
proxy_url = "https://oracle.example.com/api/oracle"
"#;
        let config: ReverieConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.storage.db_path, "/tmp/test.db");
        assert_eq!(config.remote.base_url, "https://diary.example.com");
        assert_eq!(config.remote.list_timeout(), Duration::from_secs(3));
        assert_eq!(
            config.oracle.proxy_url.as_deref(),
            Some("https://oracle.example.com/api/oracle")
        );
        // defaults still apply for unset fields
        assert_eq!(config.remote.create_timeout_secs, 15);
        assert!(config.storage.legacy_path.ends_with("legacy.json"));
    }

    #[test]
    fn overrides_apply() {
        let mut config = ReverieConfig::default();
        config.apply_overrides(source(&[
            ("REVERIE_DB", "/tmp/override.db"),
            ("REVERIE_LOG_LEVEL", "trace"),
            ("REVERIE_API_URL", "https://diary.example.com"),
        ]));

        assert_eq!(config.storage.db_path, "/tmp/override.db");
        assert_eq!(config.server.log_level, "trace");
        assert!(config.remote.is_configured());
    }

    #[test]
    fn earlier_names_take_priority() {
        let mut config = ReverieConfig::default();
        config.apply_overrides(source(&[
            ("SUPABASE_URL", "https://primary.example.com"),
            ("VITE_SUPABASE_URL", "https://secondary.example.com"),
            ("VITE_SUPABASE_ANON_KEY", "anon-key"),
        ]));

        assert_eq!(
            config.oracle.registry_url.as_deref(),
            Some("https://primary.example.com")
        );
        assert_eq!(config.oracle.registry_key.as_deref(), Some("anon-key"));
    }

    #[test]
    fn blank_values_fall_through() {
        let mut config = ReverieConfig::default();
        config.apply_overrides(source(&[
            ("REVERIE_API_URL", ""),
            ("API_BASE_URL", "https://fallback.example.com"),
        ]));
        assert_eq!(config.remote.base_url, "https://fallback.example.com");
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReverieConfig::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.oracle.timeout_secs, 10);
    }
}
