//! Store configuration.
//!
//! Resolution order:
//! 1) JSON file given explicitly, or via `DRIBBLE_CONFIG_PATH`
//! 2) environment overrides (`DRIBBLE_SUPA_URL`, `DRIBBLE_SUPA_KEY`,
//!    `DRIBBLE_PAGE_SIZE`, `DRIBBLE_HEADSHOT_BASE_URL`)
//!
//! Empty or whitespace-only environment values are ignored.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "DRIBBLE_CONFIG_PATH";
pub const URL_ENV: &str = "DRIBBLE_SUPA_URL";
pub const API_KEY_ENV: &str = "DRIBBLE_SUPA_KEY";
pub const PAGE_SIZE_ENV: &str = "DRIBBLE_PAGE_SIZE";
pub const HEADSHOT_BASE_URL_ENV: &str = "DRIBBLE_HEADSHOT_BASE_URL";

pub const DEFAULT_PAGE_SIZE: usize = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const HEADSHOT_BUCKET_PATH: &str = "storage/v1/object/public/headshots/";

/// Names of the remote tables/views the tool reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceNames {
    pub players: String,
    pub teammates: String,
    pub puzzles: String,
}

impl Default for ResourceNames {
    fn default() -> Self {
        Self {
            players: "players".to_string(),
            teammates: "teammates_season_details".to_string(),
            puzzles: "user_puzzles".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Derived from `url` when absent
    #[serde(default)]
    pub headshot_base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub resources: ResourceNames,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            page_size: DEFAULT_PAGE_SIZE,
            headshot_base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            resources: ResourceNames::default(),
        }
    }
}

impl StoreConfig {
    pub fn from_json(content: &str) -> CoreResult<Self> {
        serde_json::from_str(content).map_err(|e| CoreError::Config(format!("Invalid config JSON: {e}")))
    }

    pub fn from_json_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("Failed to read config file '{}': {e}", path.display()))
        })?;
        Self::from_json(&content)
    }

    /// Load from an optional file (falling back to `DRIBBLE_CONFIG_PATH`),
    /// apply environment overrides, then validate.
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let config = Self::load_unvalidated(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Same as [`StoreConfig::load`] without the credential checks; used
    /// when no remote store is contacted.
    pub fn load_unvalidated(path: Option<&Path>) -> CoreResult<Self> {
        let path = path.map(Path::to_path_buf).or_else(|| env_value(CONFIG_PATH_ENV).map(PathBuf::from));

        let mut config = match path {
            Some(path) => Self::from_json_file(&path)?,
            None => Self::default(),
        };
        config.apply_overrides(env_value)?;
        Ok(config)
    }

    /// Apply overrides from a key lookup; `load` passes the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> CoreResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(URL_ENV) {
            self.url = url;
        }
        if let Some(key) = lookup(API_KEY_ENV) {
            self.api_key = key;
        }
        if let Some(raw) = lookup(PAGE_SIZE_ENV) {
            self.page_size = raw
                .parse()
                .map_err(|e| CoreError::Config(format!("{PAGE_SIZE_ENV}='{raw}': {e}")))?;
        }
        if let Some(base) = lookup(HEADSHOT_BASE_URL_ENV) {
            self.headshot_base_url = Some(base);
        }
        Ok(())
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.url.trim().is_empty() {
            return Err(CoreError::Config(format!("store url is not set ({URL_ENV})")));
        }
        if self.api_key.trim().is_empty() {
            return Err(CoreError::Config(format!("store api key is not set ({API_KEY_ENV})")));
        }
        if self.page_size == 0 {
            return Err(CoreError::Config("page_size must be greater than zero".to_string()));
        }
        Ok(())
    }

    pub fn rest_base_url(&self) -> String {
        format!("{}/rest/v1", self.url.trim_end_matches('/'))
    }

    pub fn resolved_headshot_base_url(&self) -> String {
        match &self.headshot_base_url {
            Some(base) => base.clone(),
            None => format!("{}/{HEADSHOT_BUCKET_PATH}", self.url.trim_end_matches('/')),
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    let value = env::var(name).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_from_minimal_json() {
        let config = StoreConfig::from_json(r#"{"url": "https://abc.supabase.co/", "api_key": "k"}"#).unwrap();
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.resources, ResourceNames::default());
        assert_eq!(config.rest_base_url(), "https://abc.supabase.co/rest/v1");
        assert_eq!(
            config.resolved_headshot_base_url(),
            "https://abc.supabase.co/storage/v1/object/public/headshots/"
        );
        config.validate().unwrap();
    }

    #[test]
    fn test_overrides_win_over_file_values() {
        let mut config = StoreConfig::from_json(r#"{"url": "https://a", "api_key": "file"}"#).unwrap();
        let env: HashMap<&str, &str> =
            [(API_KEY_ENV, "from-env"), (PAGE_SIZE_ENV, "250")].into_iter().collect();

        config.apply_overrides(|k| env.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.url, "https://a");
        assert_eq!(config.api_key, "from-env");
        assert_eq!(config.page_size, 250);
    }

    #[test]
    fn test_bad_page_size_override() {
        let mut config = StoreConfig::default();
        let err = config
            .apply_overrides(|k| (k == PAGE_SIZE_ENV).then(|| "lots".to_string()))
            .unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        assert!(StoreConfig::default().validate().is_err());

        let config = StoreConfig {
            url: "https://a".into(),
            api_key: "k".into(),
            page_size: 0,
            ..StoreConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"url": "https://a", "api_key": "k", "resources": {{"puzzles": "staging_puzzles"}}}}"#
        )
        .unwrap();

        let config = StoreConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.resources.puzzles, "staging_puzzles");
        assert_eq!(config.resources.players, "players");
    }
}
