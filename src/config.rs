use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_OMDB_URL: &str = "https://www.omdbapi.com/";

/// Platform directories shared by config, preferences and logs.
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "movie-explorer", "movie-explorer")
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No API endpoint configured")]
    MissingEndpoint,

    #[error("Batch size must be at least 1")]
    InvalidBatchSize,

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            ConfigError::MissingEndpoint => "No OMDb access configured. Set OMDB_API_KEY, \
                 pass --api-key, or add \"api_key\" to the config file."
                .to_string(),
            ConfigError::InvalidBatchSize => "Batch size must be at least 1".to_string(),
            ConfigError::Io { path, source } => {
                format!("Could not read {}: {}", path.display(), source)
            }
            ConfigError::Parse(e) => format!("Config file is not valid JSON: {}", e),
        }
    }
}

/// Runtime configuration, layered file < environment < command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_key: Option<String>,
    /// Full lookup endpoint including the key; wins over `api_key`.
    pub api_url: Option<String>,
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    pub request_timeout_secs: u64,
    /// Combine genre filter and search with AND instead of last-trigger-wins.
    pub compose_filters: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: None,
            batch_size: 5,
            batch_delay_ms: 1000,
            request_timeout_secs: 10,
            compose_filters: false,
        }
    }
}

impl AppConfig {
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load_from(p),
            None => match Self::default_path() {
                Some(p) => Self::load_from(&p),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = non_empty(lookup("OMDB_API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(url) = non_empty(lookup("OMDB_API_URL")) {
            self.api_url = Some(url);
        }
    }

    /// Base URL that a title query is appended to.
    pub fn endpoint(&self) -> Result<String, ConfigError> {
        if let Some(url) = non_empty(self.api_url.clone()) {
            return Ok(url);
        }
        match non_empty(self.api_key.clone()) {
            Some(key) => Ok(format!("{}?apikey={}", DEFAULT_OMDB_URL, key)),
            None => Err(ConfigError::MissingEndpoint),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize);
        }
        self.endpoint().map(|_| ())
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_configuration() {
        let config = AppConfig::default();
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.batch_delay(), Duration::from_secs(1));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert!(!config.compose_filters);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"api_key": "abc123", "batch_size": 3}"#).unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("abc123"));
        assert_eq!(config.batch_size, 3);
        assert_eq!(config.batch_delay_ms, 1000);
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let env: HashMap<&str, &str> =
            HashMap::from([("OMDB_API_KEY", "fromenv"), ("OMDB_API_URL", "  ")]);
        let mut config = AppConfig {
            api_key: Some("fromfile".to_string()),
            ..AppConfig::default()
        };
        config.apply_env_from(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.api_key.as_deref(), Some("fromenv"));
        assert_eq!(config.api_url, None);
    }

    #[test]
    fn test_endpoint_prefers_full_url() {
        let config = AppConfig {
            api_key: Some("abc".to_string()),
            api_url: Some("http://localhost:9000/?apikey=local".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(config.endpoint().unwrap(), "http://localhost:9000/?apikey=local");
    }

    #[test]
    fn test_endpoint_from_key() {
        let config = AppConfig {
            api_key: Some("abc".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(
            config.endpoint().unwrap(),
            "https://www.omdbapi.com/?apikey=abc"
        );
    }

    #[test]
    fn test_validate_rejects_missing_endpoint_and_zero_batch() {
        assert!(matches!(
            AppConfig::default().validate(),
            Err(ConfigError::MissingEndpoint)
        ));

        let config = AppConfig {
            api_key: Some("abc".to_string()),
            batch_size: 0,
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidBatchSize)));
    }

    #[test]
    fn test_config_error_user_message() {
        let msg = ConfigError::MissingEndpoint.user_message();
        assert!(msg.contains("OMDB_API_KEY"));
    }
}
