//! Configuration file handling for vidgen.
//!
//! Loads configuration from `<config dir>/vidgen/config.toml` or a custom path.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::poll::{PollConfig, DEFAULT_MAX_ATTEMPTS};

/// Compiled-in backend location, used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Environment variable that overrides the persisted base URL.
pub const BASE_URL_ENV: &str = "VIDGEN_API_BASE";

/// Configuration file structure for vidgen.
/// Loaded from ~/.config/vidgen/config.toml (or custom path via --config).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub poll: PollSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct BackendConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PollSettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            interval_secs: default_interval_secs(),
        }
    }
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_interval_secs() -> u64 {
    1
}

impl From<&PollSettings> for PollConfig {
    fn from(settings: &PollSettings) -> Self {
        PollConfig {
            max_attempts: settings.max_attempts,
            interval: Duration::from_secs(settings.interval_secs),
        }
    }
}

/// Where the resolved base URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseUrlSource {
    Flag,
    Environment,
    ConfigFile,
    Default,
}

impl std::fmt::Display for BaseUrlSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BaseUrlSource::Flag => write!(f, "--base-url"),
            BaseUrlSource::Environment => write!(f, "{}", BASE_URL_ENV),
            BaseUrlSource::ConfigFile => write!(f, "config file"),
            BaseUrlSource::Default => write!(f, "built-in default"),
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Write configuration to a file path, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |e: std::io::Error| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, content).map_err(io_error)
    }

    /// Resolve the backend base URL.
    ///
    /// Precedence: explicit flag > environment > config file > built-in
    /// default. Blank values are skipped and trailing slashes trimmed.
    pub fn resolve_base_url(
        &self,
        flag: Option<&str>,
        env: Option<&str>,
    ) -> (String, BaseUrlSource) {
        let candidates = [
            (flag, BaseUrlSource::Flag),
            (env, BaseUrlSource::Environment),
            (self.backend.base_url.as_deref(), BaseUrlSource::ConfigFile),
        ];

        candidates
            .into_iter()
            .find_map(|(value, source)| {
                value
                    .map(|v| v.trim().trim_end_matches('/'))
                    .filter(|v| !v.is_empty())
                    .map(|v| (v.to_string(), source))
            })
            .unwrap_or_else(|| (DEFAULT_BASE_URL.to_string(), BaseUrlSource::Default))
    }

    /// Per-request HTTP timeout, if configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.backend.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    SerializeError {
        path: PathBuf,
        source: toml::ser::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to access config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::SerializeError { path, source } => {
                write!(
                    f,
                    "Failed to serialize config for '{}': {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::SerializeError { source, .. } => Some(source),
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("vidgen").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/vidgen/config.toml")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(dir.path().join("nope.toml").as_path())).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.poll.max_attempts, 60);
        assert_eq!(config.poll.interval_secs, 1);
    }

    #[test]
    fn test_parse_full_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[backend]
base_url = "https://render.example.com"
request_timeout_secs = 90

[poll]
max_attempts = 10
interval_secs = 3
"#,
        )
        .unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(
            config.backend.base_url.as_deref(),
            Some("https://render.example.com")
        );
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(90)));
        let poll = PollConfig::from(&config.poll);
        assert_eq!(poll.max_attempts, 10);
        assert_eq!(poll.interval, Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[backend\nbase_url = ").unwrap();

        let err = Config::load(Some(path.as_path())).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_save_then_load_persists_base_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.backend.base_url = Some("https://saved.example.com".to_string());

        config.save(&path).unwrap();
        let loaded = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_base_url_precedence() {
        let mut config = Config::default();
        config.backend.base_url = Some("https://file.example.com".to_string());

        assert_eq!(
            config.resolve_base_url(Some("https://flag.example.com/"), Some("https://env.example.com")),
            ("https://flag.example.com".to_string(), BaseUrlSource::Flag)
        );
        assert_eq!(
            config.resolve_base_url(None, Some("https://env.example.com")),
            ("https://env.example.com".to_string(), BaseUrlSource::Environment)
        );
        assert_eq!(
            config.resolve_base_url(None, None),
            ("https://file.example.com".to_string(), BaseUrlSource::ConfigFile)
        );
        assert_eq!(
            Config::default().resolve_base_url(None, Some("  ")),
            (DEFAULT_BASE_URL.to_string(), BaseUrlSource::Default)
        );
    }

    #[test]
    fn test_default_path_ends_with_vidgen_config() {
        let path = default_path();
        assert!(path.ends_with("vidgen/config.toml"));
    }
}
