//! Startup configuration loaded from a RON file.
//!
//! Every field is optional in the file; missing fields take their defaults
//! and a missing file yields the default configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use research_core::{is_well_formed, Preset, PresetCatalog};
use research_engine::{ChunkSettings, FetchSettings, IndexSettings};
use research_logging::research_info;
use serde::{Deserialize, Serialize};

use crate::session::SessionLimits;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8501";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("preset {label:?} has an invalid url {url:?}")]
    InvalidPreset { label: String, url: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Sessions idle for longer than this are dropped.
    pub session_idle_secs: u64,
    /// Upper bound on live sessions; the least recently used one is evicted.
    pub max_sessions: usize,
    pub fetch: FetchConfig,
    pub index: IndexConfig,
    pub presets: Vec<PresetConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub allowed_content_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetConfig {
    pub label: String,
    pub url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            session_idle_secs: 60 * 60,
            max_sessions: 256,
            fetch: FetchConfig::default(),
            index: IndexConfig::default(),
            presets: PresetCatalog::builtin()
                .presets()
                .iter()
                .map(|p| PresetConfig {
                    label: p.label.clone(),
                    url: p.url.clone(),
                })
                .collect(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        let settings = FetchSettings::default();
        Self {
            connect_timeout_secs: settings.connect_timeout.as_secs(),
            request_timeout_secs: settings.request_timeout.as_secs(),
            redirect_limit: settings.redirect_limit,
            max_bytes: settings.max_bytes,
            allowed_content_types: settings.allowed_content_types,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        let settings = IndexSettings::default();
        Self {
            chunk_size: settings.chunking.chunk_size,
            chunk_overlap: settings.chunking.chunk_overlap,
            top_k: settings.top_k,
        }
    }
}

impl AppConfig {
    /// Loads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                research_info!("No config at {:?}; using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        research_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self
            .presets
            .iter()
            .find(|p| p.label.trim().is_empty() || !is_well_formed(&p.url))
        {
            Some(bad) => Err(ConfigError::InvalidPreset {
                label: bad.label.clone(),
                url: bad.url.clone(),
            }),
            None => Ok(()),
        }
    }

    pub fn catalog(&self) -> PresetCatalog {
        PresetCatalog::new(
            self.presets
                .iter()
                .map(|p| Preset::new(p.label.trim(), p.url.trim()))
                .collect(),
        )
    }

    pub fn session_limits(&self) -> SessionLimits {
        SessionLimits {
            idle: Duration::from_secs(self.session_idle_secs),
            max_sessions: self.max_sessions,
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_secs(self.fetch.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.fetch.request_timeout_secs),
            redirect_limit: self.fetch.redirect_limit,
            max_bytes: self.fetch.max_bytes,
            allowed_content_types: self.fetch.allowed_content_types.clone(),
        }
    }

    pub fn index_settings(&self) -> IndexSettings {
        IndexSettings {
            chunking: ChunkSettings {
                chunk_size: self.index.chunk_size,
                chunk_overlap: self.index.chunk_overlap,
            },
            top_k: self.index.top_k,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.ron")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.catalog(), PresetCatalog::builtin());
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("research.ron");
        fs::write(
            &path,
            r#"(
                bind_addr: "0.0.0.0:9000",
                index: (top_k: 5),
                presets: [(label: "Rates", url: "https://rates.example.com")],
            )"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.index.top_k, 5);
        assert_eq!(config.index.chunk_size, IndexConfig::default().chunk_size);
        assert_eq!(config.fetch, FetchConfig::default());
        assert_eq!(config.catalog().resolve("Rates"), Some("https://rates.example.com"));
        assert_eq!(config.index_settings().top_k, 5);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("research.ron");
        fs::write(&path, "(bind_addr: 42").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn preset_with_bad_url_is_rejected() {
        let config = AppConfig {
            presets: vec![PresetConfig {
                label: "Broken".to_string(),
                url: "not a url".to_string(),
            }],
            ..AppConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPreset { .. })
        ));
    }

    #[test]
    fn fetch_settings_follow_config() {
        let mut config = AppConfig::default();
        config.fetch.request_timeout_secs = 3;
        assert_eq!(config.fetch_settings().request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn session_limits_follow_config() {
        let config = AppConfig::parse("(session_idle_secs: 90, max_sessions: 4)").unwrap();
        assert_eq!(
            config.session_limits(),
            SessionLimits {
                idle: Duration::from_secs(90),
                max_sessions: 4,
            }
        );
    }
}
