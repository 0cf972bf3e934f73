//! Configuration loading and root folder resolution
//!
//! Bootstrap settings come from a TOML file. A missing file is not fatal:
//! the service logs a warning and starts on built-in defaults.
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments (--root-folder, --port)
//! 2. Environment variables (TUNES_ROOT_FOLDER)
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "TUNES_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "tunes.db";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Root folder holding the database (optional)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Explicit database path; defaults to `<root_folder>/tunes.db`
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub recommend: RecommendConfig,

    /// Fixed seed for request RNGs; unset means OS entropy per request
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// What a search with an empty (or whitespace) query returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyQueryPolicy {
    /// Empty result lists and no principal
    #[default]
    Empty,
    /// List visible entities of every kind, still without a principal
    Browse,
}

/// Search result bounds
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Maximum songs per list
    #[serde(default = "default_song_limit")]
    pub song_limit: usize,

    /// Maximum entries per non-song list
    #[serde(default = "default_other_limit")]
    pub other_limit: usize,

    /// Candidates requested from the index per kind
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: usize,

    #[serde(default)]
    pub empty_query: EmptyQueryPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendConfig {
    #[serde(default = "default_recommend_count")]
    pub default_count: usize,

    /// Upper bound on the `count` a caller may request
    #[serde(default = "default_recommend_max")]
    pub max_count: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5730
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_song_limit() -> usize {
    10
}

fn default_other_limit() -> usize {
    6
}

fn default_candidate_limit() -> usize {
    30
}

fn default_recommend_count() -> usize {
    10
}

fn default_recommend_max() -> usize {
    50
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            database_path: None,
            host: default_host(),
            port: default_port(),
            logging: LoggingConfig::default(),
            search: SearchConfig::default(),
            recommend: RecommendConfig::default(),
            rng_seed: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            song_limit: default_song_limit(),
            other_limit: default_other_limit(),
            candidate_limit: default_candidate_limit(),
            empty_query: EmptyQueryPolicy::default(),
        }
    }
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            default_count: default_recommend_count(),
            max_count: default_recommend_max(),
        }
    }
}

impl TomlConfig {
    /// Parse and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path, e)))?;

        let config: TomlConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        config.validate()?;
        info!("Loaded TOML configuration from {:?}", path);
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    ///
    /// A file that exists but fails to parse or validate is still an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) if p.exists() => Self::load(p),
            Some(p) => {
                warn!("Config file {:?} not found, using defaults", p);
                Ok(Self::default())
            }
            None => match default_config_path() {
                Some(p) if p.exists() => Self::load(&p),
                _ => {
                    info!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.search.song_limit == 0 || self.search.other_limit == 0 {
            return Err(Error::Config(
                "search.song_limit and search.other_limit must be positive".to_string(),
            ));
        }
        if self.search.candidate_limit < self.search.song_limit.max(self.search.other_limit) {
            return Err(Error::Config(format!(
                "search.candidate_limit ({}) must cover the largest list limit",
                self.search.candidate_limit
            )));
        }
        if self.recommend.default_count == 0
            || self.recommend.default_count > self.recommend.max_count
        {
            return Err(Error::Config(format!(
                "recommend.default_count must be in 1..={}",
                self.recommend.max_count
            )));
        }
        Ok(())
    }

    /// Database path: explicit setting, else `<root>/tunes.db`
    pub fn database_path(&self, root_folder: &Path) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| root_folder.join(DATABASE_FILE))
    }
}

/// Command-line configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub root_folder: Option<PathBuf>,
    pub port: Option<u16>,
}

impl ConfigOverrides {
    /// Apply command-line values over the file configuration
    ///
    /// The root folder is not written back: it goes through
    /// [`resolve_root_folder`] so the environment variable keeps its place
    /// in the priority order.
    pub fn apply(&self, config: &mut TomlConfig) {
        if let Some(port) = self.port {
            config.port = port;
        }
    }

    pub fn root_folder(&self) -> Option<&Path> {
        self.root_folder.as_deref()
    }
}

/// Root folder resolution in priority order:
/// 1. Command-line argument
/// 2. `TUNES_ROOT_FOLDER` environment variable
/// 3. `root_folder` from the TOML config
/// 4. OS-dependent default
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml.root_folder {
        return path.clone();
    }

    get_default_root_folder()
}

/// Per-user config file location (`<config_dir>/tunes/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tunes").join("config.toml"))
}

/// Get OS-dependent default root folder path
pub fn get_default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("tunes"))
        .unwrap_or_else(|| PathBuf::from("./tunes_data"))
}
