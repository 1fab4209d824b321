//! TOML-based configuration for the seating server.
//!
//! The file is read from `--config <path>` when given, otherwise from the
//! platform-appropriate location:
//! - Linux:    `$XDG_CONFIG_HOME/cinema-seating/server.toml` (or `~/.config/...`)
//! - macOS:    `~/Library/Application Support/CinemaSeating/server.toml`
//! - Windows:  `%APPDATA%\CinemaSeating\server.toml`
//!
//! A missing file is not an error: the server starts with the defaults below.
//!
//! ```toml
//! [server]
//! bind_address = "0.0.0.0"
//! port = 1355
//! log_level = "info"
//! max_cells = 131068
//!
//! [cinema]
//! rows = 10
//! columns = 10
//! minimum_distance = 2
//! ```
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is absent from the TOML file, and whole
//! sections fall back to their `Default` impl.  An empty file is therefore a
//! valid configuration.

use std::path::{Path, PathBuf};

use cinema_core::protocol::MAX_SNAPSHOT_SEATS;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the config file inside the platform config directory.
const CONFIG_FILE_NAME: &str = "server.toml";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level server configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ListenConfig,
    #[serde(default)]
    pub cinema: CinemaConfig,
}

/// Listener, logging, and resource limit settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListenConfig {
    /// IP address to bind to.  `"0.0.0.0"` binds all interfaces.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// `tracing` level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Largest `rows × columns` the start-up cinema or a create or resize
    /// request may ask for.  Values above the largest grid whose snapshot
    /// fits in one response frame are capped to it.
    #[serde(default = "default_max_cells")]
    pub max_cells: u64,
}

/// The cinema created at start-up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CinemaConfig {
    #[serde(default = "default_rows")]
    pub rows: u32,
    #[serde(default = "default_columns")]
    pub columns: u32,
    #[serde(default = "default_minimum_distance")]
    pub minimum_distance: u32,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    1355
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_max_cells() -> u64 {
    MAX_SNAPSHOT_SEATS
}
fn default_rows() -> u32 {
    10
}
fn default_columns() -> u32 {
    10
}
fn default_minimum_distance() -> u32 {
    2
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            log_level: default_log_level(),
            max_cells: default_max_cells(),
        }
    }
}

impl Default for CinemaConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            columns: default_columns(),
            minimum_distance: default_minimum_distance(),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads the configuration from `path`, or from [`config_file_path`] when
/// `path` is `None`.
///
/// A missing file yields [`ServerConfig::default()`].  So does an
/// undeterminable platform directory when no explicit path was given.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: Option<&Path>) -> Result<ServerConfig, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match config_file_path() {
            Ok(p) => p,
            Err(ConfigError::NoPlatformConfigDir) => return Ok(ServerConfig::default()),
            Err(e) => return Err(e),
        },
    };

    match std::fs::read_to_string(&path) {
        Ok(content) => {
            let cfg: ServerConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ServerConfig::default()),
        Err(e) => Err(ConfigError::Io { path, source: e }),
    }
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(config: &ServerConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Resolves the platform config directory for this application.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("CinemaSeating"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("CinemaSeating")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("cinema-seating"))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("cinema_test_{}", Uuid::new_v4()))
    }

    // ── Defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_server_config_default_listens_on_1355() {
        // Arrange / Act
        let cfg = ServerConfig::default();

        // Assert
        assert_eq!(cfg.server.bind_address, "0.0.0.0");
        assert_eq!(cfg.server.port, 1355);
        assert_eq!(cfg.server.log_level, "info");
        assert_eq!(cfg.server.max_cells, MAX_SNAPSHOT_SEATS);
    }

    #[test]
    fn test_server_config_default_cinema_is_10_by_10_with_distance_2() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.cinema, CinemaConfig { rows: 10, columns: 10, minimum_distance: 2 });
    }

    // ── TOML parsing ──────────────────────────────────────────────────────────

    #[test]
    fn test_deserialize_empty_toml_uses_defaults() {
        let cfg: ServerConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, ServerConfig::default());
    }

    #[test]
    fn test_deserialize_partial_section_overrides_only_given_fields() {
        // Arrange
        let toml_str = r#"
[server]
port = 9999
[cinema]
minimum_distance = 0
"#;

        // Act
        let cfg: ServerConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(cfg.server.port, 9999);
        assert_eq!(cfg.server.bind_address, "0.0.0.0");
        assert_eq!(cfg.cinema.minimum_distance, 0);
        assert_eq!(cfg.cinema.rows, 10);
    }

    #[test]
    fn test_deserialize_negative_dimension_is_rejected() {
        let result: Result<ServerConfig, _> = toml::from_str("[cinema]\nrows = -1\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_server_config_round_trips_through_toml() {
        let mut cfg = ServerConfig::default();
        cfg.server.port = 4000;
        cfg.cinema.columns = 25;

        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: ServerConfig = toml::from_str(&toml_str).expect("deserialize");

        assert_eq!(cfg, restored);
    }

    // ── load_config / save_config ─────────────────────────────────────────────

    #[test]
    fn test_load_config_returns_default_when_file_absent() {
        let path = temp_dir().join("missing.toml");
        let cfg = load_config(Some(&path)).expect("missing file yields defaults");
        assert_eq!(cfg, ServerConfig::default());
    }

    #[test]
    fn test_save_and_load_config_round_trip_via_temp_dir() {
        // Arrange
        let dir = temp_dir();
        let path = dir.join("nested").join(CONFIG_FILE_NAME);
        let mut cfg = ServerConfig::default();
        cfg.server.log_level = "debug".to_string();
        cfg.cinema.rows = 42;

        // Act
        save_config(&cfg, &path).expect("save");
        let loaded = load_config(Some(&path)).expect("load");

        // Assert
        assert_eq!(loaded, cfg);

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_config_reports_parse_error_for_invalid_toml() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[[[ not valid toml").unwrap();

        let result = load_config(Some(&path));

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_config_reports_io_error_for_directory_path() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();

        let result = load_config(Some(&dir));

        assert!(matches!(result, Err(ConfigError::Io { .. })));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_config_file_path_ends_with_server_toml() {
        if let Ok(path) = config_file_path() {
            assert!(path.ends_with(CONFIG_FILE_NAME), "unexpected config path {path:?}");
        }
        // NoPlatformConfigDir in a stripped environment is also acceptable.
    }
}
