//! TOML-based settings for the mapper.
//!
//! Reads `AppConfig` from the platform-appropriate config file:
//! - Windows:  `%APPDATA%\VideoWall\config.toml`
//! - Linux:    `~/.config/videowall/config.toml`
//! - macOS:    `~/Library/Application Support/VideoWall/config.toml`
//!
//! Example:
//!
//! ```toml
//! [mapper]
//! log_level = "debug"
//!
//! [capture]
//! interval_ms = 500
//!
//! [storage]
//! mapping_file = "/srv/wall/mapping.json"
//! ```
//!
//! # Serde default values
//!
//! Every field carries `#[serde(default = "some_fn")]`, so a missing file, a
//! missing section, or a missing key all fall back to the built-in default.
//! Relative storage paths resolve against the directory of the config file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::capture_cycle::CaptureSettings;

/// Error type for settings file operations.
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

/// Top-level settings stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub mapper: MapperConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// General behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapperConfig {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Timing of the capture → detect → merge cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptureConfig {
    /// Pause between two cycles.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Delay before the first cycle after the camera opens.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Delay before the next cycle once a save resumes paused detection,
    /// giving devices time to show their markers.
    #[serde(default = "default_resume_delay_ms")]
    pub resume_delay_ms: u64,
}

/// Locations of the host files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Persisted mapping (screens and snapshot resolution).
    #[serde(default = "default_mapping_file")]
    pub mapping_file: PathBuf,
    /// Device-assignment snapshot.
    #[serde(default = "default_devices_file")]
    pub devices_file: PathBuf,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_interval_ms() -> u64 {
    1000
}
fn default_initial_delay_ms() -> u64 {
    100
}
fn default_resume_delay_ms() -> u64 {
    3000
}
fn default_mapping_file() -> PathBuf {
    PathBuf::from("mapping.json")
}
fn default_devices_file() -> PathBuf {
    PathBuf::from("devices.json")
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            initial_delay_ms: default_initial_delay_ms(),
            resume_delay_ms: default_resume_delay_ms(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            mapping_file: default_mapping_file(),
            devices_file: default_devices_file(),
        }
    }
}

impl CaptureConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn resume_delay(&self) -> Duration {
        Duration::from_millis(self.resume_delay_ms)
    }
}

impl From<&CaptureConfig> for CaptureSettings {
    fn from(cfg: &CaptureConfig) -> Self {
        Self {
            initial_delay: cfg.initial_delay(),
            interval: cfg.interval(),
            resume_delay: cfg.resume_delay(),
        }
    }
}

impl StorageConfig {
    /// Resolves both file paths against `base` unless they are absolute.
    pub fn resolve_against(&self, base: &Path) -> StorageConfig {
        StorageConfig {
            mapping_file: base.join(&self.mapping_file),
            devices_file: base.join(&self.devices_file),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the settings file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default settings file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the
/// file does not exist yet.
///
/// Storage paths in the result are resolved against the file's directory.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let mut cfg = match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str::<AppConfig>(&content)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => AppConfig::default(),
        Err(e) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };
    if let Some(dir) = path.parent() {
        cfg.storage = cfg.storage.resolve_against(dir);
    }
    Ok(cfg)
}

/// Persists `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
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

/// Resolves the platform config base directory including the `VideoWall` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("VideoWall"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("videowall"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("VideoWall")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("wall_cfg_{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_app_config_default_has_expected_timings() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.capture.interval_ms, 1000);
        assert_eq!(cfg.capture.initial_delay_ms, 100);
        assert_eq!(cfg.capture.resume_delay_ms, 3000);
        assert_eq!(cfg.capture.interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_capture_settings_from_config_converts_milliseconds() {
        let mut cfg = CaptureConfig::default();
        cfg.resume_delay_ms = 1500;

        let settings = CaptureSettings::from(&cfg);

        assert_eq!(settings.initial_delay, Duration::from_millis(100));
        assert_eq!(settings.resume_delay, Duration::from_millis(1500));
    }

    #[test]
    fn test_app_config_default_log_level_is_info() {
        assert_eq!(AppConfig::default().mapper.log_level, "info");
    }

    #[test]
    fn test_deserialize_empty_toml_uses_defaults() {
        let cfg: AppConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_deserialize_partial_capture_overrides_defaults() {
        // Arrange
        let toml_str = r#"
[capture]
interval_ms = 250
"#;

        // Act
        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(cfg.capture.interval_ms, 250);
        // Fields left out keep their defaults
        assert_eq!(cfg.capture.resume_delay_ms, 3000);
        assert_eq!(cfg.storage.mapping_file, PathBuf::from("mapping.json"));
    }

    #[test]
    fn test_deserialize_invalid_toml_returns_parse_error() {
        let result: Result<AppConfig, toml::de::Error> = toml::from_str("[[[ not valid toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_from_missing_file_returns_defaults_resolved_to_its_dir() {
        let dir = scratch_dir();
        let path = dir.join("config.toml");

        let cfg = load_config_from(&path).expect("missing file is not an error");

        assert_eq!(cfg.capture, CaptureConfig::default());
        assert_eq!(cfg.storage.mapping_file, dir.join("mapping.json"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_config_keeps_absolute_storage_paths() {
        let dir = scratch_dir();
        let path = dir.join("config.toml");
        let absolute = std::env::temp_dir().join("elsewhere").join("m.json");
        let mut cfg = AppConfig::default();
        cfg.storage.mapping_file = absolute.clone();
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();

        assert_eq!(loaded.storage.mapping_file, absolute);
        assert_eq!(loaded.storage.devices_file, dir.join("devices.json"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_and_load_config_round_trip_via_temp_dir() {
        // Arrange
        let dir = scratch_dir();
        let path = dir.join("nested").join("config.toml");
        let mut cfg = AppConfig::default();
        cfg.mapper.log_level = "debug".to_string();
        cfg.capture.interval_ms = 42;

        // Act
        save_config_to(&cfg, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        // Assert
        assert_eq!(loaded.mapper.log_level, "debug");
        assert_eq!(loaded.capture.interval_ms, 42);

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_config_file_path_ends_with_config_toml() {
        if let Ok(path) = config_file_path() {
            assert!(
                path.ends_with("config.toml"),
                "config file must be named config.toml, got {path:?}"
            );
        }
        // NoPlatformConfigDir in a stripped CI environment is also acceptable.
    }
}
