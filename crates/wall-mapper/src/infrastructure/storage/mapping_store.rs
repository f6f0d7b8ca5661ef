//! JSON persistence of the mapping.
//!
//! The host stores the mapping as:
//!
//! ```json
//! {
//!   "screens": [
//!     { "serial": "A", "homography": [..9 numbers..], "homography_secondary": [] }
//!   ],
//!   "snapshot_w": 1000,
//!   "snapshot_h": 750
//! }
//! ```
//!
//! Records written before secondary outputs existed lack
//! `homography_secondary`; they load with that slot empty.
//!
//! Saves go to a sibling temporary file that is then renamed over the
//! target, so a crash mid-write never leaves a truncated mapping behind.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use wall_core::MappingConfig;

use super::StoreError;
use crate::application::mapping_session::MappingStore;

/// Loads the mapping at `path`, or an empty mapping if the file does not exist.
///
/// # Errors
///
/// Returns [`StoreError::Io`] for read failures other than "not found" and
/// [`StoreError::Json`] if the document is malformed.
pub fn load_mapping(path: &Path) -> Result<MappingConfig, StoreError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("no mapping at {}; starting empty", path.display());
            return Ok(MappingConfig::default());
        }
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&content).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `config` to `path` atomically, creating parent directories.
///
/// # Errors
///
/// Returns [`StoreError::Io`] for any file-system failure.
pub fn save_mapping(config: &MappingConfig, path: &Path) -> Result<(), StoreError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| StoreError::Io { path, source }
    };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(io_err(dir))?;
    }

    let content = serde_json::to_string_pretty(config).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let tmp = temp_path(path);
    std::fs::write(&tmp, content).map_err(io_err(&tmp))?;
    std::fs::rename(&tmp, path).map_err(io_err(path))?;
    debug!("mapping written to {}", path.display());
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// [`MappingStore`] backed by a JSON file.
#[derive(Debug, Clone)]
pub struct JsonMappingStore {
    path: PathBuf,
}

impl JsonMappingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MappingStore for JsonMappingStore {
    fn save(&mut self, config: &MappingConfig) -> Result<(), String> {
        save_mapping(config, &self.path).map_err(|e| e.to_string())
    }
}
