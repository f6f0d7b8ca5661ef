//! Storage infrastructure: settings, mapping persistence and device snapshots.
//!
//! - `config` reads the TOML settings file from the platform config directory
//!   and provides defaults on first run.
//! - `mapping_store` loads and saves the [`wall_core::MappingConfig`] in the
//!   JSON format the device-management host uses.
//! - `devices` reads the device-assignment snapshot exported by the host.
//!
//! Keeping file formats here means the application layer only ever sees
//! domain types.

use std::path::PathBuf;

use thiserror::Error;

pub mod config;
pub mod devices;
pub mod mapping_store;

/// Error type for the JSON-backed host files.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
