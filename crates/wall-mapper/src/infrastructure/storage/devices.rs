//! Device-assignment snapshot exported by the host.
//!
//! A JSON array of `{"serial": "...", "assigned": true}` records, one per
//! known device, in no particular order.  A missing `assigned` reads as
//! unassigned.

use std::path::Path;

use wall_core::Device;

use super::StoreError;

/// Reads the device snapshot at `path`.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the file cannot be read and
/// [`StoreError::Json`] if it is not a device list.
pub fn load_devices(path: &Path) -> Result<Vec<Device>, StoreError> {
    let content = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}
