//! The persisted mapping unit: screens plus the reference-picture resolution.
//!
//! Homographies are only meaningful in the coordinate space of the picture
//! they were computed from.  [`Snapshot`] records that picture's pixel
//! dimensions; all transforms stored in a [`MappingConfig`] share it.

use serde::{Deserialize, Serialize};

use super::screen::ScreenRegistry;

/// Pixel dimensions of the reference picture behind the stored transforms.
///
/// `0 × 0` means no picture has been used yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "snapshot_w", default)]
    pub width: u32,
    #[serde(rename = "snapshot_h", default)]
    pub height: u32,
}

impl Snapshot {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns `true` if the dimensions equal `width × height`.
    pub fn matches(&self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }
}

/// Complete durable state of one video wall's mapping.
///
/// Stored on the host as
/// `{"screens": [...], "snapshot_w": 1000, "snapshot_h": 750}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingConfig {
    #[serde(default)]
    pub screens: ScreenRegistry,
    #[serde(flatten)]
    snapshot: Snapshot,
}

impl MappingConfig {
    pub fn new(screens: ScreenRegistry, snapshot: Snapshot) -> Self {
        Self { screens, snapshot }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot
    }

    /// Records a new reference-picture resolution.
    ///
    /// Counts as a mutation for persistence purposes.
    pub fn set_snapshot(&mut self, snapshot: Snapshot) {
        self.snapshot = snapshot;
        self.screens.mark_dirty();
    }

    /// Revision of the whole unit; changes whenever anything must be saved.
    pub fn revision(&self) -> u64 {
        self.screens.revision()
    }
}
