//! Replays detector output recorded as JSON.
//!
//! A recording is one [`Detection`] per file:
//!
//! ```json
//! {
//!   "width": 1000,
//!   "height": 750,
//!   "markers": [
//!     {
//!       "id": 1,
//!       "corners": [{"x": 10, "y": 10}, {"x": 90, "y": 10}, {"x": 90, "y": 90}, {"x": 10, "y": 90}],
//!       "transform": [1, 0, 0, 0, 1, 0, 0, 0, 1]
//!     }
//!   ]
//! }
//! ```
//!
//! A directory of recordings replays in file-name order.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use tracing::debug;
use wall_core::{DetectedMarker, Detection};

use super::{DetectorError, MarkerDetector};

/// Reads a single recorded detection.
///
/// # Errors
///
/// Returns [`DetectorError::Io`] if the file cannot be read and
/// [`DetectorError::Parse`] if it is not a valid detection document.
pub fn load_detection(path: &Path) -> Result<Detection, DetectorError> {
    let content = std::fs::read_to_string(path).map_err(|source| DetectorError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| DetectorError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// A [`MarkerDetector`] that returns recorded detections one call at a time.
pub struct RecordedDetector {
    pending: VecDeque<Detection>,
}

impl RecordedDetector {
    pub fn new(detections: impl IntoIterator<Item = Detection>) -> Self {
        Self {
            pending: detections.into_iter().collect(),
        }
    }

    /// Loads every `*.json` file in `dir`, sorted by file name.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::Io`] if the directory cannot be listed, or the
    /// error of the first recording that fails to load.
    pub fn from_dir(dir: &Path) -> Result<Self, DetectorError> {
        let io_err = |source| DetectorError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(io_err)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();
        debug!("loading {} recorded detection(s) from {}", paths.len(), dir.display());

        let detections = paths
            .iter()
            .map(|p| load_detection(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(detections))
    }

    /// Frame sizes a source must produce to replay this recording.
    pub fn frame_dimensions(&self) -> Vec<(u32, u32)> {
        self.pending.iter().map(|d| (d.width, d.height)).collect()
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl MarkerDetector for RecordedDetector {
    fn detect(
        &mut self,
        _pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<DetectedMarker>, DetectorError> {
        let next = self
            .pending
            .pop_front()
            .ok_or_else(|| DetectorError::Unavailable("recording exhausted".to_string()))?;
        if next.width != width || next.height != height {
            return Err(DetectorError::DimensionMismatch {
                expected_width: next.width,
                expected_height: next.height,
                actual_width: width,
                actual_height: height,
            });
        }
        Ok(next.markers)
    }
}
