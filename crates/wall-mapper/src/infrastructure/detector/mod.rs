//! Marker detector boundary.
//!
//! The detector is an external, synchronous routine: given an RGBA buffer and
//! its dimensions it returns every marker it found, each with an identifier,
//! four corners and a homography.  The mapper never looks inside it and does
//! not validate its output beyond bounds-checking marker identifiers.
//!
//! [`recorded::RecordedDetector`] replays detector output captured earlier as
//! JSON, which is how the command-line front end and the integration tests
//! drive the engine.

use std::path::PathBuf;

use thiserror::Error;
use wall_core::DetectedMarker;

pub mod recorded;

/// Error type for detector invocations and recordings.
#[derive(Debug, Error)]
pub enum DetectorError {
    /// The detector could not run at all.
    #[error("marker detector unavailable: {0}")]
    Unavailable(String),

    /// The frame handed to a recorded detector does not match the recording.
    #[error("frame is {actual_width}x{actual_height} but the recording expects {expected_width}x{expected_height}")]
    DimensionMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("I/O error reading detection recording {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed detection recording {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Trait abstracting the external marker detector.
#[cfg_attr(test, mockall::automock)]
pub trait MarkerDetector: Send {
    /// Detects markers in a row-major RGBA buffer of `width * height * 4` bytes.
    fn detect(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<DetectedMarker>, DetectorError>;
}
