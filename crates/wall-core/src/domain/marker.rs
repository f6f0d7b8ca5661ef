//! Fiducial markers and the identifier convention that addresses screens.
//!
//! Every display of the wall shows a marker whose identifier encodes which
//! screen and which output it belongs to.  The detector itself is external;
//! this module only defines what it hands back ([`DetectedMarker`],
//! [`Detection`]) and how an identifier is turned into an address.
//!
//! # Identifier convention
//!
//! Identifiers run from 1 to 255 and are split into two shifted ranges of 128:
//!
//! ```text
//! id        screen_index         slot
//! 1..=127   id - 1               Primary
//! 129..=255 (id % 128) - 1       Secondary
//! ```
//!
//! Id 128 decodes to index -1 and never addresses a screen.  The screen index
//! is a position in the registry order at detection time, not a stable key.
//! The convention is shared with the marker-printing side and must not change.

use serde::{Deserialize, Serialize};

use super::screen::{ScreenRegistry, Slot, Transform};

/// Identifiers above this value address the secondary output.
const SECONDARY_ID_OFFSET: u32 = 128;

/// A point in reference-picture pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One marker found by the detector in a single frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedMarker {
    /// Encoded identifier in `1..=255`.
    pub id: u32,
    /// Marker corners in picture coordinates, in detector order.
    pub corners: [Point; 4],
    /// Homography from picture coordinates to the marker's display.
    pub transform: Transform,
}

impl DetectedMarker {
    /// Mean of the four corners.
    pub fn center(&self) -> Point {
        let (sx, sy) = self
            .corners
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point::new(sx / 4.0, sy / 4.0)
    }
}

/// Output of one detector run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Detection {
    /// Width of the analysed picture in pixels.
    pub width: u32,
    /// Height of the analysed picture in pixels.
    pub height: u32,
    #[serde(default)]
    pub markers: Vec<DetectedMarker>,
}

/// Screen position and output slot encoded in a marker identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerAddress {
    /// Position in registry order; may be negative or past the end.
    pub screen_index: i64,
    pub slot: Slot,
}

impl MarkerAddress {
    /// Returns the index if it addresses one of `len` screens.
    pub fn index_within(&self, len: usize) -> Option<usize> {
        usize::try_from(self.screen_index).ok().filter(|&i| i < len)
    }
}

/// Decodes a marker identifier into a screen index and output slot.
///
/// # Example
///
/// ```
/// use wall_core::domain::marker::decode;
/// use wall_core::domain::screen::Slot;
///
/// let address = decode(130);
/// assert_eq!(address.screen_index, 1);
/// assert_eq!(address.slot, Slot::Secondary);
/// ```
pub fn decode(marker_id: u32) -> MarkerAddress {
    let slot = if marker_id > SECONDARY_ID_OFFSET {
        Slot::Secondary
    } else {
        Slot::Primary
    };
    MarkerAddress {
        screen_index: i64::from(marker_id % SECONDARY_ID_OFFSET) - 1,
        slot,
    }
}

/// What a detected marker refers to, for preview overlays and logs.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerAnnotation {
    pub id: u32,
    pub center: Point,
    pub slot: Slot,
    /// Serial of the addressed screen, or `None` for a marker that belongs to
    /// no screen of this wall.
    pub serial: Option<String>,
}

/// Resolves `marker` against the current registry order.
pub fn annotate(registry: &ScreenRegistry, marker: &DetectedMarker) -> MarkerAnnotation {
    let address = decode(marker.id);
    let serial = address
        .index_within(registry.len())
        .and_then(|i| registry.serial_at(i))
        .map(str::to_string);
    MarkerAnnotation {
        id: marker.id,
        center: marker.center(),
        slot: address.slot,
        serial,
    }
}
