//! # wall-core
//!
//! Shared domain library for the video wall mapper.
//!
//! A video wall is a set of devices driven as one composite surface.  To
//! configure it, every display shows a fiducial marker, an operator captures a
//! picture of the whole wall, and an external detector recovers one homography
//! per marker.  This crate defines the entities that result:
//!
//! - **`domain::screen`** – The [`ScreenRegistry`]: one [`Screen`] per
//!   assigned device, each with a primary and a secondary [`Transform`].
//!
//! - **`domain::mapping`** – The persisted [`MappingConfig`] and the
//!   [`Snapshot`] resolution every stored transform shares.
//!
//! - **`domain::marker`** – Detector output and [`decode`], the identifier
//!   convention that maps a marker to a screen position and output slot.
//!
//! It has zero dependencies on cameras, files, or the detector.

pub mod domain;

// Re-export the most-used types at the crate root so callers can write
// `wall_core::ScreenRegistry` instead of `wall_core::domain::screen::ScreenRegistry`.
pub use domain::mapping::{MappingConfig, Snapshot};
pub use domain::marker::{
    annotate, decode, DetectedMarker, Detection, MarkerAddress, MarkerAnnotation, Point,
};
pub use domain::screen::{
    serial_cmp, Device, Screen, ScreenError, ScreenProgress, ScreenRegistry, Slot, Transform,
    TransformError,
};
