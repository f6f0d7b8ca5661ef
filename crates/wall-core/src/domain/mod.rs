//! Domain entities for video wall mapping.
//!
//! This module contains pure business logic with no infrastructure
//! dependencies: no file system, no camera, no detector.  Everything here can
//! be compiled and tested on any platform without external setup.
//!
//! Code in outer layers (the mapper's application use cases, storage, capture)
//! depends on the domain, but the domain never depends on them.

/// Screens, display slots and homographies.
///
/// See [`screen::ScreenRegistry`] for the main type.
pub mod screen;

/// The persisted mapping unit and reference-picture resolution.
pub mod mapping;

/// Detector output and the marker identifier convention.
pub mod marker;
