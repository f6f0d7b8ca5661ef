//! Screen registry domain entity.
//!
//! A video wall is a set of physical devices, each driving up to two displays
//! (the primary and secondary HDMI outputs).  For every display we store a
//! [`Transform`]: the 3×3 homography that maps coordinates in the shared
//! reference picture onto that display's output.
//!
//! The [`ScreenRegistry`] is the ordered list of [`Screen`] records, one per
//! assigned device, sorted by serial.  The order matters to exactly one
//! consumer: the marker decoder, whose screen index is a position into this
//! list (see [`crate::domain::marker::decode`]).  Everything else addresses
//! screens by serial.
//!
//! # Dirty tracking
//!
//! Every mutation bumps [`ScreenRegistry::revision`].  The owner of the
//! registry compares the revision with the last one it persisted and writes
//! the configuration out whenever they differ.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of coefficients in a 3×3 homography, stored row-major.
pub const TRANSFORM_COEFFICIENTS: usize = 9;

/// Errors raised by registry mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScreenError {
    /// A screen with this serial already exists in the registry.
    #[error("duplicate screen serial: {0}")]
    DuplicateSerial(String),

    /// No screen with this serial exists in the registry.
    #[error("unknown screen serial: {0}")]
    UnknownSerial(String),
}

/// Errors raised when building a [`Transform`] from raw coefficients.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    /// A transform is either empty or exactly nine coefficients.
    #[error("homography must have 0 or 9 coefficients, got {0}")]
    InvalidLength(usize),
}

/// One of the two display outputs of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// First output (HDMI0).
    Primary,
    /// Second output (HDMI1).
    Secondary,
}

impl Slot {
    /// Zero-based output number, as printed on the device (`HDMI0`, `HDMI1`).
    pub fn output_index(self) -> u8 {
        match self {
            Slot::Primary => 0,
            Slot::Secondary => 1,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HDMI{}", self.output_index())
    }
}

/// A display mapping: either not yet known, or a row-major 3×3 homography.
///
/// Serialised as a flat JSON array: `[]` for [`Transform::Empty`] and nine
/// numbers for [`Transform::Matrix`].  This is the format the device side
/// reads, so it must not change.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub enum Transform {
    /// No mapping recorded for this slot.
    #[default]
    Empty,
    /// Row-major homography coefficients.
    Matrix([f64; TRANSFORM_COEFFICIENTS]),
}

impl Transform {
    /// Returns `true` if a homography is stored.
    pub fn is_set(&self) -> bool {
        matches!(self, Transform::Matrix(_))
    }
}

impl TryFrom<Vec<f64>> for Transform {
    type Error = TransformError;

    fn try_from(coefficients: Vec<f64>) -> Result<Self, Self::Error> {
        if coefficients.is_empty() {
            return Ok(Transform::Empty);
        }
        let matrix: [f64; TRANSFORM_COEFFICIENTS] = coefficients
            .as_slice()
            .try_into()
            .map_err(|_| TransformError::InvalidLength(coefficients.len()))?;
        Ok(Transform::Matrix(matrix))
    }
}

impl From<Transform> for Vec<f64> {
    fn from(transform: Transform) -> Self {
        match transform {
            Transform::Empty => Vec::new(),
            Transform::Matrix(m) => m.to_vec(),
        }
    }
}

/// How much of a single screen has been mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenProgress {
    NotMapped,
    OneDisplay,
    BothDisplays,
}

impl fmt::Display for ScreenProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ScreenProgress::NotMapped => "Not mapped yet",
            ScreenProgress::OneDisplay => "One display mapped",
            ScreenProgress::BothDisplays => "Both displays mapped",
        };
        f.write_str(text)
    }
}

/// A device assignment as reported by the device-management host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub serial: String,
    #[serde(default)]
    pub assigned: bool,
}

/// Mapping record for one assigned device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    /// Device serial; the identity of the screen.
    pub serial: String,
    /// Homography for the first output.
    #[serde(rename = "homography", default)]
    pub primary: Transform,
    /// Homography for the second output.
    ///
    /// Records written before dual-output support lack this field and load
    /// with an empty slot.
    #[serde(rename = "homography_secondary", default)]
    pub secondary: Transform,
}

impl Screen {
    /// Creates an unmapped screen.
    pub fn new(serial: impl Into<String>) -> Self {
        Self {
            serial: serial.into(),
            primary: Transform::Empty,
            secondary: Transform::Empty,
        }
    }

    pub fn transform(&self, slot: Slot) -> &Transform {
        match slot {
            Slot::Primary => &self.primary,
            Slot::Secondary => &self.secondary,
        }
    }

    fn transform_mut(&mut self, slot: Slot) -> &mut Transform {
        match slot {
            Slot::Primary => &mut self.primary,
            Slot::Secondary => &mut self.secondary,
        }
    }

    /// Number of slots holding a homography (0, 1 or 2).
    pub fn configured_slots(&self) -> usize {
        usize::from(self.primary.is_set()) + usize::from(self.secondary.is_set())
    }

    pub fn progress(&self) -> ScreenProgress {
        match self.configured_slots() {
            0 => ScreenProgress::NotMapped,
            1 => ScreenProgress::OneDisplay,
            _ => ScreenProgress::BothDisplays,
        }
    }

    fn clear(&mut self) {
        self.primary = Transform::Empty;
        self.secondary = Transform::Empty;
    }
}

/// Orders device serials the way the operator sees them listed.
///
/// Case is folded first so `a-2` sorts next to `A-1`; ties fall back to the
/// raw string so the order stays total and deterministic.
pub fn serial_cmp(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b))
}

/// Ordered collection of screens, one per assigned device.
///
/// Serialises as a plain array of [`Screen`] records; the revision counter is
/// runtime-only.  Loading an array that repeats a serial fails.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Screen>", into = "Vec<Screen>")]
pub struct ScreenRegistry {
    screens: Vec<Screen>,
    revision: u64,
}

impl ScreenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry of unmapped screens in the given order.
    pub fn from_serials<I, S>(serials: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            screens: serials.into_iter().map(Screen::new).collect(),
            revision: 0,
        }
    }

    /// Appends an unmapped screen.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenError::DuplicateSerial`] if the serial is already present.
    pub fn add_screen(&mut self, serial: impl Into<String>) -> Result<(), ScreenError> {
        let serial = serial.into();
        if self.get(&serial).is_some() {
            return Err(ScreenError::DuplicateSerial(serial));
        }
        self.screens.push(Screen::new(serial));
        self.mark_dirty();
        Ok(())
    }

    /// Clears both slots of one screen.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenError::UnknownSerial`] if no such screen exists.
    pub fn reset_screen(&mut self, serial: &str) -> Result<(), ScreenError> {
        self.get_mut(serial)?.clear();
        self.mark_dirty();
        Ok(())
    }

    /// Clears every slot of every screen.
    pub fn reset_all(&mut self) {
        self.screens.iter_mut().for_each(Screen::clear);
        self.mark_dirty();
    }

    /// Replaces all screens with unmapped ones built from `serials`.
    ///
    /// Unlike assigning a fresh [`ScreenRegistry::from_serials`], the revision
    /// keeps counting so the pending write is not lost.
    pub fn rebuild<I, S>(&mut self, serials: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.screens = serials.into_iter().map(Screen::new).collect();
        self.mark_dirty();
    }

    /// Overwrites one slot of one screen.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenError::UnknownSerial`] if no such screen exists.
    pub fn set_transform(
        &mut self,
        serial: &str,
        slot: Slot,
        transform: Transform,
    ) -> Result<(), ScreenError> {
        *self.get_mut(serial)?.transform_mut(slot) = transform;
        self.mark_dirty();
        Ok(())
    }

    /// Total number of populated slots across all screens.
    pub fn count_configured(&self) -> usize {
        self.screens.iter().map(Screen::configured_slots).sum()
    }

    /// Number of slots the wall has in total (two per screen).
    pub fn slot_capacity(&self) -> usize {
        self.screens.len() * 2
    }

    /// Serial of the screen at `index` in registry order.
    pub fn serial_at(&self, index: usize) -> Option<&str> {
        self.screens.get(index).map(|s| s.serial.as_str())
    }

    pub fn get(&self, serial: &str) -> Option<&Screen> {
        self.screens.iter().find(|s| s.serial == serial)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Screen> {
        self.screens.iter()
    }

    pub fn serials(&self) -> impl Iterator<Item = &str> {
        self.screens.iter().map(|s| s.serial.as_str())
    }

    pub fn len(&self) -> usize {
        self.screens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    /// Monotonic mutation counter; see the module docs.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Records a mutation that must reach persistent storage.
    pub fn mark_dirty(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn get_mut(&mut self, serial: &str) -> Result<&mut Screen, ScreenError> {
        self.screens
            .iter_mut()
            .find(|s| s.serial == serial)
            .ok_or_else(|| ScreenError::UnknownSerial(serial.to_string()))
    }
}

impl PartialEq for ScreenRegistry {
    fn eq(&self, other: &Self) -> bool {
        self.screens == other.screens
    }
}

impl TryFrom<Vec<Screen>> for ScreenRegistry {
    type Error = ScreenError;

    fn try_from(screens: Vec<Screen>) -> Result<Self, Self::Error> {
        for (i, screen) in screens.iter().enumerate() {
            if screens[..i].iter().any(|s| s.serial == screen.serial) {
                return Err(ScreenError::DuplicateSerial(screen.serial.clone()));
            }
        }
        Ok(Self { screens, revision: 0 })
    }
}

impl From<ScreenRegistry> for Vec<Screen> {
    fn from(registry: ScreenRegistry) -> Self {
        registry.screens
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
