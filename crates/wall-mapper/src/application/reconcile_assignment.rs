//! ReconcileAssignmentUseCase: keeps the screen registry in sync with the
//! devices assigned to the wall.
//!
//! The host reports every device together with an `assigned` flag, in no
//! particular order.  The registry must hold exactly one screen per assigned
//! device, sorted by serial, because marker identifiers address screens by
//! their position in that order.
//!
//! # Why a full reset? (for beginners)
//!
//! When the assigned set changes, existing homographies cannot be carried
//! over safely: a marker id addresses a *position*, so inserting one device in
//! the middle shifts every screen after it.  Rather than guess which old
//! transform belongs to which serial, any positional difference rebuilds the
//! registry with every slot empty and the operator maps the wall again.
//!
//! The stored snapshot resolution is left alone; the next detection with a
//! different resolution triggers its own reset.

use tracing::{debug, info, warn};
use wall_core::{serial_cmp, Device, ScreenRegistry};

/// What reconciliation found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOutcome {
    /// The assigned set differs from the registry, which has been rebuilt.
    Changed,
    /// No device is assigned to the wall.
    NoScreens,
    /// The registry already matched; existing transforms are kept.
    Ready,
}

/// Returns the serials of assigned devices in registry order.
///
/// Serials reported more than once are kept once.
pub fn assigned_serials(devices: &[Device]) -> Vec<String> {
    let mut serials: Vec<String> = devices
        .iter()
        .filter(|d| d.assigned)
        .map(|d| d.serial.clone())
        .collect();
    serials.sort_by(|a, b| serial_cmp(a, b));

    let before = serials.len();
    serials.dedup();
    if serials.len() != before {
        warn!(
            "assignment snapshot lists {} duplicate serial(s); keeping one of each",
            before - serials.len()
        );
    }
    serials
}

/// Brings `registry` in line with the assigned devices.
///
/// The comparison is positional: same length and the same serial at every
/// index.  Anything else replaces the registry with unmapped screens.
pub fn reconcile(registry: &mut ScreenRegistry, devices: &[Device]) -> AssignmentOutcome {
    let target = assigned_serials(devices);

    let unchanged = registry.len() == target.len()
        && registry.serials().zip(&target).all(|(have, want)| have == want);

    let no_screens = target.is_empty();
    if unchanged {
        debug!("assignment unchanged: {} screen(s)", target.len());
    } else {
        info!(
            "assignment changed: {} -> {} screen(s); resetting all mappings",
            registry.len(),
            target.len()
        );
        registry.rebuild(target);
    }

    if no_screens {
        AssignmentOutcome::NoScreens
    } else if unchanged {
        AssignmentOutcome::Ready
    } else {
        AssignmentOutcome::Changed
    }
}
