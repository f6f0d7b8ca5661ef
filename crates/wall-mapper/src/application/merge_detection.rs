//! MergeDetectionUseCase: folds one detector result into the stored mapping.
//!
//! # Algorithm
//!
//! 1. Run the [resolution guard](super::resolution_guard); a new resolution
//!    clears every slot first.
//! 2. Decode every marker, in detection order, into a screen position and
//!    output slot.  Markers addressing no screen of this wall are skipped.
//! 3. Write the decoded transforms, again in detection order, so when two
//!    markers hit the same slot the later one wins.
//! 4. Report how many slots became populated.
//!
//! Decoding finishes before the first write, and the whole merge runs under a
//! single `&mut` borrow, so no caller can observe a half-applied detection.
//!
//! `added_count` is the change in populated slots.  Overwriting a slot that
//! was already set does not count as added.

use tracing::{debug, info, warn};
use wall_core::{decode, Detection, MappingConfig, Slot, Transform};

use super::resolution_guard;

/// Summary of one merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeResult {
    /// Slots that went from empty to populated.
    pub added_count: usize,
    /// Whether the detection's resolution reset the mapping first.
    pub resolution_changed: bool,
    /// Markers in the detection, including ignored ones.
    pub marker_count: usize,
    /// Markers that addressed no screen of this wall.
    pub ignored_count: usize,
}

/// Merges `detection` into `config`.
pub fn merge_detection(config: &mut MappingConfig, detection: &Detection) -> MergeResult {
    let resolution_changed =
        resolution_guard::check_and_apply(config, detection.width, detection.height);
    let before = config.screens.count_configured();

    let writes: Vec<(String, Slot, Transform)> = detection
        .markers
        .iter()
        .filter_map(|marker| {
            let address = decode(marker.id);
            let serial = address
                .index_within(config.screens.len())
                .and_then(|i| config.screens.serial_at(i));
            match serial {
                Some(serial) => {
                    debug!("marker {} -> screen {serial} {}", marker.id, address.slot);
                    Some((serial.to_string(), address.slot, marker.transform))
                }
                None => {
                    debug!(
                        "marker {} addresses screen index {} outside {} screen(s); ignored",
                        marker.id,
                        address.screen_index,
                        config.screens.len()
                    );
                    None
                }
            }
        })
        .collect();

    let ignored_count = detection.markers.len() - writes.len();
    for (serial, slot, transform) in writes {
        if let Err(e) = config.screens.set_transform(&serial, slot, transform) {
            // Serials come from the registry itself, so this cannot happen.
            warn!("dropping decoded marker write: {e}");
        }
    }

    let added_count = config.screens.count_configured().saturating_sub(before);
    info!(
        "merged detection {}x{}: {} marker(s), {added_count} new slot(s), {ignored_count} ignored{}",
        detection.width,
        detection.height,
        detection.markers.len(),
        if resolution_changed { ", resolution reset" } else { "" }
    );

    MergeResult {
        added_count,
        resolution_changed,
        marker_count: detection.markers.len(),
        ignored_count,
    }
}
