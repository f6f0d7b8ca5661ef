//! Status narrator: the "next step" message shown to the operator.
//!
//! [`narrate`] is a fixed decision table over the registry, the most recent
//! merge, and the assignment outcome.  The first matching row wins:
//!
//! | # | condition                                    | message                     |
//! |---|----------------------------------------------|-----------------------------|
//! | 1 | assignment just changed                      | [`StatusMessage::AssignmentChanged`] |
//! | 2 | no screens assigned                          | [`StatusMessage::NoScreensAssigned`] |
//! | 3 | no merge yet, nothing mapped                 | [`StatusMessage::NoMappingYet`] |
//! | 4 | merge reset resolution, no markers           | [`StatusMessage::ResolutionResetNoMarkers`] |
//! | 5 | merge reset resolution, slots added          | [`StatusMessage::ResolutionResetMapped`] |
//! | 6 | merge found no markers                       | [`StatusMessage::NoMarkersDetected`] |
//! | 7 | merge added nothing                          | [`StatusMessage::NoNewSlots`] |
//! | 8 | merge added slots                            | [`StatusMessage::SlotsMapped`] |
//! | 9 | otherwise                                    | [`StatusMessage::Summary`] |
//!
//! The remaining variants are not derived from state; the mapping session
//! sets them in response to operator actions (reset, save, capture start and
//! stop).

use std::fmt;

use wall_core::ScreenRegistry;

use super::merge_detection::MergeResult;
use super::reconcile_assignment::AssignmentOutcome;

/// Operator-facing status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    AssignmentChanged,
    NoScreensAssigned,
    NoMappingYet,
    ResolutionResetNoMarkers,
    ResolutionResetMapped { added: usize },
    NoMarkersDetected,
    NoNewSlots { detected: usize },
    SlotsMapped { added: usize },
    Summary { configured: usize, capacity: usize },
    /// The operator cleared all mappings; detection waits for a save.
    MappingReset,
    /// Saved configuration is being pushed to the devices.
    DevicesUpdating { has_mapping: bool },
    CaptureStarted,
    CaptureStopped,
    /// Camera or detector failed; nothing was mapped.
    CaptureUnavailable { reason: String },
}

/// Picks the status for the current state.
pub fn narrate(
    registry: &ScreenRegistry,
    last_merge: Option<&MergeResult>,
    assignment: AssignmentOutcome,
) -> StatusMessage {
    match assignment {
        AssignmentOutcome::Changed => return StatusMessage::AssignmentChanged,
        AssignmentOutcome::NoScreens => return StatusMessage::NoScreensAssigned,
        AssignmentOutcome::Ready => {}
    }
    if registry.is_empty() {
        return StatusMessage::NoScreensAssigned;
    }

    let Some(merge) = last_merge else {
        return if registry.count_configured() == 0 {
            StatusMessage::NoMappingYet
        } else {
            summary(registry)
        };
    };

    match merge {
        MergeResult {
            resolution_changed: true,
            marker_count: 0,
            ..
        } => StatusMessage::ResolutionResetNoMarkers,
        MergeResult {
            resolution_changed: true,
            added_count: added @ 1..,
            ..
        } => StatusMessage::ResolutionResetMapped { added: *added },
        MergeResult { marker_count: 0, .. } => StatusMessage::NoMarkersDetected,
        MergeResult {
            added_count: 0,
            marker_count,
            ..
        } => StatusMessage::NoNewSlots {
            detected: *marker_count,
        },
        MergeResult { added_count, .. } => StatusMessage::SlotsMapped {
            added: *added_count,
        },
    }
}

fn summary(registry: &ScreenRegistry) -> StatusMessage {
    StatusMessage::Summary {
        configured: registry.count_configured(),
        capacity: registry.slot_capacity(),
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusMessage::AssignmentChanged => write!(
                f,
                "Assigned devices have changed. Save the setup to start mapping them."
            ),
            StatusMessage::NoScreensAssigned => write!(
                f,
                "No screens yet. Assign one or more devices to this setup, then return here."
            ),
            StatusMessage::NoMappingYet => write!(
                f,
                "No mapping yet. Capture a mapping picture or start webcam mapping to configure your video wall."
            ),
            StatusMessage::ResolutionResetNoMarkers => write!(
                f,
                "Mapping picture resolution changed and the mapping was reset, but no markers were found. Try another picture."
            ),
            StatusMessage::ResolutionResetMapped { added } => write!(
                f,
                "Mapping picture resolution changed and the mapping was reset. {added} display(s) mapped; continue mapping or save the setup."
            ),
            StatusMessage::NoMarkersDetected => {
                write!(f, "No markers detected. Capture another mapping picture to try again.")
            }
            StatusMessage::NoNewSlots { detected } => write!(
                f,
                "No new displays among {detected} detected marker(s). Capture another mapping picture to try again."
            ),
            StatusMessage::SlotsMapped { added } => write!(
                f,
                "{added} new display(s) mapped. Continue mapping or save the setup to apply the changes."
            ),
            StatusMessage::Summary {
                configured,
                capacity,
            } if configured >= capacity => write!(
                f,
                "All {capacity} displays mapped. Capture another picture to refine, or save the setup."
            ),
            StatusMessage::Summary {
                configured,
                capacity,
            } => write!(
                f,
                "{configured} of {capacity} displays mapped. Capture another mapping picture or start webcam mapping to continue."
            ),
            StatusMessage::MappingReset => write!(
                f,
                "Mapping has been reset. Save this setup to show mapping markers on all displays."
            ),
            StatusMessage::DevicesUpdating { has_mapping: false } => write!(
                f,
                "Devices are updating now and will show mapping markers. Capture a mapping picture or start webcam mapping."
            ),
            StatusMessage::DevicesUpdating { has_mapping: true } => write!(
                f,
                "Devices are updating now. If there are still unmapped displays, continue mapping."
            ),
            StatusMessage::CaptureStarted => {
                write!(f, "Webcam mapping started. Point the camera at your displays.")
            }
            StatusMessage::CaptureStopped => write!(
                f,
                "Webcam mapping stopped. Save to apply any changes or continue mapping."
            ),
            StatusMessage::CaptureUnavailable { reason } => {
                write!(f, "Cannot access the camera or detector: {reason}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wall_core::{Slot, Transform};

    fn registry(mapped: usize) -> ScreenRegistry {
        let mut registry = ScreenRegistry::from_serials(["A", "B"]);
        if mapped > 0 {
            registry
                .set_transform("A", Slot::Primary, Transform::Matrix([1.0; 9]))
                .unwrap();
        }
        registry
    }

    fn merge(added: usize, markers: usize, resolution_changed: bool) -> MergeResult {
        MergeResult {
            added_count: added,
            resolution_changed,
            marker_count: markers,
            ignored_count: 0,
        }
    }

    #[test]
    fn test_narrate_assignment_change_takes_precedence_over_merge() {
        let status = narrate(
            &registry(1),
            Some(&merge(1, 1, false)),
            AssignmentOutcome::Changed,
        );
        assert_eq!(status, StatusMessage::AssignmentChanged);
    }

    #[test]
    fn test_narrate_no_screens() {
        let status = narrate(&ScreenRegistry::new(), None, AssignmentOutcome::NoScreens);
        assert_eq!(status, StatusMessage::NoScreensAssigned);
    }

    #[test]
    fn test_narrate_no_merge_and_nothing_mapped() {
        let status = narrate(&registry(0), None, AssignmentOutcome::Ready);
        assert_eq!(status, StatusMessage::NoMappingYet);
    }

    #[test]
    fn test_narrate_resolution_reset_without_markers() {
        let status = narrate(&registry(0), Some(&merge(0, 0, true)), AssignmentOutcome::Ready);
        assert_eq!(status, StatusMessage::ResolutionResetNoMarkers);
    }

    #[test]
    fn test_narrate_resolution_reset_with_new_slots() {
        let status = narrate(&registry(1), Some(&merge(1, 1, true)), AssignmentOutcome::Ready);
        assert_eq!(status, StatusMessage::ResolutionResetMapped { added: 1 });
    }

    #[test]
    fn test_narrate_resolution_reset_with_only_stray_markers_reports_no_new_slots() {
        let status = narrate(&registry(0), Some(&merge(0, 3, true)), AssignmentOutcome::Ready);
        assert_eq!(status, StatusMessage::NoNewSlots { detected: 3 });
    }

    #[test]
    fn test_narrate_no_markers_detected() {
        let status = narrate(&registry(1), Some(&merge(0, 0, false)), AssignmentOutcome::Ready);
        assert_eq!(status, StatusMessage::NoMarkersDetected);
    }

    #[test]
    fn test_narrate_no_new_slots_among_detected_markers() {
        let status = narrate(&registry(1), Some(&merge(0, 4, false)), AssignmentOutcome::Ready);
        assert_eq!(status, StatusMessage::NoNewSlots { detected: 4 });
    }

    #[test]
    fn test_narrate_new_slots_mapped() {
        let status = narrate(&registry(1), Some(&merge(1, 2, false)), AssignmentOutcome::Ready);
        assert_eq!(status, StatusMessage::SlotsMapped { added: 1 });
    }

    #[test]
    fn test_narrate_steady_state_summarises_progress() {
        let status = narrate(&registry(1), None, AssignmentOutcome::Ready);
        assert_eq!(
            status,
            StatusMessage::Summary {
                configured: 1,
                capacity: 4
            }
        );
    }

    #[test]
    fn test_summary_wording_distinguishes_complete_wall() {
        let partial = StatusMessage::Summary { configured: 1, capacity: 4 }.to_string();
        let complete = StatusMessage::Summary { configured: 4, capacity: 4 }.to_string();
        assert!(partial.starts_with("1 of 4"));
        assert!(complete.starts_with("All 4"));
    }
}
