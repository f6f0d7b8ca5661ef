//! MappingSession: the stateful front of the mapping engine.
//!
//! One session owns the [`MappingConfig`] for a single video wall and is the
//! only writer to it.  Every operator action and every detection result goes
//! through a method here, which:
//!
//! 1. applies the matching use case (reconcile, merge, reset),
//! 2. picks the new [`StatusMessage`],
//! 3. persists the config if its revision moved past the last saved one.
//!
//! # Detection pause (for beginners)
//!
//! After the operator resets the mapping, devices keep showing the previous
//! markers until the new (empty) setup is saved and pushed to them.  Merging
//! during that window would immediately re-learn stale transforms, so the
//! session refuses detections until [`MappingSession::acknowledge_save`] is
//! called.  The capture cycle checks [`MappingSession::detection_paused`]
//! before running the detector.

use tracing::{debug, error, info};
use wall_core::{Detection, Device, MappingConfig, ScreenProgress};

use super::merge_detection::{merge_detection, MergeResult};
use super::narrate_status::{narrate, StatusMessage};
use super::reconcile_assignment::{reconcile, AssignmentOutcome};

/// Trait abstracting where the mapping is persisted.
///
/// Implemented by [`crate::infrastructure::storage::mapping_store::JsonMappingStore`]
/// in production and by a mockall mock in tests.
#[cfg_attr(test, mockall::automock)]
pub trait MappingStore: Send {
    /// Writes the full mapping.  Returns a human-readable reason on failure.
    fn save(&mut self, config: &MappingConfig) -> Result<(), String>;
}

/// Stateful mapping engine for one wall.
pub struct MappingSession {
    config: MappingConfig,
    store: Box<dyn MappingStore>,
    saved_revision: u64,
    assignment: AssignmentOutcome,
    last_merge: Option<MergeResult>,
    status: StatusMessage,
    detection_paused: bool,
    assignment_unsaved: bool,
    saves_acknowledged: u64,
}

impl MappingSession {
    /// Creates a session around a config that was just loaded from `store`.
    pub fn new(config: MappingConfig, store: Box<dyn MappingStore>) -> Self {
        let assignment = if config.screens.is_empty() {
            AssignmentOutcome::NoScreens
        } else {
            AssignmentOutcome::Ready
        };
        let status = narrate(&config.screens, None, assignment);
        Self {
            saved_revision: config.revision(),
            config,
            store,
            assignment,
            last_merge: None,
            status,
            detection_paused: false,
            assignment_unsaved: false,
            saves_acknowledged: 0,
        }
    }

    /// Reconciles the registry with a fresh device-assignment snapshot.
    ///
    /// A change is reported until the next merge or save, whichever comes
    /// first.  [`MappingSession::assignment_unsaved`] stays set until the save.
    pub fn observe_assignment(&mut self, devices: &[Device]) -> AssignmentOutcome {
        let outcome = reconcile(&mut self.config.screens, devices);
        self.assignment = match outcome {
            AssignmentOutcome::Ready if self.assignment == AssignmentOutcome::Changed => {
                AssignmentOutcome::Changed
            }
            other => other,
        };
        match outcome {
            AssignmentOutcome::Changed => {
                self.assignment_unsaved = true;
                self.last_merge = None;
            }
            AssignmentOutcome::NoScreens => self.assignment_unsaved = false,
            AssignmentOutcome::Ready => {}
        }
        self.status = narrate(&self.config.screens, self.last_merge.as_ref(), self.assignment);
        self.persist_if_dirty();
        outcome
    }

    /// Folds one detection into the mapping.
    pub fn merge(&mut self, detection: &Detection) -> MergeResult {
        if self.assignment == AssignmentOutcome::Changed {
            self.assignment = AssignmentOutcome::Ready;
        }
        let result = merge_detection(&mut self.config, detection);
        self.last_merge = Some(result);
        self.status = narrate(&self.config.screens, Some(&result), self.assignment);
        self.persist_if_dirty();
        result
    }

    /// Clears every transform and pauses detection until the next save.
    pub fn reset_mapping(&mut self) {
        info!("mapping reset by operator; detection paused until save");
        self.config.screens.reset_all();
        self.last_merge = None;
        self.detection_paused = true;
        self.status = StatusMessage::MappingReset;
        self.persist_if_dirty();
    }

    /// Records that the host saved the setup and is pushing it to devices.
    pub fn acknowledge_save(&mut self) {
        if self.assignment == AssignmentOutcome::Changed {
            self.assignment = AssignmentOutcome::Ready;
        }
        self.assignment_unsaved = false;
        self.detection_paused = false;
        self.saves_acknowledged += 1;
        self.status = StatusMessage::DevicesUpdating {
            has_mapping: self.config.screens.count_configured() > 0,
        };
        debug!("save acknowledged; detection resumed");
    }

    pub fn capture_started(&mut self) {
        self.detection_paused = false;
        self.status = StatusMessage::CaptureStarted;
    }

    pub fn capture_stopped(&mut self) {
        self.status = StatusMessage::CaptureStopped;
    }

    pub fn capture_failed(&mut self, reason: impl Into<String>) {
        self.status = StatusMessage::CaptureUnavailable {
            reason: reason.into(),
        };
    }

    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    pub fn status(&self) -> &StatusMessage {
        &self.status
    }

    pub fn assignment(&self) -> AssignmentOutcome {
        self.assignment
    }

    pub fn last_merge(&self) -> Option<&MergeResult> {
        self.last_merge.as_ref()
    }

    pub fn detection_paused(&self) -> bool {
        self.detection_paused
    }

    /// Number of [`MappingSession::acknowledge_save`] calls so far.
    pub fn saves_acknowledged(&self) -> u64 {
        self.saves_acknowledged
    }

    /// True from an assignment change until the host saves the new setup.
    pub fn assignment_unsaved(&self) -> bool {
        self.assignment_unsaved
    }

    /// Mapping progress of every screen, in registry order.
    pub fn progress(&self) -> Vec<(String, ScreenProgress)> {
        self.config
            .screens
            .iter()
            .map(|s| (s.serial.clone(), s.progress()))
            .collect()
    }

    /// Saves the config when it changed since the last successful save.
    ///
    /// A failed save leaves `saved_revision` behind, so the next mutation
    /// retries.
    fn persist_if_dirty(&mut self) {
        let revision = self.config.revision();
        if revision == self.saved_revision {
            return;
        }
        match self.store.save(&self.config) {
            Ok(()) => {
                debug!("mapping saved at revision {revision}");
                self.saved_revision = revision;
            }
            Err(e) => error!("failed to save mapping: {e}"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
