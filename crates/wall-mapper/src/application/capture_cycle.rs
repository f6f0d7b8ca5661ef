//! CaptureCycleUseCase: the periodic capture → detect → merge loop.
//!
//! # Flow
//!
//! ```text
//! start source ─► initial delay ─► ┌─► grab frame
//!                                  │     │ paused? ── yes ─► skip detection
//!                                  │     ▼
//!                                  │   detect markers (session unlocked)
//!                                  │     │ stopped or paused meanwhile? ── yes ─► discard
//!                                  │     ▼
//!                                  │   annotate + merge into the session
//!                                  └── sleep interval (or resume delay after a save)
//! ```
//!
//! Only one cycle is ever in flight: the loop awaits each step before the
//! next, so two merges can never interleave.  The [`MappingSession`] is shared
//! behind a `tokio::sync::Mutex` so operator actions (reset, save) can reach
//! it between cycles.  The lock is released while the detector runs.
//!
//! [`MarkerDetector::detect`] is synchronous and runs on the calling task, so
//! a slow detector holds up that runtime worker for the length of the call.
//!
//! A detector failure is reported and the loop carries on with the next
//! frame.  A capture failure ends the loop.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use wall_core::{annotate, DetectedMarker, Detection};

use super::mapping_session::MappingSession;
use super::merge_detection::MergeResult;
use crate::infrastructure::capture::{CaptureError, Frame, FrameSource};
use crate::infrastructure::detector::{DetectorError, MarkerDetector};

/// Result of a single cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The detection was merged into the session.
    Merged(MergeResult),
    /// Detection is paused; the frame was dropped.
    Paused,
    /// The cycle was stopped before its result could be applied.
    Cancelled,
}

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("capture failed: {0}")]
    Capture(#[from] CaptureError),
    #[error("detection failed: {0}")]
    Detect(#[from] DetectorError),
}

/// Cloneable handle that stops a running [`CaptureCycle`].
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Timing of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSettings {
    pub initial_delay: Duration,
    pub interval: Duration,
    /// Wait after each save acknowledgement while devices pick up the setup.
    pub resume_delay: Duration,
}

/// Tracks which save acknowledgements the loop has already waited out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SaveWatch {
    seen: u64,
}

impl SaveWatch {
    fn new(session: &MappingSession) -> Self {
        Self {
            seen: session.saves_acknowledged(),
        }
    }

    /// True once per save acknowledged since the last call.
    fn saw_new_save(&mut self, session: &MappingSession) -> bool {
        let current = session.saves_acknowledged();
        let fresh = current != self.seen;
        self.seen = current;
        fresh
    }
}

/// Drives a frame source and a detector against a mapping session.
pub struct CaptureCycle<F, D> {
    source: F,
    detector: D,
    stop: StopHandle,
}

impl<F: FrameSource, D: MarkerDetector> CaptureCycle<F, D> {
    pub fn new(source: F, detector: D) -> Self {
        Self {
            source,
            detector,
            stop: StopHandle::default(),
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Runs one grab → detect → merge step.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::Capture`] if no frame could be grabbed and
    /// [`CycleError::Detect`] if the detector failed.  The session is left
    /// untouched in both cases.
    pub fn run_once(&mut self, session: &mut MappingSession) -> Result<CycleOutcome, CycleError> {
        let Some(frame) = self.grab_unless_paused(session)? else {
            return Ok(self.skipped());
        };
        let markers = self.detect(&frame)?;
        Ok(self.apply(session, &frame, markers))
    }

    /// Runs cycles until stopped, until the source runs dry, or until
    /// `max_cycles` cycles have completed.  Returns the number of cycles run.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::Capture`] if the source cannot be started or a
    /// grab fails for any reason other than the source being stopped.
    pub async fn run(
        &mut self,
        session: Arc<Mutex<MappingSession>>,
        settings: CaptureSettings,
        max_cycles: Option<usize>,
    ) -> Result<usize, CycleError> {
        if let Err(e) = self.source.start() {
            warn!("capture source failed to start: {e}");
            session.lock().await.capture_failed(e.to_string());
            return Err(e.into());
        }
        session.lock().await.capture_started();
        info!("capture started");

        tokio::time::sleep(settings.initial_delay).await;

        let result = self.cycle_loop(&session, settings, max_cycles).await;

        self.source.stop();
        session.lock().await.capture_stopped();
        match &result {
            Ok(cycles) => info!("capture stopped after {cycles} cycle(s)"),
            Err(e) => warn!("capture stopped: {e}"),
        }
        result
    }

    async fn cycle_loop(
        &mut self,
        session: &Mutex<MappingSession>,
        settings: CaptureSettings,
        max_cycles: Option<usize>,
    ) -> Result<usize, CycleError> {
        let mut cycles = 0;
        let mut saves = SaveWatch::new(&*session.lock().await);

        loop {
            if self.stop.is_stopped() || max_cycles.is_some_and(|max| cycles >= max) {
                return Ok(cycles);
            }

            if saves.saw_new_save(&*session.lock().await) {
                debug!("setup saved; waiting {:?} for devices", settings.resume_delay);
                tokio::time::sleep(settings.resume_delay).await;
                continue;
            }

            match self.step(session).await {
                Ok(CycleOutcome::Cancelled) => return Ok(cycles),
                Ok(CycleOutcome::Paused | CycleOutcome::Merged(_)) => {}
                Err(CycleError::Capture(CaptureError::Stopped)) => {
                    debug!("frame source exhausted");
                    return Ok(cycles);
                }
                Err(CycleError::Detect(e)) => {
                    warn!("marker detection failed: {e}");
                    session.lock().await.capture_failed(e.to_string());
                }
                Err(e) => return Err(e),
            }
            cycles += 1;

            tokio::time::sleep(settings.interval).await;
        }
    }

    /// One cycle with the session locked only around the grab and the merge.
    async fn step(&mut self, session: &Mutex<MappingSession>) -> Result<CycleOutcome, CycleError> {
        let frame = {
            let guard = session.lock().await;
            self.grab_unless_paused(&guard)?
        };
        let Some(frame) = frame else {
            return Ok(self.skipped());
        };
        let markers = self.detect(&frame)?;
        let mut guard = session.lock().await;
        Ok(self.apply(&mut guard, &frame, markers))
    }

    /// Grabs a frame, or returns `None` if stopped or detection is paused.
    fn grab_unless_paused(&mut self, session: &MappingSession) -> Result<Option<Frame>, CycleError> {
        if self.stop.is_stopped() {
            return Ok(None);
        }
        let frame = self.source.grab()?;
        if session.detection_paused() {
            debug!("detection paused; dropping {}x{} frame", frame.width(), frame.height());
            return Ok(None);
        }
        Ok(Some(frame))
    }

    fn skipped(&self) -> CycleOutcome {
        if self.stop.is_stopped() {
            CycleOutcome::Cancelled
        } else {
            CycleOutcome::Paused
        }
    }

    fn detect(&mut self, frame: &Frame) -> Result<Vec<DetectedMarker>, CycleError> {
        Ok(self
            .detector
            .detect(frame.pixels(), frame.width(), frame.height())?)
    }

    fn apply(
        &self,
        session: &mut MappingSession,
        frame: &Frame,
        markers: Vec<DetectedMarker>,
    ) -> CycleOutcome {
        // Stopped while the detector ran: the result must not be applied.
        if self.stop.is_stopped() {
            debug!("capture stopped during detection; discarding {} marker(s)", markers.len());
            return CycleOutcome::Cancelled;
        }
        // Reset while the detector ran: the picture may show stale markers.
        if session.detection_paused() {
            debug!("detection paused during detection; discarding {} marker(s)", markers.len());
            return CycleOutcome::Paused;
        }

        for marker in &markers {
            let a = annotate(&session.config().screens, marker);
            debug!(
                "marker {} at ({:.1}, {:.1}): {} {}",
                a.id,
                a.center.x,
                a.center.y,
                a.serial.as_deref().unwrap_or("<Unknown>"),
                a.slot
            );
        }

        let detection = Detection {
            width: frame.width(),
            height: frame.height(),
            markers,
        };
        CycleOutcome::Merged(session.merge(&detection))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
