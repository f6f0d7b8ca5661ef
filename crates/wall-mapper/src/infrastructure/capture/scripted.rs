//! Scripted frame source for tests and recording replay.
//!
//! Produces blank frames with a predetermined sequence of dimensions, so the
//! capture cycle can run without a camera.  Can also be told to refuse
//! starting, which mimics a denied camera permission.

use std::collections::VecDeque;

use super::{CaptureError, Frame, FrameSource};

/// A [`FrameSource`] that replays a fixed list of frame sizes.
pub struct ScriptedFrameSource {
    pending: VecDeque<(u32, u32)>,
    started: bool,
    deny_reason: Option<String>,
    grab_count: usize,
}

impl ScriptedFrameSource {
    /// Creates a source that yields one blank frame per entry of `dimensions`.
    pub fn new(dimensions: impl IntoIterator<Item = (u32, u32)>) -> Self {
        Self {
            pending: dimensions.into_iter().collect(),
            started: false,
            deny_reason: None,
            grab_count: 0,
        }
    }

    /// Creates a source whose `start` fails as if camera access was denied.
    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            pending: VecDeque::new(),
            started: false,
            deny_reason: Some(reason.into()),
            grab_count: 0,
        }
    }

    /// Number of frames handed out so far.
    pub fn grab_count(&self) -> usize {
        self.grab_count
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}

impl FrameSource for ScriptedFrameSource {
    fn start(&mut self) -> Result<(), CaptureError> {
        if let Some(reason) = &self.deny_reason {
            return Err(CaptureError::CameraUnavailable(reason.clone()));
        }
        self.started = true;
        Ok(())
    }

    fn grab(&mut self) -> Result<Frame, CaptureError> {
        if !self.started {
            return Err(CaptureError::Stopped);
        }
        let (width, height) = self.pending.pop_front().ok_or(CaptureError::Stopped)?;
        self.grab_count += 1;
        Ok(Frame::blank(width, height)?)
    }

    fn stop(&mut self) {
        self.started = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_source_yields_frames_in_order() {
        // Arrange
        let mut source = ScriptedFrameSource::new([(4, 2), (8, 6)]);
        source.start().expect("start should succeed");

        // Act
        let first = source.grab().unwrap();
        let second = source.grab().unwrap();

        // Assert
        assert_eq!((first.width(), first.height()), (4, 2));
        assert_eq!((second.width(), second.height()), (8, 6));
        assert_eq!(source.grab_count(), 2);
    }

    #[test]
    fn test_scripted_source_reports_stopped_when_exhausted() {
        let mut source = ScriptedFrameSource::new([(1, 1)]);
        source.start().unwrap();
        source.grab().unwrap();
        assert!(matches!(source.grab(), Err(CaptureError::Stopped)));
    }

    #[test]
    fn test_scripted_source_refuses_grab_before_start_and_after_stop() {
        let mut source = ScriptedFrameSource::new([(1, 1), (1, 1)]);
        assert!(matches!(source.grab(), Err(CaptureError::Stopped)));
        source.start().unwrap();
        source.stop();
        assert!(matches!(source.grab(), Err(CaptureError::Stopped)));
    }

    #[test]
    fn test_denied_source_fails_to_start() {
        let mut source = ScriptedFrameSource::denied("permission denied");
        let result = source.start();
        assert!(matches!(result, Err(CaptureError::CameraUnavailable(r)) if r == "permission denied"));
        assert!(!source.is_started());
    }
}
