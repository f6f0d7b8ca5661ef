//! Frame capture infrastructure.
//!
//! A capture session pulls frames from a camera (or any other picture source)
//! one at a time.  Each frame is a raw RGBA buffer, row-major, exactly
//! `width * height * 4` bytes, which is what the marker detector expects.
//!
//! # Testability
//!
//! The [`FrameSource`] trait lets the capture cycle run against
//! [`scripted::ScriptedFrameSource`] in tests and in recording replay, with no
//! camera attached.

use thiserror::Error;

pub mod scripted;

/// Bytes per RGBA pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Error type for malformed frames.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame dimensions must be non-zero, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },

    #[error("RGBA buffer for {width}x{height} must be {expected} bytes, got {actual}")]
    BufferLength {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Error type for capture sources.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The camera could not be opened or access was denied.
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    /// The source has no more frames or was stopped.
    #[error("capture source has stopped")]
    Stopped,

    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// One captured picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl Frame {
    /// Wraps an RGBA buffer after checking its length against the dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError`] for zero dimensions or a buffer of the wrong size.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::ZeroDimension { width, height });
        }
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if pixels.len() != expected {
            return Err(FrameError::BufferLength {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    /// A black, fully transparent frame.
    pub fn blank(width: u32, height: u32) -> Result<Self, FrameError> {
        let len = width as usize * height as usize * BYTES_PER_PIXEL;
        Self::new(vec![0; len], width, height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Trait abstracting a picture source.
///
/// Production implementations wrap a camera; tests use
/// [`scripted::ScriptedFrameSource`] or a mockall mock.
#[cfg_attr(test, mockall::automock)]
pub trait FrameSource: Send {
    /// Opens the source.
    fn start(&mut self) -> Result<(), CaptureError>;
    /// Acquires the next frame.
    fn grab(&mut self) -> Result<Frame, CaptureError>;
    /// Releases the source.  Further `grab` calls fail with [`CaptureError::Stopped`].
    fn stop(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_new_accepts_exact_rgba_buffer() {
        let frame = Frame::new(vec![0; 2 * 3 * 4], 2, 3).expect("valid frame");
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 3);
        assert_eq!(frame.pixels().len(), 24);
    }

    #[test]
    fn test_frame_new_rejects_short_buffer() {
        let result = Frame::new(vec![0; 10], 2, 3);
        assert_eq!(
            result,
            Err(FrameError::BufferLength {
                width: 2,
                height: 3,
                expected: 24,
                actual: 10
            })
        );
    }

    #[test]
    fn test_frame_new_rejects_zero_dimension() {
        assert_eq!(
            Frame::new(Vec::new(), 0, 5),
            Err(FrameError::ZeroDimension { width: 0, height: 5 })
        );
    }

    #[test]
    fn test_frame_blank_has_matching_length() {
        let frame = Frame::blank(4, 4).unwrap();
        assert!(frame.pixels().iter().all(|&b| b == 0));
        assert_eq!(frame.pixels().len(), 64);
    }
}
