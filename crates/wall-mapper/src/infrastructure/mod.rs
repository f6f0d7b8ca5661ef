//! Infrastructure layer for the mapper.
//!
//! Contains the adapters around the engine: picture sources, the marker
//! detector boundary, and file-system storage.
//!
//! **Dependency rule**: the `application` layer may name the traits declared
//! here (`FrameSource`, `MarkerDetector`) but never a concrete adapter.
//! Adapters may depend on `application` and `wall_core`.

pub mod capture;
pub mod detector;
pub mod storage;
