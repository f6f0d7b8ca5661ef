//! Application layer use cases for the mapper.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure business rules in `wall-core`) and the infrastructure (camera,
//! detector, files).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** domain objects to fulfil an operator goal (e.g., "map
//!   every display of the wall from a picture").
//! - **Depend on abstractions** (traits) rather than concrete implementations,
//!   so a real camera or a recorded replay can drive the same code.
//! - **Contain no OS calls and no file system access**.
//!
//! # Sub-modules
//!
//! - **`reconcile_assignment`** – Keeps the screen registry equal to the
//!   sorted set of assigned devices.
//! - **`resolution_guard`** – Clears every transform when the reference
//!   picture resolution changes.
//! - **`merge_detection`** – Folds one detector result into the mapping.
//! - **`narrate_status`** – Picks the operator-facing "next step" message.
//! - **`mapping_session`** – Owns the mapping, applies the use cases above and
//!   persists every change.
//! - **`capture_cycle`** – The periodic grab → detect → merge loop.

pub mod capture_cycle;
pub mod mapping_session;
pub mod merge_detection;
pub mod narrate_status;
pub mod reconcile_assignment;
pub mod resolution_guard;
