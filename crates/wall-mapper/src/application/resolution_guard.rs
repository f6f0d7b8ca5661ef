//! Resolution guard: one coordinate frame for the whole wall.
//!
//! A homography maps coordinates of one particular reference picture.  If a
//! new picture arrives with different pixel dimensions, every stored
//! transform is expressed in a frame that no longer exists, not only the ones
//! the new picture would overwrite.  The guard therefore clears all of them
//! before anything new is written.

use tracing::info;
use wall_core::{MappingConfig, Snapshot};

/// Adopts `width × height` as the reference resolution.
///
/// Returns `true` if the resolution differed from the stored snapshot, in
/// which case every transform has been cleared.  Returns `false` and leaves
/// `config` untouched otherwise.
pub fn check_and_apply(config: &mut MappingConfig, width: u32, height: u32) -> bool {
    let current = config.snapshot();
    if current.matches(width, height) {
        return false;
    }

    info!(
        "reference resolution changed from {}x{} to {width}x{height}; clearing {} mapped slot(s)",
        current.width,
        current.height,
        config.screens.count_configured()
    );
    config.screens.reset_all();
    config.set_snapshot(Snapshot::new(width, height));
    true
}
