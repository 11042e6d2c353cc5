//! Per-page view controllers.
//!
//! Each controller owns its view's caches, its push subscriptions, its
//! effect scheduler, and any interval tasks. The caller drives it:
//! `pump()` drains pending push events through the reconciler (performing
//! any refetches the intents demand), `render()` projects the caches into
//! a view model, `close()` tears everything down. After `close()` the
//! controller goes inert; late fetch completions and pumps are no-ops.

pub mod dashboard;
pub mod garden;
pub mod greenhouse;
pub mod journal;
pub mod pathways;
pub mod profile;

pub use dashboard::{DashboardController, DashboardView};
pub use garden::{GardenController, GardenView};
pub use greenhouse::{GreenhouseController, GreenhouseView};
pub use journal::{JournalController, JournalTab, JournalView};
pub use pathways::{PathwaysController, PathwaysView};
pub use profile::{ProfileController, ProfileView};

use std::sync::atomic::{AtomicU64, Ordering};

/// Provisional ids start far above anything the server assigns, so an
/// optimistic record can never collide with a real entity while the
/// confirmation is in flight.
const PROVISIONAL_BASE: u64 = 1 << 40;

static NEXT_PROVISIONAL: AtomicU64 = AtomicU64::new(PROVISIONAL_BASE);

/// Mint a provisional entity id for an optimistic insert.
pub(crate) fn provisional_id() -> u64 {
    NEXT_PROVISIONAL.fetch_add(1, Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provisional_ids_are_unique_and_out_of_server_range() {
        let a = provisional_id();
        let b = provisional_id();
        assert_ne!(a, b);
        assert!(a >= PROVISIONAL_BASE);
    }
}
