//! Verdant sync: per-view state caches and the reconciler that merges
//! snapshots and push deltas into them.
//!
//! Both the snapshot path and the push path funnel through the same
//! idempotent upsert, so a view converges to the same state no matter
//! which completes first. The reconciler additionally enforces the
//! invariants the raw event stream does not: goal progress stays in
//! 0–100, completed goals never reactivate, duplicates collapse, and a
//! deletion of an unknown id is a no-op.

pub mod cache;
pub mod intent;
pub mod reconcile;
pub mod view;

pub use cache::{Applied, Cache, Identified};
pub use intent::RenderIntent;
pub use reconcile::Reconciler;
pub use view::{ViewCaches, ViewContext, ViewKind};
