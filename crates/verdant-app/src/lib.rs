//! Verdant app: the per-page view controllers and everything they share.
//!
//! A controller owns its view's caches, its push subscriptions, and its
//! scheduled tasks. State flows one way: snapshots and push deltas land in
//! the caches through the reconciler, and `render()` projects the caches
//! into a view model. Nothing is ever read back out of rendered output.

pub mod api;
pub mod bus;
pub mod context;
pub mod controller;
pub mod effects;

pub use api::{Api, HttpApi};
pub use bus::{BusSubscription, PageBus};
pub use context::AppContext;
pub use controller::{
    DashboardController, GardenController, GreenhouseController, JournalController,
    PathwaysController, ProfileController,
};
pub use effects::{EffectKind, EffectPolicy, EffectTarget, Scheduler, Stage};
