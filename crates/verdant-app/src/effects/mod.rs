//! Animation effect lifecycles.
//!
//! Effects are markers attached to render targets for a bounded time.
//! The scheduler guarantees every attached marker comes off exactly once,
//! either on the surface's completion signal or on a fallback timer,
//! even when the target vanished mid-effect.

mod ambient;
mod kind;
mod scheduler;
mod stage;

pub use ambient::{particle_count, theme_for_hour, AmbientScene, DayTheme, Weather};
pub use kind::{EffectKind, EffectPolicy};
pub use scheduler::Scheduler;
pub use stage::{EffectTarget, Stage};
