//! Verdant protocol: the push event taxonomy, pull snapshot shapes, the
//! REST endpoint catalogue, and the typed page-local note variants.
//!
//! Nothing here talks to a network; this crate only fixes the shapes both
//! sides of every boundary agree on.

pub mod events;
pub mod notes;
pub mod paths;
pub mod snapshots;

pub use events::{EventName, Frame, PushEvent};
pub use notes::PageNote;
pub use snapshots::{
    ActivitySnapshot, CommentResponse, CreatedGoal, CreatedReflection, GoalDraft, GoalsSnapshot,
    GroupDetail, GroupDraft, GroupsSnapshot, ReflectionDraft, UserDirectory, WaterResponse,
};
