//! Verdant core: identifiers, timestamps, domain entities, and the unified
//! error type.
//!
//! This crate is pure data — no async, no I/O. Everything wire-visible
//! derives serde with field names matching the server's JSON, so the
//! protocol and sync layers can move entities around without adapter
//! structs.

pub mod errors;
pub mod identifiers;
pub mod model;
pub mod time;

pub use errors::VerdantError;
pub use identifiers::{
    BadgeId, CommentId, CorrelationId, GoalId, GroupId, PlantId, ReflectionId, UserId,
};
pub use model::activity::ActivityEvent;
pub use model::garden::{Badge, GardenState, Plant, UserVitals};
pub use model::goal::{Goal, GoalKind, GoalStatus};
pub use model::group::{Group, GroupSummary, UserSummary};
pub use model::profile::Profile;
pub use model::reflection::{Comment, DisplayMode, ReflectionEntry};
pub use time::TimeStamp;
