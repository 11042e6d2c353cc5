//! The render-surface seam.

use std::fmt;
use verdant_core::{BadgeId, GoalId, PlantId, ReflectionId};

/// A render target an effect can attach to, e.g. `plant-3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EffectTarget(String);

impl EffectTarget {
    /// Target from a raw key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Target for a plant node.
    pub fn plant(id: PlantId) -> Self {
        Self(id.to_string())
    }

    /// Target for a goal node.
    pub fn goal(id: GoalId) -> Self {
        Self(id.to_string())
    }

    /// Target for a badge toast slot.
    pub fn badge(id: BadgeId) -> Self {
        Self(id.to_string())
    }

    /// Target for a reflection card.
    pub fn reflection(id: ReflectionId) -> Self {
        Self(id.to_string())
    }

    /// The raw key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EffectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EffectTarget {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// What the scheduler needs from a render surface.
///
/// Implementations must return quickly and must not call back into the
/// scheduler; calls may arrive while scheduler state is locked.
pub trait Stage: Send + Sync {
    /// Attach a marker class to a target.
    fn attach(&self, target: &EffectTarget, marker: &'static str);

    /// Remove a marker class from a target. Unknown targets and absent
    /// markers are a no-op.
    fn remove(&self, target: &EffectTarget, marker: &'static str);

    /// Whether the target is still rendered.
    fn target_exists(&self, target: &EffectTarget) -> bool;
}
