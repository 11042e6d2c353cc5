//! Render intents: what the reconciler tells the controller to redraw.

use verdant_core::{BadgeId, GoalId, PlantId, ReflectionId};

/// A notification that a cache changed and which fragment to re-render.
///
/// Controllers map these to fragment redraws and animation requests;
/// `Refetch*` intents carry no entity because the event was only a
/// signal to re-pull the corresponding snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderIntent {
    /// A goal was inserted or changed.
    GoalUpserted(GoalId),
    /// A goal was removed.
    GoalRemoved(GoalId),
    /// A plant was inserted or changed.
    PlantUpserted(PlantId),
    /// A badge was inserted.
    BadgeUpserted(BadgeId),
    /// A reflection was inserted or changed.
    ReflectionUpserted(ReflectionId),
    /// A reflection was removed.
    ReflectionRemoved(ReflectionId),
    /// A comment landed on a cached reflection.
    CommentAdded(ReflectionId),
    /// Streak/xp/level changed.
    VitalsChanged,
    /// Re-pull the garden snapshot.
    RefetchGarden,
    /// Re-pull the group list.
    RefetchGroups,
    /// Re-pull the active group's activity feed.
    RefetchGroupActivity,
}
