//! Per-view projections and the context they are filtered against.

use crate::cache::Cache;
use verdant_core::{
    ActivityEvent, Badge, Goal, GroupId, GroupSummary, Plant, ReflectionEntry, UserId, UserVitals,
};

/// The page a controller drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// Home: garden summary, vitals, activity feed.
    Dashboard,
    /// The full personal garden.
    Garden,
    /// Groups and their shared gardens.
    Greenhouse,
    /// Personal goals.
    Pathways,
    /// Reflection compose and feeds.
    Journal,
    /// Profile, badges, reflection history.
    Profile,
}

/// What the filter predicates see: who is looking, and at which group.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewContext {
    /// The local user.
    pub user: UserId,
    /// The group currently open in a group-scoped view.
    pub active_group: Option<GroupId>,
}

impl ViewContext {
    /// Context for a user with no group selected.
    pub fn for_user(user: UserId) -> Self {
        Self {
            user,
            active_group: None,
        }
    }

    /// Whether a group reference matches the active group.
    pub fn is_active_group(&self, group: Option<GroupId>) -> bool {
        match (self.active_group, group) {
            (Some(active), Some(group)) => active == group,
            _ => false,
        }
    }
}

/// One view's in-memory projection of the world.
///
/// Exclusively owned by its controller; two views showing overlapping
/// data each hold their own copy, updated by their own subscriptions.
#[derive(Debug, Clone, Default)]
pub struct ViewCaches {
    /// Goals by id.
    pub goals: Cache<Goal>,
    /// Plants by id.
    pub plants: Cache<Plant>,
    /// Badges by id.
    pub badges: Cache<Badge>,
    /// Reflections by id.
    pub reflections: Cache<ReflectionEntry>,
    /// Group summaries by id.
    pub groups: Cache<GroupSummary>,
    /// Activity feed, replaced wholesale on refetch.
    pub activity: Vec<ActivityEvent>,
    /// Streak/xp/level.
    pub vitals: UserVitals,
}

impl ViewCaches {
    /// Fresh, empty projection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the activity feed from a snapshot.
    pub fn set_activity(&mut self, feed: Vec<ActivityEvent>) {
        self.activity = feed;
    }
}
