//! REST endpoint catalogue.
//!
//! Paths are built here so controllers never format URLs by hand.

use verdant_core::{GoalId, GroupId, PlantId, ReflectionId};

/// GET — the personal garden snapshot.
pub const GARDEN_STATE: &str = "/api/garden-state";
/// GET — the cross-view recent activity feed.
pub const RECENT_ACTIVITY: &str = "/api/recent-activity";
/// GET/POST — goal listing and creation.
pub const GOALS: &str = "/api/goals";
/// GET/POST — group listing and creation.
pub const GROUPS: &str = "/api/groups";
/// GET — the user directory.
pub const USERS: &str = "/api/users";
/// GET/PUT — the profile.
pub const PROFILE: &str = "/api/profile";
/// POST — reflection creation.
pub const REFLECTIONS: &str = "/api/reflections";

/// PUT/DELETE — a single goal.
pub fn goal(id: GoalId) -> String {
    format!("/api/goals/{}", id.value())
}

/// POST — mark a goal complete.
pub fn goal_complete(id: GoalId) -> String {
    format!("/api/goals/{}/complete", id.value())
}

/// GET — a single group.
pub fn group(id: GroupId) -> String {
    format!("/api/groups/{}", id.value())
}

/// GET — a group's activity feed.
pub fn group_activity(id: GroupId) -> String {
    format!("/api/groups/{}/activity", id.value())
}

/// POST — comment on a reflection.
pub fn reflection_comments(id: ReflectionId) -> String {
    format!("/api/reflections/{}/comments", id.value())
}

/// POST — water a plant.
pub fn water_plant(id: PlantId) -> String {
    format!("/api/plants/{}/water", id.value())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_interpolate_raw_ids() {
        assert_eq!(goal(GoalId::new(5)), "/api/goals/5");
        assert_eq!(group_activity(GroupId::new(2)), "/api/groups/2/activity");
        assert_eq!(water_plant(PlantId::new(3)), "/api/plants/3/water");
    }
}
