//! Entity factories with sensible defaults.

use verdant_core::{
    Badge, BadgeId, GardenState, Goal, GoalId, GoalKind, GroupId, Plant, PlantId, Profile,
    ReflectionEntry, ReflectionId, TimeStamp, UserId, UserVitals,
};

/// The default local user in tests.
pub const TEST_USER: UserId = UserId::new(1);

/// An active personal goal owned by [`TEST_USER`].
pub fn goal(id: u64, progress: u8) -> Goal {
    Goal {
        id: GoalId::new(id),
        title: format!("goal {id}"),
        progress,
        created_by: TEST_USER,
        ..Goal::default()
    }
}

/// A completed personal goal.
pub fn completed_goal(id: u64) -> Goal {
    let mut g = goal(id, 100);
    g.complete();
    g
}

/// A group goal for the given group, created by [`TEST_USER`].
pub fn group_goal(id: u64, group: u64) -> Goal {
    Goal {
        kind: GoalKind::Group,
        group_id: Some(GroupId::new(group)),
        ..goal(id, 0)
    }
}

/// A personal reflection entry.
pub fn reflection(id: u64) -> ReflectionEntry {
    ReflectionEntry {
        id: ReflectionId::new(id),
        display_name: Some("fern".into()),
        content: format!("entry {id}"),
        created_at: TimeStamp::from_millis(id * 1_000),
        ..ReflectionEntry::default()
    }
}

/// A reflection posted into a group feed.
pub fn group_reflection(id: u64, group: u64) -> ReflectionEntry {
    ReflectionEntry {
        group_id: Some(GroupId::new(group)),
        ..reflection(id)
    }
}

/// A plant owned by [`TEST_USER`].
pub fn plant(id: u64, stage: u8) -> Plant {
    Plant {
        id: PlantId::new(id),
        user_id: TEST_USER,
        stage,
        image: format!("stage{stage}.png"),
    }
}

/// A badge owned by [`TEST_USER`].
pub fn badge(id: u64, name: &str) -> Badge {
    Badge {
        id: BadgeId::new(id),
        user_id: TEST_USER,
        name: name.into(),
        icon: None,
        awarded_at: TimeStamp::from_millis(id * 1_000),
    }
}

/// A vitals triple.
pub fn vitals(streak: u32, xp: u64, level: u32) -> UserVitals {
    UserVitals { streak, xp, level }
}

/// A garden with the given plants and vitals.
pub fn garden(xp: u64, plants: Vec<Plant>) -> GardenState {
    GardenState {
        xp,
        streak: 1,
        level: 1 + (xp / 1_000) as u32,
        plants,
        ..GardenState::default()
    }
}

/// A profile for [`TEST_USER`].
pub fn profile(username: &str) -> Profile {
    Profile {
        id: TEST_USER,
        username: username.into(),
        ..Profile::default()
    }
}
