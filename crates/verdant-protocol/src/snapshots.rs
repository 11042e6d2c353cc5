//! Pull snapshot shapes and mutation response bodies.

use serde::{Deserialize, Serialize};
use verdant_core::{
    ActivityEvent, Comment, Goal, Group, GroupSummary, PlantId, ReflectionEntry, UserSummary,
};

/// `/api/goals` — personal and group goals, separately listed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalsSnapshot {
    /// Goals created by the user with no group reference.
    #[serde(default)]
    pub personal: Vec<Goal>,
    /// Goals in groups the user belongs to.
    #[serde(default)]
    pub group: Vec<Goal>,
}

impl GoalsSnapshot {
    /// All goals in listing order, personal first.
    pub fn all(&self) -> impl Iterator<Item = &Goal> {
        self.personal.iter().chain(self.group.iter())
    }
}

/// `/api/recent-activity` and `/api/groups/:id/activity`.
pub type ActivitySnapshot = Vec<ActivityEvent>;

/// `/api/groups` list.
pub type GroupsSnapshot = Vec<GroupSummary>;

/// `/api/groups/:id` detail.
pub type GroupDetail = Group;

/// `/api/users` directory.
pub type UserDirectory = Vec<UserSummary>;

/// Response of `POST /api/reflections`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedReflection {
    /// The entry as the server stored it.
    pub reflection: ReflectionEntry,
}

/// Response of `POST /api/goals`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedGoal {
    /// The goal as the server stored it.
    pub goal: Goal,
}

/// Response of `POST /api/reflections/:id/comments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentResponse {
    /// The stored comment.
    pub comment: Comment,
}

/// Response of `POST /api/plants/:id/water`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterResponse {
    /// The watered plant.
    pub plant_id: PlantId,
    /// Its new growth stage.
    pub new_stage: u8,
    /// Image for the new stage.
    pub image: String,
}

/// Request body of `POST /api/reflections`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReflectionDraft {
    /// Entry body; must be non-empty.
    pub content: String,
    /// `named` or `pseudonym`.
    pub display_mode: verdant_core::DisplayMode,
    /// Pseudonym when `display_mode` is `pseudonym`.
    #[serde(default)]
    pub pseudonym: Option<String>,
    /// Ordered tag set.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Target group feed, if any.
    #[serde(default)]
    pub group_id: Option<verdant_core::GroupId>,
}

/// Request body of `POST /api/goals` and `PUT /api/goals/:id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalDraft {
    /// Goal title; must be non-empty.
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// `personal` or `group`.
    #[serde(rename = "type", default)]
    pub kind: verdant_core::GoalKind,
    /// Owning group for group goals.
    #[serde(default)]
    pub group_id: Option<verdant_core::GroupId>,
    /// Due date, when set.
    #[serde(default)]
    pub due_date: Option<verdant_core::TimeStamp>,
    /// Completion percentage; the server clamps as the client does.
    #[serde(default)]
    pub progress: u8,
}

/// Request body of `POST /api/groups`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupDraft {
    /// Group name; required.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Class the group belongs to; required.
    pub class_name: String,
    /// Initial members.
    #[serde(default)]
    pub members: Vec<verdant_core::UserId>,
}
