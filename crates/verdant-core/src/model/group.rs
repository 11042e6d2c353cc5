//! Groups and the user directory.

use crate::identifiers::{GroupId, UserId};
use crate::model::garden::GardenState;
use serde::{Deserialize, Serialize};

/// A reflection group with its shared garden.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Server-assigned id.
    pub id: GroupId,
    /// Group name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Member user ids.
    #[serde(default)]
    pub members: Vec<UserId>,
    /// Aggregate reflection count.
    #[serde(rename = "reflectionCount", default)]
    pub reflection_count: u64,
    /// Aggregate goal count.
    #[serde(rename = "goalCount", default)]
    pub goal_count: u64,
    /// Shared garden scoped to the group.
    #[serde(rename = "gardenState", default)]
    pub garden: GardenState,
}

impl Group {
    /// Whether the given user belongs to this group.
    pub fn has_member(&self, user: UserId) -> bool {
        self.members.contains(&user)
    }
}

/// The lightweight shape `/api/groups` returns for list rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Server-assigned id.
    pub id: GroupId,
    /// Group name.
    pub name: String,
    /// Number of members.
    #[serde(rename = "memberCount", default)]
    pub member_count: u32,
}

/// A directory entry from `/api/users`, used when picking group members.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    /// User id.
    pub id: UserId,
    /// Account name.
    pub username: String,
}
