//! Activity feed events.

use crate::identifiers::{GoalId, GroupId, ReflectionId};
use crate::model::goal::GoalStatus;
use crate::time::TimeStamp;
use serde::{Deserialize, Serialize};

/// One entry in a recent-activity feed, denormalized for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActivityEvent {
    /// Someone posted a reflection.
    Reflection {
        /// Reflection id.
        id: ReflectionId,
        /// Display identity of the author.
        #[serde(rename = "userName", default)]
        user_name: Option<String>,
        /// Entry body.
        content: String,
        /// Group feed it was posted into, if any.
        #[serde(default)]
        group_id: Option<GroupId>,
        /// When it was posted.
        #[serde(rename = "createdAt")]
        created_at: TimeStamp,
    },
    /// Someone moved a goal forward.
    Goal {
        /// Goal id.
        id: GoalId,
        /// Display identity of the actor.
        #[serde(rename = "userName", default)]
        user_name: Option<String>,
        /// Goal title for display.
        #[serde(rename = "goalName")]
        goal_name: String,
        /// Progress at the time of the event.
        progress: u8,
        /// Status at the time of the event.
        status: GoalStatus,
        /// When it happened.
        #[serde(rename = "createdAt")]
        created_at: TimeStamp,
    },
}

impl ActivityEvent {
    /// When the event happened.
    pub fn timestamp(&self) -> TimeStamp {
        match self {
            Self::Reflection { created_at, .. } | Self::Goal { created_at, .. } => *created_at,
        }
    }

    /// Whether this is a reflection entry.
    pub fn is_reflection(&self) -> bool {
        matches!(self, Self::Reflection { .. })
    }

    /// The group the event is scoped to, if any.
    pub fn group_id(&self) -> Option<GroupId> {
        match self {
            Self::Reflection { group_id, .. } => *group_id,
            Self::Goal { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_by_type_on_the_wire() {
        let ev = ActivityEvent::Reflection {
            id: ReflectionId::new(4),
            user_name: Some("fern".into()),
            content: "grew today".into(),
            group_id: None,
            created_at: TimeStamp::from_millis(1000),
        };
        let v = serde_json::to_value(&ev).unwrap();
        assert_eq!(v["type"], "reflection");
        assert_eq!(v["userName"], "fern");
        let back: ActivityEvent = serde_json::from_value(v).unwrap();
        assert_eq!(back, ev);
    }
}
