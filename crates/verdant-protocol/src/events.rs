//! Server push notifications.
//!
//! The channel delivers `(name, payload)` frames. Each wire name maps to
//! one [`PushEvent`] variant; unknown names fail decoding and are dropped
//! by the channel after logging. Duplicate and out-of-order delivery is
//! expected around reconnects — tolerating that is the reconciler's job,
//! not this layer's.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use verdant_core::{
    Badge, Comment, Goal, GoalId, GroupSummary, PlantId, ReflectionEntry, ReflectionId, UserId,
    UserVitals, VerdantError,
};

/// Wire names of the push events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventName {
    /// A personal reflection was posted.
    NewReflection,
    /// A reflection was posted into a group feed.
    NewGroupReflection,
    /// A plant sprouted from a reflection.
    NewPlant,
    /// A goal was created.
    GoalCreated,
    /// A goal changed.
    GoalUpdated,
    /// A goal was removed.
    GoalDeleted,
    /// A badge was awarded.
    NewBadge,
    /// Signal: re-pull the garden snapshot.
    GardenUpdate,
    /// Streak/xp/level changed.
    UserStateUpdate,
    /// Signal: re-pull the group list.
    GroupCreated,
    /// Signal: re-pull the active group's activity.
    NewComment,
}

impl EventName {
    /// All event names, for blanket subscriptions.
    pub const ALL: [EventName; 11] = [
        Self::NewReflection,
        Self::NewGroupReflection,
        Self::NewPlant,
        Self::GoalCreated,
        Self::GoalUpdated,
        Self::GoalDeleted,
        Self::NewBadge,
        Self::GardenUpdate,
        Self::UserStateUpdate,
        Self::GroupCreated,
        Self::NewComment,
    ];

    /// The snake_case wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewReflection => "new_reflection",
            Self::NewGroupReflection => "new_group_reflection",
            Self::NewPlant => "new_plant",
            Self::GoalCreated => "goal_created",
            Self::GoalUpdated => "goal_updated",
            Self::GoalDeleted => "goal_deleted",
            Self::NewBadge => "new_badge",
            Self::GardenUpdate => "garden_update",
            Self::UserStateUpdate => "user_state_update",
            Self::GroupCreated => "group_created",
            Self::NewComment => "new_comment",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventName {
    type Err = VerdantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| VerdantError::serialization(format!("unknown push event: {s}")))
    }
}

/// A raw frame as it travels over the push connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Event name.
    pub name: String,
    /// JSON payload.
    pub payload: serde_json::Value,
}

/// A decoded server push notification.
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    /// `new_reflection` — a personal reflection was posted.
    NewReflection {
        /// The posted entry.
        reflection: ReflectionEntry,
    },
    /// `new_group_reflection` — a reflection landed in a group feed.
    NewGroupReflection {
        /// The posted entry.
        reflection: ReflectionEntry,
    },
    /// `new_plant` — a plant sprouted.
    NewPlant {
        /// The new plant's id.
        plant_id: PlantId,
        /// Its owner.
        user_id: UserId,
        /// Stage-zero image.
        image: String,
    },
    /// `goal_created` — full goal object.
    GoalCreated(Goal),
    /// `goal_updated` — full goal object, last write wins.
    GoalUpdated(Goal),
    /// `goal_deleted`.
    GoalDeleted {
        /// The removed goal's id.
        goal_id: GoalId,
    },
    /// `new_badge` — a badge was awarded.
    NewBadge(Badge),
    /// `garden_update` — signal to re-pull the garden snapshot.
    GardenUpdate {
        /// Whose garden changed.
        user_id: UserId,
    },
    /// `user_state_update` — streak/xp/level.
    UserStateUpdate(UserVitals),
    /// `group_created` — signal to re-pull the group list.
    GroupCreated(GroupSummary),
    /// `new_comment` — signal to re-pull activity for the active group.
    NewComment {
        /// The commented reflection.
        reflection_id: ReflectionId,
        /// The comment itself, for feeds that patch in place.
        comment: Comment,
    },
}

#[derive(Serialize, Deserialize)]
struct ReflectionEnvelope {
    reflection: ReflectionEntry,
}

#[derive(Serialize, Deserialize)]
struct NewPlantPayload {
    plant_id: PlantId,
    user_id: UserId,
    #[serde(default)]
    image: String,
}

#[derive(Serialize, Deserialize)]
struct GoalDeletedPayload {
    goal_id: GoalId,
}

#[derive(Serialize, Deserialize)]
struct NewBadgePayload {
    #[serde(rename = "userId")]
    user_id: UserId,
    badge_id: verdant_core::BadgeId,
    badge_name: String,
    #[serde(default)]
    icon: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct GardenUpdatePayload {
    #[serde(rename = "userId")]
    user_id: UserId,
}

#[derive(Serialize, Deserialize)]
struct NewCommentPayload {
    #[serde(rename = "reflectionId")]
    reflection_id: ReflectionId,
    comment: Comment,
}

impl PushEvent {
    /// The wire name this event travels under.
    pub fn name(&self) -> EventName {
        match self {
            Self::NewReflection { .. } => EventName::NewReflection,
            Self::NewGroupReflection { .. } => EventName::NewGroupReflection,
            Self::NewPlant { .. } => EventName::NewPlant,
            Self::GoalCreated(_) => EventName::GoalCreated,
            Self::GoalUpdated(_) => EventName::GoalUpdated,
            Self::GoalDeleted { .. } => EventName::GoalDeleted,
            Self::NewBadge(_) => EventName::NewBadge,
            Self::GardenUpdate { .. } => EventName::GardenUpdate,
            Self::UserStateUpdate(_) => EventName::UserStateUpdate,
            Self::GroupCreated(_) => EventName::GroupCreated,
            Self::NewComment { .. } => EventName::NewComment,
        }
    }

    /// Encode into a wire frame.
    pub fn to_frame(&self) -> Result<Frame, VerdantError> {
        let payload = match self {
            Self::NewReflection { reflection } | Self::NewGroupReflection { reflection } => {
                serde_json::to_value(ReflectionEnvelope {
                    reflection: reflection.clone(),
                })?
            }
            Self::NewPlant {
                plant_id,
                user_id,
                image,
            } => serde_json::to_value(NewPlantPayload {
                plant_id: *plant_id,
                user_id: *user_id,
                image: image.clone(),
            })?,
            Self::GoalCreated(goal) | Self::GoalUpdated(goal) => serde_json::to_value(goal)?,
            Self::GoalDeleted { goal_id } => {
                serde_json::to_value(GoalDeletedPayload { goal_id: *goal_id })?
            }
            Self::NewBadge(badge) => serde_json::to_value(NewBadgePayload {
                user_id: badge.user_id,
                badge_id: badge.id,
                badge_name: badge.name.clone(),
                icon: badge.icon.clone(),
            })?,
            Self::GardenUpdate { user_id } => {
                serde_json::to_value(GardenUpdatePayload { user_id: *user_id })?
            }
            Self::UserStateUpdate(vitals) => serde_json::to_value(vitals)?,
            Self::GroupCreated(group) => serde_json::to_value(group)?,
            Self::NewComment {
                reflection_id,
                comment,
            } => serde_json::to_value(NewCommentPayload {
                reflection_id: *reflection_id,
                comment: comment.clone(),
            })?,
        };
        Ok(Frame {
            name: self.name().as_str().to_string(),
            payload,
        })
    }

    /// Decode a wire frame. Unknown names and malformed payloads fail.
    pub fn from_frame(frame: &Frame) -> Result<Self, VerdantError> {
        let name: EventName = frame.name.parse()?;
        let payload = frame.payload.clone();
        let event = match name {
            EventName::NewReflection => {
                let env: ReflectionEnvelope = serde_json::from_value(payload)?;
                Self::NewReflection {
                    reflection: env.reflection,
                }
            }
            EventName::NewGroupReflection => {
                let env: ReflectionEnvelope = serde_json::from_value(payload)?;
                Self::NewGroupReflection {
                    reflection: env.reflection,
                }
            }
            EventName::NewPlant => {
                let p: NewPlantPayload = serde_json::from_value(payload)?;
                Self::NewPlant {
                    plant_id: p.plant_id,
                    user_id: p.user_id,
                    image: p.image,
                }
            }
            EventName::GoalCreated => Self::GoalCreated(serde_json::from_value(payload)?),
            EventName::GoalUpdated => Self::GoalUpdated(serde_json::from_value(payload)?),
            EventName::GoalDeleted => {
                let p: GoalDeletedPayload = serde_json::from_value(payload)?;
                Self::GoalDeleted { goal_id: p.goal_id }
            }
            EventName::NewBadge => {
                let p: NewBadgePayload = serde_json::from_value(payload)?;
                Self::NewBadge(Badge {
                    id: p.badge_id,
                    user_id: p.user_id,
                    name: p.badge_name,
                    icon: p.icon,
                    awarded_at: Default::default(),
                })
            }
            EventName::GardenUpdate => {
                let p: GardenUpdatePayload = serde_json::from_value(payload)?;
                Self::GardenUpdate { user_id: p.user_id }
            }
            EventName::UserStateUpdate => Self::UserStateUpdate(serde_json::from_value(payload)?),
            EventName::GroupCreated => Self::GroupCreated(serde_json::from_value(payload)?),
            EventName::NewComment => {
                let p: NewCommentPayload = serde_json::from_value(payload)?;
                Self::NewComment {
                    reflection_id: p.reflection_id,
                    comment: p.comment,
                }
            }
        };
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use verdant_core::TimeStamp;

    #[test]
    fn unknown_event_name_fails_decode() {
        let frame = Frame {
            name: "mystery_event".into(),
            payload: serde_json::json!({}),
        };
        assert_matches!(
            PushEvent::from_frame(&frame),
            Err(VerdantError::Serialization { .. })
        );
    }

    #[test]
    fn badge_payload_uses_server_field_names() {
        let frame = Frame {
            name: "new_badge".into(),
            payload: serde_json::json!({
                "userId": 7, "badge_id": 12, "badge_name": "Consistent Grower"
            }),
        };
        let event = PushEvent::from_frame(&frame).unwrap();
        assert_matches!(event, PushEvent::NewBadge(ref b) if b.user_id == UserId::new(7)
            && b.id.value() == 12 && b.icon.is_none());
    }

    #[test]
    fn goal_frames_round_trip() {
        let goal = Goal {
            id: GoalId::new(3),
            title: "Water daily".into(),
            progress: 40,
            created_by: UserId::new(1),
            ..Goal::default()
        };
        let frame = PushEvent::GoalUpdated(goal.clone()).to_frame().unwrap();
        assert_eq!(frame.name, "goal_updated");
        let back = PushEvent::from_frame(&frame).unwrap();
        assert_matches!(back, PushEvent::GoalUpdated(g) if g == goal);
    }

    #[test]
    fn goal_payload_out_of_range_progress_clamps() {
        let frame = Frame {
            name: "goal_updated".into(),
            payload: serde_json::json!({
                "id": 3, "title": "t", "progress": 400, "created_by": 1
            }),
        };
        let event = PushEvent::from_frame(&frame).unwrap();
        assert_matches!(event, PushEvent::GoalUpdated(g) if g.progress == 100);
    }

    #[test]
    fn comment_signal_carries_subject() {
        let frame = Frame {
            name: "new_comment".into(),
            payload: serde_json::json!({
                "reflectionId": 9,
                "comment": { "author": "moss", "content": "nice", "createdAt": 5 }
            }),
        };
        let event = PushEvent::from_frame(&frame).unwrap();
        assert_matches!(
            event,
            PushEvent::NewComment { reflection_id, ref comment }
                if reflection_id == ReflectionId::new(9)
                && comment.created_at == TimeStamp::from_millis(5)
        );
    }
}
