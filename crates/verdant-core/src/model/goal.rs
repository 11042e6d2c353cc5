//! Goal entity: progress clamping and status monotonicity.

use crate::identifiers::{CorrelationId, GoalId, GroupId, UserId};
use crate::time::TimeStamp;
use serde::{Deserialize, Serialize};

/// Whether a goal belongs to a single user or to a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalKind {
    /// Owned by a single user, rendered in the personal pathways view.
    #[default]
    Personal,
    /// Shared by a group, rendered in the greenhouse view.
    Group,
}

/// Goal lifecycle status.
///
/// The raw event stream may carry regressions; the reconciled view never
/// moves back from `Completed` to `Active`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    /// Still in progress.
    #[default]
    Active,
    /// Finished; terminal.
    Completed,
}

impl GoalStatus {
    /// Whether the goal is finished.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// A personal or group goal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Server-assigned id.
    pub id: GoalId,
    /// Short title.
    pub title: String,
    /// Longer free-form description.
    #[serde(default)]
    pub description: String,
    /// Personal or group.
    #[serde(rename = "type", default)]
    pub kind: GoalKind,
    /// Owning group, when `kind` is [`GoalKind::Group`].
    #[serde(default)]
    pub group_id: Option<GroupId>,
    /// Due date, when set.
    #[serde(default)]
    pub due_date: Option<TimeStamp>,
    /// Completion percentage, clamped to 0–100 on construction and merge.
    #[serde(deserialize_with = "clamped_progress")]
    pub progress: u8,
    /// Lifecycle status.
    #[serde(default)]
    pub status: GoalStatus,
    /// Creator.
    pub created_by: UserId,
    /// Local-only optimistic-insert token; never serialized.
    #[serde(skip)]
    pub correlation: Option<CorrelationId>,
}

/// Deserialize any integer into the 0–100 range.
fn clamped_progress<'de, D>(de: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = i64::deserialize(de)?;
    Ok(Goal::clamp_progress(raw))
}

impl Goal {
    /// Clamp a raw progress value into the 0–100 range.
    pub fn clamp_progress(raw: i64) -> u8 {
        raw.clamp(0, 100) as u8
    }

    /// Set progress, clamping out-of-range input.
    pub fn set_progress(&mut self, raw: i64) {
        self.progress = Self::clamp_progress(raw);
    }

    /// Whether the goal has no group reference.
    pub fn is_personal(&self) -> bool {
        self.group_id.is_none()
    }

    /// Mark completed: progress pinned to 100, status terminal.
    pub fn complete(&mut self) {
        self.progress = 100;
        self.status = GoalStatus::Completed;
    }

    /// Fields that a view renders, used for the no-change discard.
    ///
    /// The correlation token is local bookkeeping and deliberately
    /// excluded; two goals that differ only in token render identically.
    pub fn renders_same_as(&self, other: &Goal) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.description == other.description
            && self.kind == other.kind
            && self.group_id == other.group_id
            && self.due_date == other.due_date
            && self.progress == other.progress
            && self.status == other.status
            && self.created_by == other.created_by
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(progress: u8) -> Goal {
        Goal {
            id: GoalId::new(1),
            title: "Read daily".into(),
            progress,
            created_by: UserId::new(9),
            ..Goal::default()
        }
    }

    #[test]
    fn progress_clamps_on_deserialize() {
        let g: Goal = serde_json::from_value(serde_json::json!({
            "id": 1, "title": "t", "progress": 250, "created_by": 9
        }))
        .unwrap();
        assert_eq!(g.progress, 100);

        let g: Goal = serde_json::from_value(serde_json::json!({
            "id": 1, "title": "t", "progress": -5, "created_by": 9
        }))
        .unwrap();
        assert_eq!(g.progress, 0);
    }

    #[test]
    fn complete_is_terminal_shape() {
        let mut g = goal(40);
        g.complete();
        assert_eq!(g.progress, 100);
        assert!(g.status.is_completed());
    }

    #[test]
    fn correlation_does_not_affect_rendering() {
        let a = goal(40);
        let mut b = a.clone();
        b.correlation = Some(CorrelationId::new());
        assert!(a.renders_same_as(&b));
    }
}
