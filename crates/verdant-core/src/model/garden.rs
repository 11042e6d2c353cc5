//! Garden aggregate: plants, badges, and the user's vital stats.

use crate::identifiers::{BadgeId, PlantId, UserId};
use crate::model::goal::Goal;
use crate::time::TimeStamp;
use serde::{Deserialize, Serialize};

/// A plant growing in a garden.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    /// Server-assigned id.
    pub id: PlantId,
    /// Owner.
    pub user_id: UserId,
    /// Growth stage ordinal, 0-based.
    #[serde(default)]
    pub stage: u8,
    /// Image reference for the current stage.
    #[serde(default)]
    pub image: String,
}

impl Plant {
    /// Advance to a new stage with its image; stages never regress.
    pub fn advance_to(&mut self, stage: u8, image: impl Into<String>) {
        if stage >= self.stage {
            self.stage = stage;
            self.image = image.into();
        }
    }
}

/// An awarded badge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    /// Server-assigned id.
    #[serde(rename = "badge_id")]
    pub id: BadgeId,
    /// Owner.
    #[serde(default)]
    pub user_id: UserId,
    /// Badge name.
    #[serde(rename = "badge_name")]
    pub name: String,
    /// Icon reference, when the server provides one.
    #[serde(default)]
    pub icon: Option<String>,
    /// When it was awarded.
    #[serde(default)]
    pub awarded_at: TimeStamp,
}

impl Badge {
    /// Rare badges render as floating flowers in the garden.
    pub fn is_rare(&self) -> bool {
        let name = self.name.to_lowercase();
        ["rare", "milestone", "consistent"]
            .iter()
            .any(|needle| name.contains(needle))
    }
}

/// The user's streak/xp/level triple pushed by `user_state_update`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserVitals {
    /// Consecutive active days.
    pub streak: u32,
    /// Experience points.
    pub xp: u64,
    /// Derived level.
    pub level: u32,
}

/// Aggregate garden state: a snapshot of everything one garden renders.
///
/// Not separately persisted client-side; rebuilt from each
/// `/api/garden-state` pull and patched by push deltas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GardenState {
    /// Experience points.
    #[serde(default)]
    pub xp: u64,
    /// Consecutive active days.
    #[serde(default)]
    pub streak: u32,
    /// Derived level.
    #[serde(default)]
    pub level: u32,
    /// Ordered plants.
    #[serde(default)]
    pub plants: Vec<Plant>,
    /// Ordered badges.
    #[serde(default)]
    pub badges: Vec<Badge>,
    /// Personal goals the garden renders as flowers.
    #[serde(default)]
    pub goals: Vec<Goal>,
}

impl GardenState {
    /// Tree-of-insight growth fraction: xp/1000 capped at 1.
    pub fn tree_growth(&self) -> f32 {
        (self.xp as f32 / 1000.0).min(1.0)
    }

    /// Rendered tree height in layout units: 200 base plus growth.
    pub fn tree_height(&self) -> f32 {
        200.0 + self.tree_growth() * 300.0
    }

    /// Overwrite the vitals triple.
    pub fn apply_vitals(&mut self, vitals: UserVitals) {
        self.xp = vitals.xp;
        self.streak = vitals.streak;
        self.level = vitals.level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plant_stage_never_regresses() {
        let mut p = Plant {
            id: PlantId::new(1),
            user_id: UserId::new(1),
            stage: 2,
            image: "s2.png".into(),
        };
        p.advance_to(1, "s1.png");
        assert_eq!(p.stage, 2);
        assert_eq!(p.image, "s2.png");
        p.advance_to(3, "s3.png");
        assert_eq!(p.stage, 3);
    }

    #[test]
    fn rare_badge_detection_is_case_insensitive() {
        let mut b = Badge {
            name: "Milestone Master".into(),
            ..Badge::default()
        };
        assert!(b.is_rare());
        b.name = "Early Bird".into();
        assert!(!b.is_rare());
        b.name = "CONSISTENT grower".into();
        assert!(b.is_rare());
    }

    #[test]
    fn tree_growth_caps_at_one() {
        let mut g = GardenState {
            xp: 500,
            ..GardenState::default()
        };
        assert!((g.tree_growth() - 0.5).abs() < f32::EPSILON);
        g.xp = 5000;
        assert!((g.tree_growth() - 1.0).abs() < f32::EPSILON);
        assert!((g.tree_height() - 500.0).abs() < f32::EPSILON);
    }
}
