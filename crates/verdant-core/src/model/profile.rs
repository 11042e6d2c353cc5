//! User profile.

use crate::identifiers::UserId;
use crate::model::garden::Badge;
use serde::{Deserialize, Serialize};

/// Profile data from `/api/profile`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// User id.
    pub id: UserId,
    /// Account name.
    pub username: String,
    /// Self-described pronouns.
    #[serde(default)]
    pub pronouns: Option<String>,
    /// Chosen title, e.g. "Seedling".
    #[serde(default)]
    pub title: Option<String>,
    /// Profile quote.
    #[serde(default)]
    pub quote: Option<String>,
    /// Earned badges.
    #[serde(default)]
    pub badges: Vec<Badge>,
}
