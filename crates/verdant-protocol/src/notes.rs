//! Page-local notes.
//!
//! Sibling widgets on one page (a compose form, an animation overlay)
//! decouple through these typed variants instead of stringly-named
//! custom events. Notes are page-scoped and never network-visible.
//!
//! Each note carries the minimal fields the animation layer needs and is
//! published from the mutation's returned entity, never synthesized by
//! reading rendered output back.

use serde::{Deserialize, Serialize};
use verdant_core::{GoalId, GroupId, ReflectionId};

/// A page-scoped notification between sibling widgets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageNote {
    /// The user submitted a reflection and the server confirmed it.
    ReflectionSubmitted {
        /// Confirmed entry id.
        id: ReflectionId,
        /// Entry body, for the overlay card.
        content: String,
        /// Group feed it went to, if any.
        group_id: Option<GroupId>,
    },
    /// The user submitted a goal and the server confirmed it.
    GoalSubmitted {
        /// Confirmed goal id.
        id: GoalId,
        /// Goal title, for the overlay label.
        title: String,
        /// Owning group, if any.
        group_id: Option<GroupId>,
    },
}
