//! Identifier types used across the Verdant engine.
//!
//! Each entity family gets its own newtype so a `GoalId` can never be
//! handed to a plant cache. Server-assigned ids are integers; the
//! client-generated [`CorrelationId`] is a uuid minted before an
//! optimistic insert so the server echo can be matched even if the
//! server assigns a different entity id.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
            Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Wrap a raw server-assigned id.
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// The raw integer value.
            pub const fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

entity_id!(
    /// A registered user.
    UserId,
    "user"
);
entity_id!(
    /// A journal reflection entry.
    ReflectionId,
    "reflection"
);
entity_id!(
    /// A comment on a reflection.
    CommentId,
    "comment"
);
entity_id!(
    /// A personal or group goal.
    GoalId,
    "goal"
);
entity_id!(
    /// A garden plant.
    PlantId,
    "plant"
);
entity_id!(
    /// An awarded badge.
    BadgeId,
    "badge"
);
entity_id!(
    /// A reflection group.
    GroupId,
    "group"
);

/// Client-generated token correlating an optimistic insert with its
/// server echo.
///
/// Never sent to the server; lives only in the local cache until the echo
/// arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(pub Uuid);

impl CorrelationId {
    /// Mint a fresh random token.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "corr-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_transparent_in_json() {
        let id = GoalId::new(7);
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
        let back: GoalId = serde_json::from_str("7").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn display_carries_prefix() {
        assert_eq!(PlantId::new(3).to_string(), "plant-3");
        assert_eq!(UserId::new(12).to_string(), "user-12");
    }

    #[test]
    fn default_id_is_zero() {
        // Entities built with struct-update defaults get the zero id;
        // it is a placeholder and never rendered.
        assert_eq!(GoalId::default(), GoalId::new(0));
        assert_eq!(ReflectionId::default().value(), 0);
    }

    #[test]
    fn correlation_ids_are_unique() {
        assert_ne!(CorrelationId::new(), CorrelationId::new());
    }
}
