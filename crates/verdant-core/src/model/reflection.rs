//! Reflection entries and their comments.

use crate::identifiers::{CorrelationId, GroupId, ReflectionId};
use crate::time::TimeStamp;
use serde::{Deserialize, Serialize};

/// How the author chose to appear on a particular post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Real account name.
    #[default]
    Named,
    /// Per-post pseudonym.
    Pseudonym,
}

/// A comment attached to a reflection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Display identity of the commenter.
    pub author: String,
    /// Comment body.
    pub content: String,
    /// When it was posted.
    #[serde(rename = "createdAt", default)]
    pub created_at: TimeStamp,
}

/// A journal entry, personal or posted into a group feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReflectionEntry {
    /// Server-assigned id.
    pub id: ReflectionId,
    /// Display identity chosen per post; `None` renders as "Anonymous".
    #[serde(default)]
    pub display_name: Option<String>,
    /// Entry body.
    pub content: String,
    /// When it was posted.
    pub created_at: TimeStamp,
    /// Group feed this was posted into, if any.
    #[serde(default)]
    pub group_id: Option<GroupId>,
    /// Ordered tag set; duplicates are rejected on insert.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Ordered comment list.
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Local-only optimistic-insert token; never serialized.
    #[serde(skip)]
    pub correlation: Option<CorrelationId>,
}

impl ReflectionEntry {
    /// The name shown on the card.
    pub fn display(&self) -> &str {
        self.display_name.as_deref().unwrap_or("Anonymous")
    }

    /// Whether this entry belongs to a group feed.
    pub fn is_group(&self) -> bool {
        self.group_id.is_some()
    }

    /// Append a tag, keeping the set ordered and duplicate-free.
    pub fn push_tag(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if tag.is_empty() || self.tags.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Append a comment in arrival order.
    pub fn push_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
    }

    /// Rendered-field equality for the no-change discard.
    pub fn renders_same_as(&self, other: &ReflectionEntry) -> bool {
        self.id == other.id
            && self.display_name == other.display_name
            && self.content == other.content
            && self.created_at == other.created_at
            && self.group_id == other.group_id
            && self.tags == other.tags
            && self.comments == other.comments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_fallback() {
        let r = ReflectionEntry::default();
        assert_eq!(r.display(), "Anonymous");
    }

    #[test]
    fn comment_decodes_the_wire_shape() {
        let comment: Comment = serde_json::from_value(serde_json::json!({
            "author": "moss",
            "content": "lovely",
            "createdAt": 1_700_000_000_000_u64,
        }))
        .unwrap();
        assert_eq!(comment.author, "moss");
        assert_eq!(comment.created_at, TimeStamp::from_millis(1_700_000_000_000));
    }

    #[test]
    fn tags_stay_unique_and_ordered() {
        let mut r = ReflectionEntry::default();
        assert!(r.push_tag("focus"));
        assert!(r.push_tag("growth"));
        assert!(!r.push_tag("focus"));
        assert!(!r.push_tag(""));
        assert_eq!(r.tags, vec!["focus", "growth"]);
    }
}
