//! Shared domain types for the pressroom platform.
//!
//! This crate provides the row types used across the pressroom crates. It is
//! the only internal dependency the other crates share, which keeps the
//! dependency graph flat: `pressroom-db` maps database rows into these types,
//! and `pressroom-server` serializes them straight onto the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A published or draft post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Internal database ID.
    pub id: i64,
    /// Post title.
    pub title: String,
    /// Body text. Drafts may not have one yet.
    pub content: Option<String>,
    /// Whether the post is visible to readers. Defaults to `false` on insert.
    pub published: bool,
    /// Creation timestamp, assigned by the database.
    pub created_at: DateTime<Utc>,
}

/// A comment attached to a [`Post`].
///
/// Comments keep their post alive: the schema forbids deleting a post that
/// still has comments (restrict-on-delete), while post ID changes propagate
/// (cascade-on-update).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Internal database ID.
    pub id: i64,
    /// ID of the post this comment belongs to.
    pub post_id: i64,
    /// Comment body.
    pub content: String,
    /// Creation timestamp, assigned by the database.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn post_serializes_with_nullable_content() {
        let post = Post {
            id: 1,
            title: "Hello".to_string(),
            content: None,
            published: false,
            created_at: Utc.with_ymd_and_hms(2025, 1, 14, 9, 0, 0).unwrap(),
        };

        let json = serde_json::to_value(&post).expect("should serialize");
        assert_eq!(json["id"], 1);
        assert_eq!(json["title"], "Hello");
        assert!(json["content"].is_null());
        assert_eq!(json["published"], false);
        assert_eq!(json["created_at"], "2025-01-14T09:00:00Z");
    }

    #[test]
    fn comment_roundtrips_through_json() {
        let comment = Comment {
            id: 7,
            post_id: 3,
            content: "First!".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 14, 9, 5, 0).unwrap(),
        };

        let json = serde_json::to_string(&comment).expect("should serialize");
        let back: Comment = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(back, comment);
    }
}
