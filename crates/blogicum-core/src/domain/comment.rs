use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::User;
use super::label::short_label;
use super::post::Authored;

/// Comment entity - a reader's reply attached to one post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Create a comment bound to `post_id` and `author_id`.
    pub fn new(post_id: Uuid, author_id: Uuid, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            text,
            created_at: Utc::now(),
        }
    }

    pub fn label(&self) -> String {
        short_label(self.id, &self.text)
    }
}

impl Authored for Comment {
    fn author_id(&self) -> Uuid {
        self.author_id
    }
}

/// A comment joined with its author.
#[derive(Debug, Clone)]
pub struct CommentDetails {
    pub comment: Comment,
    pub author: User,
}
