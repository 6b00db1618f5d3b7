use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::label::short_label;
use super::{Category, Location, User};

/// Records that belong to exactly one author.
pub trait Authored {
    fn author_id(&self) -> Uuid;

    /// Anonymous requesters never own anything.
    fn is_authored_by(&self, requester: Option<Uuid>) -> bool {
        requester == Some(self.author_id())
    }
}

/// Post entity - a dated publication, optionally filed under a category
/// and a location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub text: String,
    pub image: Option<String>,
    /// Publication moment; a future value delays publication.
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new published post owned by `author_id`.
    pub fn new(author_id: Uuid, title: String, text: String, pub_date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            text,
            image: None,
            pub_date,
            is_published: true,
            category_id: None,
            location_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn at_location(mut self, location_id: Uuid) -> Self {
        self.location_id = Some(location_id);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.is_published = false;
        self
    }

    /// Whether anonymous visitors may see this post at `now`.
    ///
    /// `category` must be the post's own category when it has one.
    pub fn is_visible_at(&self, now: DateTime<Utc>, category: Option<&Category>) -> bool {
        self.is_published
            && self.pub_date <= now
            && category.map(|c| c.is_published).unwrap_or(true)
    }

    pub fn label(&self) -> String {
        short_label(self.id, &self.title)
    }
}

impl Authored for Post {
    fn author_id(&self) -> Uuid {
        self.author_id
    }
}

/// A post joined with the records it references, ready for display.
#[derive(Debug, Clone)]
pub struct PostDetails {
    pub post: Post,
    pub author: User,
    pub category: Option<Category>,
    pub location: Option<Location>,
}

impl PostDetails {
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        self.post.is_visible_at(now, self.category.as_ref())
    }

    /// Authors always see their own posts; everyone else only visible ones.
    pub fn is_visible_to(&self, requester: Option<Uuid>, now: DateTime<Utc>) -> bool {
        self.post.is_authored_by(requester) || self.is_visible_at(now)
    }
}
