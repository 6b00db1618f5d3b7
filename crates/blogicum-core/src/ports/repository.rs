use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Category, Comment, CommentDetails, Location, Post, PostDetails, User};
use crate::error::RepoError;
use crate::pagination::{Page, PageRequest};

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn create(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

/// Category repository.
///
/// Deleting a category leaves its posts in place with no category.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;

    /// All categories ordered by title, for post form choices.
    async fn list_all(&self) -> Result<Vec<Category>, RepoError>;
}

/// Location repository.
///
/// Deleting a location leaves its posts in place with no location.
#[async_trait]
pub trait LocationRepository: BaseRepository<Location, Uuid> {
    /// All locations ordered by name, for post form choices.
    async fn list_all(&self) -> Result<Vec<Location>, RepoError>;
}

/// Narrowing applied on top of the public visibility rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub category_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
}

impl PostFilter {
    pub fn category(category_id: Uuid) -> Self {
        Self {
            category_id: Some(category_id),
            ..Self::default()
        }
    }

    pub fn author(author_id: Uuid) -> Self {
        Self {
            author_id: Some(author_id),
            ..Self::default()
        }
    }
}

/// Post repository.
///
/// Every listing is ordered by `pub_date` descending.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// A single post joined with author, category and location.
    async fn find_details(&self, id: Uuid) -> Result<Option<PostDetails>, RepoError>;

    /// Posts visible to anonymous visitors at `now`: published, `pub_date`
    /// reached, and category (if any) published.
    async fn list_published(
        &self,
        now: DateTime<Utc>,
        filter: PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostDetails>, RepoError>;

    /// Every post of one author regardless of visibility.
    async fn list_by_author(
        &self,
        author_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<PostDetails>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments of one post, oldest first.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentDetails>, RepoError>;
}
