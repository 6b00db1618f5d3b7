//! In-memory blog store - used when no database is configured, and in tests.
//!
//! Enforces the same unique keys and foreign-key actions as the SQL schema:
//! deleting a user removes their posts and comments, deleting a post removes
//! its comments, and deleting a category or location detaches its posts.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use blogicum_core::domain::{Category, Comment, CommentDetails, Location, Post, PostDetails, User};
use blogicum_core::error::RepoError;
use blogicum_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, LocationRepository, PostFilter,
    PostRepository, UserRepository,
};
use blogicum_core::{Page, PageRequest};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    categories: HashMap<Uuid, Category>,
    locations: HashMap<Uuid, Location>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
}

impl Tables {
    fn details(&self, post: &Post) -> Result<PostDetails, RepoError> {
        let author = self
            .users
            .get(&post.author_id)
            .cloned()
            .ok_or_else(|| RepoError::Query(format!("author of post {} is missing", post.id)))?;

        Ok(PostDetails {
            post: post.clone(),
            author,
            category: post.category_id.and_then(|id| self.categories.get(&id).cloned()),
            location: post.location_id.and_then(|id| self.locations.get(&id).cloned()),
        })
    }

    /// Posts matching `keep`, newest publication first. Ties fall back to
    /// creation time, then id, the same as the SQL ordering.
    fn posts_where(
        &self,
        keep: impl Fn(&PostDetails) -> bool,
    ) -> Result<Vec<PostDetails>, RepoError> {
        let mut posts = self
            .posts
            .values()
            .map(|post| self.details(post))
            .collect::<Result<Vec<_>, _>>()?;

        posts.retain(|details| keep(details));
        posts.sort_by(|a, b| {
            b.post
                .pub_date
                .cmp(&a.post.pub_date)
                .then_with(|| b.post.created_at.cmp(&a.post.created_at))
                .then_with(|| a.post.id.cmp(&b.post.id))
        });
        Ok(posts)
    }

    fn check_user_unique(&self, user: &User) -> Result<(), RepoError> {
        let clash = self.users.values().find(|other| {
            other.id != user.id && (other.username == user.username || other.email == user.email)
        });
        match clash {
            Some(other) if other.username == user.username => Err(RepoError::Constraint(
                "duplicate key value violates unique constraint \"users_username_key\"".into(),
            )),
            Some(_) => Err(RepoError::Constraint(
                "duplicate key value violates unique constraint \"users_email_key\"".into(),
            )),
            None => Ok(()),
        }
    }

    fn check_post_references(&self, post: &Post) -> Result<(), RepoError> {
        if !self.users.contains_key(&post.author_id) {
            return Err(RepoError::Constraint("posts.author_id references no user".into()));
        }
        if post
            .category_id
            .is_some_and(|id| !self.categories.contains_key(&id))
        {
            return Err(RepoError::Constraint(
                "posts.category_id references no category".into(),
            ));
        }
        if post
            .location_id
            .is_some_and(|id| !self.locations.contains_key(&id))
        {
            return Err(RepoError::Constraint(
                "posts.location_id references no location".into(),
            ));
        }
        Ok(())
    }

    fn check_comment_references(&self, comment: &Comment) -> Result<(), RepoError> {
        if !self.posts.contains_key(&comment.post_id) {
            return Err(RepoError::Constraint("comments.post_id references no post".into()));
        }
        if !self.users.contains_key(&comment.author_id) {
            return Err(RepoError::Constraint("comments.author_id references no user".into()));
        }
        Ok(())
    }

    fn remove_post(&mut self, id: Uuid) -> Option<Post> {
        let post = self.posts.remove(&id)?;
        self.comments.retain(|_, c| c.post_id != id);
        Some(post)
    }
}

/// Shared in-memory tables. Clones share the same data.
///
/// Note: Data is lost on process restart.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn create(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&user.id) {
            return Err(RepoError::Constraint("duplicate key users_pkey".into()));
        }
        tables.check_user_unique(&user)?;
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user.id) {
            return Err(RepoError::NotFound);
        }
        tables.check_user_unique(&user)?;
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.users.remove(&id).ok_or(RepoError::NotFound)?;

        let owned: Vec<Uuid> = tables
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in owned {
            tables.remove_post(post_id);
        }
        tables.comments.retain(|_, c| c.author_id != id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl BaseRepository<Category, Uuid> for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn create(&self, category: Category) -> Result<Category, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .categories
            .values()
            .any(|c| c.id == category.id || c.slug == category.slug)
        {
            return Err(RepoError::Constraint(
                "duplicate key value violates unique constraint \"categories_slug_key\"".into(),
            ));
        }
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update(&self, category: Category) -> Result<Category, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.categories.contains_key(&category.id) {
            return Err(RepoError::NotFound);
        }
        if tables
            .categories
            .values()
            .any(|c| c.id != category.id && c.slug == category.slug)
        {
            return Err(RepoError::Constraint(
                "duplicate key value violates unique constraint \"categories_slug_key\"".into(),
            ));
        }
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.categories.remove(&id).ok_or(RepoError::NotFound)?;
        for post in tables.posts.values_mut() {
            if post.category_id == Some(id) {
                post.category_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.categories.values().find(|c| c.slug == slug).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Category>, RepoError> {
        let mut categories: Vec<Category> =
            self.tables.read().await.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(categories)
    }
}

#[async_trait]
impl BaseRepository<Location, Uuid> for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>, RepoError> {
        Ok(self.tables.read().await.locations.get(&id).cloned())
    }

    async fn create(&self, location: Location) -> Result<Location, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.locations.contains_key(&location.id) {
            return Err(RepoError::Constraint("duplicate key locations_pkey".into()));
        }
        tables.locations.insert(location.id, location.clone());
        Ok(location)
    }

    async fn update(&self, location: Location) -> Result<Location, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.locations.contains_key(&location.id) {
            return Err(RepoError::NotFound);
        }
        tables.locations.insert(location.id, location.clone());
        Ok(location)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.locations.remove(&id).ok_or(RepoError::NotFound)?;
        for post in tables.posts.values_mut() {
            if post.location_id == Some(id) {
                post.location_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl LocationRepository for MemoryStore {
    async fn list_all(&self) -> Result<Vec<Location>, RepoError> {
        let mut locations: Vec<Location> =
            self.tables.read().await.locations.values().cloned().collect();
        locations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(locations)
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn create(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.posts.contains_key(&post.id) {
            return Err(RepoError::Constraint("duplicate key posts_pkey".into()));
        }
        tables.check_post_references(&post)?;
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&post.id) {
            return Err(RepoError::NotFound);
        }
        tables.check_post_references(&post)?;
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.remove_post(id).ok_or(RepoError::NotFound)?;
        Ok(())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn find_details(&self, id: Uuid) -> Result<Option<PostDetails>, RepoError> {
        let tables = self.tables.read().await;
        tables.posts.get(&id).map(|post| tables.details(post)).transpose()
    }

    async fn list_published(
        &self,
        now: DateTime<Utc>,
        filter: PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostDetails>, RepoError> {
        let posts = self.tables.read().await.posts_where(|details| {
            details.is_visible_at(now)
                && filter
                    .category_id
                    .is_none_or(|id| details.post.category_id == Some(id))
                && filter
                    .author_id
                    .is_none_or(|id| details.post.author_id == id)
        })?;

        page.slice(posts).map_err(|_| RepoError::NotFound)
    }

    async fn list_by_author(
        &self,
        author_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<PostDetails>, RepoError> {
        let posts = self
            .tables
            .read()
            .await
            .posts_where(|details| details.post.author_id == author_id)?;

        page.slice(posts).map_err(|_| RepoError::NotFound)
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn create(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.comments.contains_key(&comment.id) {
            return Err(RepoError::Constraint("duplicate key comments_pkey".into()));
        }
        tables.check_comment_references(&comment)?;
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.comments.contains_key(&comment.id) {
            return Err(RepoError::NotFound);
        }
        tables.check_comment_references(&comment)?;
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.comments.remove(&id).ok_or(RepoError::NotFound)?;
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentDetails>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .map(|comment| {
                let author = tables.users.get(&comment.author_id).cloned().ok_or_else(|| {
                    RepoError::Query(format!("author of comment {} is missing", comment.id))
                })?;
                Ok(CommentDetails {
                    comment: comment.clone(),
                    author,
                })
            })
            .collect::<Result<Vec<_>, RepoError>>()?;

        comments.sort_by(|a, b| a.comment.created_at.cmp(&b.comment.created_at));
        Ok(comments)
    }
}
