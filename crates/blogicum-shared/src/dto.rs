//! Data Transfer Objects - the documents each view renders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use blogicum_core::Page;
use blogicum_core::domain::{Category, CommentDetails, Location, PostDetails, User};

use crate::forms::{CommentForm, PostForm, UserUpdateForm};

/// Public part of a user - never the email or password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorView {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for AuthorView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

/// Profile header with the date the user joined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileView {
    #[serde(flatten)]
    pub author: AuthorView,
    pub display_name: String,
    pub joined_at: DateTime<Utc>,
}

impl From<&User> for ProfileView {
    fn from(user: &User) -> Self {
        Self {
            author: AuthorView::from(user),
            display_name: user.display_name(),
            joined_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryView {
    pub id: Uuid,
    pub label: String,
    pub title: String,
    pub description: String,
    pub slug: String,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            label: category.label(),
            title: category.title.clone(),
            description: category.description.clone(),
            slug: category.slug.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationView {
    pub id: Uuid,
    pub label: String,
    pub name: String,
}

impl From<&Location> for LocationView {
    fn from(location: &Location) -> Self {
        Self {
            id: location.id,
            label: location.label(),
            name: location.name.clone(),
        }
    }
}

/// A post as shown in lists and on its detail page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub image: Option<String>,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub author: AuthorView,
    pub category: Option<CategoryView>,
    /// Unpublished locations are not shown.
    pub location: Option<LocationView>,
}

impl From<PostDetails> for PostView {
    fn from(details: PostDetails) -> Self {
        let PostDetails {
            post,
            author,
            category,
            location,
        } = details;

        Self {
            id: post.id,
            title: post.title,
            text: post.text,
            image: post.image,
            pub_date: post.pub_date,
            is_published: post.is_published,
            created_at: post.created_at,
            author: AuthorView::from(&author),
            category: category.as_ref().map(CategoryView::from),
            location: location
                .as_ref()
                .filter(|l| l.is_published)
                .map(LocationView::from),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub id: Uuid,
    pub post_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author: AuthorView,
}

impl From<CommentDetails> for CommentView {
    fn from(details: CommentDetails) -> Self {
        Self {
            id: details.comment.id,
            post_id: details.comment.post_id,
            text: details.comment.text,
            created_at: details.comment.created_at,
            author: AuthorView::from(&details.author),
        }
    }
}

/// One page of a list view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageView<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> PageView<T> {
    pub fn from_page<U: Into<T>>(page: Page<U>) -> Self {
        let has_next = page.has_next();
        let has_previous = page.has_previous();
        let page = page.map(Into::into);

        Self {
            items: page.items,
            page: page.page,
            per_page: page.per_page,
            total_items: page.total_items,
            total_pages: page.total_pages,
            has_next,
            has_previous,
        }
    }
}

/// `?page=N` query string of list views.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    #[serde(default = "first_page")]
    pub page: u64,
}

fn first_page() -> u64 {
    1
}

/// Home page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListView {
    pub posts: PageView<PostView>,
}

/// Category page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPostsView {
    pub category: CategoryView,
    pub posts: PageView<PostView>,
}

/// Profile page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilePostsView {
    pub profile: ProfileView,
    pub posts: PageView<PostView>,
}

/// Post detail page: the post, its comments oldest first, and an empty
/// comment form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailView {
    pub post: PostView,
    pub comments: Vec<CommentView>,
    pub form: CommentForm,
}

/// Post create/edit page: current values plus the available choices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostFormView {
    pub form: PostForm,
    pub categories: Vec<CategoryView>,
    pub locations: Vec<LocationView>,
}

/// Post delete confirmation page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDeleteView {
    pub post: PostView,
    pub form: PostForm,
}

/// Comment edit or delete page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentFormView {
    pub comment: CommentView,
    pub form: CommentForm,
}

/// Profile edit page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileFormView {
    pub form: UserUpdateForm,
}

/// Response containing a user's own account information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: String,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}
