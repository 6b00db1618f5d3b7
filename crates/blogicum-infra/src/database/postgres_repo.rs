//! PostgreSQL repository implementations.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Condition;
use sea_orm::{
    ColumnTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Select,
};
use uuid::Uuid;

use blogicum_core::domain::{Category, CommentDetails, Location, PostDetails, User};
use blogicum_core::error::RepoError;
use blogicum_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostFilter, PostRepository,
    UserRepository,
};
use blogicum_core::{Page, PageRequest};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::location::{self, Entity as LocationEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL location repository.
pub type PostgresLocationRepository = PostgresBaseRepository<LocationEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn list_all(&self) -> Result<Vec<Category>, RepoError> {
        let result = CategoryEntity::find()
            .order_by_asc(category::Column::Title)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl LocationRepository for PostgresLocationRepository {
    async fn list_all(&self) -> Result<Vec<Location>, RepoError> {
        let result = LocationEntity::find()
            .order_by_asc(location::Column::Name)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

impl PostgresPostRepository {
    /// Load authors, categories and locations of `posts` with one query each.
    async fn attach(&self, posts: Vec<post::Model>) -> Result<Vec<PostDetails>, RepoError> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let author_ids: HashSet<Uuid> = posts.iter().map(|p| p.author_id).collect();
        let category_ids: HashSet<Uuid> = posts.iter().filter_map(|p| p.category_id).collect();
        let location_ids: HashSet<Uuid> = posts.iter().filter_map(|p| p.location_id).collect();

        let authors: HashMap<Uuid, User> = UserEntity::find()
            .filter(user::Column::Id.is_in(author_ids))
            .all(&self.db)
            .await
            .map_err(query_error)?
            .into_iter()
            .map(|m| (m.id, m.into()))
            .collect();

        let categories: HashMap<Uuid, Category> = if category_ids.is_empty() {
            HashMap::new()
        } else {
            CategoryEntity::find()
                .filter(category::Column::Id.is_in(category_ids))
                .all(&self.db)
                .await
                .map_err(query_error)?
                .into_iter()
                .map(|m| (m.id, m.into()))
                .collect()
        };

        let locations: HashMap<Uuid, Location> = if location_ids.is_empty() {
            HashMap::new()
        } else {
            LocationEntity::find()
                .filter(location::Column::Id.is_in(location_ids))
                .all(&self.db)
                .await
                .map_err(query_error)?
                .into_iter()
                .map(|m| (m.id, m.into()))
                .collect()
        };

        posts
            .into_iter()
            .map(|model| {
                let author = authors.get(&model.author_id).cloned().ok_or_else(|| {
                    RepoError::Query(format!("author of post {} is missing", model.id))
                })?;
                let category = model.category_id.and_then(|id| categories.get(&id).cloned());
                let location = model.location_id.and_then(|id| locations.get(&id).cloned());

                Ok(PostDetails {
                    post: model.into(),
                    author,
                    category,
                    location,
                })
            })
            .collect()
    }

    async fn fetch_page(
        &self,
        query: Select<PostEntity>,
        page: PageRequest,
    ) -> Result<Page<PostDetails>, RepoError> {
        // Ties on pub_date must not shift between pages.
        let paginator = query
            .order_by_desc(post::Column::PubDate)
            .order_by_desc(post::Column::CreatedAt)
            .order_by_asc(post::Column::Id)
            .paginate(&self.db, page.per_page);

        let total_items = paginator.num_items().await.map_err(query_error)?;
        page.check(total_items).map_err(|_| RepoError::NotFound)?;

        let models = paginator
            .fetch_page(page.page - 1)
            .await
            .map_err(query_error)?;

        Ok(Page::new(self.attach(models).await?, page, total_items))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_details(&self, id: Uuid) -> Result<Option<PostDetails>, RepoError> {
        let Some(model) = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_error)?
        else {
            return Ok(None);
        };

        Ok(self.attach(vec![model]).await?.pop())
    }

    async fn list_published(
        &self,
        now: DateTime<Utc>,
        filter: PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostDetails>, RepoError> {
        let mut query = PostEntity::find()
            .join(JoinType::LeftJoin, post::Relation::Category.def())
            .filter(post::Column::IsPublished.eq(true))
            .filter(post::Column::PubDate.lte(now))
            .filter(
                Condition::any()
                    .add(post::Column::CategoryId.is_null())
                    .add(category::Column::IsPublished.eq(true)),
            );

        if let Some(category_id) = filter.category_id {
            query = query.filter(post::Column::CategoryId.eq(category_id));
        }
        if let Some(author_id) = filter.author_id {
            query = query.filter(post::Column::AuthorId.eq(author_id));
        }

        self.fetch_page(query, page).await
    }

    async fn list_by_author(
        &self,
        author_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<PostDetails>, RepoError> {
        let query = PostEntity::find().filter(post::Column::AuthorId.eq(author_id));
        self.fetch_page(query, page).await
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentDetails>, RepoError> {
        let rows = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .find_also_related(UserEntity)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        rows.into_iter()
            .map(|(comment, author)| {
                let author = author.ok_or_else(|| {
                    RepoError::Query(format!("author of comment {} is missing", comment.id))
                })?;
                Ok(CommentDetails {
                    comment: comment.into(),
                    author: author.into(),
                })
            })
            .collect()
    }
}
