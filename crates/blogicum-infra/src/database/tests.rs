#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{Duration, Utc};
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, RuntimeErr, Value};
    use uuid::Uuid;

    use crate::database::entity::{category, comment, post, user};
    use crate::database::postgres_base::query_error;
    use crate::database::postgres_repo::{
        PostgresCategoryRepository, PostgresCommentRepository, PostgresPostRepository,
    };
    use blogicum_core::PageRequest;
    use blogicum_core::domain::Post;
    use blogicum_core::error::RepoError;
    use blogicum_core::ports::{
        BaseRepository, CategoryRepository, CommentRepository, PostFilter, PostRepository,
    };

    fn user_model(id: Uuid, username: &str) -> user::Model {
        let now = Utc::now();
        user::Model {
            id,
            username: username.to_owned(),
            first_name: String::new(),
            last_name: String::new(),
            email: format!("{username}@example.com"),
            password_hash: "hash".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn post_model(id: Uuid, author_id: Uuid, category_id: Option<Uuid>) -> post::Model {
        let now = Utc::now();
        post::Model {
            id,
            author_id,
            title: "Test Post".to_owned(),
            text: "Content".to_owned(),
            image: None,
            pub_date: (now - Duration::hours(1)).into(),
            is_published: true,
            category_id,
            location_id: None,
            created_at: now.into(),
        }
    }

    #[tokio::test]
    async fn test_find_post_details_joins_author_and_category() {
        let post_id = Uuid::new_v4();
        let author_id = Uuid::new_v4();
        let category_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[post_model(post_id, author_id, Some(category_id))]])
            .append_query_results([[user_model(author_id, "anna")]])
            .append_query_results([[category::Model {
                id: category_id,
                title: "Travel".to_owned(),
                description: "Trips".to_owned(),
                slug: "travel".to_owned(),
                is_published: true,
                created_at: Utc::now().into(),
            }]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let details = repo.find_details(post_id).await.unwrap().unwrap();

        assert_eq!(details.post.id, post_id);
        assert_eq!(details.author.username, "anna");
        assert_eq!(details.category.unwrap().slug, "travel");
        assert!(details.location.is_none());
    }

    #[tokio::test]
    async fn test_find_missing_post_details() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<post::Model>::new()])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        assert!(repo.find_details(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_by_author_returns_requested_page() {
        let author_id = Uuid::new_v4();
        let post_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[BTreeMap::from([("num_items", Value::from(1i64))])]])
            .append_query_results([[post_model(post_id, author_id, None)]])
            .append_query_results([[user_model(author_id, "anna")]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let page = repo
            .list_by_author(author_id, PageRequest::first())
            .await
            .unwrap();

        assert_eq!(page.total_items, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.items[0].post.id, post_id);
    }

    #[tokio::test]
    async fn test_page_past_the_end_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[BTreeMap::from([("num_items", Value::from(3i64))])]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let result = repo
            .list_published(Utc::now(), Default::default(), PageRequest::new(2, 10))
            .await;

        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    /// SQL of every statement the connection ran, in order.
    fn executed_sql(repo: PostgresPostRepository) -> Vec<String> {
        repo.db
            .into_transaction_log()
            .iter()
            .flat_map(|txn| txn.statements().iter().map(|stmt| stmt.sql.clone()))
            .collect()
    }

    fn empty_page_db() -> sea_orm::DatabaseConnection {
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[BTreeMap::from([("num_items", Value::from(0i64))])]])
            .append_query_results([Vec::<post::Model>::new()])
            .into_connection()
    }

    #[tokio::test]
    async fn test_list_published_query_applies_visibility() {
        let repo = PostgresPostRepository::new(empty_page_db());
        let page = repo
            .list_published(Utc::now(), Default::default(), PageRequest::first())
            .await
            .unwrap();
        assert!(page.items.is_empty());

        let sql = executed_sql(repo);
        assert_eq!(sql.len(), 2);
        for stmt in &sql {
            assert!(stmt.contains(
                r#"LEFT JOIN "categories" ON "posts"."category_id" = "categories"."id""#
            ));
            assert!(stmt.contains(r#""posts"."is_published" = "#));
            assert!(stmt.contains(r#""posts"."pub_date" <= "#));
            assert!(stmt.contains(
                r#""posts"."category_id" IS NULL OR "categories"."is_published" = "#
            ));
        }
        assert!(sql[0].starts_with("SELECT COUNT(*)"));
        assert!(sql[1].contains(
            r#"ORDER BY "posts"."pub_date" DESC, "posts"."created_at" DESC, "posts"."id" ASC"#
        ));
        assert!(sql[1].contains("LIMIT"));
    }

    #[tokio::test]
    async fn test_list_published_query_narrows_to_category_and_author() {
        let repo = PostgresPostRepository::new(empty_page_db());
        let filter = PostFilter {
            category_id: Some(Uuid::new_v4()),
            author_id: Some(Uuid::new_v4()),
        };
        repo.list_published(Utc::now(), filter, PageRequest::first())
            .await
            .unwrap();

        let sql = executed_sql(repo);
        assert!(sql[1].contains(r#""posts"."category_id" = "#));
        assert!(sql[1].contains(r#""posts"."author_id" = "#));
        assert!(sql[1].contains(r#""categories"."is_published" = "#));
    }

    #[tokio::test]
    async fn test_list_by_author_skips_visibility_filters() {
        let repo = PostgresPostRepository::new(empty_page_db());
        repo.list_by_author(Uuid::new_v4(), PageRequest::first())
            .await
            .unwrap();

        let sql = executed_sql(repo);
        assert!(sql[1].contains(r#""posts"."author_id" = "#));
        assert!(!sql[1].contains("JOIN"));
        assert!(!sql[1].contains(r#""posts"."is_published" = "#));
    }

    #[tokio::test]
    async fn test_find_category_by_slug() {
        let id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[category::Model {
                id,
                title: "Food".to_owned(),
                description: "Recipes".to_owned(),
                slug: "food".to_owned(),
                is_published: false,
                created_at: Utc::now().into(),
            }]])
            .into_connection();

        let repo = PostgresCategoryRepository::new(db);
        let category = repo.find_by_slug("food").await.unwrap().unwrap();

        assert_eq!(category.id, id);
        assert!(!category.is_published);
    }

    #[tokio::test]
    async fn test_comments_come_with_their_authors() {
        let post_id = Uuid::new_v4();
        let author_id = Uuid::new_v4();
        let now = Utc::now();

        let rows = vec![(
            comment::Model {
                id: Uuid::new_v4(),
                post_id,
                author_id,
                text: "First!".to_owned(),
                created_at: now.into(),
            },
            user_model(author_id, "boris"),
        )];

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([rows])
            .into_connection();

        let repo = PostgresCommentRepository::new(db);
        let comments = repo.list_for_post(post_id).await.unwrap();

        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].author.username, "boris");
        assert_eq!(comments[0].comment.text, "First!");
    }

    #[tokio::test]
    async fn test_create_post_inserts_row() {
        let author_id = Uuid::new_v4();
        let post = Post::new(author_id, "Test Post".into(), "Content".into(), Utc::now());
        let stored = post_model(post.id, author_id, None);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let saved = BaseRepository::<Post, Uuid>::create(&repo, post.clone())
            .await
            .unwrap();

        assert_eq!(saved.id, post.id);
        assert_eq!(saved.author_id, author_id);
    }

    #[tokio::test]
    async fn test_delete_missing_post_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let result = BaseRepository::<Post, Uuid>::delete(&repo, Uuid::new_v4()).await;

        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[test]
    fn test_db_errors_are_classified() {
        let refused = DbErr::Conn(RuntimeErr::Internal("connection refused".into()));
        assert!(matches!(query_error(refused), RepoError::Connection(_)));

        let duplicate = DbErr::Query(RuntimeErr::Internal(
            "duplicate key value violates unique constraint \"users_username_key\"".into(),
        ));
        assert!(matches!(query_error(duplicate), RepoError::Constraint(_)));

        let syntax = DbErr::Query(RuntimeErr::Internal("syntax error".into()));
        assert!(matches!(query_error(syntax), RepoError::Query(_)));
    }
}
