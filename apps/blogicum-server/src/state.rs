//! Application state - shared across all handlers.

use std::sync::Arc;

use blogicum_core::PageRequest;
use blogicum_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PasswordService, PostRepository,
    TokenService, UserRepository,
};
use blogicum_infra::{Argon2PasswordService, JwtTokenService, MemoryStore};

#[cfg(feature = "postgres")]
use blogicum_infra::database::{
    DatabaseConnections, PostgresCategoryRepository, PostgresCommentRepository,
    PostgresLocationRepository, PostgresPostRepository, PostgresUserRepository,
};

use crate::config::AppConfig;

/// Where the blog data lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Postgres,
    Memory,
}

impl Storage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Storage::Postgres => "postgres",
            Storage::Memory => "memory",
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub posts_per_page: u64,
    pub storage: Storage,
}

impl AppState {
    /// Build the state from configuration, falling back to the in-memory
    /// store when no database is configured or reachable.
    pub async fn new(config: &AppConfig) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        #[cfg(feature = "postgres")]
        let connected = Self::connect(config, tokens.clone(), passwords.clone()).await;

        #[cfg(not(feature = "postgres"))]
        let connected: Option<Self> = {
            tracing::info!("Running without postgres feature - using in-memory store");
            None
        };

        if let Some(state) = connected {
            return state;
        }

        let state = Self::in_memory(MemoryStore::new(), tokens, passwords, config.posts_per_page);
        tracing::info!("Application state initialized (memory)");
        state
    }

    #[cfg(feature = "postgres")]
    async fn connect(
        config: &AppConfig,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
    ) -> Option<Self> {
        let Some(db_config) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return None;
        };

        match DatabaseConnections::init(db_config).await {
            Ok(connections) => {
                let db = connections.main;
                tracing::info!("Application state initialized (postgres)");
                Some(Self {
                    users: Arc::new(PostgresUserRepository::new(db.clone())),
                    categories: Arc::new(PostgresCategoryRepository::new(db.clone())),
                    locations: Arc::new(PostgresLocationRepository::new(db.clone())),
                    posts: Arc::new(PostgresPostRepository::new(db.clone())),
                    comments: Arc::new(PostgresCommentRepository::new(db)),
                    tokens,
                    passwords,
                    posts_per_page: config.posts_per_page,
                    storage: Storage::Postgres,
                })
            }
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                None
            }
        }
    }

    /// State backed entirely by `store`.
    pub fn in_memory(
        store: MemoryStore,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
        posts_per_page: u64,
    ) -> Self {
        Self {
            users: Arc::new(store.clone()),
            categories: Arc::new(store.clone()),
            locations: Arc::new(store.clone()),
            posts: Arc::new(store.clone()),
            comments: Arc::new(store),
            tokens,
            passwords,
            posts_per_page,
            storage: Storage::Memory,
        }
    }

    /// Page `page` of a list view.
    pub fn page(&self, page: u64) -> PageRequest {
        PageRequest::new(page, self.posts_per_page)
    }
}
