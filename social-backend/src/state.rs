//! Application state shared across handlers

use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    auth::oauth::{OAuthFlow, ProviderRegistry},
    config::Config,
    error::{Error, Result},
    post::{PgPostStore, PostStore},
    user::{PgUserStore, UserStore},
};

/// Application state shared across handlers
///
/// Cheap to clone; everything inside is behind an `Arc` and never mutated
/// after startup.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    oauth: Arc<OAuthFlow>,
    users: Arc<dyn UserStore>,
    posts: Arc<dyn PostStore>,
    db_pool: Option<PgPool>,
}

impl AppState {
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn oauth(&self) -> &OAuthFlow {
        &self.oauth
    }

    pub fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }

    pub fn posts(&self) -> &dyn PostStore {
        self.posts.as_ref()
    }

    /// Pool backing the stores, absent when stores were injected directly
    pub fn db(&self) -> Option<&PgPool> {
        self.db_pool.as_ref()
    }
}

/// Builder for [`AppState`]
///
/// With a pool, the PostgreSQL stores are created from it. Stores and the
/// provider registry can be injected instead, which is how tests run
/// without a database or real providers.
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<Config>,
    db_pool: Option<PgPool>,
    users: Option<Arc<dyn UserStore>>,
    posts: Option<Arc<dyn PostStore>>,
    providers: Option<ProviderRegistry>,
}

impl AppStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn db_pool(mut self, pool: PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    pub fn user_store(mut self, users: Arc<dyn UserStore>) -> Self {
        self.users = Some(users);
        self
    }

    pub fn post_store(mut self, posts: Arc<dyn PostStore>) -> Self {
        self.posts = Some(posts);
        self
    }

    /// Use this registry instead of building one from configuration
    pub fn providers(mut self, providers: ProviderRegistry) -> Self {
        self.providers = Some(providers);
        self
    }

    pub fn build(self) -> Result<AppState> {
        let config = self.config.unwrap_or_default();

        let users: Arc<dyn UserStore> = match (self.users, &self.db_pool) {
            (Some(users), _) => users,
            (None, Some(pool)) => Arc::new(PgUserStore::new(pool.clone())),
            (None, None) => {
                return Err(Error::Internal(
                    "No user store: provide a database pool or a store".to_string(),
                ))
            }
        };

        let posts: Arc<dyn PostStore> = match (self.posts, &self.db_pool) {
            (Some(posts), _) => posts,
            (None, Some(pool)) => Arc::new(PgPostStore::new(pool.clone())),
            (None, None) => {
                return Err(Error::Internal(
                    "No post store: provide a database pool or a store".to_string(),
                ))
            }
        };

        let providers = match self.providers {
            Some(providers) => providers,
            None => ProviderRegistry::from_config(&config)
                .map_err(|e| Error::Internal(format!("Failed to register OAuth providers: {}", e)))?,
        };

        let oauth = OAuthFlow::new(config.base_url(), Arc::new(providers), users.clone());

        Ok(AppState {
            config: Arc::new(config),
            oauth: Arc::new(oauth),
            users,
            posts,
            db_pool: self.db_pool,
        })
    }
}
