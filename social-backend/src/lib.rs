//! # social-backend
//!
//! Posts backend with OAuth2 login (Google, GitHub), backed by PostgreSQL.
//!
//! ## Features
//!
//! - **OAuth2 login**: provider redirect, callback handling, find-or-create of local users
//! - **Posts**: CRUD over `/api/posts` and `/api/post/{id}`
//! - **Middleware stack**: request tracking, panic recovery, body size limits, compression
//! - **Health checks**: Liveness and readiness probes
//! - **Graceful shutdown**: SIGTERM and SIGINT with a bounded drain
//!
//! ## Example
//!
//! ```rust,no_run
//! use social_backend::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let (config, mut warnings) = Config::load()?;
//!     init_tracing(&config)?;
//!     warnings.flush();
//!
//!     let pool = database::create_pool(&config).await?;
//!     let state = AppState::builder()
//!         .config(config.clone())
//!         .db_pool(pool)
//!         .build()?;
//!
//!     Server::new(config).serve(router(state)).await
//! }
//! ```

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod health;
pub mod middleware;
pub mod observability;
pub mod post;
pub mod routes;
pub mod server;
pub mod state;
pub mod user;

#[cfg(test)]
pub(crate) mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::auth::oauth::{
        OAuthFlow, OAuthFlowError, OAuthProvider, ProviderError, ProviderRegistry,
    };
    pub use crate::config::{Config, ConfigError, ConfigWarnings};
    pub use crate::database;
    pub use crate::error::{DatabaseError, DatabaseErrorKind, DatabaseOperation, Error, Result};
    pub use crate::health::{health, readiness};
    pub use crate::middleware::{
        request_id_layer, request_id_propagation_layer, sensitive_headers_layer,
    };
    pub use crate::observability::init_tracing;
    pub use crate::post::{PostStore, PgPostStore};
    pub use crate::routes::router;
    pub use crate::server::Server;
    pub use crate::state::{AppState, AppStateBuilder};
    pub use crate::user::{PgUserStore, UserStore};
}
