//! Route table

use axum::{routing::get, Router};

use crate::{
    auth::oauth::handlers as oauth, health, post::handlers as posts, state::AppState,
    user::handlers as users,
};

/// All routes, with state attached and no middleware
///
/// [`crate::server::Server`] adds the middleware stack.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::readiness))
        .route("/api/login/oauth/{provider}", get(oauth::start))
        .route("/api/oauth/{provider}/callback", get(oauth::callback))
        .route("/api/posts", get(posts::list_posts).post(posts::create_post))
        .route(
            "/api/post/{id}",
            get(posts::get_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        .route("/api/users/{id}", get(users::get_user))
        .with_state(state)
}
