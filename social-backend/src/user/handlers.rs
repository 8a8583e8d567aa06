//! HTTP handlers for users

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use super::model::UserResponse;
use crate::error::{Error, Result};
use crate::state::AppState;

/// `GET /api/users/{id}`
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| Error::BadRequest("Invalid user ID format".to_string()))?;

    match state.users().get_by_id(id).await {
        Ok(user) => Ok(Json(user.into())),
        Err(e) if e.is_not_found() => Err(Error::NotFound("User not found".to_string())),
        Err(e) => {
            tracing::error!(%id, error = %e, "Failed to get user by ID");
            Err(Error::Internal("Failed to get user".to_string()))
        }
    }
}
