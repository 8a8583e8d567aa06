//! HTTP handlers for posts
//!
//! Bodies that fail to parse or miss a field answer 400 "Invalid request
//! body"; malformed ids answer 400 "Invalid UUID format".

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::model::{PostRequest, PostResponse};
use crate::error::{Error, Result};
use crate::state::AppState;

fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| {
        tracing::error!(id = raw, error = %e, "Invalid UUID");
        Error::BadRequest("Invalid UUID format".to_string())
    })
}

fn parse_body(body: std::result::Result<Json<PostRequest>, JsonRejection>) -> Result<PostRequest> {
    let Json(request) = body.map_err(|e| {
        tracing::debug!(error = %e, "Rejected post body");
        Error::BadRequest("Invalid request body".to_string())
    })?;

    request.validate().map_err(|reason| {
        tracing::debug!(%reason, "Rejected post body");
        Error::BadRequest("Invalid request body".to_string())
    })?;

    Ok(request)
}

/// `GET /api/posts`
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<PostResponse>>> {
    let posts = state.posts().get_all().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to get all posts");
        Error::Internal("Failed to get posts".to_string())
    })?;

    Ok(Json(posts.into_iter().map(PostResponse::from).collect()))
}

/// `GET /api/post/{id}`
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostResponse>> {
    let id = parse_id(&id)?;

    match state.posts().get_by_id(id).await {
        Ok(post) => Ok(Json(post.into())),
        Err(e) if e.is_not_found() => Err(Error::NotFound("Post not found".to_string())),
        Err(e) => {
            tracing::error!(%id, error = %e, "Failed to get post by ID");
            Err(Error::Internal("Failed to get post".to_string()))
        }
    }
}

/// `POST /api/posts`
pub async fn create_post(
    State(state): State<AppState>,
    body: std::result::Result<Json<PostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PostResponse>)> {
    let request = parse_body(body)?;

    let post = state
        .posts()
        .create(&request.title, &request.content)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create post");
            Error::Internal("Failed to create post".to_string())
        })?;

    tracing::info!(id = %post.id, "Post created");
    Ok((StatusCode::CREATED, Json(post.into())))
}

/// `PUT /api/post/{id}`
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<PostRequest>, JsonRejection>,
) -> Result<Json<PostResponse>> {
    let id = parse_id(&id)?;
    let request = parse_body(body)?;

    match state
        .posts()
        .update(id, &request.title, &request.content)
        .await
    {
        Ok(post) => Ok(Json(post.into())),
        Err(e) if e.is_not_found() => Err(Error::NotFound("Post not found".to_string())),
        Err(e) => {
            tracing::error!(%id, error = %e, "Failed to update post");
            Err(Error::Internal("Failed to update post".to_string()))
        }
    }
}

/// `DELETE /api/post/{id}`: 200 with an empty body
pub async fn delete_post(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    let id = parse_id(&id)?;

    state.posts().delete(id).await.map_err(|e| {
        tracing::error!(%id, error = %e, "Failed to delete post");
        Error::Internal("Failed to delete post".to_string())
    })?;

    Ok(StatusCode::OK)
}
