//! HTTP handlers for the OAuth routes

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};

use super::flow::{CallbackOutcome, CallbackParams, OAuthFlowError, StartParams};
use crate::state::AppState;
use crate::user::UserSummary;

/// `GET /api/login/oauth/{provider}`: 307 to the provider's consent page
pub async fn start(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(params): Query<StartParams>,
) -> Result<Redirect, OAuthFlowError> {
    let url = state.oauth().start(&provider, &params)?;
    Ok(Redirect::temporary(&url))
}

/// `GET /api/oauth/{provider}/callback`
///
/// 200 with `{id, username, email}` on success, 307 back to the caller's
/// callback when the provider reported an error.
pub async fn callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(params): Query<CallbackParams>,
) -> Result<Response, OAuthFlowError> {
    match state.oauth().callback(&provider, params).await? {
        CallbackOutcome::Redirect(location) => Ok(Redirect::temporary(&location).into_response()),
        CallbackOutcome::Authenticated(user) => Ok(Json(UserSummary::from(user)).into_response()),
    }
}
