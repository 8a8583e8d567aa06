//! OAuth login flow
//!
//! `start` turns a login request into the provider's authorization URL.
//! `callback` validates what the provider sent back, exchanges the code,
//! fetches the identity and resolves it to a local user.
//!
//! Each failure is logged where it is detected and carries its own HTTP
//! status. Nothing is retried. Dropping the returned future (client gone,
//! request timeout) cancels any provider call in flight.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

use super::provider::{OAuthProvider, ProviderError};
use super::registry::ProviderRegistry;
use super::state::{build_callback, encode_state, CallbackTarget, StateError};
use crate::error::{json_error, DatabaseError};
use crate::user::{User, UserStore};

/// Query of `GET /api/login/oauth/{provider}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartParams {
    /// Callback URL the browser should end up on
    pub c: Option<String>,
    /// Final destination, carried through the callback as `r`
    pub r: Option<String>,
}

/// Query of `GET /api/oauth/{provider}/callback`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Provider reported an error; send the browser back to the callback
    Redirect(String),
    /// Login completed
    Authenticated(User),
}

#[derive(Debug, Error)]
pub enum OAuthFlowError {
    #[error("OAuth2 provider '{0}' not found")]
    ProviderNotFound(String),

    #[error("Failed to get callback info: {0}")]
    StateDecode(#[from] StateError),

    #[error("Failed to exchange OAuth2 code for token: {0}")]
    TokenExchange(#[source] ProviderError),

    #[error("Failed to get user info from OAuth2 provider: {0}")]
    UserInfoFetch(#[source] ProviderError),

    #[error("Failed to find or create user: {source}")]
    UserResolution {
        email: String,
        username: String,
        #[source]
        source: DatabaseError,
    },
}

impl OAuthFlowError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ProviderNotFound(_) => StatusCode::NOT_FOUND,
            // a malformed state is reported as a server error, not a 400
            Self::StateDecode(_)
            | Self::TokenExchange(_)
            | Self::UserInfoFetch(_)
            | Self::UserResolution { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for OAuthFlowError {
    fn into_response(self) -> Response {
        json_error(self.status_code(), self.to_string())
    }
}

/// Orchestrates login against the registered providers
pub struct OAuthFlow {
    base_url: String,
    providers: Arc<ProviderRegistry>,
    users: Arc<dyn UserStore>,
}

impl OAuthFlow {
    pub fn new(
        base_url: impl Into<String>,
        providers: Arc<ProviderRegistry>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            providers,
            users,
        }
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    fn provider(&self, name: &str) -> Result<Arc<dyn OAuthProvider>, OAuthFlowError> {
        self.providers.get(name).ok_or_else(|| {
            tracing::error!(provider = name, "OAuth2 provider not found");
            OAuthFlowError::ProviderNotFound(name.to_string())
        })
    }

    /// Authorization URL to redirect the browser to
    ///
    /// Does not contact the provider.
    pub fn start(&self, provider_name: &str, params: &StartParams) -> Result<String, OAuthFlowError> {
        let provider = self.provider(provider_name)?;

        let callback = build_callback(&self.base_url, params.c.as_deref(), params.r.as_deref());
        let state = encode_state(&callback);
        let url = provider.authorization_url(&state);

        tracing::info!(provider = provider_name, %callback, %url, "Redirecting to OAuth2 provider");
        Ok(url)
    }

    /// Finish a login after the provider redirects back
    #[tracing::instrument(skip(self, params), fields(has_error = params.error.is_some()))]
    pub async fn callback(
        &self,
        provider_name: &str,
        params: CallbackParams,
    ) -> Result<CallbackOutcome, OAuthFlowError> {
        let provider = self.provider(provider_name)?;

        let target = CallbackTarget::from_state(params.state.as_deref().unwrap_or_default())
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to get callback info");
                OAuthFlowError::StateDecode(e)
            })?;

        if let Some(redirect_to) = &target.redirect_to {
            // carried through but not acted on until token issuance exists
            tracing::debug!(%redirect_to, "Callback carries redirect target");
        }

        if let Some(error) = params.error.as_deref().filter(|e| !e.is_empty()) {
            let location = target.error_redirect(error);
            tracing::warn!(provider = provider_name, error, %location, "Provider reported an error");
            return Ok(CallbackOutcome::Redirect(location));
        }

        let code = params
            .code
            .filter(|c| !c.is_empty())
            .ok_or(ProviderError::MissingCode)
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to exchange OAuth2 code for token");
                OAuthFlowError::TokenExchange(e)
            })?;

        let tokens = provider.exchange_code(&code).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to exchange OAuth2 code for token");
            OAuthFlowError::TokenExchange(e)
        })?;

        let info = provider.get_user_info(&tokens).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to get user info from OAuth2 provider");
            OAuthFlowError::UserInfoFetch(e)
        })?;

        let user = self
            .users
            .find_or_create(&info.email, &info.username)
            .await
            .map_err(|source| {
                tracing::error!(
                    error = %source,
                    email = %info.email,
                    username = %info.username,
                    "Failed to find or create user"
                );
                OAuthFlowError::UserResolution {
                    email: info.email.clone(),
                    username: info.username.clone(),
                    source,
                }
            })?;

        tracing::info!(user_id = %user.id, email = %user.email, "OAuth2 login completed");
        Ok(CallbackOutcome::Authenticated(user))
    }
}
