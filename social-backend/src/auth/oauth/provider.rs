//! OAuth provider trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Endpoints used by a provider adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthEndpoints {
    /// Authorization endpoint the browser is sent to
    pub auth_url: String,
    /// Token endpoint for the code exchange
    pub token_url: String,
    /// User-info endpoint, or API base URL for providers with several
    pub userinfo_url: String,
}

/// Everything an adapter needs to talk to its provider
#[derive(Debug, Clone)]
pub struct AuthorizationConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Where the provider sends the browser back to
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub endpoints: OAuthEndpoints,
}

/// OAuth tokens received from a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthTokens {
    pub access_token: String,

    /// Refresh token (if provided)
    pub refresh_token: Option<String>,

    /// Token lifetime in seconds (if provided)
    pub expires_in: Option<u64>,

    /// Token type (usually "Bearer")
    pub token_type: String,
}

/// Identity the provider vouches for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthUserInfo {
    pub email: String,
    pub username: String,
}

/// Errors raised by provider adapters
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Adapter could not be built from configuration
    #[error("invalid {provider} provider configuration: {message}")]
    InvalidConfig {
        provider: &'static str,
        message: String,
    },

    /// Callback carried no authorization code
    #[error("authorization code is missing")]
    MissingCode,

    #[error("{provider} token exchange failed: {message}")]
    TokenExchange {
        provider: &'static str,
        message: String,
    },

    /// Transport failure or non-success status from a provider API
    #[error("{provider} request failed: {message}")]
    Request {
        provider: &'static str,
        message: String,
    },

    /// Provider answered but left out something we need
    #[error("{provider} response is missing {field}")]
    MissingField {
        provider: &'static str,
        field: &'static str,
    },
}

/// OAuth provider trait
///
/// Implementations wrap one identity provider's authorization-code exchange
/// and user-info retrieval. Instances are built once at startup and shared
/// behind `Arc<dyn OAuthProvider>`.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Registry key and path segment (e.g. "google", "github")
    fn name(&self) -> &str;

    fn authorization_config(&self) -> &AuthorizationConfig;

    /// Build the authorization URL for redirecting users
    ///
    /// The URL carries `state` verbatim, `access_type=offline`,
    /// `response_type=code`, the client id, redirect URI and scopes. Calling it
    /// twice with the same state yields the same URL.
    fn authorization_url(&self, state: &str) -> String;

    /// Exchange an authorization code for tokens (single attempt)
    async fn exchange_code(&self, code: &str) -> Result<OAuthTokens, ProviderError>;

    /// Fetch the user's email and display name
    async fn get_user_info(&self, tokens: &OAuthTokens) -> Result<OAuthUserInfo, ProviderError>;
}
