//! OAuth provider implementations

pub mod github;
pub mod google;

use oauth2::{
    basic::{BasicErrorResponse, BasicTokenType},
    AuthUrl, Client, ClientId, ClientSecret, CsrfToken, EmptyExtraTokenFields, RedirectUrl,
    Scope, StandardRevocableToken, StandardTokenIntrospectionResponse, StandardTokenResponse,
    TokenResponse, TokenUrl,
};
use reqwest::Client as HttpClient;

use super::provider::{AuthorizationConfig, OAuthTokens, ProviderError};

/// Type alias for our configured OAuth client
pub(crate) type ConfiguredClient = Client<
    BasicErrorResponse,
    StandardTokenResponse<EmptyExtraTokenFields, BasicTokenType>,
    StandardTokenIntrospectionResponse<EmptyExtraTokenFields, BasicTokenType>,
    StandardRevocableToken,
    BasicErrorResponse,
    oauth2::EndpointSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointSet,
>;

/// Build the oauth2 client for an adapter
pub(crate) fn build_client(
    provider: &'static str,
    config: &AuthorizationConfig,
) -> Result<ConfiguredClient, ProviderError> {
    let invalid = |what: &str, e: oauth2::url::ParseError| ProviderError::InvalidConfig {
        provider,
        message: format!("invalid {}: {}", what, e),
    };

    Ok(Client::new(ClientId::new(config.client_id.clone()))
        .set_client_secret(ClientSecret::new(config.client_secret.clone()))
        .set_auth_uri(
            AuthUrl::new(config.endpoints.auth_url.clone()).map_err(|e| invalid("auth URL", e))?,
        )
        .set_token_uri(
            TokenUrl::new(config.endpoints.token_url.clone())
                .map_err(|e| invalid("token URL", e))?,
        )
        .set_redirect_uri(
            RedirectUrl::new(config.redirect_uri.clone())
                .map_err(|e| invalid("redirect URI", e))?,
        ))
}

/// HTTP client shared by the token exchange and API calls
///
/// Redirects are not followed; the oauth2 crate requires this to avoid
/// leaking credentials to a redirect target.
pub(crate) fn build_http_client(provider: &'static str) -> Result<HttpClient, ProviderError> {
    HttpClient::builder()
        .redirect(reqwest::redirect::Policy::none())
        .user_agent(concat!("social-backend/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ProviderError::InvalidConfig {
            provider,
            message: format!("failed to create HTTP client: {}", e),
        })
}

/// Authorization URL with the given state, configured scopes and offline access
pub(crate) fn authorization_url(
    client: &ConfiguredClient,
    scopes: &[String],
    state: &str,
) -> String {
    let state = state.to_string();
    let (url, _) = client
        .authorize_url(move || CsrfToken::new(state))
        .add_scopes(scopes.iter().cloned().map(Scope::new))
        .add_extra_param("access_type", "offline")
        .url();
    url.to_string()
}

pub(crate) fn into_tokens(
    response: StandardTokenResponse<EmptyExtraTokenFields, BasicTokenType>,
) -> OAuthTokens {
    OAuthTokens {
        access_token: response.access_token().secret().clone(),
        refresh_token: response.refresh_token().map(|t| t.secret().clone()),
        expires_in: response.expires_in().map(|d| d.as_secs()),
        token_type: "Bearer".to_string(),
    }
}
