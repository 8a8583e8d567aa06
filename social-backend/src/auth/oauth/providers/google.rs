//! Google OAuth provider implementation

use async_trait::async_trait;
use oauth2::AuthorizationCode;
use reqwest::Client as HttpClient;
use serde::Deserialize;

use super::{authorization_url, build_client, build_http_client, into_tokens, ConfiguredClient};
use crate::auth::oauth::provider::{
    AuthorizationConfig, OAuthEndpoints, OAuthProvider, OAuthTokens, OAuthUserInfo,
    ProviderError,
};

const PROVIDER: &str = "google";

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

impl OAuthEndpoints {
    /// Google's production endpoints
    pub fn google() -> Self {
        Self {
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
        }
    }
}

/// OIDC userinfo claims we use
#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    email: Option<String>,
    name: Option<String>,
}

/// Google OAuth provider
#[derive(Clone)]
pub struct GoogleProvider {
    config: AuthorizationConfig,
    client: ConfiguredClient,
    http_client: HttpClient,
}

impl GoogleProvider {
    /// Default scopes when none are configured
    pub fn default_scopes() -> Vec<String> {
        vec![
            "openid".to_string(),
            "email".to_string(),
            "profile".to_string(),
        ]
    }

    pub fn new(mut config: AuthorizationConfig) -> Result<Self, ProviderError> {
        if config.scopes.is_empty() {
            config.scopes = Self::default_scopes();
        }

        let client = build_client(PROVIDER, &config)?;
        let http_client = build_http_client(PROVIDER)?;

        Ok(Self {
            config,
            client,
            http_client,
        })
    }
}

#[async_trait]
impl OAuthProvider for GoogleProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn authorization_config(&self) -> &AuthorizationConfig {
        &self.config
    }

    fn authorization_url(&self, state: &str) -> String {
        authorization_url(&self.client, &self.config.scopes, state)
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuthTokens, ProviderError> {
        let token_result = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http_client)
            .await
            .map_err(|e| ProviderError::TokenExchange {
                provider: PROVIDER,
                message: e.to_string(),
            })?;

        Ok(into_tokens(token_result))
    }

    async fn get_user_info(&self, tokens: &OAuthTokens) -> Result<OAuthUserInfo, ProviderError> {
        let request_failed = |message: String| ProviderError::Request {
            provider: PROVIDER,
            message,
        };

        let response = self
            .http_client
            .get(&self.config.endpoints.userinfo_url)
            .bearer_auth(&tokens.access_token)
            .send()
            .await
            .map_err(|e| request_failed(format!("failed to fetch user info: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(request_failed(format!(
                "user info request returned {} - {}",
                status, body
            )));
        }

        let user_info: GoogleUserInfo = response
            .json()
            .await
            .map_err(|e| request_failed(format!("failed to parse user info: {}", e)))?;

        let email = user_info
            .email
            .filter(|e| !e.is_empty())
            .ok_or(ProviderError::MissingField {
                provider: PROVIDER,
                field: "email",
            })?;

        // accounts without a profile name fall back to the mailbox name
        let username = user_info
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| email.split('@').next().unwrap_or(&email).to_string());

        Ok(OAuthUserInfo { email, username })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(endpoints: OAuthEndpoints) -> AuthorizationConfig {
        AuthorizationConfig {
            client_id: "test-client-id".to_string(),
            client_secret: "test-secret".to_string(),
            redirect_uri: "https://example.com/api/oauth/google/callback".to_string(),
            scopes: vec![],
            endpoints,
        }
    }

    fn tokens(access_token: &str) -> OAuthTokens {
        OAuthTokens {
            access_token: access_token.to_string(),
            refresh_token: None,
            expires_in: None,
            token_type: "Bearer".to_string(),
        }
    }

    async fn mock_endpoints() -> (MockServer, OAuthEndpoints) {
        let server = MockServer::start().await;
        let endpoints = OAuthEndpoints {
            auth_url: format!("{}/o/oauth2/v2/auth", server.uri()),
            token_url: format!("{}/token", server.uri()),
            userinfo_url: format!("{}/oauth2/v3/userinfo", server.uri()),
        };
        (server, endpoints)
    }

    #[test]
    fn test_authorization_url_generation() {
        let provider = GoogleProvider::new(config_for(OAuthEndpoints::google())).unwrap();
        let url = url::Url::parse(&provider.authorization_url("test-state")).unwrap();

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["client_id"], "test-client-id");
        assert_eq!(pairs["state"], "test-state");
        assert_eq!(pairs["access_type"], "offline");
        assert_eq!(pairs["response_type"], "code");
        assert_eq!(
            pairs["redirect_uri"],
            "https://example.com/api/oauth/google/callback"
        );
        assert_eq!(pairs["scope"], "openid email profile");
    }

    #[test]
    fn test_authorization_url_is_deterministic() {
        let provider = GoogleProvider::new(config_for(OAuthEndpoints::google())).unwrap();
        assert_eq!(
            provider.authorization_url("abc"),
            provider.authorization_url("abc")
        );
    }

    #[test]
    fn test_state_with_base64_symbols_survives() {
        let provider = GoogleProvider::new(config_for(OAuthEndpoints::google())).unwrap();
        let state = "aHR0cDovL2E/Yj0+Pz8=";
        let url = url::Url::parse(&provider.authorization_url(state)).unwrap();
        let value = url
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned());
        assert_eq!(value.as_deref(), Some(state));
    }

    #[test]
    fn test_invalid_redirect_uri_is_rejected() {
        let mut config = config_for(OAuthEndpoints::google());
        config.redirect_uri = "/relative/callback".to_string();
        assert!(matches!(
            GoogleProvider::new(config),
            Err(ProviderError::InvalidConfig { provider: "google", .. })
        ));
    }

    #[tokio::test]
    async fn test_exchange_code_success() {
        let (server, endpoints) = mock_endpoints().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("code=auth-code"))
            .and(body_string_contains("grant_type=authorization_code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "google-access-token",
                "token_type": "Bearer",
                "expires_in": 3599,
                "refresh_token": "google-refresh-token"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = GoogleProvider::new(config_for(endpoints)).unwrap();
        let tokens = provider.exchange_code("auth-code").await.unwrap();

        assert_eq!(tokens.access_token, "google-access-token");
        assert_eq!(tokens.refresh_token.as_deref(), Some("google-refresh-token"));
        assert_eq!(tokens.expires_in, Some(3599));
    }

    #[tokio::test]
    async fn test_exchange_code_rejected() {
        let (server, endpoints) = mock_endpoints().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Bad Request"
            })))
            .mount(&server)
            .await;

        let provider = GoogleProvider::new(config_for(endpoints)).unwrap();
        let result = provider.exchange_code("stale-code").await;
        assert!(matches!(result, Err(ProviderError::TokenExchange { .. })));
    }

    #[tokio::test]
    async fn test_get_user_info_success() {
        let (server, endpoints) = mock_endpoints().await;
        Mock::given(method("GET"))
            .and(path("/oauth2/v3/userinfo"))
            .and(header("authorization", "Bearer google-access-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sub": "1234567890",
                "email": "alice@example.com",
                "email_verified": true,
                "name": "Alice Liddell"
            })))
            .mount(&server)
            .await;

        let provider = GoogleProvider::new(config_for(endpoints)).unwrap();
        let info = provider
            .get_user_info(&tokens("google-access-token"))
            .await
            .unwrap();

        assert_eq!(info.email, "alice@example.com");
        assert_eq!(info.username, "Alice Liddell");
    }

    #[tokio::test]
    async fn test_get_user_info_without_name_uses_mailbox() {
        let (server, endpoints) = mock_endpoints().await;
        Mock::given(method("GET"))
            .and(path("/oauth2/v3/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sub": "1",
                "email": "bob@example.com"
            })))
            .mount(&server)
            .await;

        let provider = GoogleProvider::new(config_for(endpoints)).unwrap();
        let info = provider.get_user_info(&tokens("t")).await.unwrap();
        assert_eq!(info.username, "bob");
    }

    #[tokio::test]
    async fn test_get_user_info_missing_email() {
        let (server, endpoints) = mock_endpoints().await;
        Mock::given(method("GET"))
            .and(path("/oauth2/v3/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sub": "1",
                "name": "No Mail"
            })))
            .mount(&server)
            .await;

        let provider = GoogleProvider::new(config_for(endpoints)).unwrap();
        let result = provider.get_user_info(&tokens("t")).await;
        assert!(matches!(
            result,
            Err(ProviderError::MissingField { field: "email", .. })
        ));
    }

    #[tokio::test]
    async fn test_get_user_info_unauthorized() {
        let (server, endpoints) = mock_endpoints().await;
        Mock::given(method("GET"))
            .and(path("/oauth2/v3/userinfo"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
            .mount(&server)
            .await;

        let provider = GoogleProvider::new(config_for(endpoints)).unwrap();
        let err = provider.get_user_info(&tokens("expired")).await.unwrap_err();
        assert!(matches!(err, ProviderError::Request { .. }));
        assert!(err.to_string().contains("401"));
    }
}
