//! GitHub OAuth provider implementation

use async_trait::async_trait;
use oauth2::AuthorizationCode;
use reqwest::Client as HttpClient;
use serde::Deserialize;

use super::{authorization_url, build_client, build_http_client, into_tokens, ConfiguredClient};
use crate::auth::oauth::provider::{
    AuthorizationConfig, OAuthEndpoints, OAuthProvider, OAuthTokens, OAuthUserInfo,
    ProviderError,
};

const PROVIDER: &str = "github";

pub const GITHUB_AUTH_URL: &str = "https://github.com/login/oauth/authorize";
pub const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
pub const GITHUB_API_URL: &str = "https://api.github.com";

impl OAuthEndpoints {
    /// GitHub's production endpoints; `userinfo_url` is the REST API base
    pub fn github() -> Self {
        Self {
            auth_url: GITHUB_AUTH_URL.to_string(),
            token_url: GITHUB_TOKEN_URL.to_string(),
            userinfo_url: GITHUB_API_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
    login: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubEmail {
    email: String,
    #[serde(default)]
    primary: bool,
    #[serde(default)]
    verified: bool,
}

/// GitHub OAuth provider
#[derive(Clone)]
pub struct GitHubProvider {
    config: AuthorizationConfig,
    client: ConfiguredClient,
    http_client: HttpClient,
}

impl GitHubProvider {
    pub fn default_scopes() -> Vec<String> {
        vec!["read:user".to_string(), "user:email".to_string()]
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

    fn api_url(&self, path: &str) -> String {
        format!(
            "{}{}",
            self.config.endpoints.userinfo_url.trim_end_matches('/'),
            path
        )
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        access_token: &str,
    ) -> Result<T, ProviderError> {
        let request_failed = |message: String| ProviderError::Request {
            provider: PROVIDER,
            message,
        };

        let response = self
            .http_client
            .get(self.api_url(path))
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| request_failed(format!("GET {} failed: {}", path, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(request_failed(format!(
                "GET {} returned {} - {}",
                path, status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| request_failed(format!("failed to parse {} response: {}", path, e)))
    }

    /// Primary verified address, else any verified address
    async fn get_primary_email(&self, access_token: &str) -> Result<String, ProviderError> {
        let emails: Vec<GitHubEmail> = self.get_json("/user/emails", access_token).await?;

        emails
            .iter()
            .find(|e| e.primary && e.verified)
            .or_else(|| emails.iter().find(|e| e.verified))
            .map(|e| e.email.clone())
            .ok_or(ProviderError::MissingField {
                provider: PROVIDER,
                field: "verified email",
            })
    }
}

#[async_trait]
impl OAuthProvider for GitHubProvider {
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
        let user: GitHubUser = self.get_json("/user", &tokens.access_token).await?;

        // /user leaves email null when the address is private
        let email = match user.email.filter(|e| !e.is_empty()) {
            Some(email) => email,
            None => self.get_primary_email(&tokens.access_token).await?,
        };

        Ok(OAuthUserInfo {
            email,
            username: user.login,
        })
    }
}
