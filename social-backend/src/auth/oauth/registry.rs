//! Provider registry
//!
//! Name to adapter map, built once at startup and read-only afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use super::provider::{AuthorizationConfig, OAuthEndpoints, OAuthProvider, ProviderError};
use super::providers::{github::GitHubProvider, google::GoogleProvider};
use crate::config::Config;

#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn OAuthProvider>>,
}

impl ProviderRegistry {
    /// Build the adapters enabled by configuration
    ///
    /// Google is always registered. GitHub is registered when
    /// `github_client_id` is set.
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        let mut providers: Vec<Arc<dyn OAuthProvider>> = Vec::new();

        let google = GoogleProvider::new(AuthorizationConfig {
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_uri: redirect_uri(config.base_url(), "google"),
            scopes: GoogleProvider::default_scopes(),
            endpoints: with_overrides(
                OAuthEndpoints::google(),
                &config.google_auth_url,
                &config.google_token_url,
                &config.google_userinfo_url,
            ),
        })?;
        providers.push(Arc::new(google));

        if !config.github_client_id.is_empty() {
            let github = GitHubProvider::new(AuthorizationConfig {
                client_id: config.github_client_id.clone(),
                client_secret: config.github_client_secret.clone(),
                redirect_uri: redirect_uri(config.base_url(), "github"),
                scopes: GitHubProvider::default_scopes(),
                endpoints: with_overrides(
                    OAuthEndpoints::github(),
                    &config.github_auth_url,
                    &config.github_token_url,
                    &config.github_api_url,
                ),
            })?;
            providers.push(Arc::new(github));
        }

        let registry: Self = providers.into_iter().collect();
        tracing::info!(providers = ?registry.names(), "OAuth providers registered");
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn OAuthProvider>> {
        self.providers.get(name).cloned()
    }

    /// Registered provider names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl FromIterator<Arc<dyn OAuthProvider>> for ProviderRegistry {
    fn from_iter<I: IntoIterator<Item = Arc<dyn OAuthProvider>>>(iter: I) -> Self {
        let providers = iter
            .into_iter()
            .map(|provider| (provider.name().to_string(), provider))
            .collect();
        Self { providers }
    }
}

/// `{base_url}/api/oauth/{provider}/callback`
pub fn redirect_uri(base_url: &str, provider: &str) -> String {
    format!(
        "{}/api/oauth/{}/callback",
        base_url.trim_end_matches('/'),
        provider
    )
}

fn with_overrides(
    mut endpoints: OAuthEndpoints,
    auth_url: &Option<String>,
    token_url: &Option<String>,
    userinfo_url: &Option<String>,
) -> OAuthEndpoints {
    if let Some(url) = auth_url {
        endpoints.auth_url = url.clone();
    }
    if let Some(url) = token_url {
        endpoints.token_url = url.clone();
    }
    if let Some(url) = userinfo_url {
        endpoints.userinfo_url = url.clone();
    }
    endpoints
}
