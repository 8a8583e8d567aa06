//! OAuth2 login
//!
//! Providers are registered once at startup in a [`ProviderRegistry`]; the
//! [`OAuthFlow`] drives a login from the initial redirect to the resolved
//! local user. The `state` parameter carries the caller's callback URL
//! through the provider round trip (see [`state`]).
//!
//! # Example
//!
//! ```rust,ignore
//! use social_backend::auth::oauth::{OAuthFlow, ProviderRegistry, StartParams};
//!
//! let registry = Arc::new(ProviderRegistry::from_config(&config)?);
//! let flow = OAuthFlow::new(config.base_url(), registry, users);
//!
//! // 307 target for GET /api/login/oauth/google
//! let url = flow.start("google", &StartParams::default())?;
//! ```

pub mod flow;
pub mod handlers;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod state;

pub use flow::{CallbackOutcome, CallbackParams, OAuthFlow, OAuthFlowError, StartParams};
pub use provider::{
    AuthorizationConfig, OAuthEndpoints, OAuthProvider, OAuthTokens, OAuthUserInfo,
    ProviderError,
};
pub use providers::{github::GitHubProvider, google::GoogleProvider};
pub use registry::ProviderRegistry;
pub use state::{decode_state, encode_state, CallbackTarget, StateError};
