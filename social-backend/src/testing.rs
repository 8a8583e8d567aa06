//! In-memory stand-ins for the stores and providers, used by unit tests

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;
use uuid::Uuid;

use crate::auth::oauth::provider::{
    AuthorizationConfig, OAuthEndpoints, OAuthProvider, OAuthTokens, OAuthUserInfo,
    ProviderError,
};
use crate::error::{DatabaseError, DatabaseOperation};
use crate::post::{Post, PostStore};
use crate::user::{User, UserStore};

pub const TEST_BASE_URL: &str = "http://localhost:8080";

/// Provider that maps authorization codes straight to identities
pub struct MockProvider {
    name: &'static str,
    config: AuthorizationConfig,
    identities: HashMap<String, OAuthUserInfo>,
    fail_user_info: bool,
    pub exchanges: AtomicUsize,
    pub user_info_calls: AtomicUsize,
}

impl MockProvider {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            config: AuthorizationConfig {
                client_id: "mock-client".to_string(),
                client_secret: "mock-secret".to_string(),
                redirect_uri: format!("{}/api/oauth/{}/callback", TEST_BASE_URL, name),
                scopes: vec!["email".to_string()],
                endpoints: OAuthEndpoints {
                    auth_url: "https://provider.test/authorize".to_string(),
                    token_url: "https://provider.test/token".to_string(),
                    userinfo_url: "https://provider.test/userinfo".to_string(),
                },
            },
            identities: HashMap::new(),
            fail_user_info: false,
            exchanges: AtomicUsize::new(0),
            user_info_calls: AtomicUsize::new(0),
        }
    }

    /// Accept `code` and resolve it to the given identity
    pub fn with_identity(mut self, code: &str, email: &str, username: &str) -> Self {
        self.identities.insert(
            code.to_string(),
            OAuthUserInfo {
                email: email.to_string(),
                username: username.to_string(),
            },
        );
        self
    }

    pub fn failing_user_info(mut self) -> Self {
        self.fail_user_info = true;
        self
    }

    pub fn exchange_count(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }

    pub fn user_info_count(&self) -> usize {
        self.user_info_calls.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.exchange_count() + self.user_info_count()
    }
}

#[async_trait]
impl OAuthProvider for MockProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn authorization_config(&self) -> &AuthorizationConfig {
        &self.config
    }

    fn authorization_url(&self, state: &str) -> String {
        let mut url = match Url::parse(&self.config.endpoints.auth_url) {
            Ok(url) => url,
            Err(_) => return String::new(),
        };
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("state", state)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("scope", &self.config.scopes.join(" "))
            .append_pair("access_type", "offline");
        url.to_string()
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuthTokens, ProviderError> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        if !self.identities.contains_key(code) {
            return Err(ProviderError::TokenExchange {
                provider: "mock",
                message: "invalid_grant".to_string(),
            });
        }

        Ok(OAuthTokens {
            access_token: code.to_string(),
            refresh_token: None,
            expires_in: Some(3600),
            token_type: "Bearer".to_string(),
        })
    }

    async fn get_user_info(&self, tokens: &OAuthTokens) -> Result<OAuthUserInfo, ProviderError> {
        self.user_info_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        if self.fail_user_info {
            return Err(ProviderError::Request {
                provider: "mock",
                message: "userinfo returned 500".to_string(),
            });
        }

        self.identities
            .get(&tokens.access_token)
            .cloned()
            .ok_or(ProviderError::MissingField {
                provider: "mock",
                field: "email",
            })
    }
}

/// Users keyed by email
#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<String, User>>,
    fail: bool,
    pub creates: AtomicUsize,
}

impl InMemoryUserStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub async fn insert(&self, email: &str, username: &str) -> User {
        let user = new_user(email, username);
        self.users
            .lock()
            .await
            .insert(email.to_string(), user.clone());
        user
    }

    pub async fn len(&self) -> usize {
        self.users.lock().await.len()
    }
}

fn new_user(email: &str, username: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        username: username.to_string(),
        email: email.to_string(),
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get_by_id(&self, id: Uuid) -> Result<User, DatabaseError> {
        if self.fail {
            return Err(DatabaseError::connection_failed("database is down"));
        }
        self.users
            .lock()
            .await
            .values()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| DatabaseError::not_found(DatabaseOperation::Query, "User not found"))
    }

    async fn find_or_create(&self, email: &str, username: &str) -> Result<User, DatabaseError> {
        if self.fail {
            return Err(DatabaseError::connection_failed("database is down"));
        }
        let mut users = self.users.lock().await;
        if let Some(user) = users.get(email) {
            return Ok(user.clone());
        }
        self.creates.fetch_add(1, Ordering::SeqCst);
        let user = new_user(email, username);
        users.insert(email.to_string(), user.clone());
        Ok(user)
    }
}

#[derive(Default)]
pub struct InMemoryPostStore {
    posts: Mutex<Vec<Post>>,
    fail: bool,
}

impl InMemoryPostStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub async fn insert(&self, title: &str, content: &str) -> Post {
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.posts.lock().await.push(post.clone());
        post
    }

    fn check(&self, operation: DatabaseOperation) -> Result<(), DatabaseError> {
        if self.fail {
            return Err(DatabaseError::query_failed("database is down").during(operation));
        }
        Ok(())
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn get_all(&self) -> Result<Vec<Post>, DatabaseError> {
        self.check(DatabaseOperation::Query)?;
        let mut posts = self.posts.lock().await.clone();
        posts.reverse();
        Ok(posts)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Post, DatabaseError> {
        self.check(DatabaseOperation::Query)?;
        self.posts
            .lock()
            .await
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| DatabaseError::not_found(DatabaseOperation::Query, "Post not found"))
    }

    async fn create(&self, title: &str, content: &str) -> Result<Post, DatabaseError> {
        self.check(DatabaseOperation::Insert)?;
        Ok(self.insert(title, content).await)
    }

    async fn update(&self, id: Uuid, title: &str, content: &str) -> Result<Post, DatabaseError> {
        self.check(DatabaseOperation::Update)?;
        let mut posts = self.posts.lock().await;
        let post = posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| DatabaseError::not_found(DatabaseOperation::Update, "Post not found"))?;
        post.title = title.to_string();
        post.content = content.to_string();
        post.updated_at = Utc::now();
        Ok(post.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.check(DatabaseOperation::Delete)?;
        self.posts.lock().await.retain(|p| p.id != id);
        Ok(())
    }
}

/// Registry holding just `provider`
pub fn mock_registry(provider: Arc<MockProvider>) -> crate::auth::oauth::ProviderRegistry {
    std::iter::once(provider as Arc<dyn OAuthProvider>).collect()
}
