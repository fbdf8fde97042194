//! Shared test helpers for auth E2E tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::{App, dev::ServiceResponse, test, web};
use async_trait::async_trait;
use chrono::Utc;
use kodiiing_lib::api;
use kodiiing_lib::auth::AuthMiddleware;
use kodiiing_lib::config::{GitHubConfig, GitLabConfig};
use kodiiing_lib::models::{Provider, ProviderToken, Repository, User};
use kodiiing_lib::services::providers::{GitHubProvider, GitLabProvider};
use kodiiing_lib::services::session_store::MemorySessionStore;
use kodiiing_lib::services::user_store::{CachedUserStore, StoreError, UserStore};
use kodiiing_lib::services::{AuthenticationService, MemoryCache, ProviderRegistry};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use super::mock_provider::MockProvider;

pub const GITHUB: u8 = 0;
pub const GITLAB: u8 = 1;

#[derive(Default)]
struct Records {
    users: Vec<User>,
    snapshots: HashMap<i64, Vec<Vec<Repository>>>,
    tokens: HashMap<i64, (String, Option<String>)>,
}

/// Durable-store stand-in keeping everything in process memory.
#[derive(Default)]
pub struct InMemoryUserStore {
    records: Mutex<Records>,
    pub id_lookups: AtomicUsize,
}

impl InMemoryUserStore {
    pub fn user_count(&self) -> usize {
        self.records.lock().unwrap().users.len()
    }

    pub fn snapshot_count(&self, user_id: i64) -> usize {
        self.records
            .lock()
            .unwrap()
            .snapshots
            .get(&user_id)
            .map_or(0, Vec::len)
    }

    pub fn stored_token(&self, user_id: i64) -> Option<(String, Option<String>)> {
        self.records.lock().unwrap().tokens.get(&user_id).cloned()
    }

    fn find(&self, pred: impl Fn(&User) -> bool) -> Result<User, StoreError> {
        self.records
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| pred(u))
            .cloned()
            .ok_or(StoreError::UserNotFound)
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create_user(&self, user: &User) -> Result<i64, StoreError> {
        let mut records = self.records.lock().unwrap();
        let id = records.users.len() as i64 + 1;
        let mut stored = user.clone();
        stored.id = id;
        stored.registered_at = Some(Utc::now());
        records.users.push(stored);
        Ok(id)
    }

    async fn get_user_by_id(&self, id: i64) -> Result<User, StoreError> {
        self.id_lookups.fetch_add(1, Ordering::SeqCst);
        self.find(|u| u.id == id)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, StoreError> {
        self.find(|u| u.username == username)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        self.find(|u| u.email.as_deref() == Some(email))
    }

    async fn get_user_by_provider_id(
        &self,
        provider: Provider,
        provider_id: i64,
    ) -> Result<User, StoreError> {
        self.find(|u| u.provider == provider && u.provider_id == provider_id)
    }

    async fn create_user_statistics(&self, _user_id: i64, _user: &User) -> Result<(), StoreError> {
        Ok(())
    }

    async fn refresh_user_statistics(&self, user_id: i64, user: &User) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        let stored = records
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(StoreError::UserNotFound)?;
        stored.followers = user.followers;
        stored.following = user.following;
        stored.public_repositories = user.public_repositories;
        Ok(())
    }

    async fn create_user_repository(
        &self,
        user_id: i64,
        repositories: &[Repository],
    ) -> Result<(), StoreError> {
        if repositories.is_empty() {
            return Ok(());
        }
        self.records
            .lock()
            .unwrap()
            .snapshots
            .entry(user_id)
            .or_default()
            .push(repositories.to_vec());
        Ok(())
    }

    async fn get_user_repository_by_user_id(
        &self,
        user_id: i64,
    ) -> Result<Vec<Repository>, StoreError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .snapshots
            .get(&user_id)
            .and_then(|s| s.last().cloned())
            .unwrap_or_default())
    }

    async fn create_user_access_token(
        &self,
        user_id: i64,
        access_token: &SecretString,
        refresh_token: Option<&SecretString>,
    ) -> Result<(), StoreError> {
        self.records.lock().unwrap().tokens.insert(
            user_id,
            (
                access_token.expose_secret().to_string(),
                refresh_token.map(|t| t.expose_secret().to_string()),
            ),
        );
        Ok(())
    }

    async fn get_user_access_token(&self, user_id: i64) -> Result<ProviderToken, StoreError> {
        let (access, refresh) = self
            .stored_token(user_id)
            .ok_or(StoreError::TokenNotFound)?;
        Ok(ProviderToken::new(access, refresh))
    }
}

/// Everything one test needs: the mock provider and handles on the stores
/// behind the app.
pub struct TestContext {
    pub mock: MockProvider,
    pub users: Arc<InMemoryUserStore>,
    pub sessions: Arc<MemorySessionStore>,
    pub service: web::Data<AuthenticationService>,
    pub middleware: web::Data<AuthMiddleware>,
}

/// Start a mock provider and wire GitHub and GitLab clients against it.
pub async fn setup() -> TestContext {
    let mock = MockProvider::start().await;

    let github = GitHubProvider::new(&GitHubConfig {
        client_id: "test-github-client".to_string(),
        client_secret: SecretString::from("test-github-secret".to_string()),
        oauth_url: mock.url.clone(),
        api_url: mock.url.clone(),
    })
    .expect("github client");
    let gitlab = GitLabProvider::new(&GitLabConfig {
        client_id: "test-gitlab-client".to_string(),
        client_secret: SecretString::from("test-gitlab-secret".to_string()),
        redirect_url: "http://localhost:3000/login/gitlab".to_string(),
        base_url: mock.url.clone(),
    })
    .expect("gitlab client");

    let registry = ProviderRegistry::new()
        .with(Provider::GitHub, Arc::new(github))
        .with(Provider::GitLab, Arc::new(gitlab));

    let users = Arc::new(InMemoryUserStore::default());
    let cached: Arc<dyn UserStore> = Arc::new(CachedUserStore::new(
        users.clone(),
        MemoryCache::new(Duration::from_secs(180)),
    ));
    let sessions = Arc::new(MemorySessionStore::new(MemoryCache::new(
        Duration::from_secs(86_400),
    )));

    let service = web::Data::new(AuthenticationService::new(
        registry,
        cached.clone(),
        sessions.clone(),
    ));
    let middleware = web::Data::new(AuthMiddleware::new(sessions.clone(), cached));

    TestContext {
        mock,
        users,
        sessions,
        service,
        middleware,
    }
}

/// Create the auth app over the context's service and middleware.
pub async fn create_test_app(
    ctx: &TestContext,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = ServiceResponse,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new()
            .app_data(ctx.service.clone())
            .app_data(ctx.middleware.clone())
            .app_data(api::json_config())
            .configure(api::configure_auth_routes),
    )
    .await
}

/// POST a JSON body and return status and parsed body.
pub async fn post_json<S>(app: &S, uri: &str, body: Value) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::post()
        .uri(uri)
        .set_json(body)
        .to_request();

    let resp = test::call_service(app, req).await;
    let status = resp.status().as_u16();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

/// Log in and return status and body.
pub async fn login<S>(app: &S, provider: u8, code: &str) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    post_json(
        app,
        "/Auth/Login",
        serde_json::json!({ "provider": provider, "access_code": code }),
    )
    .await
}

/// Log in and return the issued access token, failing the test otherwise.
pub async fn login_ok<S>(app: &S, provider: u8, code: &str) -> String
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let (status, body) = login(app, provider, code).await;
    assert_eq!(status, 200, "login failed: {}", body);
    body["access_token"]
        .as_str()
        .expect("access_token in login response")
        .to_string()
}

/// GET /Auth/Me with an optional raw Authorization header.
pub async fn me_with_header<S>(app: &S, authorization: Option<&str>) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let mut req = test::TestRequest::get().uri("/Auth/Me");
    if let Some(value) = authorization {
        req = req.insert_header(("Authorization", value.to_string()));
    }

    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status().as_u16();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}
