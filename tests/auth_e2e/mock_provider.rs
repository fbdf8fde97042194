//! Mock OAuth provider for E2E tests.
//!
//! Starts an in-process HTTP server answering the GitHub and GitLab endpoints
//! the provider clients call. Authorization codes have the form
//! `<login>:<nonce>`; the issued access token encodes the login so profile
//! lookups know which account to return. The code `bad` is rejected and the
//! code `down` makes the token endpoint fail with 502. The GitHub account
//! `alice` gets a bare token response and a profile carrying only the
//! required fields.

use actix_web::{App, HttpRequest, HttpResponse, HttpServer, get, post, web};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Known accounts: login -> provider id.
const ACCOUNTS: &[(&str, i64)] = &[
    ("octocat", 583231),
    ("hubot", 7),
    ("tanuki", 4242),
    ("alice", 42),
];

/// Account answered with the minimal token and profile payloads.
const MINIMAL_ACCOUNT: &str = "alice";

/// Request counters per endpoint.
#[derive(Default)]
pub struct MockState {
    hits: Mutex<HashMap<&'static str, usize>>,
    /// Repository listings answer 500 while set.
    pub repositories_down: AtomicBool,
}

impl MockState {
    fn hit(&self, endpoint: &'static str) {
        *self.hits.lock().unwrap().entry(endpoint).or_default() += 1;
    }

    pub fn hits(&self, endpoint: &str) -> usize {
        self.hits.lock().unwrap().get(endpoint).copied().unwrap_or(0)
    }
}

fn provider_id(login: &str) -> Option<i64> {
    ACCOUNTS.iter().find(|(l, _)| *l == login).map(|(_, id)| *id)
}

/// Login encoded in `Authorization: Bearer <prefix><login>`.
fn bearer_login(req: &HttpRequest, prefix: &str) -> Option<String> {
    req.headers()
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?
        .strip_prefix(prefix)
        .map(str::to_string)
}

fn exchange(code: &str, prefix: &str) -> HttpResponse {
    match code {
        "down" => HttpResponse::BadGateway().finish(),
        "bad" => HttpResponse::Ok().json(json!({
            "error": "bad_verification_code",
            "error_description": "The code passed is incorrect or expired."
        })),
        _ => {
            let login = code.split(':').next().unwrap_or_default();
            if provider_id(login).is_none() {
                return HttpResponse::Ok().json(json!({ "error": "invalid_grant" }));
            }
            if login == MINIMAL_ACCOUNT {
                return HttpResponse::Ok().json(json!({
                    "access_token": format!("{}{}", prefix, login),
                }));
            }
            HttpResponse::Ok().json(json!({
                "access_token": format!("{}{}", prefix, login),
                "refresh_token": format!("refresh-{}", login),
                "token_type": "bearer",
            }))
        }
    }
}

#[post("/login/oauth/access_token")]
async fn github_token(state: web::Data<MockState>, body: web::Json<Value>) -> HttpResponse {
    state.hit("github_token");
    exchange(body["code"].as_str().unwrap_or_default(), "gho_")
}

#[get("/user")]
async fn github_user(state: web::Data<MockState>, req: HttpRequest) -> HttpResponse {
    state.hit("github_user");
    let Some(login) = bearer_login(&req, "gho_") else {
        return HttpResponse::Unauthorized().json(json!({ "message": "Bad credentials" }));
    };
    let Some(id) = provider_id(&login) else {
        return HttpResponse::NotFound().finish();
    };
    if login == MINIMAL_ACCOUNT {
        return HttpResponse::Ok().json(json!({
            "id": id,
            "login": login,
            "created_at": "2020-01-01T00:00:00Z"
        }));
    }

    HttpResponse::Ok().json(json!({
        "id": id,
        "login": login,
        "node_id": format!("MDQ6VXNlcj{}", id),
        "name": null,
        "avatar_url": format!("https://avatars.githubusercontent.com/u/{}", id),
        "html_url": format!("https://github.com/{}", login),
        "location": "San Francisco",
        "email": format!("{}@github.com", login),
        "public_repos": 8,
        "followers": 100,
        "following": 9,
        "created_at": "2011-01-25T18:44:36Z"
    }))
}

#[get("/users/{login}/repos")]
async fn github_repos(state: web::Data<MockState>, path: web::Path<String>) -> HttpResponse {
    state.hit("github_repos");
    if state.repositories_down.load(Ordering::SeqCst) {
        return HttpResponse::InternalServerError().finish();
    }
    let login = path.into_inner();

    HttpResponse::Ok().json(json!([
        {
            "id": 1296269,
            "name": "Hello-World",
            "owner": { "login": login },
            "html_url": format!("https://github.com/{}/Hello-World", login),
            "description": "My first repository",
            "fork": false,
            "forks_count": 9,
            "stargazers_count": 80,
            "created_at": "2011-01-26T19:01:12Z",
            "updated_at": "2011-01-26T19:14:43Z"
        },
        {
            "id": 1300192,
            "name": "Spoon-Knife",
            "owner": { "login": login },
            "html_url": format!("https://github.com/{}/Spoon-Knife", login),
            "description": null,
            "fork": true,
            "forks_count": 0,
            "stargazers_count": 1,
            "created_at": "2011-01-27T19:30:43Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }
    ]))
}

#[post("/oauth/token")]
async fn gitlab_token(state: web::Data<MockState>, body: web::Json<Value>) -> HttpResponse {
    state.hit("gitlab_token");
    if body["grant_type"] != "authorization_code" || body["redirect_uri"].as_str().is_none() {
        return HttpResponse::BadRequest().json(json!({ "error": "invalid_request" }));
    }
    exchange(body["code"].as_str().unwrap_or_default(), "glpat_")
}

#[get("/api/v4/user")]
async fn gitlab_user(state: web::Data<MockState>, req: HttpRequest) -> HttpResponse {
    state.hit("gitlab_user");
    let Some(login) = bearer_login(&req, "glpat_") else {
        return HttpResponse::Unauthorized().json(json!({ "message": "401 Unauthorized" }));
    };
    let Some(id) = provider_id(&login) else {
        return HttpResponse::NotFound().finish();
    };

    HttpResponse::Ok().json(json!({
        "id": id,
        "username": login,
        "name": "Tanuki",
        "avatar_url": null,
        "web_url": format!("https://gitlab.com/{}", login),
        "created_at": "2012-05-23T08:00:58.000Z",
        "location": "",
        "public_email": null,
        "followers": 3,
        "following": 4
    }))
}

#[get("/api/v4/users/{login}/projects")]
async fn gitlab_projects(state: web::Data<MockState>, path: web::Path<String>) -> HttpResponse {
    state.hit("gitlab_projects");
    let login = path.into_inner();

    HttpResponse::Ok().json(json!([
        {
            "id": 4,
            "name": "Diaspora Client",
            "description": null,
            "web_url": format!("https://gitlab.com/{}/diaspora-client", login),
            "forks_count": 0,
            "star_count": 2,
            "created_at": "2013-09-30T13:46:02Z",
            "last_activity_at": "2013-09-30T13:46:02Z",
            "namespace": { "path": login }
        }
    ]))
}

/// Mock provider serving both GitHub and GitLab routes.
pub struct MockProvider {
    pub url: String,
    pub state: web::Data<MockState>,
}

impl MockProvider {
    /// Start the mock on an ephemeral port.
    pub async fn start() -> Self {
        let state = web::Data::new(MockState::default());

        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind");
        let port = listener.local_addr().unwrap().port();
        let url = format!("http://127.0.0.1:{}", port);

        let state_data = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(state_data.clone())
                .service(github_token)
                .service(github_user)
                .service(github_repos)
                .service(gitlab_token)
                .service(gitlab_user)
                .service(gitlab_projects)
        })
        .workers(1)
        .listen(listener)
        .expect("failed to listen")
        .disable_signals()
        .run();

        // Lives until the test's runtime shuts down
        actix_rt::spawn(server);

        MockProvider { url, state }
    }

    pub fn hits(&self, endpoint: &str) -> usize {
        self.state.hits(endpoint)
    }
}
