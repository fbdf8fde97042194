//! E2E tests: login flow.

use kodiiing_lib::services::auth::SESSION_TOKEN_PREFIX;
use std::sync::atomic::Ordering;

use super::test_helpers::*;

/// First login registers the user, snapshots repositories and stores the
/// provider token pair.
#[actix_rt::test]
async fn test_first_login_registers_user() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    let token = login_ok(&app, GITHUB, "octocat:1").await;

    assert!(token.starts_with(SESSION_TOKEN_PREFIX));
    assert_eq!(ctx.users.user_count(), 1);
    assert_eq!(ctx.users.snapshot_count(1), 1);

    let (access, refresh) = ctx.users.stored_token(1).expect("token stored");
    assert_eq!(access, "gho_octocat");
    assert_eq!(refresh.as_deref(), Some("refresh-octocat"));

    assert_eq!(ctx.mock.hits("github_token"), 1);
    assert_eq!(ctx.mock.hits("github_user"), 1);
    assert_eq!(ctx.mock.hits("github_repos"), 1);
}

/// A second login for the same provider identity reuses the local user and
/// issues a different token; both tokens stay valid in the memory backend.
#[actix_rt::test]
async fn test_repeat_login_reuses_user() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    let first = login_ok(&app, GITHUB, "octocat:1").await;
    let second = login_ok(&app, GITHUB, "octocat:2").await;

    assert_ne!(first, second);
    assert_eq!(ctx.users.user_count(), 1);
    assert_eq!(ctx.users.snapshot_count(1), 2);

    for token in [&first, &second] {
        let (status, body) = me_with_header(&app, Some(&format!("Bearer {}", token))).await;
        assert_eq!(status, 200);
        assert_eq!(body["id"], 1);
    }
}

/// A bare token response and a profile with only id, login and created_at
/// still register the user, and the issued session resolves to it.
#[actix_rt::test]
async fn test_minimal_profile_login() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    let token = login_ok(&app, GITHUB, "alice:abc123").await;

    assert_eq!(ctx.users.user_count(), 1);
    let (access, refresh) = ctx.users.stored_token(1).expect("token stored");
    assert_eq!(access, "gho_alice");
    assert_eq!(refresh, None);

    let (status, body) = me_with_header(&app, Some(&format!("Bearer {}", token))).await;
    assert_eq!(status, 200);
    assert_eq!(body["id"], 1);
    assert_eq!(body["provider"], 0);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["profile_url"], "");

    // repeat login keeps the single user row
    login_ok(&app, GITHUB, "alice:def456").await;
    assert_eq!(ctx.users.user_count(), 1);
}

/// Different accounts get different local users.
#[actix_rt::test]
async fn test_distinct_accounts_get_distinct_users() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    login_ok(&app, GITHUB, "octocat:1").await;
    login_ok(&app, GITHUB, "hubot:1").await;

    assert_eq!(ctx.users.user_count(), 2);
}

/// Unknown provider number → 400 without calling any provider.
#[actix_rt::test]
async fn test_unknown_provider_rejected() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    let (status, body) = login(&app, 7, "octocat:1").await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "INVALID_INPUT");
    assert_eq!(ctx.mock.hits("github_token"), 0);
    assert_eq!(ctx.mock.hits("gitlab_token"), 0);
}

/// Empty code → 400 and no outbound request.
#[actix_rt::test]
async fn test_empty_code_rejected_locally() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    let (status, body) = login(&app, GITHUB, "").await;

    assert_eq!(status, 400);
    assert!(body["message"].as_str().unwrap().contains("empty"));
    assert_eq!(ctx.mock.hits("github_token"), 0);
}

/// A code the provider refuses → 400, nothing persisted.
#[actix_rt::test]
async fn test_rejected_code_is_client_error() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    let (status, _) = login(&app, GITHUB, "bad").await;

    assert_eq!(status, 400);
    assert_eq!(ctx.users.user_count(), 0);
}

/// Provider outage → 500 with a generic message.
#[actix_rt::test]
async fn test_provider_outage_is_server_error() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    let (status, body) = login(&app, GITHUB, "down").await;

    assert_eq!(status, 500);
    assert_eq!(body["error"], "INTERNAL_ERROR");
    assert!(!body["message"].as_str().unwrap().contains("502"));
}

/// Repository listing failure aborts the login before a session is issued.
#[actix_rt::test]
async fn test_repository_failure_aborts_login() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;
    ctx.mock.state.repositories_down.store(true, Ordering::SeqCst);

    let (status, body) = login(&app, GITHUB, "octocat:1").await;

    assert_eq!(status, 500);
    assert!(body.get("access_token").is_none());
    assert!(ctx.sessions.cache().is_empty().await);
}

/// Malformed JSON → 400 in the common error shape.
#[actix_rt::test]
async fn test_malformed_body_rejected() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    let (status, body) = post_json(
        &app,
        "/Auth/Login",
        serde_json::json!({ "provider": "github", "access_code": "x" }),
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "INVALID_INPUT");
}
