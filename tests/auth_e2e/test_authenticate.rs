//! E2E tests: authenticating requests with an issued session token.

use std::sync::atomic::Ordering;
use std::time::Duration;

use kodiiing_lib::services::session_store::SessionStore;

use super::test_helpers::*;

/// Bearer token on GET /Auth/Me resolves to the logged-in user.
#[actix_rt::test]
async fn test_bearer_token_resolves_user() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;
    let token = login_ok(&app, GITHUB, "octocat:1").await;

    let (status, body) = me_with_header(&app, Some(&format!("Bearer {}", token))).await;

    assert_eq!(status, 200);
    assert_eq!(body["username"], "octocat");
    assert_eq!(body["provider"], 0);
    // GitHub returned no display name
    assert_eq!(body["name"], "octocat");
    assert_eq!(body["email"], "octocat@github.com");
}

/// The body envelope used by other modules works the same way.
#[actix_rt::test]
async fn test_body_envelope_resolves_user() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;
    let token = login_ok(&app, GITHUB, "hubot:1").await;

    let (status, body) = post_json(
        &app,
        "/Auth/Me",
        serde_json::json!({ "authentication": { "access_token": token } }),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["username"], "hubot");
}

/// Missing, blank and malformed credentials are 401.
#[actix_rt::test]
async fn test_missing_credentials_rejected() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    for header in [None, Some("Bearer "), Some("Basic b2N0b2NhdA==")] {
        let (status, body) = me_with_header(&app, header).await;
        assert_eq!(status, 401, "header {:?}", header);
        assert_eq!(body["error"], "UNAUTHORIZED");
    }

    let (status, _) = post_json(&app, "/Auth/Me", serde_json::json!({})).await;
    assert_eq!(status, 401);
}

/// A token that was never issued is 401.
#[actix_rt::test]
async fn test_unknown_token_rejected() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    let (status, body) = me_with_header(&app, Some("Bearer kdg_0000")).await;

    assert_eq!(status, 401);
    assert!(body["message"].as_str().unwrap().contains("session"));
}

/// A session pointing at a user that does not exist is 401, not 500.
#[actix_rt::test]
async fn test_session_without_user_rejected() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;
    ctx.sessions.set("kdg_orphan", 999).await.unwrap();

    let (status, body) = me_with_header(&app, Some("Bearer kdg_orphan")).await;

    assert_eq!(status, 401);
    assert!(body["message"].as_str().unwrap().contains("user not found"));
}

/// Repeated authentication is served from the user cache.
#[actix_rt::test]
async fn test_repeated_lookups_hit_cache() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;
    let token = login_ok(&app, GITHUB, "octocat:1").await;
    let header = format!("Bearer {}", token);

    me_with_header(&app, Some(&header)).await;
    // cache population runs on a detached task
    actix_rt::time::sleep(Duration::from_millis(50)).await;
    let before = ctx.users.id_lookups.load(Ordering::SeqCst);

    for _ in 0..3 {
        let (status, _) = me_with_header(&app, Some(&header)).await;
        assert_eq!(status, 200);
    }

    assert_eq!(ctx.users.id_lookups.load(Ordering::SeqCst), before);
}
