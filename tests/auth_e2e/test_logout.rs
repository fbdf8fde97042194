//! E2E tests: logout.

use super::test_helpers::*;

/// Logout revokes the session: the token stops authenticating.
#[actix_rt::test]
async fn test_logout_revokes_session() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;
    let token = login_ok(&app, GITHUB, "octocat:1").await;

    let (status, body) = post_json(
        &app,
        "/Auth/Logout",
        serde_json::json!({ "access_token": token }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body, serde_json::json!({}));

    let (status, _) = me_with_header(&app, Some(&format!("Bearer {}", token))).await;
    assert_eq!(status, 401);
    assert_eq!(ctx.service.swallowed_logout_errors(), 0);
}

/// Unknown, repeated and empty tokens still get 200 `{}`; the failures are counted.
#[actix_rt::test]
async fn test_logout_failures_are_swallowed_and_counted() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    for token in ["kdg_never_issued", ""] {
        let (status, body) = post_json(
            &app,
            "/Auth/Logout",
            serde_json::json!({ "access_token": token }),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body, serde_json::json!({}));
    }

    // missing field defaults to empty
    let (status, _) = post_json(&app, "/Auth/Logout", serde_json::json!({})).await;
    assert_eq!(status, 200);

    assert_eq!(ctx.service.swallowed_logout_errors(), 3);
}

/// Logging out one session leaves the user's other sessions alive.
#[actix_rt::test]
async fn test_logout_only_affects_one_token() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;
    let kept = login_ok(&app, GITHUB, "octocat:1").await;
    let dropped = login_ok(&app, GITHUB, "octocat:2").await;

    post_json(
        &app,
        "/Auth/Logout",
        serde_json::json!({ "access_token": dropped }),
    )
    .await;

    let (status, _) = me_with_header(&app, Some(&format!("Bearer {}", kept))).await;
    assert_eq!(status, 200);
}
