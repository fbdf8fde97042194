//! E2E tests: provider-specific behavior through the login route.

use kodiiing_lib::services::user_store::UserStore;

use super::test_helpers::*;

/// GitLab login sends the redirect URI and maps the profile with an unknown
/// public repository count.
#[actix_rt::test]
async fn test_gitlab_login() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    let token = login_ok(&app, GITLAB, "tanuki:1").await;

    assert_eq!(ctx.mock.hits("gitlab_token"), 1);
    assert_eq!(ctx.mock.hits("gitlab_user"), 1);
    assert_eq!(ctx.mock.hits("gitlab_projects"), 1);
    assert_eq!(ctx.mock.hits("github_token"), 0);

    let (status, body) = me_with_header(&app, Some(&format!("Bearer {}", token))).await;
    assert_eq!(status, 200);
    assert_eq!(body["provider"], 1);
    assert_eq!(body["public_repositories"], -1);
    assert!(body["location"].is_null());
}

/// The same login name on two providers is two different users.
#[actix_rt::test]
async fn test_same_name_on_two_providers() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;

    login_ok(&app, GITHUB, "octocat:1").await;
    login_ok(&app, GITLAB, "octocat:1").await;

    assert_eq!(ctx.users.user_count(), 2);
}

/// Repository snapshots keep the provider's fields.
#[actix_rt::test]
async fn test_repository_snapshot_mapping() {
    let ctx = setup().await;
    let app = create_test_app(&ctx).await;
    login_ok(&app, GITHUB, "octocat:1").await;

    let repos = ctx.users.get_user_repository_by_user_id(1).await.unwrap();

    assert_eq!(repos.len(), 2);
    let hello = repos.iter().find(|r| r.name == "Hello-World").unwrap();
    assert!(!hello.fork);
    assert_eq!(hello.stars_count, 80);
    assert_eq!(hello.owner_username, "octocat");
    let spoon = repos.iter().find(|r| r.name == "Spoon-Knife").unwrap();
    assert!(spoon.fork);
    assert!(spoon.description.is_none());
}
