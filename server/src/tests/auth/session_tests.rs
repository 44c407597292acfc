//! Tests for logging in and out.

use std::time::Duration;

use crate::database::queries;
use crate::gc::{run_session_cleanup, run_session_cleanup_once};
use crate::tests::helpers::{Session, TestResponse, TestServer, TEST_PASSWORD};

async fn session_count(server: &TestServer) -> i64 {
    server
        .database()
        .await
        .query("SELECT COUNT(*) FROM sessions", ())
        .await
        .unwrap()
        .next()
        .await
        .unwrap()
        .unwrap()
        .get::<i64>(0)
        .unwrap()
}

async fn login_with_next(server: &TestServer, next: &str) -> TestResponse {
    server
        .post_form(
            "/auth/login/",
            &[
                ("username", "testuser"),
                ("password", TEST_PASSWORD),
                ("next", next),
            ],
        )
        .await
}

// ==================== Login ====================

#[tokio::test]
async fn test_login_redirects_to_next() {
    let server = TestServer::new().await;
    server.create_user("testuser").await;

    let response = server
        .post_form(
            "/auth/login/",
            &[
                ("username", "testuser"),
                ("password", "password"),
                ("next", "/notes/"),
            ],
        )
        .await;

    response.assert_redirects("/notes/");
    assert!(response.session_cookie().is_some());
}

#[tokio::test]
async fn test_login_next_from_query() {
    let server = TestServer::new().await;
    server.create_user("testuser").await;

    let response = server
        .post_form(
            "/auth/login/?next=/add/",
            &[("username", "testuser"), ("password", "password")],
        )
        .await;

    response.assert_redirects("/add/");
}

#[tokio::test]
async fn test_login_ignores_foreign_next() {
    let server = TestServer::new().await;
    server.create_user("testuser").await;

    let response = server
        .post_form(
            "/auth/login/",
            &[
                ("username", "testuser"),
                ("password", "password"),
                ("next", "//evil.example.com/"),
            ],
        )
        .await;

    response.assert_redirects("/");
}

#[tokio::test]
async fn test_login_ignores_next_with_control_characters() {
    let server = TestServer::new().await;
    server.create_user("testuser").await;

    // Browsers strip the tab, leaving `//evil.example.com/`
    let response = login_with_next(&server, "/\t/evil.example.com/").await;
    response.assert_redirects("/");

    let response = login_with_next(&server, "/notes/\nX: y").await;
    response.assert_redirects("/");
    assert!(response.session_cookie().is_some());
}

#[tokio::test]
async fn test_session_cookie_attributes() {
    let server = TestServer::new().await;
    server.create_user("testuser").await;

    let response = login_with_next(&server, "/").await;
    let cookie = response.set_session_cookie().expect("No session cookie");

    assert!(cookie.contains("HttpOnly"), "{}", cookie);
    assert!(cookie.contains("SameSite=Lax"), "{}", cookie);
    assert!(cookie.contains("Path=/"), "{}", cookie);
    assert!(cookie.contains("Max-Age=3600"), "{}", cookie);
    assert!(!cookie.contains("Secure"), "{}", cookie);
}

#[tokio::test]
async fn test_secure_session_cookie() {
    let server =
        TestServer::with_config_builder(|builder| builder.with_secure_cookie(true)).await;
    server.create_user("testuser").await;

    let response = login_with_next(&server, "/").await;
    let cookie = response.set_session_cookie().expect("No session cookie");

    assert!(cookie.contains("Secure"), "{}", cookie);
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let server = TestServer::new().await;
    server.create_user("testuser").await;

    let response = server
        .post_form(
            "/auth/login/",
            &[("username", "testuser"), ("password", "wrong-password")],
        )
        .await;

    response.assert_ok();
    response.assert_contains("Please enter a correct username and password.");
    assert!(response.session_cookie().is_none());
}

#[tokio::test]
async fn test_login_with_unknown_user() {
    let server = TestServer::new().await;

    let response = server
        .post_form(
            "/auth/login/",
            &[("username", "nobody"), ("password", "password")],
        )
        .await;

    response.assert_ok();
    assert!(response.session_cookie().is_none());
}

#[tokio::test]
async fn test_login_page_keeps_next() {
    let server = TestServer::new().await;

    let response = server.get("/auth/login/?next=/notes/").await;
    response.assert_ok();
    response.assert_contains(r#"name="next" value="/notes/""#);
}

#[tokio::test]
async fn test_login_records_last_login() {
    let server = TestServer::new().await;
    let session = server.create_session("testuser").await;

    let user = queries::find_user_by_id(server.database().await, session.user.id)
        .await
        .unwrap();
    assert!(user.last_login_at.is_some());
}

// ==================== Logout ====================

#[tokio::test]
async fn test_logout_ends_session() {
    let server = TestServer::new().await;
    let session = server.create_session("testuser").await;

    server
        .get_with_session("/notes/", &session)
        .await
        .assert_ok();

    server
        .post_form_with_session("/auth/logout/", &[], &session)
        .await
        .assert_ok();

    // The old cookie no longer works
    let response = server.get_with_session("/notes/", &session).await;
    response.assert_redirects("/auth/login/?next=/notes/");
}

#[tokio::test]
async fn test_tampered_cookie_is_anonymous() {
    let server = TestServer::new().await;
    let session = server.create_session("testuser").await;

    let tampered = Session {
        user: session.user,
        cookie: "jotter_session=not-encrypted".to_string(),
    };

    let response = server.get_with_session("/notes/", &tampered).await;
    response.assert_redirects("/auth/login/?next=/notes/");
}

// ==================== Expiry ====================

#[tokio::test]
async fn test_expired_session_is_anonymous() {
    let server = TestServer::with_config_builder(|builder| {
        builder.with_session_duration(Duration::ZERO)
    })
    .await;
    let session = server.create_session("testuser").await;

    let response = server.get_with_session("/notes/", &session).await;
    response.assert_redirects("/auth/login/?next=/notes/");

    // Expired sessions are removed when seen
    assert_eq!(session_count(&server).await, 0);
}

#[tokio::test]
async fn test_session_cleanup() {
    let server = TestServer::with_config_builder(|builder| {
        builder.with_session_duration(Duration::ZERO)
    })
    .await;
    server.create_session("first").await;
    server.create_session("second").await;

    let deleted = run_session_cleanup_once(server.config.clone()).await.unwrap();
    assert_eq!(deleted, 2);

    let deleted = run_session_cleanup_once(server.config.clone()).await.unwrap();
    assert_eq!(deleted, 0);
}

#[tokio::test]
async fn test_periodic_session_cleanup() {
    let server = TestServer::with_config_builder(|builder| {
        builder
            .with_session_duration(Duration::ZERO)
            .with_cleanup_interval(Duration::from_millis(20))
    })
    .await;
    server.create_session("first").await;
    server.create_session("second").await;
    assert_eq!(session_count(&server).await, 2);

    let cleanup = tokio::spawn(run_session_cleanup(server.config.clone()));

    let purged = tokio::time::timeout(Duration::from_secs(5), async {
        while session_count(&server).await > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;

    cleanup.abort();
    assert!(purged.is_ok(), "Expired sessions were not purged");
}
