//! Tests for creating, editing, and deleting notes.

use axum::http::StatusCode;

use jotter::slug::slugify;

use crate::api::web_ui::forms::WARNING;
use crate::tests::helpers::{note_form, note_form_without_slug, TestServer};

// ==================== Creating Notes ====================

#[tokio::test]
async fn test_only_logged_in_users_can_add() {
    let server = TestServer::new().await;
    let form = note_form("title", "text", "title");

    let response = server.post_form("/add/", &form).await;
    response.assert_redirects("/auth/login/?next=/add/");
    assert_eq!(server.note_count().await, 0);

    let session = server.create_session("testuser").await;
    let response = server.post_form_with_session("/add/", &form, &session).await;
    response.assert_redirects("/done/");
    assert_eq!(server.note_count().await, 1);

    let note = server.find_note("title").await.unwrap();
    assert_eq!(note.title, "title");
    assert_eq!(note.text, "text");
    assert_eq!(note.author_id, session.user.id);
}

#[tokio::test]
async fn test_same_slug_is_rejected() {
    let server = TestServer::new().await;
    let session = server.create_session("testuser").await;

    server
        .post_form_with_session("/add/", &note_form("title", "text", "title"), &session)
        .await
        .assert_redirects("/done/");

    let response = server
        .post_form_with_session("/add/", &note_form("title2", "text", "title"), &session)
        .await;

    response.assert_ok();
    response.assert_contains(&format!("title{}", WARNING));
    assert_eq!(server.note_count().await, 1);
}

#[tokio::test]
async fn test_slugs_are_unique_across_users() {
    let server = TestServer::new().await;
    let first = server.create_session("first").await;
    let second = server.create_session("second").await;
    server.create_note(&first.user, "Shared", "shared").await;

    let response = server
        .post_form_with_session("/add/", &note_form("Mine", "text", "shared"), &second)
        .await;

    response.assert_ok();
    response.assert_contains(&format!("shared{}", WARNING));
    assert_eq!(server.note_count().await, 1);
}

#[tokio::test]
async fn test_derived_slug_conflict_is_rejected() {
    let server = TestServer::new().await;
    let session = server.create_session("testuser").await;
    server.create_note(&session.user, "Other", "my-title").await;

    let response = server
        .post_form_with_session("/add/", &note_form_without_slug("My Title", "text"), &session)
        .await;

    response.assert_ok();
    response.assert_contains(&format!("my-title{}", WARNING));
    assert_eq!(server.note_count().await, 1);
}

#[tokio::test]
async fn test_add_without_slug() {
    let server = TestServer::new().await;
    let session = server.create_session("testuser").await;

    let response = server
        .post_form_with_session("/add/", &note_form_without_slug("title2", "text"), &session)
        .await;

    response.assert_redirects("/done/");
    assert_eq!(server.note_count().await, 1);

    let expected = slugify("title2");
    let note = server.find_note(&expected).await.unwrap();
    assert_eq!(note.title, "title2");
}

#[tokio::test]
async fn test_add_with_empty_slug_derives_one() {
    let server = TestServer::new().await;
    let session = server.create_session("testuser").await;

    let response = server
        .post_form_with_session("/add/", &note_form("Заголовок", "Текст", ""), &session)
        .await;

    response.assert_redirects("/done/");
    assert!(server.find_note("zagolovok").await.is_some());
}

#[tokio::test]
async fn test_add_strips_whitespace() {
    let server = TestServer::new().await;
    let session = server.create_session("testuser").await;

    let response = server
        .post_form_with_session("/add/", &note_form("  Title  ", "  body  \n", "title"), &session)
        .await;

    response.assert_redirects("/done/");

    let note = server.find_note("title").await.unwrap();
    assert_eq!(note.title, "Title");
    assert_eq!(note.text, "body");
}

#[tokio::test]
async fn test_add_with_missing_fields() {
    let server = TestServer::new().await;
    let session = server.create_session("testuser").await;

    let response = server
        .post_form_with_session("/add/", &note_form("", "", ""), &session)
        .await;

    response.assert_ok();
    response.assert_contains("This field is required.");
    assert_eq!(server.note_count().await, 0);
}

#[tokio::test]
async fn test_add_with_underivable_slug() {
    let server = TestServer::new().await;
    let session = server.create_session("testuser").await;

    let response = server
        .post_form_with_session("/add/", &note_form_without_slug("!!!", "text"), &session)
        .await;

    response.assert_ok();
    response.assert_contains(r#"id="errors_slug""#);
    assert_eq!(server.note_count().await, 0);
}

#[tokio::test]
async fn test_add_with_invalid_slug() {
    let server = TestServer::new().await;
    let session = server.create_session("testuser").await;

    let response = server
        .post_form_with_session("/add/", &note_form("title", "text", "no spaces"), &session)
        .await;

    response.assert_ok();
    response.assert_contains(r#"id="errors_slug""#);
    assert_eq!(server.note_count().await, 0);
}

// ==================== Deleting Notes ====================

#[tokio::test]
async fn test_author_can_delete_note() {
    let server = TestServer::new().await;
    let author = server.create_session("author").await;
    server.create_note(&author.user, "Заголовок", "zagolovok").await;

    let response = server
        .delete_with_session("/delete/zagolovok/", &author)
        .await;

    response.assert_redirects("/done/");
    assert_eq!(server.note_count().await, 0);
}

#[tokio::test]
async fn test_author_can_delete_note_with_form() {
    let server = TestServer::new().await;
    let author = server.create_session("author").await;
    server.create_note(&author.user, "Заголовок", "zagolovok").await;

    let response = server
        .post_form_with_session("/delete/zagolovok/", &[], &author)
        .await;

    response.assert_redirects("/done/");
    assert_eq!(server.note_count().await, 0);

    // Already gone
    let response = server
        .delete_with_session("/delete/zagolovok/", &author)
        .await;
    response.assert_not_found();
}

#[tokio::test]
async fn test_user_cant_delete_note() {
    let server = TestServer::new().await;
    let author = server.create_user("author").await;
    let non_author = server.create_session("non_author").await;
    server.create_note(&author, "Заголовок", "zagolovok").await;

    let response = server
        .delete_with_session("/delete/zagolovok/", &non_author)
        .await;

    response.assert_not_found();
    assert_eq!(server.note_count().await, 1);
}

#[tokio::test]
async fn test_anonymous_cant_delete_note() {
    let server = TestServer::new().await;
    let author = server.create_user("author").await;
    server.create_note(&author, "Заголовок", "zagolovok").await;

    let response = server.delete("/delete/zagolovok/").await;

    response.assert_redirects("/auth/login/?next=/delete/zagolovok/");
    assert_eq!(server.note_count().await, 1);
}

// ==================== Editing Notes ====================

#[tokio::test]
async fn test_user_can_edit_own_note() {
    let server = TestServer::new().await;
    let author = server.create_session("author").await;
    server.create_note(&author.user, "Заголовок", "zagolovok").await;

    let response = server
        .post_form_with_session(
            "/edit/zagolovok/",
            &note_form_without_slug("Новый заголовок", "Новый текст"),
            &author,
        )
        .await;

    response.assert_redirects("/done/");

    let note = server.find_note("zagolovok").await.unwrap();
    assert_eq!(note.title, "Новый заголовок");
    assert_eq!(note.text, "Новый текст");
}

#[tokio::test]
async fn test_user_cannot_edit_other_user_note() {
    let server = TestServer::new().await;
    let author = server.create_user("author").await;
    let non_author = server.create_session("non_author").await;
    server.create_note(&author, "Заголовок", "zagolovok").await;

    let response = server
        .post_form_with_session(
            "/edit/zagolovok/",
            &note_form_without_slug("Новый заголовок", "Новый текст"),
            &non_author,
        )
        .await;

    response.assert_status(StatusCode::NOT_FOUND);

    let note = server.find_note("zagolovok").await.unwrap();
    assert_eq!(note.title, "Заголовок");
    assert_eq!(note.text, "Text");
}

#[tokio::test]
async fn test_edit_ignores_submitted_slug() {
    let server = TestServer::new().await;
    let author = server.create_session("author").await;
    server.create_note(&author.user, "Заголовок", "zagolovok").await;

    let response = server
        .post_form_with_session(
            "/edit/zagolovok/",
            &note_form("Новый заголовок", "Новый текст", "renamed"),
            &author,
        )
        .await;

    response.assert_redirects("/done/");
    assert!(server.find_note("renamed").await.is_none());

    let note = server.find_note("zagolovok").await.unwrap();
    assert_eq!(note.title, "Новый заголовок");
}

#[tokio::test]
async fn test_edit_with_missing_fields() {
    let server = TestServer::new().await;
    let author = server.create_session("author").await;
    server.create_note(&author.user, "Заголовок", "zagolovok").await;

    let response = server
        .post_form_with_session("/edit/zagolovok/", &note_form_without_slug("", ""), &author)
        .await;

    response.assert_ok();
    response.assert_contains("This field is required.");

    let note = server.find_note("zagolovok").await.unwrap();
    assert_eq!(note.title, "Заголовок");
}
