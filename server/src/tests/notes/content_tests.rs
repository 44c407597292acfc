//! Tests for what the note pages show.

use crate::tests::helpers::TestServer;

#[tokio::test]
async fn test_own_note_is_listed() {
    let server = TestServer::new().await;
    let session = server.create_session("testuser").await;
    server.create_note(&session.user, "Новость", "zagolovok").await;

    let response = server.get_with_session("/notes/", &session).await;
    response.assert_ok();
    response.assert_contains("Новость");
    response.assert_contains("/note/zagolovok/");
}

#[tokio::test]
async fn test_notes_of_other_users_are_not_listed() {
    let server = TestServer::new().await;
    let session = server.create_session("testuser").await;
    let another = server.create_user("anotheruser").await;
    server.create_note(&session.user, "Новость", "zagolovok").await;
    server.create_note(&another, "Новость 2", "novost-2").await;

    let response = server.get_with_session("/notes/", &session).await;
    response.assert_ok();
    assert!(!response.text().contains("Новость 2"));
    assert!(!response.text().contains("/note/novost-2/"));
}

#[tokio::test]
async fn test_notes_are_listed_in_creation_order() {
    let server = TestServer::new().await;
    let session = server.create_session("testuser").await;
    server.create_note(&session.user, "Beta", "beta").await;
    server.create_note(&session.user, "Alpha", "alpha").await;

    let text = server.get_with_session("/notes/", &session).await.text();
    let beta = text.find("/note/beta/").expect("beta missing");
    let alpha = text.find("/note/alpha/").expect("alpha missing");
    assert!(beta < alpha);
}

#[tokio::test]
async fn test_add_and_edit_pages_render_the_form() {
    let server = TestServer::new().await;
    let session = server.create_session("testuser").await;
    server.create_note(&session.user, "Новость", "zagolovok").await;

    for uri in ["/add/", "/edit/zagolovok/"] {
        let response = server.get_with_session(uri, &session).await;
        response.assert_ok();
        response.assert_contains(r#"name="title""#);
        response.assert_contains(r#"name="text""#);
    }
}

#[tokio::test]
async fn test_edit_form_is_prefilled() {
    let server = TestServer::new().await;
    let session = server.create_session("testuser").await;
    server.create_note(&session.user, "Новость", "zagolovok").await;

    let response = server.get_with_session("/edit/zagolovok/", &session).await;
    response.assert_contains(r#"value="Новость""#);
    response.assert_contains(r#"action="/edit/zagolovok/""#);
}

#[tokio::test]
async fn test_detail_page_shows_the_note() {
    let server = TestServer::new().await;
    let session = server.create_session("testuser").await;
    server.create_note(&session.user, "Новость", "zagolovok").await;

    let response = server.get_with_session("/note/zagolovok/", &session).await;
    response.assert_ok();
    response.assert_contains("Новость");
    response.assert_contains("Text");
}
