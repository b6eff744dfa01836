use super::*;
use crate::site::forms::Role;
use chrono::Utc;
use crate::site::serve::{client, serve_once};

fn signup() -> WaitlistSignup {
    WaitlistSignup {
        name: "Ada".into(),
        email: "ada@example.com".into(),
        role: Role::Individual,
        source: "hero".into(),
        created_at: Utc::now(),
    }
}

fn subscription(email: &str) -> NewsletterSubscription {
    NewsletterSubscription {
        email: email.into(),
        source: "footer".into(),
        created_at: Utc::now(),
    }
}

#[test]
fn conflicts_map_to_duplicate() {
    assert!(classify_failure(StatusCode::CONFLICT, "").is_duplicate());
    assert!(
        classify_failure(
            StatusCode::BAD_REQUEST,
            r#"{"code":"23505","message":"duplicate key value violates unique constraint"}"#
        )
        .is_duplicate()
    );
    let other = classify_failure(StatusCode::SERVICE_UNAVAILABLE, "down");
    assert!(matches!(other, ScrollyteError::Remote(_)));
}

#[test]
fn table_urls_ignore_trailing_slash() {
    let db = RestDatastore::new("https://db.example.co/", "k");
    assert_eq!(db.table_url(CONTACT_TABLE), "https://db.example.co/rest/v1/contact_messages");
}

#[tokio::test]
async fn rest_insert_posts_row_with_key_headers() {
    let (url, server) = serve_once("201 Created", "").await;
    let db = RestDatastore::with_client(client(), url, "anon-key");
    db.insert_waitlist(&signup()).await.unwrap();

    let request = server.await.unwrap();
    let lower = request.to_ascii_lowercase();
    assert!(request.starts_with("POST /rest/v1/waitlist "));
    assert!(lower.contains("apikey: anon-key"));
    assert!(lower.contains("authorization: bearer anon-key"));
    assert!(request.contains(r#""email":"ada@example.com""#));
    assert!(request.contains(r#""role":"individual""#));
}

#[tokio::test]
async fn rest_conflict_is_duplicate() {
    let (url, server) = serve_once("409 Conflict", r#"{"code":"23505"}"#).await;
    let db = RestDatastore::with_client(client(), url, "k");
    let err = db.insert_newsletter(&subscription("ada@example.com")).await.unwrap_err();
    assert!(err.is_duplicate());
    server.await.unwrap();
}

#[tokio::test]
async fn memory_store_enforces_unique_newsletter_email() {
    let db = MemoryDatastore::new();
    db.insert_newsletter(&subscription("ada@example.com")).await.unwrap();
    let err = db.insert_newsletter(&subscription("Ada@Example.com")).await.unwrap_err();
    assert!(err.is_duplicate());
    db.insert_waitlist(&signup()).await.unwrap();
    db.insert_waitlist(&signup()).await.unwrap();
    assert_eq!(db.waitlist().await.len(), 2);
    assert_eq!(db.calls().await, 4);
}

#[tokio::test]
async fn unavailable_store_counts_attempts() {
    let db = MemoryDatastore::unavailable();
    assert!(db.insert_waitlist(&signup()).await.is_err());
    assert_eq!(db.calls().await, 1);
    assert!(db.waitlist().await.is_empty());
}
