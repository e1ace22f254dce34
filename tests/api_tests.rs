//! API integration tests
//!
//! These tests run against a live server with a freshly migrated database
//! seeded with one superuser (admin@example.com / 1qaz!QAZ).
//! Run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api";

/// Helper to get an authenticated superuser token
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/users/login", BASE_URL))
        .json(&json!({
            "email": "admin@example.com",
            "password": "1qaz!QAZ"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(response.status(), 202);

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["access_token"]
        .as_str()
        .expect("No token in response")
        .to_string()
}

/// Helper to create a reader user, returning its id
async fn create_reader(client: &Client, token: &str, email: &str) -> i64 {
    let response = client
        .post(format!("{}/users/create", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "username": "Reader",
            "email": email
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No user ID")
}

/// Helper to create a book, returning its id
async fn create_book(client: &Client, token: &str, title: &str, count: i64) -> i64 {
    let response = client
        .post(format!("{}/books/new", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": title,
            "author": "Test Author",
            "count": count
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No book ID")
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/users/login", BASE_URL))
        .json(&json!({
            "email": "admin@example.com",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_create_book_invalid_isbn() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .post(format!("{}/books/new", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "title",
            "author": "author",
            "isbn": "isbn",
            "count": 1
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_create_book_requires_auth() {
    let client = Client::new();

    let response = client
        .post(format!("{}/books/new", BASE_URL))
        .json(&json!({
            "title": "title",
            "author": "author",
            "count": 1
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_borrow_limit_three_books() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let reader_id = create_reader(&client, &token, "limit-reader@example.com").await;

    // Seed 5 books
    let mut book_ids = Vec::new();
    for i in 0..5 {
        book_ids.push(create_book(&client, &token, &format!("Limit Book {}", i), 2).await);
    }

    // 3 sequential borrows succeed
    for book_id in &book_ids[..3] {
        let response = client
            .post(format!("{}/library/borrow", BASE_URL))
            .header("Authorization", format!("Bearer {}", token))
            .json(&json!({ "reader_id": reader_id, "book_id": book_id }))
            .send()
            .await
            .expect("Failed to send request");

        assert_eq!(response.status(), 201);
    }

    // The 4th fails with the per-user cap
    let response = client
        .post(format!("{}/library/borrow", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "reader_id": reader_id, "book_id": book_ids[3] }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "The user has 3 books");

    // The user holds exactly 3 books
    let response = client
        .get(format!("{}/library/{}/", BASE_URL, reader_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body.as_array().expect("Expected array").len(), 3);
}

#[tokio::test]
#[ignore]
async fn test_borrow_nonexistent_book() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let reader_id = create_reader(&client, &token, "ghost-reader@example.com").await;

    let response = client
        .post(format!("{}/library/borrow", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "reader_id": reader_id, "book_id": 999999 }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Not find book");
}

#[tokio::test]
#[ignore]
async fn test_borrow_last_copy_exhausts_stock() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let first = create_reader(&client, &token, "stock-reader-1@example.com").await;
    let second = create_reader(&client, &token, "stock-reader-2@example.com").await;
    let book_id = create_book(&client, &token, "Single Copy", 1).await;

    // Borrowing the last copy sets count to 0
    let response = client
        .post(format!("{}/library/borrow", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "reader_id": first, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["count"], 0);

    // A further borrow attempt fails
    let response = client
        .post(format!("{}/library/borrow", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "reader_id": second, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "These books are not available");
}

#[tokio::test]
#[ignore]
async fn test_duplicate_active_borrow_conflicts() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let reader_id = create_reader(&client, &token, "dup-reader@example.com").await;
    let book_id = create_book(&client, &token, "Duplicate Borrow", 3).await;

    let response = client
        .post(format!("{}/library/borrow", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "reader_id": reader_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/library/borrow", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "reader_id": reader_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "The user already has this book");
}

#[tokio::test]
#[ignore]
async fn test_return_book_and_double_return() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let reader_id = create_reader(&client, &token, "return-reader@example.com").await;
    let book_id = create_book(&client, &token, "Returnable", 1).await;

    let response = client
        .post(format!("{}/library/borrow", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "reader_id": reader_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    // Return increments the count back
    let response = client
        .post(format!("{}/library/return", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "reader_id": reader_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["result"], "The book has been returned to the library");

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["count"], 1);

    // Returning twice fails
    let response = client
        .post(format!("{}/library/return", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "reader_id": reader_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "The book has already been returned");
}

#[tokio::test]
#[ignore]
async fn test_concurrent_returns_increment_count_once() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let reader_id = create_reader(&client, &token, "race-reader@example.com").await;
    let book_id = create_book(&client, &token, "Race Return", 1).await;

    let response = client
        .post(format!("{}/library/borrow", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "reader_id": reader_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    // Fire two returns for the same record at once: exactly one may succeed
    let first = client
        .post(format!("{}/library/return", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "reader_id": reader_id, "book_id": book_id }))
        .send();
    let second = client
        .post(format!("{}/library/return", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "reader_id": reader_id, "book_id": book_id }))
        .send();

    let (first, second) = tokio::join!(first, second);
    let statuses = [
        first.expect("Failed to send request").status(),
        second.expect("Failed to send request").status(),
    ];

    assert_eq!(statuses.iter().filter(|s| s.as_u16() == 201).count(), 1);
    assert_eq!(statuses.iter().filter(|s| s.as_u16() == 404).count(), 1);

    // The count went back to 1, not 2
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["count"], 1);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_email_rejected() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    create_reader(&client, &token, "unique-reader@example.com").await;

    let response = client
        .post(format!("{}/users/create", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "username": "Other",
            "email": "unique-reader@example.com"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "The email address is already in use");
}
