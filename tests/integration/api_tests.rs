//! API integration tests
//!
//! Require a running server with a fresh database and the default
//! bootstrap administrator.

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api";

/// Helper to get an admin token
async fn get_auth_token(client: &Client) -> String {
    login(client, "admin@library.local", "admin123").await
}

async fn login(client: &Client, email: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Unique suffix so reruns against the same database do not collide
fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

async fn post(client: &Client, token: &str, path: &str, body: Value) -> (StatusCode, Value) {
    let response = client
        .post(format!("{}{}", BASE_URL, path))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");
    let status = response.status();
    (status, response.json().await.unwrap_or(Value::Null))
}

async fn get(client: &Client, token: &str, path: &str) -> (StatusCode, Value) {
    let response = client
        .get(format!("{}{}", BASE_URL, path))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request");
    let status = response.status();
    (status, response.json().await.unwrap_or(Value::Null))
}

/// Create an author, category and book; returns the book id
async fn create_book(client: &Client, token: &str) -> i64 {
    let (status, author) = post(client, token, "/authors", json!({ "name": unique("Author") })).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, category) =
        post(client, token, "/categories", json!({ "name": unique("Category") })).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, book) = post(
        client,
        token,
        "/books",
        json!({
            "title": unique("Book"),
            "isbn": "9780441013593",
            "authorId": author["id"],
            "categoryId": category["id"]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(book["available"], true);
    assert_eq!(book["author"]["id"], author["id"]);

    book["id"].as_i64().expect("book id")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
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
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": "admin@library.local", "password": "admin123" }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["tokenType"], "Bearer");
    assert_eq!(body["user"]["role"], "ADMIN");
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
#[ignore]
async fn test_login_wrong_password() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": "admin@library.local", "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_borrow_return_lifecycle() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let book_id = create_book(&client, &token).await;

    let (_, me) = get(&client, &token, "/auth/me").await;
    let admin_id = me["id"].as_i64().expect("admin id");

    // Borrow
    let (status, loan) = post(
        &client,
        &token,
        "/loans/borrow",
        json!({ "bookId": book_id, "userId": admin_id }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(loan["status"], "BORROWED");
    assert_eq!(loan["returned"], false);
    assert!(loan["returnDate"].is_null());

    let (_, book) = get(&client, &token, &format!("/books/{}", book_id)).await;
    assert_eq!(book["available"], false);

    // Second borrow of the same copy is refused
    let (status, body) = post(
        &client,
        &token,
        &format!("/loans/borrow/{}/{}", book_id, admin_id),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Conflict");

    // Return
    let loan_id = loan["id"].as_i64().expect("loan id");
    let (status, returned) =
        post(&client, &token, &format!("/loans/return/{}", loan_id), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(returned["status"], "RETURNED");
    assert!(returned["returnDate"].is_string());

    // Second return is refused
    let (status, _) = post(&client, &token, &format!("/loans/return/{}", loan_id), json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, book) = get(&client, &token, &format!("/books/{}", book_id)).await;
    assert_eq!(book["available"], true);
}

#[tokio::test]
#[ignore]
async fn test_book_on_loan_cannot_be_deleted() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let book_id = create_book(&client, &token).await;
    let (_, me) = get(&client, &token, "/auth/me").await;

    let (status, _) = post(
        &client,
        &token,
        &format!("/loans/borrow/{}/{}", book_id, me["id"]),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore]
async fn test_register_and_borrow_as_user() {
    let client = Client::new();
    let admin = get_auth_token(&client).await;
    let book_id = create_book(&client, &admin).await;

    let email = format!("{}@library.local", unique("reader"));
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({ "name": "Reader", "email": email, "password": "reader123" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["user"]["role"], "USER");
    let user_id = body["user"]["id"].as_i64().expect("user id");

    // Duplicate registration
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({ "name": "Reader", "email": email, "password": "reader123" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let token = login(&client, &email, "reader123").await;

    let (status, loan) = post(
        &client,
        &token,
        "/loans/borrow",
        json!({ "bookId": book_id, "userId": user_id }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(loan["userName"], "Reader");

    let (status, loans) = get(&client, &token, &format!("/loans/user/{}", user_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loans.as_array().map(Vec::len), Some(1));

    // Admin-only surfaces
    let (status, _) = get(&client, &token, "/users").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = get(&client, &token, "/stats").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Users with open loans cannot be deleted
    let response = client
        .delete(format!("{}/users/{}", BASE_URL, user_id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore]
async fn test_list_books_paginates() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    create_book(&client, &token).await;

    let response = client
        .get(format!("{}/books?per_page=1&page=1", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let total: i64 = response
        .headers()
        .get("x-total-count")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .expect("x-total-count header");
    assert!(total >= 1);

    let books: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(books.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
#[ignore]
async fn test_stats() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let (status, stats) = get(&client, &token, "/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert!(stats["totalBooks"].as_i64().unwrap() >= stats["availableBooks"].as_i64().unwrap());
    assert!(stats["totalUsers"].as_i64().unwrap() >= 1);
    assert!(stats["activeLoans"].is_number());
}
