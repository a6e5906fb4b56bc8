//! API integration tests.
//!
//! These need a running server and its database, with a user row of id 1
//! to borrow copies. Run with:
//! `cargo test --test integration -- --ignored`

use chrono::{Duration, Utc};
use locallibrary_server::models::UserClaims;
use reqwest::{redirect::Policy, Client, StatusCode};
use serde_json::{json, Value};

fn base_url() -> String {
    std::env::var("LOCALLIBRARY_TEST_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to build client")
}

/// Token signed with the server's secret
fn bearer(user_id: i32, permissions: &[&str], is_staff: bool) -> String {
    let secret = std::env::var("JWT_SECRET")
        .unwrap_or_else(|_| "change-this-secret-in-production".to_string());
    let now = Utc::now();
    let claims = UserClaims {
        sub: user_id.to_string(),
        user_id,
        username: format!("user{}", user_id),
        is_staff,
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
        exp: (now + Duration::hours(1)).timestamp(),
        iat: now.timestamp(),
    };
    format!("Bearer {}", claims.create_token(&secret).expect("Failed to sign token"))
}

fn staff() -> String {
    bearer(1, &["catalog.can_mark_returned"], true)
}

async fn create(client: &Client, path: &str, body: Value) -> Value {
    let response = client
        .post(format!("{}/catalog/admin/{}", base_url(), path))
        .header("Authorization", staff())
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.expect("Failed to parse response")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let response = client()
        .get(format!("{}/health", base_url()))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_visit_counter_increments_per_session() {
    let client = client();
    let url = format!("{}/catalog/", base_url());

    let first: Value = client.get(&url).send().await.unwrap().json().await.unwrap();
    let second: Value = client.get(&url).send().await.unwrap().json().await.unwrap();

    assert_eq!(first["num_visits"], 0);
    assert_eq!(second["num_visits"], 1);
}

#[tokio::test]
#[ignore]
async fn test_deleting_author_keeps_books() {
    let client = client();

    let author = create(
        &client,
        "authors",
        json!({"first_name": "Isaac", "last_name": "Asimov", "date_of_birth": "1920-01-02"}),
    )
    .await;
    let book = create(
        &client,
        "books",
        json!({"title": "Foundation", "isbn": "9780553293357", "author_id": author["id"]}),
    )
    .await;

    let response = client
        .delete(format!("{}/catalog/admin/authors/{}", base_url(), author["id"]))
        .header("Authorization", staff())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let detail: Value = client
        .get(format!("{}/catalog/book/{}", base_url(), book["id"]))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(detail["book"]["author_id"].is_null());
    assert!(detail["author"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_renewal_round_trip() {
    let client = client();

    let book = create(&client, "books", json!({"title": "Solaris"})).await;
    let copy = create(
        &client,
        "instances",
        json!({
            "book_id": book["id"],
            "imprint": "Faber, 1970",
            "status": "on_loan",
            "borrower_id": 1,
            "due_back": Utc::now().date_naive().to_string()
        }),
    )
    .await;
    let renew_url = format!("{}/catalog/book/{}/renew/", base_url(), copy["id"].as_str().unwrap());

    let past = (Utc::now().date_naive() - Duration::days(1)).to_string();
    let rejected = client
        .post(&renew_url)
        .header("Authorization", staff())
        .json(&json!({"renewal_date": past}))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let next_week = (Utc::now().date_naive() + Duration::weeks(1)).to_string();
    let applied = client
        .post(&renew_url)
        .header("Authorization", staff())
        .json(&json!({"renewal_date": next_week}))
        .send()
        .await
        .unwrap();
    assert_eq!(applied.status(), StatusCode::SEE_OTHER);
    assert_eq!(applied.headers()["location"], "/catalog/borrowed/");

    let mine: Value = client
        .get(format!("{}/catalog/mybooks/", base_url()))
        .header("Authorization", bearer(1, &[], false))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(mine["items"]
        .as_array()
        .unwrap()
        .iter()
        .any(|item| item["id"] == copy["id"] && item["due_back"] == next_week.as_str()));
}

#[tokio::test]
#[ignore]
async fn test_borrowed_list_requires_permission() {
    let response = client()
        .get(format!("{}/catalog/borrowed/", base_url()))
        .header("Authorization", bearer(2, &[], false))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore]
async fn test_overdue_flag_in_listing() {
    let client = client();
    let today = Utc::now().date_naive();

    let book = create(&client, "books", json!({"title": "Dune"})).await;
    let mut copies = Vec::new();
    for due_back in [today - Duration::days(1), today] {
        let copy = create(
            &client,
            "instances",
            json!({
                "book_id": book["id"],
                "imprint": "Chilton, 1965",
                "status": "on_loan",
                "borrower_id": 1,
                "due_back": due_back.to_string()
            }),
        )
        .await;
        copies.push(copy["id"].clone());
    }

    let mine: Value = client
        .get(format!("{}/catalog/mybooks/", base_url()))
        .header("Authorization", bearer(1, &[], false))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let flag = |id: &Value| {
        mine["items"]
            .as_array()
            .unwrap()
            .iter()
            .find(|item| &item["id"] == id)
            .map(|item| item["is_overdue"].clone())
    };

    // Due yesterday is overdue, due today is not
    assert_eq!(flag(&copies[0]), Some(Value::Bool(true)));
    assert_eq!(flag(&copies[1]), Some(Value::Bool(false)));
}
