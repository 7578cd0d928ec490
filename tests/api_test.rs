use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use caltrack::{app::build_app, auth::Claims, state::AppState, storage::MemoryStorage};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use time::OffsetDateTime;
use tower::ServiceExt;

const REPLY: &str = "That sandwich is about 450 calories.";

fn token_for(user_id: &str) -> String {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let claims = Claims {
        sub: user_id.into(),
        exp: (now + 600) as usize,
        iat: Some(now as usize),
        iss: None,
        aud: "authenticated".into(),
        email: Some(format!("{user_id}@example.com")),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test")).unwrap()
}

async fn test_app() -> (Arc<MemoryStorage>, Router) {
    let storage = Arc::new(MemoryStorage::new());
    let state = AppState::fake(storage.clone(), REPLY).await;
    (storage, build_app(state))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, axum::http::HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token_for(user)));
    }
    let body = match body {
        Some(v) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, value)
}

#[tokio::test]
async fn health_is_public() {
    let (_, app) = test_app().await;
    let response = app
        .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn meal_routes_require_a_token() {
    let (_, app) = test_app().await;
    let (status, _, _) = send(&app, Method::GET, "/api/v1/meals", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::get("/api/v1/me")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_echoes_token_identity() {
    let (_, app) = test_app().await;
    let (status, _, body) = send(&app, Method::GET, "/api/v1/me", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "alice");
    assert_eq!(body["email"], "alice@example.com");
}

#[tokio::test]
async fn log_total_and_delete_scenario() {
    let (storage, app) = test_app().await;

    let (status, headers, lunch) = send(
        &app,
        Method::POST,
        "/api/v1/meals",
        Some("alice"),
        Some(json!({"name": "Lunch", "foods": "rice, beans", "calories": "500", "date": "2024-01-01"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(lunch["persisted"], true);
    assert_eq!(lunch["meal"]["foods"], json!(["rice", "beans"]));
    let lunch_id = lunch["meal"]["id"].as_str().unwrap().to_string();
    assert_eq!(
        headers.get(header::LOCATION).unwrap(),
        format!("/meals/{lunch_id}").as_str()
    );

    let (_, _, day) = send(&app, Method::GET, "/api/v1/days/2024-01-01", Some("alice"), None).await;
    assert_eq!(day["totalCalories"], 500);

    send(
        &app,
        Method::POST,
        "/api/v1/meals",
        Some("alice"),
        Some(json!({"name": "Snack", "foods": "apple", "calories": "250", "date": "2024-01-01"})),
    )
    .await;
    let (_, _, day) = send(&app, Method::GET, "/api/v1/days/2024-01-01", Some("alice"), None).await;
    assert_eq!(day["totalCalories"], 750);
    assert_eq!(day["breakdown"][0]["calories"], 500);
    assert_eq!(day["breakdown"][0]["percentage"], 67);
    assert_eq!(day["breakdown"][1]["percentage"], 33);

    let (status, _, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/v1/meals/{lunch_id}"),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, _, day) = send(&app, Method::GET, "/api/v1/days/2024-01-01", Some("alice"), None).await;
    assert_eq!(day["totalCalories"], 250);

    let stored: Value = serde_json::from_slice(&storage.object("meals").unwrap()).unwrap();
    assert_eq!(stored.as_array().unwrap().len(), 1);
    assert_eq!(stored[0]["name"], "Snack");
    assert_eq!(stored[0]["userId"], "alice");
}

#[tokio::test]
async fn incomplete_form_is_rejected_and_not_stored() {
    let (storage, app) = test_app().await;
    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/v1/meals",
        Some("alice"),
        Some(json!({"name": "Lunch", "foods": "", "calories": "500"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(storage.object("meals").is_none());
}

#[tokio::test]
async fn users_only_see_and_delete_their_own_meals() {
    let (_, app) = test_app().await;
    let (_, _, created) = send(
        &app,
        Method::POST,
        "/api/v1/meals",
        Some("alice"),
        Some(json!({"name": "Dinner", "foods": "pasta", "calories": "800", "date": "2024-03-01"})),
    )
    .await;
    let id = created["meal"]["id"].as_str().unwrap().to_string();

    let (_, _, bobs) = send(&app, Method::GET, "/api/v1/meals", Some("bob"), None).await;
    assert_eq!(bobs, json!([]));

    let (status, _, _) =
        send(&app, Method::DELETE, &format!("/api/v1/meals/{id}"), Some("bob"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, _, alices) = send(&app, Method::GET, "/api/v1/meals", Some("alice"), None).await;
    assert_eq!(alices[0]["date"], "2024-03-01");
    assert_eq!(alices[0]["meals"][0]["id"], id.as_str());
}

#[tokio::test]
async fn history_search_and_recent() {
    let (_, app) = test_app().await;
    for (name, date) in [
        ("Breakfast", "2024-01-01"),
        ("Lunch", "2024-01-03"),
        ("Late breakfast", "2024-01-02"),
    ] {
        send(
            &app,
            Method::POST,
            "/api/v1/meals",
            Some("alice"),
            Some(json!({"name": name, "foods": "x", "calories": "100", "date": date})),
        )
        .await;
    }

    let (_, _, groups) =
        send(&app, Method::GET, "/api/v1/meals?search=breakfast", Some("alice"), None).await;
    let dates: Vec<&str> = groups
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2024-01-02", "2024-01-01"]);

    let (_, _, recent) = send(&app, Method::GET, "/api/v1/meals/recent", Some("alice"), None).await;
    assert_eq!(recent[0]["name"], "Lunch");
    assert_eq!(recent.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn failed_write_is_reported_but_meal_is_kept() {
    let (storage, app) = test_app().await;
    storage.set_fail_writes(true);

    let (status, _, created) = send(
        &app,
        Method::POST,
        "/api/v1/meals",
        Some("alice"),
        Some(json!({"name": "Lunch", "foods": "rice", "calories": "300", "date": "2024-01-01"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["persisted"], false);

    let (_, _, day) = send(&app, Method::GET, "/api/v1/days/2024-01-01", Some("alice"), None).await;
    assert_eq!(day["totalCalories"], 300);

    let id = created["meal"]["id"].as_str().unwrap();
    let (status, headers, _) =
        send(&app, Method::DELETE, &format!("/api/v1/meals/{id}"), Some("alice"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(headers.get("x-ledger-persisted").unwrap(), "false");
}

#[tokio::test]
async fn assistant_returns_reply_and_prefill() {
    let (_, app) = test_app().await;
    let (status, _, body) = send(
        &app,
        Method::POST,
        "/api/v1/assistant",
        Some("alice"),
        Some(json!({"userInput": "chicken sandwich, fries"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], REPLY);
    assert_eq!(body["calories"], "450");
    assert_eq!(body["foods"], "chicken sandwich, fries");

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/v1/assistant",
        Some("alice"),
        Some(json!({"userInput": "  "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
