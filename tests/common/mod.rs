// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use odyssey_trips::config::Config;
use odyssey_trips::db::Db;
use odyssey_trips::middleware::auth::create_jwt;
use odyssey_trips::models::{ActivityLevel, Destination, TripType, User};
use odyssey_trips::permissions::PermissionTable;
use odyssey_trips::routes::create_router;
use odyssey_trips::time_utils::now_utc;
use odyssey_trips::AppState;
use std::sync::Arc;
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Build shared state over the given store with the built-in roles.
#[allow(dead_code)]
pub fn test_state(db: Db) -> Arc<AppState> {
    let permissions = PermissionTable::builtin().expect("built-in roles parse");
    Arc::new(AppState::new(Config::test_default(), db, permissions))
}

/// Create a test app backed by an empty in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = test_state(Db::in_memory());
    (create_router(state.clone()), state)
}

/// Create a test app whose store fails every call.
#[allow(dead_code)]
pub fn create_offline_app() -> (axum::Router, Arc<AppState>) {
    let state = test_state(Db::new_mock());
    (create_router(state.clone()), state)
}

/// `Authorization` header value for a caller.
#[allow(dead_code)]
pub fn bearer(state: &AppState, user_id: &str, role: &str) -> String {
    let token = create_jwt(user_id, role, &state.config.jwt_signing_key).expect("token");
    format!("Bearer {}", token)
}

/// Insert a user with the given role.
#[allow(dead_code)]
pub async fn seed_user(state: &AppState, id: &str, role: &str) -> User {
    let mut user = User::new(
        id.to_string(),
        format!("User {}", id),
        format!("{}@example.com", id),
        now_utc(),
    );
    user.role = role.to_string();
    state.db.insert(&user).await.expect("seed user");
    user
}

/// Insert a guide whose profile has the given verification flag.
#[allow(dead_code)]
pub async fn seed_guide(state: &AppState, id: &str, verified: bool) -> User {
    let mut guide = User::new(
        id.to_string(),
        format!("Guide {}", id),
        format!("{}@example.com", id),
        now_utc(),
    );
    guide.role = "guide".to_string();
    guide.is_guide = true;
    guide.guide_details_mut().is_verified = verified;
    state.db.insert(&guide).await.expect("seed guide");
    guide
}

/// Insert a destination.
#[allow(dead_code)]
pub async fn seed_destination(
    state: &AppState,
    id: &str,
    name: &str,
    level: ActivityLevel,
    price: f64,
    guide: Option<&str>,
) -> Destination {
    let destination = Destination {
        id: id.to_string(),
        name: name.to_string(),
        trip_type: TripType::OpenTrip,
        activity_level: level,
        guide: guide.map(str::to_string),
        description: "-".to_string(),
        benefits: "-".to_string(),
        price,
        rating: 0.0,
        photo: "-".to_string(),
    };
    state
        .db
        .insert(&destination)
        .await
        .expect("seed destination");
    destination
}

/// Send a request and decode the JSON body (`Null` when empty).
#[allow(dead_code)]
pub async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

/// Build an authenticated request with an optional JSON body.
#[allow(dead_code)]
pub fn authed(
    method: &str,
    uri: &str,
    auth: &str,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, auth);
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
