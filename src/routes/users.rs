// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User routes: signup, profiles, favorites, a user's orders and products.

use super::request_context;
use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{Destination, Order, User};
use crate::permissions::capabilities::{GET_USERS, MANAGE_DESTINATIONS, MANAGE_USERS};
use crate::services::{NewUser, OrderDraft, UserUpdate};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// Routes reachable without a session.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/v1/signup", post(signup))
}

/// User routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/v1/users", get(list_users))
        .route(
            "/v1/users/{user_id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route(
            "/v1/users/{user_id}/favorites",
            get(list_favorites).post(add_favorite),
        )
        .route(
            "/v1/users/{user_id}/favorites/{destination_id}",
            delete(remove_favorite),
        )
        .route(
            "/v1/users/{user_id}/orders",
            get(list_user_orders).post(create_order),
        )
        .route(
            "/v1/users/{user_id}/orders/reconcile",
            post(reconcile_orders),
        )
        .route("/v1/users/{user_id}/products", post(register_product))
}

// ─── Profiles ────────────────────────────────────────────────

async fn signup(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewUser>,
) -> Result<(StatusCode, Json<User>)> {
    let ctx = request_context(&state);
    let user = state.accounts.signup(&ctx, body).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<Vec<User>>> {
    state.gate.require(&caller, Some(GET_USERS), None)?;
    let ctx = request_context(&state);
    Ok(Json(state.accounts.list_users(&ctx).await?))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<User>> {
    state.gate.require(&caller, Some(GET_USERS), Some(&user_id))?;
    let ctx = request_context(&state);
    Ok(Json(state.accounts.get_user(&ctx, &user_id).await?))
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Json(body): Json<UserUpdate>,
) -> Result<Json<User>> {
    state.gate.require(&caller, Some(MANAGE_USERS), Some(&user_id))?;
    let ctx = request_context(&state);
    Ok(Json(state.accounts.update_user(&ctx, &user_id, body).await?))
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<StatusCode> {
    state.gate.require(&caller, Some(MANAGE_USERS), Some(&user_id))?;
    let ctx = request_context(&state);
    state.accounts.delete_user(&ctx, &user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Favorites ───────────────────────────────────────────────

#[derive(Deserialize)]
struct DestinationRequest {
    destination: String,
}

async fn list_favorites(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Destination>>> {
    state.gate.require(&caller, Some(GET_USERS), Some(&user_id))?;
    let ctx = request_context(&state);
    Ok(Json(state.relations.list_favorites(&ctx, &user_id).await?))
}

async fn add_favorite(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Json(body): Json<DestinationRequest>,
) -> Result<Json<User>> {
    state.gate.require(&caller, Some(MANAGE_USERS), Some(&user_id))?;
    let ctx = request_context(&state);
    let user = state
        .relations
        .add_favorite(&ctx, &user_id, &body.destination)
        .await?;
    Ok(Json(user))
}

async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path((user_id, destination_id)): Path<(String, String)>,
) -> Result<Json<User>> {
    state.gate.require(&caller, Some(MANAGE_USERS), Some(&user_id))?;
    let ctx = request_context(&state);
    let user = state
        .relations
        .remove_favorite(&ctx, &user_id, &destination_id)
        .await?;
    Ok(Json(user))
}

// ─── Orders ──────────────────────────────────────────────────

/// Body for placing an order.
#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct CreateOrderRequest {
    destination: String,
    start_date: Option<DateTime<Utc>>,
    finished_date: Option<DateTime<Utc>>,
    due_date: Option<DateTime<Utc>>,
    #[validate(range(min = 0.0))]
    total_price: Option<f64>,
}

async fn list_user_orders(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Order>>> {
    state.gate.require(&caller, Some(GET_USERS), Some(&user_id))?;
    let ctx = request_context(&state);
    Ok(Json(state.relations.list_user_orders(&ctx, &user_id).await?))
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    state.gate.require(&caller, Some(MANAGE_USERS), Some(&user_id))?;
    body.validate()?;

    let draft = OrderDraft {
        start_date: body.start_date,
        finished_date: body.finished_date,
        due_date: body.due_date,
        total_price: body.total_price,
    };
    let ctx = request_context(&state);
    let order = state
        .relations
        .create_order(&ctx, &user_id, &body.destination, draft)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn reconcile_orders(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<User>> {
    state.gate.require(&caller, Some(MANAGE_USERS), Some(&user_id))?;
    let ctx = request_context(&state);
    Ok(Json(
        state.relations.reconcile_user_orders(&ctx, &user_id).await?,
    ))
}

// ─── Guide products ──────────────────────────────────────────

async fn register_product(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Json(body): Json<DestinationRequest>,
) -> Result<Json<User>> {
    state
        .gate
        .require(&caller, Some(MANAGE_DESTINATIONS), Some(&user_id))?;
    let ctx = request_context(&state);
    let user = state
        .relations
        .register_guide_product(&ctx, &body.destination, &user_id)
        .await?;
    Ok(Json(user))
}
