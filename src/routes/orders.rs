// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Order routes. Orders are placed through `/v1/users/{id}/orders`.

use super::request_context;
use crate::context::OperationContext;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Order, OrderStatus};
use crate::permissions::capabilities::MANAGE_ORDERS;
use crate::services::Decision;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

/// Order routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/v1/orders", get(list_orders))
        .route("/v1/orders/{order_id}", get(get_order).delete(delete_order))
        .route("/v1/orders/{order_id}/status", put(update_status))
        .route("/v1/orders/{order_id}/dates", put(update_dates))
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<Vec<Order>>> {
    state.gate.require(&caller, Some(MANAGE_ORDERS), None)?;
    let ctx = request_context(&state);
    Ok(Json(state.relations.list_orders(&ctx).await?))
}

/// Who besides `manageOrders` holders may act on one order.
#[derive(Clone, Copy, PartialEq)]
enum OrderScope {
    /// The guide running the ordered trip.
    Guide,
    /// The guide, or the user who placed the order.
    GuideOrOrderer,
}

/// Authorize `caller` for one order.
///
/// Callers without `manageOrders` get `Forbidden` for a missing order as
/// well, so unknown IDs and other people's orders look the same.
async fn authorize_order(
    state: &AppState,
    ctx: &OperationContext,
    caller: &AuthUser,
    order_id: &str,
    scope: OrderScope,
) -> Result<()> {
    state.gate.require(caller, None, None)?;
    let privileged = state
        .gate
        .check(&caller.role, Some(MANAGE_ORDERS), &caller.user_id, None);
    if privileged == Decision::Allow {
        return Ok(());
    }

    let order = state
        .relations
        .get_order(ctx, order_id)
        .await
        .map_err(conceal_missing)?;
    if scope == OrderScope::GuideOrOrderer
        && state.gate.check(
            &caller.role,
            Some(MANAGE_ORDERS),
            &caller.user_id,
            Some(&order.ordered_by),
        ) == Decision::Allow
    {
        return Ok(());
    }

    let guide = state.relations.order_guide(ctx, &order).await?;
    state.gate.require(caller, Some(MANAGE_ORDERS), guide.as_deref())
}

fn conceal_missing(err: AppError) -> AppError {
    match err {
        AppError::NotFound(_) => {
            AppError::Forbidden(format!("missing capability {}", MANAGE_ORDERS))
        }
        other => other,
    }
}

/// Visible to `manageOrders` holders, the user who placed it and its guide.
async fn get_order(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(order_id): Path<String>,
) -> Result<Json<Order>> {
    let ctx = request_context(&state);
    authorize_order(&state, &ctx, &caller, &order_id, OrderScope::GuideOrOrderer).await?;
    Ok(Json(state.relations.get_order(&ctx, &order_id).await?))
}

#[derive(Deserialize)]
struct StatusRequest {
    status: OrderStatus,
}

/// Guides drive the lifecycle of orders for their own trips.
async fn update_status(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(order_id): Path<String>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<Order>> {
    let ctx = request_context(&state);
    authorize_order(&state, &ctx, &caller, &order_id, OrderScope::Guide).await?;
    Ok(Json(
        state
            .relations
            .update_order_status(&ctx, &order_id, body.status)
            .await?,
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatesRequest {
    start_date: Option<DateTime<Utc>>,
    finished_date: Option<DateTime<Utc>>,
}

async fn update_dates(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(order_id): Path<String>,
    Json(body): Json<DatesRequest>,
) -> Result<Json<Order>> {
    let ctx = request_context(&state);
    authorize_order(&state, &ctx, &caller, &order_id, OrderScope::Guide).await?;
    Ok(Json(
        state
            .relations
            .update_order_dates(&ctx, &order_id, body.start_date, body.finished_date)
            .await?,
    ))
}

/// Deletion stays with `manageOrders` holders.
async fn delete_order(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(order_id): Path<String>,
) -> Result<StatusCode> {
    state.gate.require(&caller, Some(MANAGE_ORDERS), None)?;
    let ctx = request_context(&state);
    state.relations.delete_order(&ctx, &order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
