// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Review routes.

use super::request_context;
use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::Review;
use crate::permissions::capabilities::{GET_REVIEW, MANAGE_REVIEW};
use crate::services::{NewReview, ReviewUpdate};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use std::sync::Arc;

/// Review routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/v1/reviews", get(list_reviews).post(create_review))
        .route(
            "/v1/reviews/{review_id}",
            get(get_review).put(update_review).delete(delete_review),
        )
}

async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<Vec<Review>>> {
    state.gate.require(&caller, Some(GET_REVIEW), None)?;
    let ctx = request_context(&state);
    Ok(Json(state.catalog.list_reviews(&ctx).await?))
}

async fn create_review(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Json(body): Json<NewReview>,
) -> Result<(StatusCode, Json<Review>)> {
    state.gate.require(&caller, Some(MANAGE_REVIEW), None)?;
    let ctx = request_context(&state);
    let review = state.catalog.create_review(&ctx, body).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

async fn get_review(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(review_id): Path<String>,
) -> Result<Json<Review>> {
    state.gate.require(&caller, Some(GET_REVIEW), None)?;
    let ctx = request_context(&state);
    Ok(Json(state.catalog.get_review(&ctx, &review_id).await?))
}

async fn update_review(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(review_id): Path<String>,
    Json(body): Json<ReviewUpdate>,
) -> Result<Json<Review>> {
    state.gate.require(&caller, Some(MANAGE_REVIEW), None)?;
    let ctx = request_context(&state);
    Ok(Json(
        state.catalog.update_review(&ctx, &review_id, body).await?,
    ))
}

async fn delete_review(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(review_id): Path<String>,
) -> Result<StatusCode> {
    state.gate.require(&caller, Some(MANAGE_REVIEW), None)?;
    let ctx = request_context(&state);
    state.catalog.delete_review(&ctx, &review_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
