// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Destination routes, including name search and a destination's reviews.

use super::request_context;
use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{ActivityLevel, Destination, Review, TripType};
use crate::permissions::capabilities::{GET_REVIEW, MANAGE_DESTINATIONS};
use crate::services::{Decision, DestinationFilters, DestinationUpdate, NewDestination};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Destination routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/v1/destinations",
            get(list_destinations).post(create_destination),
        )
        .route("/v1/destinations/search", get(search_destinations))
        .route(
            "/v1/destinations/{destination_id}",
            get(get_destination)
                .put(update_destination)
                .delete(delete_destination),
        )
        .route(
            "/v1/destinations/{destination_id}/reviews",
            get(destination_reviews),
        )
}

/// Allow holders of `manageDestinations`, or the destination's own guide.
async fn authorize_owner(state: &AppState, caller: &AuthUser, destination_id: &str) -> Result<()> {
    // Unknown roles are refused before anything is read.
    state.gate.require(caller, None, None)?;

    let privileged = state
        .gate
        .check(&caller.role, Some(MANAGE_DESTINATIONS), &caller.user_id, None);
    if privileged == Decision::Allow {
        return Ok(());
    }

    let ctx = request_context(state);
    let destination = state.catalog.get_destination(&ctx, destination_id).await?;
    state
        .gate
        .require(caller, Some(MANAGE_DESTINATIONS), destination.guide.as_deref())
}

async fn list_destinations(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<Vec<Destination>>> {
    state.gate.require(&caller, None, None)?;
    let ctx = request_context(&state);
    Ok(Json(state.catalog.list_destinations(&ctx).await?))
}

async fn create_destination(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Json(body): Json<NewDestination>,
) -> Result<(StatusCode, Json<Destination>)> {
    // Guides may list trips that name themselves as the guide.
    state
        .gate
        .require(&caller, Some(MANAGE_DESTINATIONS), body.guide.as_deref())?;
    let ctx = request_context(&state);
    let destination = state.catalog.create_destination(&ctx, body).await?;
    Ok((StatusCode::CREATED, Json(destination)))
}

async fn get_destination(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(destination_id): Path<String>,
) -> Result<Json<Destination>> {
    state.gate.require(&caller, None, None)?;
    let ctx = request_context(&state);
    Ok(Json(
        state.catalog.get_destination(&ctx, &destination_id).await?,
    ))
}

async fn update_destination(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(destination_id): Path<String>,
    Json(body): Json<DestinationUpdate>,
) -> Result<Json<Destination>> {
    authorize_owner(&state, &caller, &destination_id).await?;
    if let Some(guide) = body.guide.as_deref() {
        // Handing a trip to another guide needs the capability itself.
        state
            .gate
            .require(&caller, Some(MANAGE_DESTINATIONS), Some(guide))?;
    }
    let ctx = request_context(&state);
    Ok(Json(
        state
            .catalog
            .update_destination(&ctx, &destination_id, body)
            .await?,
    ))
}

async fn delete_destination(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(destination_id): Path<String>,
) -> Result<StatusCode> {
    authorize_owner(&state, &caller, &destination_id).await?;
    let ctx = request_context(&state);
    state
        .catalog
        .delete_destination(&ctx, &destination_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Search ──────────────────────────────────────────────────

/// Query string for `/v1/destinations/search`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchQuery {
    #[serde(default)]
    name: String,
    activity_level: Option<ActivityLevel>,
    #[serde(rename = "type")]
    trip_type: Option<TripType>,
    min_price: Option<f64>,
    max_price: Option<f64>,
    guide: Option<bool>,
}

async fn search_destinations(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Destination>>> {
    state.gate.require(&caller, None, None)?;

    let filters = DestinationFilters {
        activity_level: query.activity_level,
        trip_type: query.trip_type,
        min_price: query.min_price,
        max_price: query.max_price,
        guide: query.guide,
    };
    let ctx = request_context(&state);
    let results = state
        .relations
        .search_destinations_by_name(&ctx, &query.name, &filters)
        .await?;

    tracing::debug!(pattern = %query.name, count = results.len(), "Destination search");
    Ok(Json(results))
}

// ─── Reviews ─────────────────────────────────────────────────

async fn destination_reviews(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(destination_id): Path<String>,
) -> Result<Json<Vec<Review>>> {
    state.gate.require(&caller, Some(GET_REVIEW), None)?;
    let ctx = request_context(&state);
    Ok(Json(
        state
            .catalog
            .reviews_for_destination(&ctx, &destination_id)
            .await?,
    ))
}
