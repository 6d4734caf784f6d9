// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Favorites: set semantics, concurrency and dangling references.

use axum::http::StatusCode;
use odyssey_trips::context::OperationContext;
use odyssey_trips::error::AppError;
use odyssey_trips::models::{ActivityLevel, Destination, User};

mod common;

use common::{authed, bearer, create_test_app, seed_destination, seed_user, send};

#[tokio::test]
async fn test_add_favorite_twice_keeps_one_entry() {
    let (_, state) = create_test_app();
    seed_user(&state, "u1", "user").await;
    seed_destination(&state, "d1", "Bali", ActivityLevel::Moderate, 100.0, None).await;
    let ctx = OperationContext::unbounded();

    state.relations.add_favorite(&ctx, "u1", "d1").await.unwrap();
    let user = state.relations.add_favorite(&ctx, "u1", "d1").await.unwrap();

    assert_eq!(user.favorites.len(), 1);
    assert_eq!(user.favorites[0].destination, "d1");
}

#[tokio::test]
async fn test_concurrent_adds_leave_one_entry() {
    let (_, state) = create_test_app();
    seed_user(&state, "u1", "user").await;
    seed_destination(&state, "d1", "Bali", ActivityLevel::Moderate, 100.0, None).await;

    let mut handles = Vec::new();
    for _ in 0..16 {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            state
                .relations
                .add_favorite(&OperationContext::unbounded(), "u1", "d1")
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let user = state.db.resolve::<User>("u1").await.unwrap();
    assert_eq!(user.favorites.len(), 1);
}

#[tokio::test]
async fn test_add_favorite_missing_entities() {
    let (_, state) = create_test_app();
    seed_user(&state, "u1", "user").await;
    seed_destination(&state, "d1", "Bali", ActivityLevel::Moderate, 100.0, None).await;
    let ctx = OperationContext::unbounded();

    let err = state
        .relations
        .add_favorite(&ctx, "u1", "missing")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = state
        .relations
        .add_favorite(&ctx, "ghost", "d1")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_list_favorites_skips_deleted_destinations() {
    let (_, state) = create_test_app();
    seed_user(&state, "u1", "user").await;
    seed_destination(&state, "d1", "Bali", ActivityLevel::Moderate, 100.0, None).await;
    seed_destination(&state, "d2", "Lombok", ActivityLevel::Leisurely, 80.0, None).await;
    let ctx = OperationContext::unbounded();

    state.relations.add_favorite(&ctx, "u1", "d1").await.unwrap();
    state.relations.add_favorite(&ctx, "u1", "d2").await.unwrap();
    state.db.delete::<Destination>("d1").await.unwrap();

    let favorites = state.relations.list_favorites(&ctx, "u1").await.unwrap();
    let ids: Vec<_> = favorites.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["d2"]);
}

#[tokio::test]
async fn test_list_favorites_reflects_current_destination() {
    let (_, state) = create_test_app();
    seed_user(&state, "u1", "user").await;
    let mut bali =
        seed_destination(&state, "d1", "Bali", ActivityLevel::Moderate, 100.0, None).await;
    let ctx = OperationContext::unbounded();
    state.relations.add_favorite(&ctx, "u1", "d1").await.unwrap();

    bali.price = 150.0;
    state.db.upsert(&bali).await.unwrap();

    let favorites = state.relations.list_favorites(&ctx, "u1").await.unwrap();
    assert_eq!(favorites[0].price, 150.0);
}

#[tokio::test]
async fn test_remove_favorite_then_add_again() {
    let (_, state) = create_test_app();
    seed_user(&state, "u1", "user").await;
    seed_destination(&state, "d1", "Bali", ActivityLevel::Moderate, 100.0, None).await;
    let ctx = OperationContext::unbounded();

    state.relations.add_favorite(&ctx, "u1", "d1").await.unwrap();
    let user = state
        .relations
        .remove_favorite(&ctx, "u1", "d1")
        .await
        .unwrap();
    assert!(user.favorites.is_empty());

    let user = state.relations.add_favorite(&ctx, "u1", "d1").await.unwrap();
    assert_eq!(user.favorites.len(), 1);
}

#[tokio::test]
async fn test_favorites_over_http() {
    let (app, state) = create_test_app();
    seed_user(&state, "u1", "user").await;
    seed_destination(&state, "d1", "Bali", ActivityLevel::Moderate, 100.0, None).await;
    let auth = bearer(&state, "u1", "user");

    let add = serde_json::json!({ "destination": "d1" });
    let (status, _) = send(
        &app,
        authed("POST", "/v1/users/u1/favorites", &auth, Some(add.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        authed("POST", "/v1/users/u1/favorites", &auth, Some(add)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["favorites"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, authed("GET", "/v1/users/u1/favorites", &auth, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "Bali");

    let (status, body) = send(
        &app,
        authed("DELETE", "/v1/users/u1/favorites/d1", &auth, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["favorites"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_cannot_edit_someone_elses_favorites() {
    let (app, state) = create_test_app();
    seed_user(&state, "u1", "user").await;
    seed_user(&state, "u2", "user").await;
    seed_destination(&state, "d1", "Bali", ActivityLevel::Moderate, 100.0, None).await;
    let auth = bearer(&state, "u1", "user");

    let (status, _) = send(
        &app,
        authed(
            "POST",
            "/v1/users/u2/favorites",
            &auth,
            Some(serde_json::json!({ "destination": "d1" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let user = state.db.resolve::<User>("u2").await.unwrap();
    assert!(user.favorites.is_empty());
}
