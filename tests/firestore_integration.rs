// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running and skip
//! otherwise. Set FIRESTORE_EMULATOR_HOST (e.g. `localhost:8081`) to run them.

use odyssey_trips::context::OperationContext;
use odyssey_trips::db::Db;
use odyssey_trips::models::{ActivityLevel, Destination, Order, TripType, User};
use odyssey_trips::services::{OrderDraft, RelationsService};
use odyssey_trips::time_utils::now_utc;

mod common;

async fn test_db() -> Db {
    Db::firestore("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Fresh ID so runs against a shared emulator do not collide.
fn unique_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Db::new_id())
}

fn test_user(id: &str) -> User {
    User::new(
        id.to_string(),
        "Emulator User".to_string(),
        format!("{}@example.com", id),
        now_utc(),
    )
}

fn test_destination(id: &str) -> Destination {
    Destination {
        id: id.to_string(),
        name: "Emulator Bali".to_string(),
        trip_type: TripType::Honeymoon,
        activity_level: ActivityLevel::Leisurely,
        guide: None,
        description: "-".to_string(),
        benefits: "-".to_string(),
        price: 500.0,
        rating: 0.0,
        photo: "-".to_string(),
    }
}

#[tokio::test]
async fn test_user_roundtrip_preserves_wire_fields() {
    require_emulator!();

    let db = test_db().await;
    let id = unique_id("user");

    assert!(db.get::<User>(&id).await.unwrap().is_none());

    let mut user = test_user(&id);
    user.guide_details_mut().is_verified = true;
    db.insert(&user).await.unwrap();

    let stored = db.resolve::<User>(&id).await.unwrap();
    assert_eq!(stored.email, user.email);
    assert!(stored.is_verified_guide());
    assert_eq!(stored.created_at, user.created_at);

    db.delete::<User>(&id).await.unwrap();
    assert!(db.get::<User>(&id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_create_order_against_emulator() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_id("user");
    let destination_id = unique_id("dest");
    db.insert(&test_user(&user_id)).await.unwrap();
    db.insert(&test_destination(&destination_id)).await.unwrap();

    let relations = RelationsService::new(db.clone());
    let order = relations
        .create_order(
            &OperationContext::unbounded(),
            &user_id,
            &destination_id,
            OrderDraft::default(),
        )
        .await
        .unwrap();

    let stored = db.resolve::<Order>(&order.id).await.unwrap();
    assert_eq!(stored.due_date, order.due_date);

    let user = db.resolve::<User>(&user_id).await.unwrap();
    assert_eq!(user.orders.len(), 1);
    assert_eq!(user.orders[0].order, order.id);

    db.delete::<Order>(&order.id).await.unwrap();
    db.delete::<User>(&user_id).await.unwrap();
    db.delete::<Destination>(&destination_id).await.unwrap();
}

#[tokio::test]
async fn test_add_favorite_against_emulator() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_id("user");
    let destination_id = unique_id("dest");
    db.insert(&test_user(&user_id)).await.unwrap();
    db.insert(&test_destination(&destination_id)).await.unwrap();

    let relations = RelationsService::new(db.clone());
    let ctx = OperationContext::unbounded();
    relations
        .add_favorite(&ctx, &user_id, &destination_id)
        .await
        .unwrap();
    relations
        .add_favorite(&ctx, &user_id, &destination_id)
        .await
        .unwrap();

    let favorites = relations.list_favorites(&ctx, &user_id).await.unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].id, destination_id);

    db.delete::<User>(&user_id).await.unwrap();
    db.delete::<Destination>(&destination_id).await.unwrap();
}
