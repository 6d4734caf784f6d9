// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Destination and review records.
//!
//! Reference fields written here (a destination's guide, a review's
//! destination) must resolve at write time; otherwise the write is rejected
//! with `InvalidReference`.

use crate::context::OperationContext;
use crate::db::{Db, Entity};
use crate::error::{AppError, Result};
use crate::models::{ActivityLevel, Destination, Review, TripType, User};
use crate::time_utils::now_utc;
use serde::Deserialize;
use validator::Validate;

/// Payload for creating a destination.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewDestination {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(rename = "type")]
    pub trip_type: TripType,
    pub activity_level: ActivityLevel,
    pub guide: Option<String>,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1))]
    pub benefits: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    pub photo: String,
}

/// Editable destination fields; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DestinationUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub trip_type: Option<TripType>,
    pub activity_level: Option<ActivityLevel>,
    pub guide: Option<String>,
    pub description: Option<String>,
    pub benefits: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f64>,
    pub photo: Option<String>,
}

/// Payload for creating a review.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewReview {
    pub photo: String,
    #[validate(length(min = 1))]
    pub review: String,
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: f64,
    pub destination: Option<String>,
}

/// Editable review fields; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ReviewUpdate {
    pub photo: Option<String>,
    #[validate(length(min = 1))]
    pub review: Option<String>,
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f64>,
    pub destination: Option<String>,
}

#[derive(Clone)]
pub struct CatalogService {
    db: Db,
}

impl CatalogService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Check that a reference field points at an existing entity.
    async fn ensure_reference<T: Entity>(&self, field: &str, id: &str) -> Result<()> {
        match self.db.get::<T>(id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::InvalidReference(format!(
                "{} {} does not name an existing {}",
                field,
                id,
                T::KIND
            ))),
        }
    }

    // ─── Destinations ────────────────────────────────────────────

    pub async fn create_destination(
        &self,
        ctx: &OperationContext,
        new: NewDestination,
    ) -> Result<Destination> {
        new.validate()?;

        if let Some(guide) = new.guide.as_deref() {
            ctx.checkpoint("resolve guide")?;
            self.ensure_reference::<User>("guide", guide).await?;
        }

        ctx.checkpoint("create destination")?;
        let destination = Destination {
            id: Db::new_id(),
            name: new.name,
            trip_type: new.trip_type,
            activity_level: new.activity_level,
            guide: new.guide,
            description: new.description,
            benefits: new.benefits,
            price: new.price,
            rating: 0.0,
            photo: new.photo,
        };
        self.db.insert(&destination).await?;

        tracing::info!(destination_id = %destination.id, guide = ?destination.guide, "Destination created");
        Ok(destination)
    }

    pub async fn list_destinations(&self, ctx: &OperationContext) -> Result<Vec<Destination>> {
        ctx.checkpoint("list destinations")?;
        self.db.list::<Destination>().await
    }

    pub async fn get_destination(
        &self,
        ctx: &OperationContext,
        destination_id: &str,
    ) -> Result<Destination> {
        ctx.checkpoint("get destination")?;
        self.db.resolve::<Destination>(destination_id).await
    }

    pub async fn update_destination(
        &self,
        ctx: &OperationContext,
        destination_id: &str,
        update: DestinationUpdate,
    ) -> Result<Destination> {
        update.validate()?;

        if let Some(guide) = update.guide.as_deref() {
            ctx.checkpoint("resolve guide")?;
            self.ensure_reference::<User>("guide", guide).await?;
        }

        ctx.checkpoint("update destination")?;
        let (destination, ()) = self
            .db
            .modify::<Destination, _, _>(destination_id, |d| {
                if let Some(name) = update.name {
                    d.name = name;
                }
                if let Some(trip_type) = update.trip_type {
                    d.trip_type = trip_type;
                }
                if let Some(level) = update.activity_level {
                    d.activity_level = level;
                }
                if let Some(guide) = update.guide {
                    d.guide = Some(guide);
                }
                if let Some(description) = update.description {
                    d.description = description;
                }
                if let Some(benefits) = update.benefits {
                    d.benefits = benefits;
                }
                if let Some(price) = update.price {
                    d.price = price;
                }
                if let Some(rating) = update.rating {
                    d.rating = rating;
                }
                if let Some(photo) = update.photo {
                    d.photo = photo;
                }
                Ok(())
            })
            .await?;

        tracing::info!(destination_id, "Destination updated");
        Ok(destination)
    }

    /// Delete a destination. Favorites, products and orders that point at it
    /// become dangling and are skipped when resolved.
    pub async fn delete_destination(
        &self,
        ctx: &OperationContext,
        destination_id: &str,
    ) -> Result<()> {
        ctx.checkpoint("resolve destination")?;
        self.db.resolve::<Destination>(destination_id).await?;

        ctx.checkpoint("delete destination")?;
        self.db.delete::<Destination>(destination_id).await?;

        tracing::info!(destination_id, "Destination deleted");
        Ok(())
    }

    // ─── Reviews ─────────────────────────────────────────────────

    pub async fn create_review(&self, ctx: &OperationContext, new: NewReview) -> Result<Review> {
        new.validate()?;

        if let Some(destination) = new.destination.as_deref() {
            ctx.checkpoint("resolve destination")?;
            self.ensure_reference::<Destination>("destination", destination)
                .await?;
        }

        ctx.checkpoint("create review")?;
        let review = Review {
            id: Db::new_id(),
            photo: new.photo,
            review: new.review,
            rating: new.rating,
            destination: new.destination,
            created_at: now_utc(),
        };
        self.db.insert(&review).await?;

        tracing::info!(review_id = %review.id, destination = ?review.destination, "Review created");
        Ok(review)
    }

    pub async fn list_reviews(&self, ctx: &OperationContext) -> Result<Vec<Review>> {
        ctx.checkpoint("list reviews")?;
        self.db.list::<Review>().await
    }

    pub async fn get_review(&self, ctx: &OperationContext, review_id: &str) -> Result<Review> {
        ctx.checkpoint("get review")?;
        self.db.resolve::<Review>(review_id).await
    }

    /// Reviews whose `destination` field names this destination.
    pub async fn reviews_for_destination(
        &self,
        ctx: &OperationContext,
        destination_id: &str,
    ) -> Result<Vec<Review>> {
        ctx.checkpoint("resolve destination")?;
        self.db.resolve::<Destination>(destination_id).await?;

        ctx.checkpoint("list reviews")?;
        self.db
            .find::<Review, _>(|r| r.destination.as_deref() == Some(destination_id))
            .await
    }

    pub async fn update_review(
        &self,
        ctx: &OperationContext,
        review_id: &str,
        update: ReviewUpdate,
    ) -> Result<Review> {
        update.validate()?;

        if let Some(destination) = update.destination.as_deref() {
            ctx.checkpoint("resolve destination")?;
            self.ensure_reference::<Destination>("destination", destination)
                .await?;
        }

        ctx.checkpoint("update review")?;
        let (review, ()) = self
            .db
            .modify::<Review, _, _>(review_id, |r| {
                if let Some(photo) = update.photo {
                    r.photo = photo;
                }
                if let Some(text) = update.review {
                    r.review = text;
                }
                if let Some(rating) = update.rating {
                    r.rating = rating;
                }
                if let Some(destination) = update.destination {
                    r.destination = Some(destination);
                }
                Ok(())
            })
            .await?;

        tracing::info!(review_id, "Review updated");
        Ok(review)
    }

    pub async fn delete_review(&self, ctx: &OperationContext, review_id: &str) -> Result<()> {
        ctx.checkpoint("resolve review")?;
        self.db.resolve::<Review>(review_id).await?;

        ctx.checkpoint("delete review")?;
        self.db.delete::<Review>(review_id).await?;

        tracing::info!(review_id, "Review deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_destination(guide: Option<&str>) -> NewDestination {
        NewDestination {
            name: "Bali Getaway".to_string(),
            trip_type: TripType::OpenTrip,
            activity_level: ActivityLevel::Moderate,
            guide: guide.map(str::to_string),
            description: "Beaches".to_string(),
            benefits: "Meals".to_string(),
            price: 250.0,
            photo: "photo-ref".to_string(),
        }
    }

    fn new_review(destination: Option<&str>) -> NewReview {
        NewReview {
            photo: "-".to_string(),
            review: "Great trip".to_string(),
            rating: 4.5,
            destination: destination.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_unknown_guide_is_invalid_reference() {
        let db = Db::in_memory();
        let service = CatalogService::new(db.clone());

        let err = service
            .create_destination(&OperationContext::unbounded(), new_destination(Some("ghost")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidReference(_)));
        assert!(db.list::<Destination>().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_new_destination_starts_unrated() {
        let service = CatalogService::new(Db::in_memory());
        let destination = service
            .create_destination(&OperationContext::unbounded(), new_destination(None))
            .await
            .unwrap();
        assert_eq!(destination.rating, 0.0);
    }

    #[tokio::test]
    async fn test_negative_price_rejected() {
        let service = CatalogService::new(Db::in_memory());
        let mut new = new_destination(None);
        new.price = -1.0;

        let err = service
            .create_destination(&OperationContext::unbounded(), new)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_reviews_found_by_destination_field() {
        let service = CatalogService::new(Db::in_memory());
        let ctx = OperationContext::unbounded();
        let bali = service
            .create_destination(&ctx, new_destination(None))
            .await
            .unwrap();
        let other = service
            .create_destination(&ctx, new_destination(None))
            .await
            .unwrap();

        let first = service.create_review(&ctx, new_review(Some(&bali.id))).await.unwrap();
        service.create_review(&ctx, new_review(Some(&other.id))).await.unwrap();
        service.create_review(&ctx, new_review(None)).await.unwrap();

        let reviews = service.reviews_for_destination(&ctx, &bali.id).await.unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].id, first.id);
    }

    #[tokio::test]
    async fn test_review_for_missing_destination_rejected() {
        let service = CatalogService::new(Db::in_memory());
        let err = service
            .create_review(&OperationContext::unbounded(), new_review(Some("nowhere")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidReference(_)));
    }
}
