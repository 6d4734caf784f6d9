// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mutations and lookups that span entities or embedded reference lists.
//!
//! Handles:
//! 1. Favorites (set-like add, remove, resolve)
//! 2. Order creation with the user back-link, and status/date updates
//! 3. Guide product registration
//! 4. Destination search with the guide-verification filter
//! 5. Rebuilding a user's order index from the orders collection

use crate::context::OperationContext;
use crate::db::{Db, Entity};
use crate::error::{AppError, Result};
use crate::models::{
    ActivityLevel, Destination, Order, OrderRef, OrderStatus, TripType, User,
};
use crate::services::order_lifecycle::{self, OrderDraft};
use crate::time_utils::{format_utc_rfc3339, now_utc};
use chrono::{DateTime, Utc};
use futures_util::{stream, StreamExt};
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

const MAX_CONCURRENT_LOOKUPS: usize = 16;

/// Attempts at appending a new order to its user before giving up.
pub const ORDER_LINK_ATTEMPTS: u32 = 3;
const ORDER_LINK_BACKOFF: Duration = Duration::from_millis(50);

/// Optional filters for destination search.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationFilters {
    pub activity_level: Option<ActivityLevel>,
    #[serde(rename = "type")]
    pub trip_type: Option<TripType>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Keep only destinations whose guide's verification flag equals this.
    pub guide: Option<bool>,
}

/// Case-insensitive, unanchored substring match. `needle` must be lower-case.
pub fn name_matches(name: &str, needle: &str) -> bool {
    name.to_lowercase().contains(needle)
}

/// Apply the attribute filters (everything except `guide`), keeping order.
pub fn apply_filters(
    destinations: Vec<Destination>,
    filters: &DestinationFilters,
) -> Vec<Destination> {
    destinations
        .into_iter()
        .filter(|d| filters.activity_level.is_none_or(|level| d.activity_level == level))
        .filter(|d| filters.trip_type.is_none_or(|t| d.trip_type == t))
        .filter(|d| filters.min_price.is_none_or(|min| d.price >= min))
        .filter(|d| filters.max_price.is_none_or(|max| d.price <= max))
        .collect()
}

/// Service for relational-consistency operations.
#[derive(Clone)]
pub struct RelationsService {
    db: Db,
}

impl RelationsService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    // ─── Favorites ───────────────────────────────────────────────

    /// Add a destination to a user's favorites unless already present.
    pub async fn add_favorite(
        &self,
        ctx: &OperationContext,
        user_id: &str,
        destination_id: &str,
    ) -> Result<User> {
        ctx.checkpoint("resolve destination")?;
        self.db.resolve::<Destination>(destination_id).await?;

        ctx.checkpoint("update favorites")?;
        // The membership check runs under the user's document lock, so two
        // concurrent adds cannot both insert.
        let (user, added) = self
            .db
            .modify::<User, _, _>(user_id, |user| {
                let added = user.add_favorite(destination_id);
                if added {
                    user.updated_at = now_utc();
                }
                Ok(added)
            })
            .await?;

        tracing::info!(user_id, destination_id, added, "Favorite add");
        Ok(user)
    }

    /// Remove every favorite referencing a destination.
    pub async fn remove_favorite(
        &self,
        ctx: &OperationContext,
        user_id: &str,
        destination_id: &str,
    ) -> Result<User> {
        ctx.checkpoint("update favorites")?;
        let (user, removed) = self
            .db
            .modify::<User, _, _>(user_id, |user| {
                let removed = user.remove_favorite(destination_id);
                if removed > 0 {
                    user.updated_at = now_utc();
                }
                Ok(removed)
            })
            .await?;

        tracing::info!(user_id, destination_id, removed, "Favorite remove");
        Ok(user)
    }

    /// Current snapshots of a user's favorite destinations.
    ///
    /// References to deleted destinations are skipped.
    pub async fn list_favorites(
        &self,
        ctx: &OperationContext,
        user_id: &str,
    ) -> Result<Vec<Destination>> {
        ctx.checkpoint("resolve user")?;
        let user = self.db.resolve::<User>(user_id).await?;

        ctx.checkpoint("resolve favorites")?;
        let ids = user.favorites.into_iter().map(|f| f.destination).collect();
        self.resolve_existing(ids).await
    }

    // ─── Orders ──────────────────────────────────────────────────

    /// Place an order and link it into the user's order list.
    ///
    /// The back-link is idempotent and retried. If it still fails, the order
    /// exists without a user reference and `PartialFailure` is returned so the
    /// caller can retry or reconcile.
    pub async fn create_order(
        &self,
        ctx: &OperationContext,
        user_id: &str,
        destination_id: &str,
        draft: OrderDraft,
    ) -> Result<Order> {
        ctx.checkpoint("resolve user")?;
        let user = self.db.resolve::<User>(user_id).await?;
        ctx.checkpoint("resolve destination")?;
        let destination = self.db.resolve::<Destination>(destination_id).await?;

        ctx.checkpoint("create order")?;
        let order = order_lifecycle::open_order(
            Db::new_id(),
            &destination.id,
            &user.id,
            draft,
            now_utc(),
        );
        self.db.insert(&order).await?;

        tracing::info!(
            order_id = %order.id,
            user_id,
            destination_id,
            due_date = %format_utc_rfc3339(order.due_date),
            "Order created"
        );

        // The order is committed: finish the link even if the deadline passes.
        self.link_order_to_user(&order).await?;

        if let Some(guide_id) = destination.guide.as_deref() {
            self.link_order_to_guide(guide_id, &order.id).await;
        }

        Ok(order)
    }

    async fn link_order_to_user(&self, order: &Order) -> Result<()> {
        let mut last_error = String::new();

        for attempt in 1..=ORDER_LINK_ATTEMPTS {
            let result = self
                .db
                .modify::<User, _, _>(&order.ordered_by, |user| {
                    if user.link_order(&order.id) {
                        user.updated_at = now_utc();
                    }
                    Ok(())
                })
                .await;

            match result {
                Ok(_) => return Ok(()),
                Err(AppError::NotFound(msg)) => {
                    // The user vanished after resolution; retrying cannot help.
                    last_error = msg;
                    break;
                }
                Err(e) => {
                    tracing::warn!(
                        order_id = %order.id,
                        user_id = %order.ordered_by,
                        attempt,
                        error = %e,
                        "Failed to link order to user"
                    );
                    last_error = e.to_string();
                    if attempt < ORDER_LINK_ATTEMPTS {
                        tokio::time::sleep(ORDER_LINK_BACKOFF * attempt).await;
                    }
                }
            }
        }

        tracing::error!(
            order_id = %order.id,
            user_id = %order.ordered_by,
            error = %last_error,
            "Order created but not linked to its user; reconciliation required"
        );
        Err(AppError::PartialFailure(format!(
            "order {} was created but could not be linked to user {}",
            order.id, order.ordered_by
        )))
    }

    /// Record the order on the guide's profile. Failures are logged only.
    async fn link_order_to_guide(&self, guide_id: &str, order_id: &str) {
        let result = self
            .db
            .modify::<User, _, _>(guide_id, |guide| {
                let details = guide.guide_details_mut();
                if !details.orders.iter().any(|o| o.order == order_id) {
                    details.orders.push(OrderRef {
                        order: order_id.to_string(),
                    });
                }
                Ok(())
            })
            .await;

        if let Err(e) = result {
            tracing::warn!(guide_id, order_id, error = %e, "Failed to link order to guide");
        }
    }

    /// Move an order to a new status, enforcing the lifecycle.
    pub async fn update_order_status(
        &self,
        ctx: &OperationContext,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<Order> {
        ctx.checkpoint("update order status")?;
        let (order, previous) = self
            .db
            .modify::<Order, _, _>(order_id, |order| {
                let previous = order.status;
                order.status = previous.transition(status)?;
                Ok(previous)
            })
            .await?;

        tracing::info!(order_id, from = %previous, to = %order.status, "Order status updated");
        Ok(order)
    }

    /// Update an order's trip dates. The due date is never touched.
    pub async fn update_order_dates(
        &self,
        ctx: &OperationContext,
        order_id: &str,
        start_date: Option<DateTime<Utc>>,
        finished_date: Option<DateTime<Utc>>,
    ) -> Result<Order> {
        ctx.checkpoint("update order dates")?;
        let (order, ()) = self
            .db
            .modify::<Order, _, _>(order_id, |order| {
                if start_date.is_some() {
                    order.start_date = start_date;
                }
                if finished_date.is_some() {
                    order.finished_date = finished_date;
                }
                Ok(())
            })
            .await?;

        tracing::debug!(order_id, "Order dates updated");
        Ok(order)
    }

    /// Delete an order and drop its reference from the ordering user.
    ///
    /// The order is removed first; if unlinking fails the user keeps a
    /// dangling reference, which resolution skips and reconciliation drops.
    pub async fn delete_order(&self, ctx: &OperationContext, order_id: &str) -> Result<()> {
        ctx.checkpoint("resolve order")?;
        let order = self.db.resolve::<Order>(order_id).await?;

        ctx.checkpoint("delete order")?;
        self.db.delete::<Order>(order_id).await?;

        let unlinked = self
            .db
            .modify::<User, _, _>(&order.ordered_by, |user| {
                let before = user.orders.len();
                user.orders.retain(|o| o.order != order_id);
                if user.orders.len() != before {
                    user.updated_at = now_utc();
                }
                Ok(())
            })
            .await;
        if let Err(e) = unlinked {
            tracing::warn!(order_id, user_id = %order.ordered_by, error = %e, "Failed to unlink deleted order");
        }

        tracing::info!(order_id, "Order deleted");
        Ok(())
    }

    /// All orders, in store order.
    pub async fn list_orders(&self, ctx: &OperationContext) -> Result<Vec<Order>> {
        ctx.checkpoint("list orders")?;
        self.db.list::<Order>().await
    }

    pub async fn get_order(&self, ctx: &OperationContext, order_id: &str) -> Result<Order> {
        ctx.checkpoint("get order")?;
        self.db.resolve::<Order>(order_id).await
    }

    /// The guide running an order's trip, if the destination still exists
    /// and has one.
    pub async fn order_guide(
        &self,
        ctx: &OperationContext,
        order: &Order,
    ) -> Result<Option<String>> {
        ctx.checkpoint("resolve order destination")?;
        Ok(self
            .db
            .get::<Destination>(&order.destination)
            .await?
            .and_then(|destination| destination.guide))
    }

    /// Current snapshots of a user's orders; dangling references are skipped.
    pub async fn list_user_orders(
        &self,
        ctx: &OperationContext,
        user_id: &str,
    ) -> Result<Vec<Order>> {
        ctx.checkpoint("resolve user")?;
        let user = self.db.resolve::<User>(user_id).await?;

        ctx.checkpoint("resolve orders")?;
        let ids = user.orders.into_iter().map(|o| o.order).collect();
        self.resolve_existing(ids).await
    }

    /// Rebuild `User.orders` from the orders whose `orderedBy` is the user.
    ///
    /// Orders are the record of truth; the user's list is an index. The scan
    /// runs under the user's document lock so a concurrent back-link waits
    /// and lands after the rebuild.
    pub async fn reconcile_user_orders(
        &self,
        ctx: &OperationContext,
        user_id: &str,
    ) -> Result<User> {
        ctx.checkpoint("reconcile orders")?;
        let _guard = self.db.lock_document::<User>(user_id).await;

        let mut user = self.db.resolve::<User>(user_id).await?;
        let mut owned = self
            .db
            .find::<Order, _>(|order| order.ordered_by == user_id)
            .await?;
        owned.sort_by_key(|order| order.created_at);

        let before: HashSet<String> = user.orders.iter().map(|o| o.order.clone()).collect();
        let after: HashSet<String> = owned.iter().map(|o| o.id.clone()).collect();
        let added = after.difference(&before).count();
        let dropped = before.difference(&after).count();

        if added > 0 || dropped > 0 || user.orders.len() != owned.len() {
            user.orders = owned
                .into_iter()
                .map(|order| OrderRef { order: order.id })
                .collect();
            user.updated_at = now_utc();
            self.db.upsert(&user).await?;
        }

        tracing::info!(user_id, added, dropped, "User order index reconciled");
        Ok(user)
    }

    // ─── Guides ──────────────────────────────────────────────────

    /// Append a destination to a guide's offered products.
    pub async fn register_guide_product(
        &self,
        ctx: &OperationContext,
        destination_id: &str,
        user_id: &str,
    ) -> Result<User> {
        ctx.checkpoint("resolve destination")?;
        self.db.resolve::<Destination>(destination_id).await?;

        ctx.checkpoint("update guide products")?;
        let (user, ()) = self
            .db
            .modify::<User, _, _>(user_id, |user| {
                user.guide_details_mut()
                    .products
                    .push(crate::models::ProductRef {
                        destination: destination_id.to_string(),
                    });
                user.updated_at = now_utc();
                Ok(())
            })
            .await?;

        tracing::info!(user_id, destination_id, "Guide product registered");
        Ok(user)
    }

    // ─── Search ──────────────────────────────────────────────────

    /// Search destinations by name, then filter.
    ///
    /// With a `guide` filter, destinations whose guide reference cannot be
    /// resolved are excluded rather than reported as errors.
    pub async fn search_destinations_by_name(
        &self,
        ctx: &OperationContext,
        pattern: &str,
        filters: &DestinationFilters,
    ) -> Result<Vec<Destination>> {
        ctx.checkpoint("search destinations")?;
        let needle = pattern.to_lowercase();
        let matches = self
            .db
            .find::<Destination, _>(|d| name_matches(&d.name, &needle))
            .await?;
        let candidates = apply_filters(matches, filters);

        let Some(want_verified) = filters.guide else {
            return Ok(candidates);
        };

        ctx.checkpoint("resolve guides")?;
        let db = &self.db;
        let verdicts: Vec<Result<(Destination, bool)>> = stream::iter(candidates)
            .map(|destination| async move {
                let guide = match destination.guide.as_deref() {
                    Some(guide_id) => db.get::<User>(guide_id).await?,
                    None => None,
                };
                let keep = match guide {
                    Some(guide) => guide.is_verified_guide() == want_verified,
                    None => {
                        tracing::debug!(
                            destination_id = %destination.id,
                            guide = ?destination.guide,
                            "Excluding destination with unresolvable guide"
                        );
                        false
                    }
                };
                Ok::<_, AppError>((destination, keep))
            })
            .buffered(MAX_CONCURRENT_LOOKUPS)
            .collect()
            .await;

        let mut results = Vec::new();
        for verdict in verdicts {
            let (destination, keep) = verdict?;
            if keep {
                results.push(destination);
            }
        }
        Ok(results)
    }

    // ─── Helpers ─────────────────────────────────────────────────

    /// Resolve IDs to entities, keeping order and skipping missing ones.
    async fn resolve_existing<T: Entity>(&self, ids: Vec<String>) -> Result<Vec<T>> {
        let requested = ids.len();
        let db = &self.db;

        let found = stream::iter(ids)
            .map(|id| async move { db.get::<T>(&id).await })
            .buffered(MAX_CONCURRENT_LOOKUPS)
            .collect::<Vec<Result<Option<T>>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<Option<T>>>>()?;

        let resolved: Vec<T> = found.into_iter().flatten().collect();
        if resolved.len() < requested {
            tracing::debug!(
                kind = T::KIND,
                skipped = requested - resolved.len(),
                "Skipped dangling references"
            );
        }
        Ok(resolved)
    }
}
