// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Order lifecycle: construction, due dates and status transitions.
//!
//! ```text
//! waiting ──► success
//!    │
//!    └─────► failed
//! ```
//!
//! `success` and `failed` are terminal. The due date is fixed at creation.

use crate::error::{AppError, Result};
use crate::models::{Order, OrderStatus};
use chrono::{DateTime, Duration, Utc};

/// Days between order creation and payment due date.
pub const DUE_DATE_OFFSET_DAYS: i64 = 3;

/// Due date for an order created at `created_at`.
pub fn due_date_from(created_at: DateTime<Utc>) -> DateTime<Utc> {
    created_at + Duration::days(DUE_DATE_OFFSET_DAYS)
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Success | OrderStatus::Failed)
    }

    /// Validate a transition to `next`.
    ///
    /// Returns the new status, or `Conflict` when leaving a terminal state.
    /// `waiting → waiting` is accepted as a no-op.
    pub fn transition(self, next: OrderStatus) -> Result<OrderStatus> {
        if self.is_terminal() {
            return Err(AppError::Conflict(format!(
                "Order is already {} and cannot become {}",
                self, next
            )));
        }
        Ok(next)
    }
}

/// Fields supplied by the caller when placing an order.
#[derive(Debug, Clone, Default)]
pub struct OrderDraft {
    pub start_date: Option<DateTime<Utc>>,
    pub finished_date: Option<DateTime<Utc>>,
    /// Overrides the computed due date when present.
    pub due_date: Option<DateTime<Utc>>,
    pub total_price: Option<f64>,
}

/// Build a new order in the initial `waiting` state.
pub fn open_order(
    id: String,
    destination_id: &str,
    user_id: &str,
    draft: OrderDraft,
    now: DateTime<Utc>,
) -> Order {
    Order {
        id,
        status: OrderStatus::Waiting,
        destination: destination_id.to_string(),
        due_date: draft.due_date.unwrap_or_else(|| due_date_from(now)),
        start_date: draft.start_date,
        finished_date: draft.finished_date,
        ordered_by: user_id.to_string(),
        total_price: draft.total_price,
        created_at: now,
    }
}
