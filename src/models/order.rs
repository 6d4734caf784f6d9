// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Order model for storage and API.
//!
//! Orders are created only through the order-creation mutation, which also
//! links the order into the owning user's `orders` list. Status changes go
//! through `services::order_lifecycle`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order status. `Waiting` is initial; the other two are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Waiting,
    Success,
    Failed,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OrderStatus::Waiting => "waiting",
            OrderStatus::Success => "success",
            OrderStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// An order stored in the `orders` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Document ID
    pub id: String,
    #[serde(default)]
    pub status: OrderStatus,
    /// Ordered destination
    pub destination: String,
    /// Set once at creation
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_date: Option<DateTime<Utc>>,
    /// User who placed the order
    pub ordered_by: String,
    #[serde(default)]
    pub total_price: Option<f64>,
    pub created_at: DateTime<Utc>,
}
