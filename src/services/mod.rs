// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod accounts;
pub mod authorization;
pub mod catalog;
pub mod order_lifecycle;
pub mod relations;

pub use accounts::{AccountsService, NewUser, UserUpdate};
pub use authorization::{AuthorizationGate, Decision};
pub use catalog::{CatalogService, DestinationUpdate, NewDestination, NewReview, ReviewUpdate};
pub use order_lifecycle::OrderDraft;
pub use relations::{DestinationFilters, RelationsService};
