// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod destination;
pub mod order;
pub mod review;
pub mod user;

pub use destination::{ActivityLevel, Destination, TripType};
pub use order::{Order, OrderStatus};
pub use review::Review;
pub use user::{FavoriteRef, GuideDetails, OrderRef, ProductRef, User};
