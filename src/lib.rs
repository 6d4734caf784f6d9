// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Odyssey Trips: booking backend for travelers, guides and trips
//!
//! This crate provides the HTTP API over users, destinations, orders and
//! reviews, keeping the references between them consistent and gating every
//! operation on the caller's role.

pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod permissions;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Db;
use permissions::PermissionTable;
use services::{AccountsService, AuthorizationGate, CatalogService, RelationsService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub gate: AuthorizationGate,
    pub accounts: AccountsService,
    pub catalog: CatalogService,
    pub relations: RelationsService,
}

impl AppState {
    /// Wire services over one store handle and permission table.
    pub fn new(config: Config, db: Db, permissions: PermissionTable) -> Self {
        Self {
            gate: AuthorizationGate::new(Arc::new(permissions)),
            accounts: AccountsService::new(db.clone()),
            catalog: CatalogService::new(db.clone()),
            relations: RelationsService::new(db.clone()),
            config,
            db,
        }
    }
}
