// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Odyssey Trips API Server
//!
//! Serves users, destinations, orders and reviews for the booking frontend,
//! with role-based authorization over a static permission table.

use odyssey_trips::{config::Config, db::Db, permissions::PermissionTable, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        backend = ?config.storage_backend,
        "Starting Odyssey Trips API"
    );

    // Load the role → capability table
    let permissions = match &config.roles_file {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading permission table");
            PermissionTable::load_from_file(path)?
        }
        None => PermissionTable::builtin()?,
    };
    tracing::debug!(roles = ?permissions.roles().collect::<Vec<_>>(), "Known roles");

    // Open the document store
    let db = Db::connect(&config).await?;

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), db, permissions));

    // Build router
    let app = odyssey_trips::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("odyssey_trips=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
