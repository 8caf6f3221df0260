// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout Mapper API Server
//!
//! Serves the workout controller to a map front end and persists workouts
//! to a local JSON key-value file.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use workout_mapper::{
    config::Config,
    db::{FileKvStore, KeyValueStore, PersistenceGateway},
    services::{ViewState, WorkoutController},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Workout Mapper API");

    // Open the workout store
    let kv: Arc<dyn KeyValueStore> = Arc::new(FileKvStore::open(&config.storage_path)?);
    tracing::info!(path = %config.storage_path.display(), "Workout storage opened");

    let mut controller = WorkoutController::new(
        PersistenceGateway::new(kv),
        ViewState::new(),
        config.map_zoom_level,
    );
    let loaded = controller.load()?;
    tracing::info!(count = loaded, "Stored workouts restored");

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        controller: Mutex::new(controller),
    });

    // Build router
    let app = workout_mapper::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("workout_mapper=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
