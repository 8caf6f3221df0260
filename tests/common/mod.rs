// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceExt;
use workout_mapper::config::Config;
use workout_mapper::db::{KeyValueStore, MemoryKvStore, PersistenceGateway};
use workout_mapper::routes::create_router;
use workout_mapper::services::{ViewState, WorkoutController};
use workout_mapper::AppState;

/// Fixed creation time for deterministic ids and descriptions.
#[allow(dead_code)]
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 14, 9, 0, 0).unwrap()
}

/// Controller over an in-memory store, with the map already usable.
#[allow(dead_code)]
pub fn test_controller() -> WorkoutController<Arc<dyn KeyValueStore>, ViewState> {
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
    controller_over(kv)
}

/// Controller over a given store, with the map already usable.
#[allow(dead_code)]
pub fn controller_over(
    kv: Arc<dyn KeyValueStore>,
) -> WorkoutController<Arc<dyn KeyValueStore>, ViewState> {
    let mut controller =
        WorkoutController::new(PersistenceGateway::new(kv), ViewState::new(), 13)
            .with_clock(fixed_now);
    controller.map_ready(workout_mapper::models::Coords::new(39.92, 32.85));
    controller
}

/// Create a test app over an in-memory store with the map pending.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
    let controller = WorkoutController::new(PersistenceGateway::new(kv), ViewState::new(), 13)
        .with_clock(fixed_now);

    let state = Arc::new(AppState {
        config: Config::default(),
        controller: Mutex::new(controller),
    });

    (create_router(state.clone()), state)
}

/// Send a request with an optional JSON body and return status plus JSON.
#[allow(dead_code)]
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
