// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP-level tests driving the controller through the JSON API.

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::{create_test_app, send};

#[tokio::test]
async fn test_health_check() {
    let (app, _state) = create_test_app();

    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_map_click_before_position_known_is_unavailable() {
    let (app, _state) = create_test_app();

    let (status, body) =
        send(&app, "POST", "/api/map/click", Some(json!({"lat": 1.0, "lng": 2.0}))).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "location_unavailable");
}

#[tokio::test]
async fn test_map_unavailable_reports_notification() {
    let (app, _state) = create_test_app();

    let (status, body) = send(&app, "POST", "/api/map/unavailable", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["map_status"], "unavailable");
    assert_eq!(body["view"]["notifications"][0], "Could not get your position");
}

#[tokio::test]
async fn test_out_of_range_location_is_rejected() {
    let (app, _state) = create_test_app();

    let (status, body) =
        send(&app, "POST", "/api/map/ready", Some(json!({"lat": 120.0, "lng": 0.0}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_submit_without_open_form_is_bad_request() {
    let (app, _state) = create_test_app();

    let (status, _) = send(
        &app,
        "POST",
        "/api/form/submit",
        Some(json!({"type": "running", "distance": 5, "duration": 25, "cadence": 170})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_form_keeps_form_open() {
    let (app, state) = create_test_app();
    send(&app, "POST", "/api/map/ready", Some(json!({"lat": 39.92, "lng": 32.85}))).await;
    send(&app, "POST", "/api/map/click", Some(json!({"lat": 39.93, "lng": 32.86}))).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/form/submit",
        Some(json!({"type": "cycling", "distance": "abc", "duration": "60", "elevation": "10"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");

    let (_, view) = send(&app, "GET", "/api/view", None).await;
    assert_eq!(view["form"]["state"], "creating");
    assert_eq!(
        view["view"]["notifications"][0],
        "Inputs have to be positive numbers!"
    );
    assert!(state.controller.lock().await.store().is_empty());
}

#[tokio::test]
async fn test_null_form_value_is_invalid_input() {
    let (app, _state) = create_test_app();
    send(&app, "POST", "/api/map/ready", Some(json!({"lat": 39.92, "lng": 32.85}))).await;
    send(&app, "POST", "/api/map/click", Some(json!({"lat": 39.93, "lng": 32.86}))).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/form/submit",
        Some(json!({"type": "running", "distance": null, "duration": true, "cadence": 170})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");

    let (_, view) = send(&app, "GET", "/api/view", None).await;
    assert_eq!(
        view["view"]["notifications"][0],
        "Inputs have to be positive numbers!"
    );
}

#[tokio::test]
async fn test_workout_lifecycle() {
    let (app, state) = create_test_app();

    let (status, body) =
        send(&app, "POST", "/api/map/ready", Some(json!({"lat": 39.92, "lng": 32.85}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["map_status"], "ready");
    assert_eq!(body["view"]["map"]["zoom"], 13);

    // Create a run
    let (status, body) =
        send(&app, "POST", "/api/map/click", Some(json!({"lat": 39.93, "lng": 32.86}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["form"]["state"], "creating");

    let (status, run) = send(
        &app,
        "POST",
        "/api/form/submit",
        Some(json!({"type": "running", "distance": "5", "duration": "25", "cadence": "172"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(run["id"], "3085200000");
    assert_eq!(run["type"], "running");
    assert_eq!(run["pace"], 5.0);
    assert_eq!(run["description"], "Running on April 14");
    assert_eq!(run["created_at"], "2024-04-14T09:00:00.000Z");

    // Create a longer ride at the same clock tick
    send(&app, "POST", "/api/map/click", Some(json!({"lat": 40.0, "lng": 32.9}))).await;
    let (status, ride) = send(
        &app,
        "POST",
        "/api/form/submit",
        Some(json!({"type": "cycling", "distance": 20, "duration": 60, "elevation": 150})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ride["id"], "3085200001");
    assert_eq!(ride["speed"], 20.0);
    assert_eq!(ride["elevation_gain"], 150.0);

    let (_, list) = send(&app, "GET", "/api/workouts", None).await;
    assert_eq!(list.as_array().map(Vec::len), Some(2));

    // Clicking counts and recenters
    let (status, selected) = send(&app, "POST", "/api/workouts/3085200000/select", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(selected["clicks"], 1);

    // Edit the run into a longer run
    let (status, view) = send(&app, "POST", "/api/workouts/3085200000/edit", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["form"]["state"], "editing");
    assert_eq!(view["form"]["target"], "3085200000");

    let (status, edited) = send(
        &app,
        "POST",
        "/api/form/submit",
        Some(json!({"type": "running", "distance": 30, "duration": 150, "cadence": 175})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["id"], "3085200000");
    assert_eq!(edited["pace"], 5.0);
    assert_eq!(edited["clicks"], 1);

    // Longest first
    let (status, sorted) = send(&app, "POST", "/api/workouts/sort", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sorted["view"]["entries"][0]["id"], "3085200000");
    assert_eq!(sorted["view"]["entries"][1]["id"], "3085200001");

    // Delete, then delete again
    let (status, body) = send(&app, "DELETE", "/api/workouts/3085200001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);

    let (status, body) = send(&app, "DELETE", "/api/workouts/3085200001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], false);

    let (_, view) = send(&app, "GET", "/api/view", None).await;
    assert_eq!(view["view"]["entries"].as_array().map(Vec::len), Some(1));
    assert_eq!(view["view"]["markers"].as_array().map(Vec::len), Some(1));

    // Reset
    let (status, body) = send(&app, "DELETE", "/api/workouts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 1);

    let controller = state.controller.lock().await;
    assert!(controller.store().is_empty());
    assert_eq!(controller.gateway().slot_count(), 0);
}

#[tokio::test]
async fn test_edit_unknown_workout_is_not_found() {
    let (app, _state) = create_test_app();

    let (status, body) = send(&app, "POST", "/api/workouts/42/edit", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_cancel_closes_form() {
    let (app, _state) = create_test_app();
    send(&app, "POST", "/api/map/ready", Some(json!({"lat": 39.92, "lng": 32.85}))).await;
    send(&app, "POST", "/api/map/click", Some(json!({"lat": 39.93, "lng": 32.86}))).await;

    let (status, body) = send(&app, "POST", "/api/form/cancel", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["form"]["state"], "idle");
}
