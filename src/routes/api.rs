// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout API routes.
//!
//! Each handler translates one front-end event into a controller intent.
//! The controller lock is held for the whole intent.

use crate::error::{AppError, Result};
use crate::models::{Coords, FormInput, Workout, WorkoutDetail, WorkoutId};
use crate::services::{FormState, MapStatus, ViewState};
use crate::time_utils::format_utc_rfc3339;
use crate::{AppController, AppState};
use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Workout API routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/workouts", get(list_workouts).delete(reset_workouts))
        .route("/api/workouts/sort", post(sort_workouts))
        .route("/api/workouts/{id}", delete(delete_workout))
        .route("/api/workouts/{id}/select", post(select_workout))
        .route("/api/workouts/{id}/edit", post(begin_edit))
        .route("/api/view", get(get_view))
        .route("/api/map/ready", post(map_ready))
        .route("/api/map/unavailable", post(map_unavailable))
        .route("/api/map/click", post(map_click))
        .route("/api/form/submit", post(submit_form))
        .route("/api/form/cancel", post(cancel_form))
}

// ─── Responses ───────────────────────────────────────────────

/// A workout as returned by the API.
#[derive(Serialize, Clone, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkoutResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub created_at: String,
    pub lat: f64,
    pub lng: f64,
    pub distance: f64,
    pub duration: f64,
    pub cadence: Option<f64>,
    pub pace: Option<f64>,
    pub elevation_gain: Option<f64>,
    pub speed: Option<f64>,
    pub clicks: u32,
}

impl From<&Workout> for WorkoutResponse {
    fn from(workout: &Workout) -> Self {
        let (cadence, elevation_gain) = match workout.detail() {
            WorkoutDetail::Running { cadence, .. } => (Some(cadence), None),
            WorkoutDetail::Cycling { elevation_gain, .. } => (None, Some(elevation_gain)),
        };

        Self {
            id: workout.id().to_string(),
            kind: workout.kind().to_string(),
            description: workout.description().to_string(),
            created_at: format_utc_rfc3339(workout.created_at()),
            lat: workout.coords().lat,
            lng: workout.coords().lng,
            distance: workout.distance(),
            duration: workout.duration(),
            cadence,
            pace: workout.pace(),
            elevation_gain,
            speed: workout.speed(),
            clicks: workout.clicks(),
        }
    }
}

/// Current form, map and rendered view.
#[derive(Serialize, Clone, Debug)]
pub struct ViewResponse {
    pub form: FormState,
    pub map_status: MapStatus,
    pub view: ViewState,
}

impl From<&AppController> for ViewResponse {
    fn from(controller: &AppController) -> Self {
        Self {
            form: controller.form_state().clone(),
            map_status: controller.map_status(),
            view: controller.presenter().clone(),
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeleteResponse {
    pub deleted: bool,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ResetResponse {
    pub removed: usize,
}

#[derive(Serialize)]
pub struct SortResponse {
    /// Ids in the order they were rendered
    pub rendered: Vec<WorkoutId>,
    pub view: ViewState,
}

// ─── Requests ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LocationRequest {
    pub lat: f64,
    pub lng: f64,
}

impl LocationRequest {
    fn to_coords(&self) -> Result<Coords> {
        let valid = self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng);

        if !valid {
            return Err(AppError::BadRequest(format!(
                "Invalid location: lat={}, lng={}",
                self.lat, self.lng
            )));
        }
        Ok(Coords::new(self.lat, self.lng))
    }
}

// ─── Workouts ────────────────────────────────────────────────

/// All workouts in creation order.
async fn list_workouts(State(state): State<Arc<AppState>>) -> Json<Vec<WorkoutResponse>> {
    let controller = state.controller.lock().await;
    Json(
        controller
            .store()
            .workouts()
            .iter()
            .map(WorkoutResponse::from)
            .collect(),
    )
}

async fn select_workout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<WorkoutResponse>> {
    let mut controller = state.controller.lock().await;
    let workout = controller.select_workout(&WorkoutId::from(id))?;
    Ok(Json(WorkoutResponse::from(&workout)))
}

async fn begin_edit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ViewResponse>> {
    let mut controller = state.controller.lock().await;
    controller.begin_edit(&WorkoutId::from(id))?;
    Ok(Json(ViewResponse::from(&*controller)))
}

async fn delete_workout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let mut controller = state.controller.lock().await;
    let deleted = controller.delete(&WorkoutId::from(id))?;
    Ok(Json(DeleteResponse { deleted }))
}

async fn sort_workouts(State(state): State<Arc<AppState>>) -> Json<SortResponse> {
    let mut controller = state.controller.lock().await;
    let rendered = controller.sort();
    Json(SortResponse {
        rendered,
        view: controller.presenter().clone(),
    })
}

async fn reset_workouts(State(state): State<Arc<AppState>>) -> Result<Json<ResetResponse>> {
    let mut controller = state.controller.lock().await;
    let removed = controller.reset()?;
    Ok(Json(ResetResponse { removed }))
}

// ─── View & Map ──────────────────────────────────────────────

async fn get_view(State(state): State<Arc<AppState>>) -> Json<ViewResponse> {
    let controller = state.controller.lock().await;
    Json(ViewResponse::from(&*controller))
}

async fn map_ready(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LocationRequest>,
) -> Result<Json<ViewResponse>> {
    let position = body.to_coords()?;
    let mut controller = state.controller.lock().await;
    controller.map_ready(position);
    Ok(Json(ViewResponse::from(&*controller)))
}

async fn map_unavailable(State(state): State<Arc<AppState>>) -> Json<ViewResponse> {
    let mut controller = state.controller.lock().await;
    controller.map_unavailable();
    Json(ViewResponse::from(&*controller))
}

async fn map_click(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LocationRequest>,
) -> Result<Json<ViewResponse>> {
    let coords = body.to_coords()?;
    let mut controller = state.controller.lock().await;
    controller.select_location(coords)?;
    Ok(Json(ViewResponse::from(&*controller)))
}

// ─── Form ────────────────────────────────────────────────────

async fn submit_form(
    State(state): State<Arc<AppState>>,
    Json(input): Json<FormInput>,
) -> Result<Json<WorkoutResponse>> {
    let mut controller = state.controller.lock().await;
    let workout = controller.submit(&input)?;
    Ok(Json(WorkoutResponse::from(&workout)))
}

async fn cancel_form(State(state): State<Arc<AppState>>) -> Json<ViewResponse> {
    let mut controller = state.controller.lock().await;
    controller.cancel();
    Json(ViewResponse::from(&*controller))
}
