// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout controller.
//!
//! Turns user intents (map click, form submit, edit, delete, sort, reset)
//! into store and storage changes, then asks the presenter to reflect them.
//! Within one intent storage is written before the store changes, so a
//! failed write leaves the store as it was. Rendering comes last.

use crate::db::{KeyValueStore, PersistenceGateway};
use crate::error::{AppError, Result};
use crate::models::form::INVALID_INPUT_MESSAGE;
use crate::models::{Coords, FormInput, Workout, WorkoutFields, WorkoutId};
use crate::services::presenter::Presenter;
use crate::services::store::WorkoutStore;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Default map zoom when centering on a location.
pub const DEFAULT_ZOOM_LEVEL: u8 = 13;

/// Message shown when the user's position cannot be determined.
pub const LOCATION_UNAVAILABLE_MESSAGE: &str = "Could not get your position";

/// Workout form state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FormState {
    /// No form open
    Idle,
    /// Form open for a new workout at `coords`
    Creating { coords: Coords },
    /// Form open to edit `target`
    Editing { target: WorkoutId },
}

/// Whether the map collaborator is usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MapStatus {
    /// Waiting for the user's position
    Pending,
    Ready,
    /// Position could not be acquired; map features stay disabled
    Unavailable,
}

/// Orchestrates the workout store, persistence and presentation.
pub struct WorkoutController<S, P> {
    store: WorkoutStore,
    gateway: PersistenceGateway<S>,
    presenter: P,
    form: FormState,
    map: MapStatus,
    zoom_level: u8,
    sort_descending: bool,
    clock: fn() -> DateTime<Utc>,
}

impl<S: KeyValueStore, P: Presenter> WorkoutController<S, P> {
    pub fn new(gateway: PersistenceGateway<S>, presenter: P, zoom_level: u8) -> Self {
        Self {
            store: WorkoutStore::new(),
            gateway,
            presenter,
            form: FormState::Idle,
            map: MapStatus::Pending,
            zoom_level,
            sort_descending: true,
            clock: Utc::now,
        }
    }

    /// Replace the clock used to timestamp new workouts.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &WorkoutStore {
        &self.store
    }

    pub fn gateway(&self) -> &PersistenceGateway<S> {
        &self.gateway
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn form_state(&self) -> &FormState {
        &self.form
    }

    pub fn map_status(&self) -> MapStatus {
        self.map
    }

    // ─── Startup ─────────────────────────────────────────────────

    /// Load stored workouts into the store and render the list.
    ///
    /// Returns the number of workouts loaded.
    pub fn load(&mut self) -> Result<usize> {
        let workouts = self.gateway.load_all()?;
        self.store.clear();
        for workout in workouts {
            self.store.add(workout);
        }

        self.render_list();
        if self.map == MapStatus::Ready {
            self.render_markers();
        }

        tracing::info!(count = self.store.len(), "Workouts loaded");
        Ok(self.store.len())
    }

    /// The user's position is known and the map can be shown.
    pub fn map_ready(&mut self, position: Coords) {
        self.map = MapStatus::Ready;
        self.presenter.center_on(position, self.zoom_level);
        self.render_markers();
        tracing::info!(
            lat = position.lat,
            lng = position.lng,
            markers = self.store.len(),
            "Map ready"
        );
    }

    /// Geolocation failed. The map stays disabled.
    pub fn map_unavailable(&mut self) {
        self.map = MapStatus::Unavailable;
        self.presenter.notify(LOCATION_UNAVAILABLE_MESSAGE);
        tracing::warn!("Geolocation unavailable, map disabled");
    }

    // ─── Form ────────────────────────────────────────────────────

    /// A location was picked on the map: open the form for a new workout.
    pub fn select_location(&mut self, coords: Coords) -> Result<()> {
        if self.map != MapStatus::Ready {
            tracing::debug!("Ignoring map selection without a map");
            return Err(AppError::LocationUnavailable);
        }

        self.form = FormState::Creating { coords };
        tracing::debug!(lat = coords.lat, lng = coords.lng, "Form opened for new workout");
        Ok(())
    }

    /// Edit action on a rendered workout: open the form targeting it.
    pub fn begin_edit(&mut self, id: &WorkoutId) -> Result<()> {
        let workout = self.store.find_by_id(id).ok_or_else(|| {
            tracing::warn!(workout_id = %id, "Edit requested for unknown workout");
            AppError::NotFound(format!("Workout {} not found", id))
        })?;

        let coords = workout.coords();
        self.form = FormState::Editing {
            target: id.clone(),
        };
        self.center_if_ready(coords);
        tracing::debug!(workout_id = %id, "Form opened for edit");
        Ok(())
    }

    /// Close the form without changes.
    pub fn cancel(&mut self) {
        self.form = FormState::Idle;
    }

    /// Submit the open form.
    ///
    /// Invalid input is reported to the user and leaves the form open with
    /// nothing changed.
    pub fn submit(&mut self, input: &FormInput) -> Result<Workout> {
        let workout = match self.form.clone() {
            FormState::Idle => {
                return Err(AppError::BadRequest("No workout form is open".to_string()));
            }
            FormState::Creating { coords } => {
                let fields = self.validate(input)?;
                let created_at = self.next_timestamp()?;
                let workout = Workout::new(created_at, coords, &fields);

                self.gateway.append_record(&workout)?;
                self.store.add(workout.clone());

                self.presenter.render_entry(&workout);
                if self.map == MapStatus::Ready {
                    self.presenter.place_marker(&workout);
                }

                tracing::info!(
                    workout_id = %workout.id(),
                    kind = %workout.kind(),
                    distance = workout.distance(),
                    "Workout created"
                );
                workout
            }
            FormState::Editing { target } => {
                let fields = self.validate(input)?;
                let updated = self
                    .store
                    .find_by_id(&target)
                    .ok_or_else(|| AppError::NotFound(format!("Workout {} not found", target)))?
                    .with_fields(&fields);
                self.gateway.overwrite_slot_for(&updated)?;
                let workout = self.store.edit_by_id(&target, &fields)?.clone();

                self.render_list();
                if self.map == MapStatus::Ready {
                    self.presenter.place_marker(&workout);
                }

                tracing::info!(
                    workout_id = %workout.id(),
                    kind = %workout.kind(),
                    distance = workout.distance(),
                    "Workout edited"
                );
                workout
            }
        };

        self.form = FormState::Idle;
        Ok(workout)
    }

    // ─── List Actions ────────────────────────────────────────────

    /// Click on a rendered workout: count it and move the map to it.
    ///
    /// Without a usable map the click is ignored and the workout returned
    /// unchanged.
    pub fn select_workout(&mut self, id: &WorkoutId) -> Result<Workout> {
        if self.map != MapStatus::Ready {
            tracing::debug!(workout_id = %id, "Ignoring selection without a map");
            return self
                .store
                .find_by_id(id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("Workout {} not found", id)));
        }

        let workout = self
            .store
            .click(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Workout {} not found", id)))?;

        self.presenter.center_on(workout.coords(), self.zoom_level);
        Ok(workout)
    }

    /// Delete a workout. Unknown ids are a silent no-op.
    ///
    /// Returns whether a workout was removed.
    pub fn delete(&mut self, id: &WorkoutId) -> Result<bool> {
        let Some(removed) = self.store.remove_by_id(id) else {
            tracing::debug!(workout_id = %id, "Delete of unknown workout ignored");
            return Ok(false);
        };

        if !self.gateway.remove_slot_for(id)? {
            let err = AppError::SlotMismatch(format!("no stored slot for workout {}", id));
            tracing::warn!(error = %err, "Deleted workout was not persisted");
        }

        if matches!(&self.form, FormState::Editing { target } if target == id) {
            self.form = FormState::Idle;
        }

        self.render_list();
        self.presenter.remove_marker(id);

        tracing::info!(workout_id = %id, kind = %removed.kind(), "Workout deleted");
        Ok(true)
    }

    /// Re-render the list, alternating between longest-first and creation
    /// order on each call. Returns the ids in emission order.
    pub fn sort(&mut self) -> Vec<WorkoutId> {
        self.presenter.clear_list();

        let ids = self.store.sort_by_distance_descending(self.sort_descending);
        for id in &ids {
            if let Some(workout) = self.store.find_by_id(id) {
                self.presenter.render_entry(workout);
            }
        }

        tracing::debug!(
            descending = self.sort_descending,
            count = ids.len(),
            "Workouts sorted"
        );
        self.sort_descending = !self.sort_descending;
        ids
    }

    /// Delete every workout, in memory and in storage.
    ///
    /// Returns the number of storage slots removed.
    pub fn reset(&mut self) -> Result<usize> {
        let in_memory = self.store.len();
        self.store.clear();
        let removed = self.gateway.clear_all()?;

        self.form = FormState::Idle;
        self.presenter.clear_list();
        self.presenter.clear_markers();

        tracing::info!(in_memory, removed, "Workouts reset");
        Ok(removed)
    }

    // ─── Helpers ─────────────────────────────────────────────────

    fn validate(&mut self, input: &FormInput) -> Result<WorkoutFields> {
        input.validate().inspect_err(|err| {
            tracing::debug!(error = %err, kind = %input.kind, "Rejected workout form");
            self.presenter.notify(INVALID_INPUT_MESSAGE);
        })
    }

    /// Creation time whose derived id is used neither in the store nor by
    /// any storage slot, including slots `load` skipped as undecodable.
    fn next_timestamp(&self) -> Result<DateTime<Utc>> {
        let mut at = (self.clock)();
        loop {
            let id = WorkoutId::from_timestamp(at);
            if !self.store.contains(&id) && !self.gateway.has_slot_for(&id)? {
                return Ok(at);
            }
            at += Duration::milliseconds(1);
        }
    }

    /// Render every workout so the newest is on top.
    fn render_list(&mut self) {
        self.presenter.clear_list();
        for workout in self.store.workouts() {
            self.presenter.render_entry(workout);
        }
    }

    fn render_markers(&mut self) {
        for workout in self.store.workouts() {
            self.presenter.place_marker(workout);
        }
    }

    fn center_if_ready(&mut self, coords: Coords) {
        if self.map == MapStatus::Ready {
            self.presenter.center_on(coords, self.zoom_level);
        }
    }
}
