// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Presentation collaborators (map widget, workout list, notifications).
//!
//! The controller only tells a `Presenter` what changed. `ViewState` is a
//! presenter that records the resulting view so it can be served as JSON to
//! whatever front end draws the map and list.

use crate::models::{Coords, Workout, WorkoutDetail, WorkoutId, WorkoutKind};
use serde::Serialize;
use std::collections::VecDeque;

/// Notifications kept in `ViewState`; older ones are dropped.
const MAX_NOTIFICATIONS: usize = 20;

/// Output side of the controller.
pub trait Presenter: Send {
    /// Insert a list entry at the top of the list.
    fn render_entry(&mut self, workout: &Workout);

    fn clear_list(&mut self);

    /// Place (or replace) the map marker for a workout.
    fn place_marker(&mut self, workout: &Workout);

    fn remove_marker(&mut self, id: &WorkoutId);

    fn clear_markers(&mut self);

    fn center_on(&mut self, coords: Coords, zoom: u8);

    /// Show a message to the user.
    fn notify(&mut self, message: &str);
}

/// One rendered list row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListEntry {
    pub id: WorkoutId,
    pub kind: WorkoutKind,
    pub title: String,
    pub icon: &'static str,
    pub distance: f64,
    pub duration: f64,
    /// Pace or speed, one decimal place
    pub metric: String,
    pub metric_unit: &'static str,
    /// Cadence or elevation gain
    pub detail: f64,
    pub detail_unit: &'static str,
    pub clicks: u32,
}

impl From<&Workout> for ListEntry {
    fn from(workout: &Workout) -> Self {
        let (metric, metric_unit, detail, detail_unit) = match workout.detail() {
            WorkoutDetail::Running { cadence, pace } => (pace, "min/km", cadence, "spm"),
            WorkoutDetail::Cycling {
                elevation_gain,
                speed,
            } => (speed, "km/h", elevation_gain, "m"),
        };

        Self {
            id: workout.id().clone(),
            kind: workout.kind(),
            title: workout.description().to_string(),
            icon: workout.kind().icon(),
            distance: workout.distance(),
            duration: workout.duration(),
            metric: format!("{:.1}", metric),
            metric_unit,
            detail,
            detail_unit,
            clicks: workout.clicks(),
        }
    }
}

/// A map marker with its popup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub id: WorkoutId,
    pub coords: Coords,
    pub popup: String,
    /// `running-popup` or `cycling-popup`
    pub class_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapView {
    pub center: Coords,
    pub zoom: u8,
}

/// Recorded view: list rows top to bottom, markers, map view, messages.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewState {
    pub entries: Vec<ListEntry>,
    pub markers: Vec<Marker>,
    pub map: Option<MapView>,
    pub notifications: VecDeque<String>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of list rows from top to bottom.
    pub fn entry_ids(&self) -> Vec<&WorkoutId> {
        self.entries.iter().map(|e| &e.id).collect()
    }
}

impl Presenter for ViewState {
    fn render_entry(&mut self, workout: &Workout) {
        self.entries.insert(0, ListEntry::from(workout));
    }

    fn clear_list(&mut self) {
        self.entries.clear();
    }

    fn place_marker(&mut self, workout: &Workout) {
        self.remove_marker(workout.id());
        self.markers.push(Marker {
            id: workout.id().clone(),
            coords: workout.coords(),
            popup: workout.popup_text(),
            class_name: format!("{}-popup", workout.kind()),
        });
    }

    fn remove_marker(&mut self, id: &WorkoutId) {
        self.markers.retain(|m| &m.id != id);
    }

    fn clear_markers(&mut self) {
        self.markers.clear();
    }

    fn center_on(&mut self, coords: Coords, zoom: u8) {
        self.map = Some(MapView {
            center: coords,
            zoom,
        });
    }

    fn notify(&mut self, message: &str) {
        if self.notifications.len() == MAX_NOTIFICATIONS {
            self.notifications.pop_front();
        }
        self.notifications.push_back(message.to_string());
    }
}
