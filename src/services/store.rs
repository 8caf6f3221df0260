// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory workout collection.
//!
//! Workouts are kept in creation order alongside a parallel distance index
//! used for sorting. Both sequences are mutated together so entry `i` of
//! the index always describes workout `i`.

use crate::error::{AppError, Result};
use crate::models::{Workout, WorkoutFields, WorkoutId};
use serde::Serialize;

/// Sort key for one workout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceEntry {
    pub id: WorkoutId,
    pub distance: f64,
}

impl From<&Workout> for DistanceEntry {
    fn from(workout: &Workout) -> Self {
        Self {
            id: workout.id().clone(),
            distance: workout.distance(),
        }
    }
}

/// Ordered workouts plus their distance index.
#[derive(Debug, Default)]
pub struct WorkoutStore {
    workouts: Vec<Workout>,
    distances: Vec<DistanceEntry>,
}

impl WorkoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a workout and its index entry.
    pub fn add(&mut self, workout: Workout) {
        self.distances.push(DistanceEntry::from(&workout));
        self.workouts.push(workout);
        self.debug_check();
    }

    pub fn find_by_id(&self, id: &WorkoutId) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id() == id)
    }

    pub fn contains(&self, id: &WorkoutId) -> bool {
        self.position_of(id).is_some()
    }

    /// Ordinal position in creation order.
    pub fn position_of(&self, id: &WorkoutId) -> Option<usize> {
        self.workouts.iter().position(|w| w.id() == id)
    }

    /// Record a click on a workout. Returns the updated workout.
    pub fn click(&mut self, id: &WorkoutId) -> Option<&Workout> {
        let workout = self.workouts.iter_mut().find(|w| w.id() == id)?;
        workout.click();
        Some(workout)
    }

    /// Replace a workout's metrics, keeping its identity and location.
    ///
    /// The workout is rebuilt from `fields`, so derived values and the
    /// distance index follow the new inputs. The type may change.
    pub fn edit_by_id(&mut self, id: &WorkoutId, fields: &WorkoutFields) -> Result<&Workout> {
        let index = self
            .position_of(id)
            .ok_or_else(|| AppError::NotFound(format!("Workout {} not found", id)))?;

        let updated = self.workouts[index].with_fields(fields);
        self.distances[index] = DistanceEntry::from(&updated);
        self.workouts[index] = updated;
        self.debug_check();

        Ok(&self.workouts[index])
    }

    /// Remove a workout and its index entry. No-op if the id is unknown.
    pub fn remove_by_id(&mut self, id: &WorkoutId) -> Option<Workout> {
        let index = self.position_of(id)?;
        self.distances.remove(index);
        let removed = self.workouts.remove(index);
        self.debug_check();
        Some(removed)
    }

    /// Ids in the order they should be rendered into a list that inserts
    /// each new entry at the top.
    ///
    /// With `descending` set, the last id emitted is the longest workout,
    /// so the rendered list reads longest first. Otherwise ids are emitted
    /// in creation order, which renders newest first.
    pub fn sort_by_distance_descending(&self, descending: bool) -> Vec<WorkoutId> {
        if !descending {
            return self.distances.iter().map(|e| e.id.clone()).collect();
        }

        let mut sorted = self.distances.clone();
        sorted.sort_by(|a, b| b.distance.total_cmp(&a.distance));
        sorted.into_iter().rev().map(|e| e.id).collect()
    }

    pub fn clear(&mut self) {
        self.workouts.clear();
        self.distances.clear();
    }

    /// Workouts in creation order.
    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn distance_index(&self) -> &[DistanceEntry] {
        &self.distances
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    fn debug_check(&self) {
        debug_assert_eq!(self.workouts.len(), self.distances.len());
        debug_assert!(self
            .workouts
            .iter()
            .zip(&self.distances)
            .all(|(w, e)| w.id() == &e.id && w.distance() == e.distance));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coords;
    use chrono::{Duration, TimeZone, Utc};

    fn run_at(offset_ms: i64, distance: f64) -> Workout {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap();
        let at = start + Duration::milliseconds(offset_ms);
        Workout::running(at, Coords::new(0.0, 0.0), distance, 30.0, 170.0)
    }

    #[test]
    fn test_add_then_find() {
        let mut store = WorkoutStore::new();
        let run = run_at(0, 5.0);
        store.add(run.clone());

        assert_eq!(store.find_by_id(run.id()), Some(&run));
        assert_eq!(store.distance_index()[0], DistanceEntry::from(&run));
    }

    #[test]
    fn test_edit_updates_index_and_derived_values() {
        let mut store = WorkoutStore::new();
        let run = run_at(0, 5.0);
        let id = run.id().clone();
        store.add(run);

        let edited = store
            .edit_by_id(&id, &WorkoutFields::running(10.0, 40.0, 180.0))
            .unwrap();
        assert_eq!(edited.pace(), Some(4.0));
        assert_eq!(store.distance_index()[0].distance, 10.0);
    }

    #[test]
    fn test_edit_unknown_is_not_found() {
        let mut store = WorkoutStore::new();
        let err = store
            .edit_by_id(&WorkoutId::from("42"), &WorkoutFields::running(1.0, 1.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_remove_keeps_index_aligned() {
        let mut store = WorkoutStore::new();
        let (a, b, c) = (run_at(0, 5.0), run_at(1, 2.0), run_at(2, 8.0));
        store.add(a.clone());
        store.add(b.clone());
        store.add(c.clone());

        assert_eq!(store.remove_by_id(b.id()), Some(b));
        assert_eq!(
            store.distance_index(),
            &[DistanceEntry::from(&a), DistanceEntry::from(&c)]
        );
    }

    #[test]
    fn test_click_increments() {
        let mut store = WorkoutStore::new();
        let run = run_at(0, 5.0);
        store.add(run.clone());

        store.click(run.id());
        assert_eq!(store.click(run.id()).map(Workout::clicks), Some(2));
        assert!(store.click(&WorkoutId::from("missing")).is_none());
    }
}
