// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout persistence on top of the key-value substrate.
//!
//! Each workout occupies one slot keyed `workout:<id>`, so a record can be
//! overwritten or removed without knowing its position in any list.
//!
//! Older data used bare numeric slot keys ("0", "1", ...) assigned from the
//! occupied-slot count at write time. Those keys go non-contiguous after a
//! deletion and the next append can land on an occupied slot. `load_all`
//! still reads them, tolerating gaps, and re-keys each under its id.

use crate::db::keys;
use crate::db::KeyValueStore;
use crate::error::{AppError, Result};
use crate::models::{Coords, Workout, WorkoutFields, WorkoutId, WorkoutKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted representation of a workout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredWorkout {
    pub id: WorkoutId,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: WorkoutKind,
    pub coords: Coords,
    pub distance: f64,
    pub duration: f64,
    #[serde(default)]
    pub clicks: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_gain: Option<f64>,
    /// Older edits wrote the cycling field under this name.
    #[serde(default, skip_serializing)]
    pub elevation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

impl From<&Workout> for StoredWorkout {
    fn from(workout: &Workout) -> Self {
        let fields = workout.fields();
        let (cadence, elevation_gain) = match fields.metric {
            crate::models::KindMetric::Cadence(c) => (Some(c), None),
            crate::models::KindMetric::ElevationGain(e) => (None, Some(e)),
        };

        Self {
            id: workout.id().clone(),
            date: workout.created_at(),
            kind: workout.kind(),
            coords: workout.coords(),
            distance: workout.distance(),
            duration: workout.duration(),
            clicks: workout.clicks(),
            description: Some(workout.description().to_string()),
            cadence,
            pace: workout.pace(),
            elevation_gain,
            elevation: None,
            speed: workout.speed(),
        }
    }
}

impl StoredWorkout {
    /// Rebuild the workout, recomputing derived values from the inputs.
    pub fn into_workout(self) -> std::result::Result<Workout, String> {
        let fields = match self.kind {
            WorkoutKind::Running => {
                let cadence = self.cadence.ok_or("running workout without cadence")?;
                WorkoutFields::running(self.distance, self.duration, cadence)
            }
            WorkoutKind::Cycling => {
                let elevation = self
                    .elevation
                    .or(self.elevation_gain)
                    .ok_or("cycling workout without elevation gain")?;
                WorkoutFields::cycling(self.distance, self.duration, elevation)
            }
        };

        Ok(Workout::restore(
            self.id,
            self.date,
            self.coords,
            self.clicks,
            &fields,
        ))
    }
}

/// Durable workout storage.
pub struct PersistenceGateway<S> {
    kv: S,
}

impl<S: KeyValueStore> PersistenceGateway<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    /// Slot key for a workout id.
    pub fn slot_key(id: &WorkoutId) -> String {
        format!("{}{}", keys::WORKOUT_PREFIX, id)
    }

    /// Whether any value, decodable or not, occupies the workout's slot.
    pub fn has_slot_for(&self, id: &WorkoutId) -> Result<bool> {
        Ok(self.kv.contains(&Self::slot_key(id))?)
    }

    /// Store a new workout. Fails if its slot is already occupied.
    pub fn append_record(&self, workout: &Workout) -> Result<String> {
        let key = Self::slot_key(workout.id());
        if self.kv.contains(&key)? {
            tracing::warn!(workout_id = %workout.id(), key = %key, "Append onto occupied slot");
            return Err(AppError::SlotMismatch(format!(
                "slot {} is already occupied",
                key
            )));
        }

        self.kv.set(&key, encode(workout)?)?;
        tracing::debug!(workout_id = %workout.id(), key = %key, "Workout appended");
        Ok(key)
    }

    /// Load every stored workout, ordered by creation time.
    ///
    /// Undecodable values and slots whose stored id disagrees with the key
    /// are logged and skipped.
    pub fn load_all(&self) -> Result<Vec<Workout>> {
        let migrated = self.migrate_legacy_slots()?;
        if migrated > 0 {
            tracing::info!(migrated, "Re-keyed legacy workout slots");
        }

        let mut workouts = Vec::new();
        for key in self.kv.keys() {
            let Some(suffix) = key.strip_prefix(keys::WORKOUT_PREFIX) else {
                continue;
            };
            let Some(raw) = self.kv.get(&key)? else {
                continue;
            };

            match decode(&raw) {
                Ok(workout) if workout.id().as_str() == suffix => workouts.push(workout),
                Ok(workout) => {
                    let err = AppError::SlotMismatch(format!(
                        "slot {} holds workout {}",
                        key,
                        workout.id()
                    ));
                    tracing::warn!(error = %err, "Skipping mismatched slot");
                }
                Err(reason) => {
                    tracing::warn!(key = %key, reason = %reason, "Skipping undecodable workout");
                }
            }
        }

        workouts.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });

        tracing::debug!(count = workouts.len(), "Loaded workouts");
        Ok(workouts)
    }

    /// Replace the stored value for an existing workout.
    ///
    /// A missing slot is written anyway so storage matches memory, and the
    /// mismatch is logged.
    pub fn overwrite_slot_for(&self, workout: &Workout) -> Result<()> {
        let key = Self::slot_key(workout.id());
        if !self.kv.contains(&key)? {
            tracing::warn!(workout_id = %workout.id(), key = %key, "Overwrite of missing slot");
        }
        self.kv.set(&key, encode(workout)?)?;
        Ok(())
    }

    /// Remove a workout's slot. Returns whether the slot was occupied.
    pub fn remove_slot_for(&self, id: &WorkoutId) -> Result<bool> {
        let key = Self::slot_key(id);
        let existed = self.kv.contains(&key)?;
        if existed {
            self.kv.remove(&key)?;
        }
        Ok(existed)
    }

    /// Delete every occupied workout slot. Returns the number removed.
    pub fn clear_all(&self) -> Result<usize> {
        let slots: Vec<String> = self
            .kv
            .keys()
            .into_iter()
            .filter(|k| is_workout_slot(k))
            .collect();

        for key in &slots {
            self.kv.remove(key)?;
        }

        tracing::info!(removed = slots.len(), "Cleared workout storage");
        Ok(slots.len())
    }

    /// Number of occupied workout slots.
    pub fn slot_count(&self) -> usize {
        self.kv.keys().iter().filter(|k| is_workout_slot(k)).count()
    }

    /// Move values under numeric slot keys to id-keyed slots.
    fn migrate_legacy_slots(&self) -> Result<usize> {
        let mut legacy: Vec<(u64, String)> = self
            .kv
            .keys()
            .into_iter()
            .filter_map(|k| k.parse::<u64>().ok().map(|n| (n, k)))
            .collect();
        legacy.sort_unstable();

        let mut migrated = 0;
        for (_, key) in legacy {
            let Some(raw) = self.kv.get(&key)? else {
                continue;
            };

            let workout = match decode(&raw) {
                Ok(workout) => workout,
                Err(reason) => {
                    tracing::warn!(key = %key, reason = %reason, "Leaving undecodable legacy slot");
                    continue;
                }
            };

            let new_key = Self::slot_key(workout.id());
            if self.kv.contains(&new_key)? {
                tracing::warn!(
                    key = %key,
                    new_key = %new_key,
                    "Legacy slot duplicates an existing workout, dropping it"
                );
            } else {
                self.kv.set(&new_key, encode(&workout)?)?;
                migrated += 1;
            }
            self.kv.remove(&key)?;
        }

        Ok(migrated)
    }
}

fn is_workout_slot(key: &str) -> bool {
    key.starts_with(keys::WORKOUT_PREFIX) || key.parse::<u64>().is_ok()
}

fn encode(workout: &Workout) -> Result<String> {
    serde_json::to_string(&StoredWorkout::from(workout))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode workout: {}", e)))
}

fn decode(raw: &str) -> std::result::Result<Workout, String> {
    serde_json::from_str::<StoredWorkout>(raw)
        .map_err(|e| e.to_string())?
        .into_workout()
}
