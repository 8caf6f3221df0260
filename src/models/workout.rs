// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout record model.
//!
//! A workout has an immutable identity (id, creation time, map location)
//! and a set of metrics. Each activity type carries one type-specific field
//! and one derived performance figure:
//! - Running: cadence (steps/min), pace (min/km)
//! - Cycling: elevation gain (m), speed (km/h)
//!
//! Derived figures and the description are only ever computed by the
//! constructors, so they can never go stale.

use crate::time_utils::format_month_day;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of trailing timestamp digits kept in a workout id.
const ID_DIGITS: usize = 10;

/// Workout identifier, derived from the creation timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(String);

impl WorkoutId {
    /// Derive an id from the last ten digits of the millisecond timestamp.
    pub fn from_timestamp(created_at: DateTime<Utc>) -> Self {
        let millis = created_at.timestamp_millis().to_string();
        let start = millis.len().saturating_sub(ID_DIGITS);
        Self(millis[start..].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WorkoutId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for WorkoutId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Map location, serialized as `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

impl Coords {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for Coords {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coords> for [f64; 2] {
    fn from(coords: Coords) -> Self {
        [coords.lat, coords.lng]
    }
}

/// Activity type discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutKind {
    Running,
    Cycling,
}

impl WorkoutKind {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkoutKind::Running => "running",
            WorkoutKind::Cycling => "cycling",
        }
    }

    /// Capitalized name used in descriptions.
    pub fn label(self) -> &'static str {
        match self {
            WorkoutKind::Running => "Running",
            WorkoutKind::Cycling => "Cycling",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            WorkoutKind::Running => "🏃‍♂️",
            WorkoutKind::Cycling => "🚴‍♀️",
        }
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized workout type string.
#[derive(Debug, thiserror::Error)]
#[error("Unknown workout type: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for WorkoutKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "running" => Ok(WorkoutKind::Running),
            "cycling" => Ok(WorkoutKind::Cycling),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// The type-specific input field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KindMetric {
    /// Steps per minute
    Cadence(f64),
    /// Meters climbed
    ElevationGain(f64),
}

/// Validated user-supplied metrics for a workout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkoutFields {
    /// Kilometers
    pub distance: f64,
    /// Minutes
    pub duration: f64,
    pub metric: KindMetric,
}

impl WorkoutFields {
    pub fn running(distance: f64, duration: f64, cadence: f64) -> Self {
        Self {
            distance,
            duration,
            metric: KindMetric::Cadence(cadence),
        }
    }

    pub fn cycling(distance: f64, duration: f64, elevation_gain: f64) -> Self {
        Self {
            distance,
            duration,
            metric: KindMetric::ElevationGain(elevation_gain),
        }
    }

    pub fn kind(&self) -> WorkoutKind {
        match self.metric {
            KindMetric::Cadence(_) => WorkoutKind::Running,
            KindMetric::ElevationGain(_) => WorkoutKind::Cycling,
        }
    }
}

/// Type-specific field plus its derived figure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorkoutDetail {
    Running { cadence: f64, pace: f64 },
    Cycling { elevation_gain: f64, speed: f64 },
}

impl WorkoutDetail {
    fn derive(fields: &WorkoutFields) -> Self {
        match fields.metric {
            KindMetric::Cadence(cadence) => WorkoutDetail::Running {
                cadence,
                pace: pace(fields.distance, fields.duration),
            },
            KindMetric::ElevationGain(elevation_gain) => WorkoutDetail::Cycling {
                elevation_gain,
                speed: speed(fields.distance, fields.duration),
            },
        }
    }
}

/// Minutes per kilometer.
pub fn pace(distance: f64, duration: f64) -> f64 {
    duration / distance
}

/// Kilometers per hour.
pub fn speed(distance: f64, duration: f64) -> f64 {
    distance / (duration / 60.0)
}

/// Human-readable label, e.g. `Running on April 14`.
pub fn describe(kind: WorkoutKind, created_at: DateTime<Utc>) -> String {
    format!("{} on {}", kind.label(), format_month_day(created_at))
}

/// A logged workout.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    id: WorkoutId,
    created_at: DateTime<Utc>,
    coords: Coords,
    distance: f64,
    duration: f64,
    description: String,
    clicks: u32,
    detail: WorkoutDetail,
}

impl Workout {
    /// Create a running workout. Inputs are assumed validated by the caller.
    pub fn running(
        created_at: DateTime<Utc>,
        coords: Coords,
        distance: f64,
        duration: f64,
        cadence: f64,
    ) -> Self {
        Self::new(
            created_at,
            coords,
            &WorkoutFields::running(distance, duration, cadence),
        )
    }

    /// Create a cycling workout. Inputs are assumed validated by the caller.
    pub fn cycling(
        created_at: DateTime<Utc>,
        coords: Coords,
        distance: f64,
        duration: f64,
        elevation_gain: f64,
    ) -> Self {
        Self::new(
            created_at,
            coords,
            &WorkoutFields::cycling(distance, duration, elevation_gain),
        )
    }

    /// Create a workout of the kind implied by `fields`.
    pub fn new(created_at: DateTime<Utc>, coords: Coords, fields: &WorkoutFields) -> Self {
        Self::restore(
            WorkoutId::from_timestamp(created_at),
            created_at,
            coords,
            0,
            fields,
        )
    }

    /// Rebuild a workout with a known identity (e.g. from storage).
    pub fn restore(
        id: WorkoutId,
        created_at: DateTime<Utc>,
        coords: Coords,
        clicks: u32,
        fields: &WorkoutFields,
    ) -> Self {
        Self {
            id,
            created_at,
            coords,
            distance: fields.distance,
            duration: fields.duration,
            description: describe(fields.kind(), created_at),
            clicks,
            detail: WorkoutDetail::derive(fields),
        }
    }

    /// Same identity and location, new metrics.
    pub fn with_fields(&self, fields: &WorkoutFields) -> Self {
        Self::restore(
            self.id.clone(),
            self.created_at,
            self.coords,
            self.clicks,
            fields,
        )
    }

    pub fn click(&mut self) {
        self.clicks += 1;
    }

    pub fn id(&self) -> &WorkoutId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn coords(&self) -> Coords {
        self.coords
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn clicks(&self) -> u32 {
        self.clicks
    }

    pub fn detail(&self) -> WorkoutDetail {
        self.detail
    }

    pub fn kind(&self) -> WorkoutKind {
        match self.detail {
            WorkoutDetail::Running { .. } => WorkoutKind::Running,
            WorkoutDetail::Cycling { .. } => WorkoutKind::Cycling,
        }
    }

    /// The inputs this workout was built from.
    pub fn fields(&self) -> WorkoutFields {
        let metric = match self.detail {
            WorkoutDetail::Running { cadence, .. } => KindMetric::Cadence(cadence),
            WorkoutDetail::Cycling { elevation_gain, .. } => {
                KindMetric::ElevationGain(elevation_gain)
            }
        };
        WorkoutFields {
            distance: self.distance,
            duration: self.duration,
            metric,
        }
    }

    pub fn pace(&self) -> Option<f64> {
        match self.detail {
            WorkoutDetail::Running { pace, .. } => Some(pace),
            WorkoutDetail::Cycling { .. } => None,
        }
    }

    pub fn speed(&self) -> Option<f64> {
        match self.detail {
            WorkoutDetail::Cycling { speed, .. } => Some(speed),
            WorkoutDetail::Running { .. } => None,
        }
    }

    /// Marker popup text: type icon followed by the description.
    pub fn popup_text(&self) -> String {
        format!("{} {}", self.kind().icon(), self.description)
    }
}
