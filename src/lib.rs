// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Workout Mapper: log runs and rides at a spot on the map
//!
//! This crate provides the workout model, its key-value persistence and the
//! controller that keeps the two consistent, plus a small JSON API that a
//! map front end drives.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::KeyValueStore;
use services::{ViewState, WorkoutController};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Controller as wired into the HTTP service.
pub type AppController = WorkoutController<Arc<dyn KeyValueStore>, ViewState>;

/// Shared application state.
///
/// The controller sits behind a mutex so each request's intent runs to
/// completion before the next one starts.
pub struct AppState {
    pub config: Config,
    pub controller: Mutex<AppController>,
}
