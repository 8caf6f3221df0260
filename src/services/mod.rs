// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod controller;
pub mod presenter;
pub mod store;

pub use controller::{FormState, MapStatus, WorkoutController};
pub use presenter::{Presenter, ViewState};
pub use store::WorkoutStore;
