// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Dwell-Tracker: presence and leveling at tracked locations
//!
//! This crate fuses noisy GPS fixes into a stable position, decides
//! whether that position is at a tracked location, maintains resumable
//! dwell sessions, and advances per-location levels with exactly-once
//! achievement events.

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod geo;
pub mod models;
pub mod services;
pub mod time_utils;

pub use engine::{PositionUpdate, TrackingEngine};
