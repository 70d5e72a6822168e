// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Run-scoped deduplication of user-facing achievement events.

use crate::time_utils::epoch_bucket;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Width of the time bucket baked into shown-achievement keys.
const SHOWN_KEY_BUCKET_SECONDS: i64 = 60;

/// Build the opaque dedup key for a level completion.
pub fn achievement_key(location_id: &str, level: u32, at: DateTime<Utc>) -> String {
    format!(
        "{}-{}-{}",
        location_id,
        level,
        epoch_bucket(at, SHOWN_KEY_BUCKET_SECONDS)
    )
}

/// Keys already surfaced to the notification layer within one run.
///
/// Best-effort UI guard only: the authoritative once-per-level guarantee
/// is the advancement ratchet, which owns the award records.
#[derive(Debug, Default)]
pub struct ShownAchievements {
    shown: HashSet<String>,
}

impl ShownAchievements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the payload only on first sight of `key`.
    pub fn notify_if_new<T>(&mut self, key: &str, payload: T) -> Option<T> {
        if self.shown.insert(key.to_string()) {
            Some(payload)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.shown.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shown.is_empty()
    }
}
