// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and bucketing.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Bucket a timestamp into fixed-width intervals of epoch seconds.
///
/// `width_seconds` must be positive.
pub fn epoch_bucket(date: DateTime<Utc>, width_seconds: i64) -> i64 {
    date.timestamp().div_euclid(width_seconds)
}
