// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dwell-Tracker replay driver
//!
//! Reads newline-delimited JSON position fixes from stdin, drives the
//! tracking engine with them, and prints each position update as JSON.
//! Input lines look like:
//!
//! ```json
//! {"user_id": "u1", "fix": {"coordinate": {"latitude": 37.7596, "longitude": -122.427},
//!  "accuracy_meters": 10.0, "timestamp": "2024-01-15T10:00:00Z"}}
//! ```

use dwell_tracker::config::Config;
use dwell_tracker::db::MemoryStore;
use dwell_tracker::models::PositionFix;
use dwell_tracker::services::LocationCatalog;
use dwell_tracker::TrackingEngine;
use serde::Deserialize;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// One stdin line: a fix attributed to a user.
#[derive(Deserialize)]
struct FixEnvelope {
    user_id: String,
    fix: PositionFix,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(catalog = %config.catalog_path, "Starting Dwell-Tracker replay");

    let catalog = LocationCatalog::load_from_file(&config.catalog_path)
        .expect("Failed to load location catalog");
    tracing::info!(count = catalog.locations().len(), "Location catalog loaded");

    let store = Arc::new(MemoryStore::new());
    let engine = TrackingEngine::new(store, catalog, &config);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, shutting down");
                break;
            }
            line = lines.next_line() => {
                match line? {
                    Some(line) if line.trim().is_empty() => continue,
                    Some(line) => process_line(&engine, &line).await,
                    None => break,
                }
            }
        }
    }

    engine.shutdown().await;
    Ok(())
}

/// Parse and feed one stdin line; malformed lines are logged and skipped.
async fn process_line(engine: &TrackingEngine, line: &str) {
    let envelope: FixEnvelope = match serde_json::from_str(line) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!(error = %e, "Skipping malformed input line");
            return;
        }
    };

    if !engine.is_tracking(&envelope.user_id) {
        if let Err(e) = engine.start_tracking(&envelope.user_id).await {
            tracing::error!(user_id = %envelope.user_id, error = %e, "Failed to start tracking");
            return;
        }
    }

    match engine.ingest_position(&envelope.user_id, envelope.fix).await {
        Ok(update) => match serde_json::to_string(&update) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::error!(error = %e, "Failed to serialize update"),
        },
        Err(e) => {
            tracing::warn!(user_id = %envelope.user_id, error = %e, "Fix rejected");
        }
    }
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dwell_tracker=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
