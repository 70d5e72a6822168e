//! Application configuration loaded from environment variables.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the tracked-location catalog (GeoJSON)
    pub catalog_path: String,
    /// Whether checkpoints are written to the audit log
    pub audit_checkpoints: bool,
    /// Concurrency cap for ending sessions at shutdown
    pub end_concurrency: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let end_concurrency = env::var("END_CONCURRENCY")
            .unwrap_or_else(|_| "8".to_string())
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or(ConfigError::Invalid("END_CONCURRENCY"))?;

        Ok(Self {
            catalog_path: env::var("CATALOG_PATH")
                .unwrap_or_else(|_| "data/locations.geojson".to_string()),
            audit_checkpoints: env::var("AUDIT_CHECKPOINTS")
                .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
                .unwrap_or(false),
            end_concurrency,
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            catalog_path: "data/locations.geojson".to_string(),
            audit_checkpoints: true,
            end_concurrency: 4,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env mutation is process-global, so defaults and overrides share
    // one test.
    #[test]
    fn test_config_from_env() {
        env::remove_var("CATALOG_PATH");
        env::remove_var("AUDIT_CHECKPOINTS");
        env::remove_var("END_CONCURRENCY");

        let config = Config::from_env().expect("Config should load");
        assert_eq!(config.catalog_path, "data/locations.geojson");
        assert!(!config.audit_checkpoints);
        assert_eq!(config.end_concurrency, 8);

        env::set_var("AUDIT_CHECKPOINTS", "true");
        env::set_var("END_CONCURRENCY", "2");
        let config = Config::from_env().expect("Config should load");
        assert!(config.audit_checkpoints);
        assert_eq!(config.end_concurrency, 2);

        env::set_var("END_CONCURRENCY", "0");
        assert!(Config::from_env().is_err());

        env::remove_var("AUDIT_CHECKPOINTS");
        env::remove_var("END_CONCURRENCY");
    }
}
