//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every section falls back to its defaults when absent.

pub mod engine;
pub mod logging;
pub mod scan;

use serde::{Deserialize, Serialize};

pub use self::engine::{CostModel, EngineConfig, ResidualShares, WeightingFactors};
pub use self::logging::LoggingConfig;
pub use self::scan::ScanConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Scoring and recommendation settings.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Bulk scan settings.
    #[serde(default)]
    pub scan: ScanConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Facility snapshot the scan binary loads (JSON).
    #[serde(default)]
    pub snapshot_path: Option<String>,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `PLACEMENT_`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("PLACEMENT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
