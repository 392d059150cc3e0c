//! CLI configuration

use serde::Deserialize;

use core_kernel::Timezone;

/// Settings read from `SUBMISSION_*` environment variables
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Log level used when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Timezone whose calendar date licenses are checked against
    pub facility_timezone: Timezone,
    /// Treat the payer API as unreachable and queue submissions locally
    pub offline: bool,
    /// Recorded as the initiator of each submission
    pub reviewer: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_json: false,
            facility_timezone: Timezone::default(),
            offline: false,
            reviewer: None,
        }
    }
}

impl CliConfig {
    /// Loads configuration from the process environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_source(config::Environment::with_prefix("SUBMISSION"))
    }

    /// Loads configuration from an explicit set of `SUBMISSION_*` variables
    pub fn from_vars<I>(vars: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self::from_source(
            config::Environment::with_prefix("SUBMISSION").source(Some(vars.into_iter().collect())),
        )
    }

    fn from_source(source: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(source.try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
