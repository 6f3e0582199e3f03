//! Runtime configuration.
//!
//! All settings come from the environment (a `.env` file is honored via
//! `dotenvy` in `main`). Every required variable is checked up front so a
//! misconfigured run fails before any spreadsheet is touched.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};

/// Request timeout applied to every API call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolved runtime configuration for one batch run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base address of the repository API, e.g. `https://api.eufarmbook.eu`.
    pub api_address: String,
    /// Target project identifier, sent with every upload.
    pub project_id: String,
    /// Account email for token acquisition.
    pub email: String,
    /// Account password for token acquisition.
    pub password: String,
    /// Directory holding the metadata spreadsheets.
    pub metadata_dir: PathBuf,
    /// Directory holding the knowledge-object files referenced by rows.
    pub objects_dir: PathBuf,
}

impl Config {
    /// Build the configuration from the environment, failing fast on any
    /// missing required variable.
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            api_address: required("API_ADDRESS")?,
            project_id: required("PROJECT_ID")?,
            email: required("EMAIL")?,
            password: required("PASSWORD")?,
            metadata_dir: optional_path("METADATA_DIR", "data"),
            objects_dir: optional_path("KO_DIR", "data/kos"),
        })
    }
}

fn required(name: &'static str) -> ConfigResult<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

fn optional_path(name: &str, default: &str) -> PathBuf {
    env::var(name)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_var_names_the_variable() {
        let err = ConfigError::MissingVar("API_ADDRESS");
        assert!(err.to_string().contains("API_ADDRESS"));
    }
}
