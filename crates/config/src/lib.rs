#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for varia
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (TOML)
//! - Environment variables

pub mod flags;

pub use flags::{BuildFlags, FIX_IMAGE_VARIANT_FALLBACK};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use varia_errors::{ConfigError, Error};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub flags: BuildFlags,
}

/// Mutator engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_jobs")]
    pub jobs: usize, // 0 = auto-detect
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            jobs: 0,
            parallel: true,
        }
    }
}

fn default_jobs() -> usize {
    0 // 0 = auto-detect
}

fn default_parallel() -> bool {
    true
}

impl Config {
    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this structure.
    pub fn from_toml_str(contents: &str) -> Result<Self, Error> {
        toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        tracing::debug!(path = %path.display(), "loaded varia configuration");
        Self::from_toml_str(&contents)
    }

    /// Load configuration from an optional path or use defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&PathBuf>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Ok(Self::default()),
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // VARIA_JOBS
        if let Ok(jobs) = std::env::var("VARIA_JOBS") {
            self.engine.jobs = jobs.parse().map_err(|_| ConfigError::InvalidValue {
                field: "VARIA_JOBS".to_string(),
                value: jobs,
            })?;
        }

        // VARIA_FIX_IMAGE_VARIANT_FALLBACK
        if let Ok(fix) = std::env::var("VARIA_FIX_IMAGE_VARIANT_FALLBACK") {
            let value = parse_bool("VARIA_FIX_IMAGE_VARIANT_FALLBACK", fix)?;
            self.flags.set(FIX_IMAGE_VARIANT_FALLBACK, value);
        }

        Ok(())
    }

    /// Value of a release build flag; unset flags are false
    #[must_use]
    pub fn get_build_flag_bool(&self, name: &str) -> bool {
        self.flags.get_bool(name)
    }

    /// Number of worker threads a mutator phase may use
    #[must_use]
    pub fn worker_count(&self) -> usize {
        if self.engine.parallel {
            calculate_jobs(self.engine.jobs)
        } else {
            1
        }
    }
}

fn parse_bool(field: &str, value: String) -> Result<bool, Error> {
    match value.as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value,
        }
        .into()),
    }
}

/// Calculate worker jobs based on CPU count
#[must_use]
pub fn calculate_jobs(config_value: usize) -> usize {
    if config_value > 0 {
        config_value // User override
    } else {
        num_cpus::get().max(1)
    }
}
