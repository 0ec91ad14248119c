#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Default mutator registration for varia
//!
//! Wires the image and override policies into one pipeline, in the order
//! they must run, and offers a small context for running it over a graph
//! with configuration loaded from file and environment.

mod context;
mod report;

pub use context::{MutatorsContextBuilder, MutatorsCtx};
pub use report::RunReport;

use std::path::PathBuf;

use varia_config::Config;
use varia_errors::Error;
use varia_transition::Pipeline;

pub use varia_image::register_image_mutators;
pub use varia_override::register_override_mutators;

/// Register every default mutator: image variants first, then overrides
pub fn register_default_mutators(pipeline: &mut Pipeline) {
    register_image_mutators(pipeline);
    register_override_mutators(pipeline);
}

/// Pipeline with the default mutators
#[must_use]
pub fn default_pipeline() -> Pipeline {
    let mut pipeline = Pipeline::new();
    register_default_mutators(&mut pipeline);
    pipeline
}

/// Load configuration from `path` (or defaults) and apply environment
/// overrides
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if an
/// environment variable holds an invalid value.
pub async fn load_config(path: Option<&PathBuf>) -> Result<Config, Error> {
    let mut config = Config::load_or_default(path).await?;
    config.merge_env()?;
    Ok(config)
}
