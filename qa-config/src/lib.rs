//! Load `.env` and expose tuning constants for the QA run core (single place for all
//! env/config).

mod dotenv;

pub mod constants;

#[cfg(feature = "tracing-init")]
mod tracing_init;

pub use dotenv::{apply_dotenv, load_env_map};

#[cfg(feature = "tracing-init")]
pub use tracing_init::init_tracing;

use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("read .env: {0}")]
    DotenvRead(std::io::Error),
}

/// Applies `.env` (current directory or `override_dir`) to the process environment.
/// Existing environment variables are never overwritten.
pub fn load_and_apply(override_dir: Option<&Path>) -> Result<(), LoadError> {
    apply_dotenv(override_dir).map_err(LoadError::DotenvRead)
}
