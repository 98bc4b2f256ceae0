//! Settings error types.

use std::path::PathBuf;

use thiserror::Error;
use voxlingo_core::LanguageError;

/// Errors that can occur while building the startup configuration.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An explicitly requested settings file does not exist.
    #[error("settings file not found: {}", .0.display())]
    MissingFile(PathBuf),
    /// The settings file could not be read or did not match the schema.
    #[error("failed to load settings: {0}")]
    Load(#[from] Box<figment::Error>),
    /// The language table is inconsistent.
    #[error("invalid language configuration: {0}")]
    Languages(#[from] LanguageError),
    /// The transcription API key is not set.
    #[error("{0} is not set (add it to the environment or .env.local)")]
    MissingApiKey(&'static str),
}

impl From<figment::Error> for SettingsError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;
