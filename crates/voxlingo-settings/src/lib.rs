//! # voxlingo-settings
//!
//! Startup configuration for the voxlingo service.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`Settings::default()`]
//! 2. **Settings file**: `voxlingo.json` (or `--config` / `VOXLINGO_CONFIG`), merged with `figment`
//! 3. **Environment variables**: `VOXLINGO_*` overrides (highest priority)
//!
//! The transcription API key is read from `ASSEMBLYAI_API_KEY`, optionally via
//! `.env.local`. The result is an immutable [`AppConfig`] passed explicitly to
//! every component; there is no global settings instance.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    api_key_from, load_config, load_env_file, load_settings_from_path, settings_path, AppConfig,
    API_KEY_VAR,
};
pub use types::*;
