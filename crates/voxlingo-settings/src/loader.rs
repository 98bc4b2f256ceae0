//! Settings loading.
//!
//! Loading flow:
//! 1. `.env.local` is read into the process environment (existing vars win)
//! 2. Compiled [`Settings::default()`] are layered under the JSON settings file
//! 3. `VOXLINGO_*` environment variables override individual values
//! 4. `ASSEMBLYAI_API_KEY` is read as a secret; it is required

use std::path::{Path, PathBuf};

use figment::providers::{Format, Json, Serialized};
use figment::Figment;
use secrecy::SecretString;
use tracing::{debug, warn};
use voxlingo_core::translation::FanOut;
use voxlingo_core::LanguageTable;

use crate::errors::{Result, SettingsError};
use crate::types::Settings;

/// Environment variable holding the transcription API key.
pub const API_KEY_VAR: &str = "ASSEMBLYAI_API_KEY";
/// Local environment file loaded at startup.
pub const ENV_FILE: &str = ".env.local";
/// Environment variable naming the settings file.
pub const CONFIG_PATH_VAR: &str = "VOXLINGO_CONFIG";
/// Settings file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "voxlingo.json";

/// Immutable startup configuration handed to every component.
#[derive(Debug)]
pub struct AppConfig {
    pub settings: Settings,
    pub languages: LanguageTable,
    pub assemblyai_api_key: SecretString,
}

impl AppConfig {
    /// Validate `settings` and pair them with the API key.
    pub fn new(settings: Settings, assemblyai_api_key: SecretString) -> Result<Self> {
        let languages = LanguageTable::new(settings.languages.clone(), &settings.default_language)?;
        Ok(Self {
            settings,
            languages,
            assemblyai_api_key,
        })
    }
}

/// Load `.env.local` from the working directory, if present.
pub fn load_env_file() -> Option<PathBuf> {
    match dotenvy::from_filename(ENV_FILE) {
        Ok(path) => {
            debug!(path = %path.display(), "loaded environment file");
            Some(path)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            warn!(error = %e, "failed to parse {ENV_FILE}, ignoring");
            None
        }
    }
}

/// Resolve the settings file: explicit path, then `VOXLINGO_CONFIG`, then `./voxlingo.json`.
pub fn settings_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| read_env_string(CONFIG_PATH_VAR).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Load the full startup configuration.
///
/// An explicitly named settings file must exist; the default one is optional.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    load_env_file();

    let path = settings_path(explicit);
    if explicit.is_some() && !path.exists() {
        return Err(SettingsError::MissingFile(path));
    }

    let settings = load_settings_from_path(&path)?;
    let key = api_key_from(std::env::var(API_KEY_VAR).ok())?;
    AppConfig::new(settings, key)
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults; malformed JSON or mistyped values are errors.
pub fn load_settings_from_path(path: &Path) -> Result<Settings> {
    if path.exists() {
        debug!(?path, "loading settings from file");
    } else {
        debug!(?path, "settings file not found, using defaults");
    }

    let mut settings: Settings = Figment::from(Serialized::defaults(Settings::default()))
        .merge(Json::file(path))
        .extract()?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Turn the raw key value into a secret, rejecting blank values.
pub fn api_key_from(value: Option<String>) -> Result<SecretString> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
        .ok_or(SettingsError::MissingApiKey(API_KEY_VAR))
}

/// Apply environment variable overrides to loaded settings.
///
/// Invalid values are ignored with a warning (file/default value kept).
pub fn apply_env_overrides(settings: &mut Settings) {
    // ── Server ──────────────────────────────────────────────────────
    if let Some(v) = read_env_string("VOXLINGO_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = read_env_u16("VOXLINGO_PORT", 0, 65535) {
        settings.server.port = v;
    }
    if let Some(v) = read_env_usize("VOXLINGO_MAX_UPLOAD_BYTES", 1024, 1_073_741_824) {
        settings.server.max_upload_bytes = v;
    }
    if let Some(v) = read_env_string("VOXLINGO_STATIC_DIR") {
        settings.server.static_dir = PathBuf::from(v);
    }
    if let Some(v) = read_env_bool("VOXLINGO_EXPOSE_ERROR_DETAILS") {
        settings.server.expose_error_details = v;
    }
    if let Some(v) = read_env_string("VOXLINGO_DEFAULT_LANGUAGE") {
        settings.default_language = v;
    }

    // ── External services ───────────────────────────────────────────
    if let Some(v) = read_env_string("VOXLINGO_TRANSCRIPTION_URL") {
        settings.transcription.base_url = v;
    }
    if let Some(v) = read_env_u64("VOXLINGO_TRANSCRIPTION_TIMEOUT_MS", 1000, 3_600_000) {
        settings.transcription.timeout_ms = v;
    }
    if let Some(v) = read_env_string("VOXLINGO_TRANSLATION_URL") {
        settings.translation.base_url = v;
    }
    if let Some(v) = read_env_u64("VOXLINGO_TRANSLATION_TIMEOUT_MS", 100, 600_000) {
        settings.translation.timeout_ms = v;
    }
    if let Some(v) = read_env_string("VOXLINGO_SPEECH_URL") {
        settings.speech.base_url = v;
    }
    if let Some(v) = read_env_u64("VOXLINGO_SPEECH_TIMEOUT_MS", 100, 600_000) {
        settings.speech.timeout_ms = v;
    }

    // ── Storage ─────────────────────────────────────────────────────
    if let Some(v) = read_env_string("VOXLINGO_STORAGE_DIR") {
        settings.storage.dir = Some(PathBuf::from(v));
    }
    if let Some(v) = read_env_u64("VOXLINGO_RETENTION_HOURS", 0, 8_760) {
        settings.storage.retention_hours = v;
    }
    if let Some(v) = read_env_u64("VOXLINGO_SWEEP_INTERVAL_SECS", 1, 604_800) {
        settings.storage.sweep_interval_secs = Some(v);
    }

    // ── Pipeline / logging ──────────────────────────────────────────
    if let Some(v) = read_env_string("VOXLINGO_FAN_OUT") {
        match parse_fan_out(&v) {
            Some(mode) => settings.pipeline.fan_out = mode,
            None => warn!(key = "VOXLINGO_FAN_OUT", value = %v, "invalid fan-out mode, ignoring"),
        }
    }
    if let Some(v) = read_env_string("VOXLINGO_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = read_env_bool("VOXLINGO_LOG_JSON") {
        settings.logging.json = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a fan-out mode name.
pub fn parse_fan_out(val: &str) -> Option<FanOut> {
    match val.to_lowercase().as_str() {
        "sequential" => Some(FanOut::Sequential),
        "concurrent" => Some(FanOut::Concurrent),
        _ => None,
    }
}

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `usize` within a range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_bool(name: &str) -> Option<bool> {
    let val = std::env::var(name).ok()?;
    let result = parse_bool(&val);
    if result.is_none() {
        warn!(key = name, value = %val, "invalid boolean env var, ignoring");
    }
    result
}

fn read_env_u16(name: &str, min: u16, max: u16) -> Option<u16> {
    let val = std::env::var(name).ok()?;
    let result = parse_u16_range(&val, min, max);
    if result.is_none() {
        warn!(key = name, value = %val, "invalid u16 env var, ignoring");
    }
    result
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    let val = std::env::var(name).ok()?;
    let result = parse_u64_range(&val, min, max);
    if result.is_none() {
        warn!(key = name, value = %val, "invalid u64 env var, ignoring");
    }
    result
}

fn read_env_usize(name: &str, min: usize, max: usize) -> Option<usize> {
    let val = std::env::var(name).ok()?;
    let result = parse_usize_range(&val, min, max);
    if result.is_none() {
        warn!(key = name, value = %val, "invalid usize env var, ignoring");
    }
    result
}
