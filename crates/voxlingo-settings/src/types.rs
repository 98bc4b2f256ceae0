//! Settings sections.
//!
//! JSON keys are camelCase; every section falls back to its compiled default
//! when omitted from the settings file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use voxlingo_core::translation::FanOut;
use voxlingo_core::{Language, LanguageTable};

/// Root settings object.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// HTTP listener and response policy.
    pub server: ServerSettings,
    /// Supported languages in fan-out order.
    pub languages: Vec<Language>,
    /// Display name used when a request omits `source_language`.
    pub default_language: String,
    /// Speech-to-text service.
    pub transcription: TranscriptionSettings,
    /// Translation service.
    pub translation: TranslationSettings,
    /// Text-to-speech service.
    pub speech: SpeechSettings,
    /// Artifact staging directory and reaper.
    pub storage: StorageSettings,
    /// Orchestrator behaviour.
    pub pipeline: PipelineSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            languages: LanguageTable::reference_languages(),
            default_language: "English".to_string(),
            transcription: TranscriptionSettings::default(),
            translation: TranslationSettings::default(),
            speech: SpeechSettings::default(),
            storage: StorageSettings::default(),
            pipeline: PipelineSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// HTTP listener settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Bind port (`0` picks a free port).
    pub port: u16,
    /// Largest accepted request body in bytes.
    pub max_upload_bytes: usize,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
    /// Whether 500 responses carry the underlying error message.
    pub expose_error_details: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            max_upload_bytes: 26_214_400,
            static_dir: PathBuf::from("static"),
            expose_error_details: true,
        }
    }
}

/// AssemblyAI client settings. The API key is read separately from the environment.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscriptionSettings {
    /// API root.
    pub base_url: String,
    /// Upper bound for upload + queue + processing, in milliseconds.
    pub timeout_ms: u64,
    /// Delay between status polls, in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.assemblyai.com".to_string(),
            timeout_ms: 300_000,
            poll_interval_ms: 1_000,
        }
    }
}

/// Google Translate client settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslationSettings {
    pub base_url: String,
    pub timeout_ms: u64,
    /// Longest text accepted for one translation.
    pub max_chars: usize,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            base_url: "https://translate.googleapis.com".to_string(),
            timeout_ms: 15_000,
            max_chars: 5_000,
        }
    }
}

/// Google TTS client settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpeechSettings {
    pub base_url: String,
    pub timeout_ms: u64,
    /// Longest text fragment sent in one synthesis request.
    pub chunk_chars: usize,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            base_url: "https://translate.google.com".to_string(),
            timeout_ms: 30_000,
            chunk_chars: 100,
        }
    }
}

/// Staging directory and reaper settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageSettings {
    /// Staging directory; the system temp directory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// Age in hours after which staged artifacts are reaped.
    pub retention_hours: u64,
    /// Periodic sweep interval; sweeps only at startup when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sweep_interval_secs: Option<u64>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            dir: None,
            retention_hours: 24,
            sweep_interval_secs: None,
        }
    }
}

impl StorageSettings {
    /// Staging directory to use.
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Orchestrator settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineSettings {
    /// How target languages are processed within one request.
    pub fan_out: FanOut,
    /// Route prefix of the audio retrieval endpoint, used to build URLs.
    pub audio_route: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            fan_out: FanOut::Sequential,
            audio_route: "/api/audio".to_string(),
        }
    }
}

/// Log output settings. `RUST_LOG` takes precedence over `level`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}
