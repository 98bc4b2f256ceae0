use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One incoming call: the recorded audio and the declared spoken language.
#[derive(Clone, Debug, Default)]
pub struct TranslationRequest {
    /// Raw uploaded bytes, `None` when the caller attached no audio.
    pub audio: Option<Vec<u8>>,
    /// Display name of the spoken language; the table default when absent.
    pub source_language: Option<String>,
}

/// Response payload of a successful translation.
///
/// `translations` holds one entry per configured language (text or an inline
/// error marker); `audio_paths` only holds languages whose synthesis succeeded.
/// Both keep insertion order, which is the source language first and then the
/// remaining languages in configuration order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub original_text: String,
    pub translations: IndexMap<String, String>,
    pub audio_paths: IndexMap<String, String>,
}

/// How the target languages of one request are processed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanOut {
    /// One language after another, in configuration order.
    #[default]
    Sequential,
    /// All targets polled together on the request task.
    Concurrent,
}

impl TranslationResult {
    /// Inline marker recorded in place of a failed translation.
    pub fn error_marker(message: &str) -> String {
        format!("[Translation error: {message}]")
    }
}
