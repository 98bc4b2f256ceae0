//! Language descriptors and the table every request is validated against.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One supported language.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    /// Display name, also the key used in requests and responses.
    pub name: String,
    /// Code used for translation and speech synthesis (e.g. `"es"`).
    pub code: String,
    /// Code handed to the transcription service when it differs from `code`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcription_code: Option<String>,
    /// External voice identifier, for synthesis backends that select voices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
}

impl Language {
    /// Create a descriptor without a voice or transcription override.
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            transcription_code: None,
            voice_id: None,
        }
    }

    /// Attach an external voice identifier.
    #[must_use]
    pub fn with_voice(mut self, voice_id: impl Into<String>) -> Self {
        self.voice_id = Some(voice_id.into());
        self
    }

    /// The code to send to the transcription service.
    pub fn transcription_code(&self) -> &str {
        self.transcription_code.as_deref().unwrap_or(&self.code)
    }
}

/// Reasons a language table is rejected at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LanguageError {
    /// No languages were configured.
    #[error("language table is empty")]
    Empty,
    /// Two descriptors share a display name.
    #[error("duplicate language name: {0}")]
    DuplicateName(String),
    /// A descriptor has a blank name or code.
    #[error("language {0:?} has an empty name or code")]
    Blank(String),
    /// The default language is not part of the table.
    #[error("default language {0:?} is not configured")]
    UnknownDefault(String),
}

/// Immutable, ordered set of languages with a default.
///
/// Iteration order is configuration order; the translation fan-out follows it.
#[derive(Clone, Debug)]
pub struct LanguageTable {
    languages: Vec<Language>,
    default_index: usize,
}

impl LanguageTable {
    /// Validate and build a table.
    pub fn new(languages: Vec<Language>, default_name: &str) -> Result<Self, LanguageError> {
        if languages.is_empty() {
            return Err(LanguageError::Empty);
        }

        let mut seen = HashSet::new();
        for lang in &languages {
            if lang.name.trim().is_empty() || lang.code.trim().is_empty() {
                return Err(LanguageError::Blank(lang.name.clone()));
            }
            if !seen.insert(lang.name.as_str()) {
                return Err(LanguageError::DuplicateName(lang.name.clone()));
            }
        }

        let default_index = languages
            .iter()
            .position(|l| l.name == default_name)
            .ok_or_else(|| LanguageError::UnknownDefault(default_name.to_string()))?;

        Ok(Self {
            languages,
            default_index,
        })
    }

    /// The seven languages of the reference deployment, English first.
    pub fn reference_languages() -> Vec<Language> {
        vec![
            Language::new("English", "en").with_voice("21m00Tcm4TlvDq8ikWAM"),
            Language::new("Hindi", "hi").with_voice("IKne3meq5aSn9XLyUdCD"),
            Language::new("Japanese", "ja").with_voice("pNInz6obpgDQGcFmaJgB"),
            Language::new("Spanish", "es").with_voice("EXAVITQu4vr4xnSDxMaL"),
            Language::new("Russian", "ru").with_voice("GBv7mTt0atIp3Br8iCZE"),
            Language::new("German", "de").with_voice("UBhIiElKbNeidRm6JYKp"),
            Language::new("Korean", "ko").with_voice("XrExE9yKIg0eXQXPvsxG"),
        ]
    }

    /// Look up a language by display name.
    pub fn get(&self, name: &str) -> Option<&Language> {
        self.languages.iter().find(|l| l.name == name)
    }

    /// Whether `name` is a configured display name.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The language used when a request does not declare one.
    pub fn default_language(&self) -> &Language {
        &self.languages[self.default_index]
    }

    /// All languages in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &Language> {
        self.languages.iter()
    }

    /// Every language except `name`, in configuration order.
    pub fn others<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Language> + 'a {
        self.languages.iter().filter(move |l| l.name != name)
    }

    /// Number of configured languages.
    pub fn len(&self) -> usize {
        self.languages.len()
    }

    /// Always false for a validated table; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

impl Default for LanguageTable {
    fn default() -> Self {
        Self {
            languages: Self::reference_languages(),
            default_index: 0,
        }
    }
}
