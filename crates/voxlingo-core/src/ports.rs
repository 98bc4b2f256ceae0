//! Traits at the seams between the orchestrator and the outside world.
//!
//! Each external-service trait has one required method that performs the raw
//! call and a provided method that applies the contract callers rely on
//! (error context, the same-language fast path). Backends implement the
//! former; the orchestrator only calls the latter.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use crate::artifact::{ArtifactId, ArtifactKind};
use crate::errors::{ProviderError, StoreError, TranscriptionError, TranslationError};

/// Speech recognition service.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Recognize speech in the audio file. An empty string is a valid result.
    async fn recognize(&self, audio: &Path, language_code: &str) -> Result<String, ProviderError>;

    /// Transcribe with `"Transcription error: ..."` context on failure.
    async fn transcribe(
        &self,
        audio: &Path,
        language_code: &str,
    ) -> Result<String, TranscriptionError> {
        Ok(self.recognize(audio, language_code).await?)
    }
}

/// Machine translation service.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Perform the external translation call.
    async fn request(
        &self,
        text: &str,
        source_code: &str,
        target_code: &str,
    ) -> Result<String, ProviderError>;

    /// Translate `text`, returning it verbatim without any call when the
    /// codes match. Failures are tagged with the target code.
    async fn translate(
        &self,
        text: &str,
        source_code: &str,
        target_code: &str,
    ) -> Result<String, TranslationError> {
        if source_code == target_code {
            return Ok(text.to_string());
        }
        self.request(text, source_code, target_code)
            .await
            .map_err(|source| TranslationError {
                target: target_code.to_string(),
                source,
            })
    }
}

/// Speech synthesis service producing MP3 audio.
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Render `text` in `language_code` to MP3 bytes.
    async fn render(&self, text: &str, language_code: &str) -> Result<Vec<u8>, ProviderError>;
}

/// Staging area for uploaded and synthesized audio.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Write `bytes` under a fresh random id of `kind`.
    async fn put(&self, kind: ArtifactKind, bytes: &[u8]) -> Result<ArtifactId, StoreError>;

    /// Where the artifact lives (or would live).
    fn locate(&self, id: &ArtifactId) -> PathBuf;

    /// Path of the artifact if it currently exists.
    async fn resolve(&self, id: &ArtifactId) -> Option<PathBuf>;

    /// Delete the artifact. Returns whether a file was removed.
    ///
    /// Synchronous so scoped guards can call it from `Drop`.
    fn remove(&self, id: &ArtifactId) -> Result<bool, StoreError>;

    /// Delete the artifact from async code. Returns whether a file was removed.
    async fn discard(&self, id: &ArtifactId) -> Result<bool, StoreError> {
        self.remove(id)
    }

    /// Delete every staged artifact at least `max_age` old. Returns the count removed.
    async fn sweep(&self, max_age: Duration) -> Result<usize, StoreError>;
}
