use voxlingo_core::{StoreError, TranscriptionError};

/// Fatal failure of one translation request.
///
/// Per-language translation and synthesis failures are not errors at this
/// level; they are recorded in the result.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("No audio file provided")]
    MissingAudio,
    #[error("Invalid source language: {0}")]
    InvalidSourceLanguage(String),
    #[error("Transcription failed or empty")]
    EmptyTranscription,
    #[error(transparent)]
    Transcription(#[from] TranscriptionError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PipelineError {
    /// Whether the caller is at fault (bad input) rather than the pipeline.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingAudio | Self::InvalidSourceLanguage(_))
    }

    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::MissingAudio => "missing_audio",
            Self::InvalidSourceLanguage(_) => "invalid_source_language",
            Self::EmptyTranscription => "empty_transcription",
            Self::Transcription(_) => "transcription",
            Self::Store(_) => "store",
        }
    }
}
