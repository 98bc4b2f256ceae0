use std::time::Duration;

/// Failure talking to an external speech or translation service.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),
    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response format: {0}")]
    UnexpectedResponse(String),
    #[error("timeout after {0:?}")]
    Timeout(Duration),
    /// The service accepted the job and reported that it failed.
    #[error("{0}")]
    Rejected(String),
    /// Refused locally before any call was made.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("io error: {0}")]
    Io(String),
}

impl ProviderError {
    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Status { .. } => "status",
            Self::UnexpectedResponse(_) => "unexpected_response",
            Self::Timeout(_) => "timeout",
            Self::Rejected(_) => "rejected",
            Self::InvalidInput(_) => "invalid_input",
            Self::Io(_) => "io",
        }
    }

    /// Build a status error, keeping at most 512 bytes of the body.
    pub fn from_status(status: u16, body: &str) -> Self {
        let mut end = body.len().min(512);
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        Self::Status {
            status,
            body: body[..end].to_string(),
        }
    }
}

impl From<std::io::Error> for ProviderError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Speech-to-text failure, rendered with the context callers surface verbatim.
#[derive(Clone, Debug, thiserror::Error)]
#[error("Transcription error: {0}")]
pub struct TranscriptionError(#[from] pub ProviderError);

/// Translation failure attributed to the target language that failed.
#[derive(Clone, Debug, thiserror::Error)]
#[error("Translation error for {target}: {source}")]
pub struct TranslationError {
    pub target: String,
    pub source: ProviderError,
}

/// Artifact store failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("artifact store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("artifact not found: {0}")]
    NotFound(String),
}
