//! # voxlingo-core
//!
//! Shared vocabulary for the voxlingo workspace:
//!
//! - [`languages`]: the immutable language table configured at startup
//! - [`translation`]: per-request input and the assembled result
//! - [`artifact`]: staged audio file identifiers
//! - [`ports`]: traits implemented by the external-service adapters and the artifact store
//! - [`errors`]: typed errors shared across crates

#![deny(unsafe_code)]

pub mod artifact;
pub mod errors;
pub mod languages;
pub mod ports;
pub mod translation;

pub use artifact::{ArtifactId, ArtifactKind};
pub use errors::{ProviderError, StoreError, TranscriptionError, TranslationError};
pub use languages::{Language, LanguageError, LanguageTable};
pub use ports::{ArtifactStore, SpeechToText, TextToSpeech, Translator};
pub use translation::{FanOut, TranslationRequest, TranslationResult};
