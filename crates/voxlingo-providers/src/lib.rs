//! # voxlingo-providers
//!
//! Adapters implementing the `voxlingo-core` ports against external services:
//!
//! | Adapter | Port | Service |
//! |---------|------|---------|
//! | [`AssemblyAiClient`] | `SpeechToText` | AssemblyAI `/v2/upload` + `/v2/transcript` |
//! | [`GoogleTranslateClient`] | `Translator` | Google Translate `/translate_a/single` |
//! | [`GoogleTtsClient`] | `TextToSpeech` | Google Translate `/translate_tts` (MP3) |
//!
//! Every client takes its base URL from configuration so tests can point it
//! at a local mock server, and every request is bounded by a timeout.

#![deny(unsafe_code)]

pub mod assemblyai;
pub mod google_translate;
pub mod google_tts;
mod http;

pub use assemblyai::{AssemblyAiClient, AssemblyAiConfig};
pub use google_translate::{GoogleTranslateClient, GoogleTranslateConfig};
pub use google_tts::{split_text, GoogleTtsClient, GoogleTtsConfig};
