//! Google Translate text-to-speech adapter.
//!
//! The `translate_tts` endpoint only accepts short fragments, so text is split
//! into chunks that are synthesized in order and concatenated. MP3 frames are
//! self-delimiting, which makes the joined payload a playable file.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};
use voxlingo_core::{ProviderError, TextToSpeech};

use crate::http::{build_client, check_status, send_error, trim_base_url};

const SENTENCE_ENDS: &[char] = &['.', '!', '?', ';', '。', '！', '？', '；', '\n'];

/// Connection settings for [`GoogleTtsClient`].
#[derive(Clone, Debug)]
pub struct GoogleTtsConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Longest fragment sent per request, in characters.
    pub chunk_chars: usize,
}

/// Google Translate TTS client.
pub struct GoogleTtsClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    chunk_chars: usize,
}

impl GoogleTtsClient {
    pub fn new(config: GoogleTtsConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(config.timeout)?,
            base_url: trim_base_url(&config.base_url),
            timeout: config.timeout,
            chunk_chars: config.chunk_chars.max(1),
        })
    }

    async fn fetch_chunk(
        &self,
        chunk: &str,
        language_code: &str,
        idx: usize,
        total: usize,
    ) -> Result<Vec<u8>, ProviderError> {
        let total = total.to_string();
        let idx = idx.to_string();
        let textlen = chunk.chars().count().to_string();
        let resp = self
            .client
            .get(format!("{}/translate_tts", self.base_url))
            .query(&[
                ("ie", "UTF-8"),
                ("q", chunk),
                ("tl", language_code),
                ("client", "tw-ob"),
                ("total", total.as_str()),
                ("idx", idx.as_str()),
                ("textlen", textlen.as_str()),
            ])
            .send()
            .await
            .map_err(|e| send_error(&e, self.timeout))?;

        let bytes = check_status(resp)
            .await?
            .bytes()
            .await
            .map_err(|e| send_error(&e, self.timeout))?;
        Ok(bytes.to_vec())
    }
}

/// Split `text` into trimmed chunks of at most `max_chars` characters.
///
/// Sentences are kept whole where they fit, long sentences are wrapped on
/// whitespace and words longer than the limit are cut. Adjacent short pieces
/// are merged back together up to the limit.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut pieces = Vec::new();

    for sentence in text.split_inclusive(SENTENCE_ENDS) {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }
        if sentence.chars().count() <= max_chars {
            pieces.push(sentence.to_string());
            continue;
        }
        for word in sentence.split_whitespace() {
            if word.chars().count() <= max_chars {
                pieces.push(word.to_string());
            } else {
                let chars: Vec<char> = word.chars().collect();
                pieces.extend(chars.chunks(max_chars).map(|c| c.iter().collect::<String>()));
            }
        }
    }

    let mut chunks: Vec<String> = Vec::new();
    for piece in pieces {
        match chunks.last_mut() {
            Some(last) if last.chars().count() + 1 + piece.chars().count() <= max_chars => {
                last.push(' ');
                last.push_str(&piece);
            }
            _ => chunks.push(piece),
        }
    }
    chunks
}

#[async_trait]
impl TextToSpeech for GoogleTtsClient {
    fn name(&self) -> &str {
        "google-tts"
    }

    #[instrument(skip(self, text), fields(backend = "google-tts"))]
    async fn render(&self, text: &str, language_code: &str) -> Result<Vec<u8>, ProviderError> {
        let chunks = split_text(text, self.chunk_chars);
        if chunks.is_empty() {
            return Err(ProviderError::InvalidInput("no text to speak".into()));
        }

        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let bytes = self.fetch_chunk(chunk, language_code, idx, chunks.len()).await?;
            audio.extend_from_slice(&bytes);
        }
        if audio.is_empty() {
            return Err(ProviderError::UnexpectedResponse("empty audio payload".into()));
        }
        debug!(chunks = chunks.len(), bytes = audio.len(), "speech rendered");
        Ok(audio)
    }
}
