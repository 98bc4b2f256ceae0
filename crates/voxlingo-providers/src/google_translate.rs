//! Google Translate adapter using the keyless `translate_a/single` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};
use voxlingo_core::{ProviderError, Translator};

use crate::http::{build_client, check_status, send_error, trim_base_url};

/// Connection settings for [`GoogleTranslateClient`].
#[derive(Clone, Debug)]
pub struct GoogleTranslateConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Longest accepted input, in characters.
    pub max_chars: usize,
}

/// Google Translate web client.
pub struct GoogleTranslateClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    max_chars: usize,
}

impl GoogleTranslateClient {
    pub fn new(config: GoogleTranslateConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(config.timeout)?,
            base_url: trim_base_url(&config.base_url),
            timeout: config.timeout,
            max_chars: config.max_chars,
        })
    }
}

/// Join the translated segments of a `translate_a/single` response.
///
/// The payload looks like `[[["Hola ","Hello ",...],["mundo","world",...]],null,"en",...]`.
pub fn parse_translation(body: &Value) -> Result<String, ProviderError> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| ProviderError::UnexpectedResponse("missing translation segments".into()))?;

    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if text.is_empty() {
        return Err(ProviderError::UnexpectedResponse("empty translation".into()));
    }
    Ok(text)
}

#[async_trait]
impl Translator for GoogleTranslateClient {
    fn name(&self) -> &str {
        "google-translate"
    }

    #[instrument(skip(self, text), fields(backend = "google-translate"))]
    async fn request(
        &self,
        text: &str,
        source_code: &str,
        target_code: &str,
    ) -> Result<String, ProviderError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }
        let len = text.chars().count();
        if len > self.max_chars {
            return Err(ProviderError::InvalidInput(format!(
                "text is {len} characters, the limit is {}",
                self.max_chars
            )));
        }

        let resp = self
            .client
            .get(format!("{}/translate_a/single", self.base_url))
            .query(&[
                ("client", "gtx"),
                ("sl", source_code),
                ("tl", target_code),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| send_error(&e, self.timeout))?;

        let body: Value = check_status(resp)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::UnexpectedResponse(e.to_string()))?;

        let translated = parse_translation(&body)?;
        debug!(chars = translated.chars().count(), "translated");
        Ok(translated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GoogleTranslateClient {
        GoogleTranslateClient::new(GoogleTranslateConfig {
            base_url: server.uri(),
            timeout: Duration::from_secs(5),
            max_chars: 50,
        })
        .unwrap()
    }

    #[test]
    fn parses_multi_segment_payload() {
        let body = serde_json::json!([
            [["Hola. ", "Hello. ", null, null, 10], ["¿Cómo estás?", "How are you?", null, null, 10]],
            null,
            "en"
        ]);
        assert_eq!(parse_translation(&body).unwrap(), "Hola. ¿Cómo estás?");
    }

    #[test]
    fn rejects_unexpected_payload() {
        assert!(parse_translation(&serde_json::json!({"error": "x"})).is_err());
        assert!(parse_translation(&serde_json::json!([[]])).is_err());
    }

    #[tokio::test]
    async fn sends_language_pair_and_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .and(query_param("sl", "en"))
            .and(query_param("tl", "de"))
            .and(query_param("q", "good morning"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([[["Guten Morgen", "good morning"]], null, "en"])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let out = client(&server).translate("good morning", "en", "de").await.unwrap();
        assert_eq!(out, "Guten Morgen");
    }

    #[tokio::test]
    async fn same_language_never_calls_service() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let out = client(&server).translate("hello", "en", "en").await.unwrap();
        assert_eq!(out, "hello");
    }

    #[tokio::test]
    async fn server_error_is_tagged_with_target() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
            .mount(&server)
            .await;

        let err = client(&server).translate("hello", "en", "ko").await.unwrap_err();
        assert_eq!(err.target, "ko");
        assert_eq!(
            err.to_string(),
            "Translation error for ko: service returned 429: Too Many Requests"
        );
    }

    #[tokio::test]
    async fn overlong_text_is_refused_locally() {
        let server = MockServer::start().await;
        let err = client(&server)
            .translate(&"a".repeat(51), "en", "hi")
            .await
            .unwrap_err();
        assert_eq!(err.source.error_kind(), "invalid_input");
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
