//! AssemblyAI speech-to-text adapter.
//!
//! Flow: upload the raw audio, submit a transcript job with the language
//! hint, then poll the job until it completes or fails. The whole exchange is
//! bounded by the configured timeout.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};
use voxlingo_core::{ProviderError, SpeechToText};

use crate::http::{build_client, check_status, send_error, trim_base_url};

/// Floor for the transcript poll interval.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Connection settings for [`AssemblyAiClient`].
#[derive(Debug)]
pub struct AssemblyAiConfig {
    pub base_url: String,
    pub api_key: SecretString,
    pub timeout: Duration,
    pub poll_interval: Duration,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptResponse {
    id: String,
    status: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// AssemblyAI REST client.
pub struct AssemblyAiClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
    timeout: Duration,
    poll_interval: Duration,
}

impl AssemblyAiClient {
    pub fn new(config: AssemblyAiConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(config.timeout)?,
            base_url: trim_base_url(&config.base_url),
            api_key: config.api_key,
            timeout: config.timeout,
            poll_interval: config.poll_interval.max(MIN_POLL_INTERVAL),
        })
    }

    async fn upload(&self, audio: Vec<u8>) -> Result<String, ProviderError> {
        let resp = self
            .client
            .post(format!("{}/v2/upload", self.base_url))
            .header(AUTHORIZATION, self.api_key.expose_secret())
            .body(audio)
            .send()
            .await
            .map_err(|e| send_error(&e, self.timeout))?;
        let upload: UploadResponse = decode(check_status(resp).await?).await?;
        Ok(upload.upload_url)
    }

    async fn submit(&self, audio_url: &str, language_code: &str) -> Result<TranscriptResponse, ProviderError> {
        let resp = self
            .client
            .post(format!("{}/v2/transcript", self.base_url))
            .header(AUTHORIZATION, self.api_key.expose_secret())
            .json(&serde_json::json!({
                "audio_url": audio_url,
                "language_code": language_code,
            }))
            .send()
            .await
            .map_err(|e| send_error(&e, self.timeout))?;
        decode(check_status(resp).await?).await
    }

    async fn fetch(&self, id: &str) -> Result<TranscriptResponse, ProviderError> {
        let resp = self
            .client
            .get(format!("{}/v2/transcript/{id}", self.base_url))
            .header(AUTHORIZATION, self.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| send_error(&e, self.timeout))?;
        decode(check_status(resp).await?).await
    }

    async fn run(&self, audio: &Path, language_code: &str) -> Result<String, ProviderError> {
        let bytes = tokio::fs::read(audio).await?;
        let upload_url = self.upload(bytes).await?;
        let mut job = self.submit(&upload_url, language_code).await?;
        debug!(job_id = %job.id, "transcript job submitted");

        loop {
            match job.status.as_str() {
                "completed" => return Ok(job.text.unwrap_or_default()),
                "error" => {
                    return Err(ProviderError::Rejected(
                        job.error.unwrap_or_else(|| "transcription failed".to_string()),
                    ))
                }
                status => debug!(job_id = %job.id, status, "transcript pending"),
            }
            tokio::time::sleep(self.poll_interval).await;
            job = self.fetch(&job.id).await?;
        }
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ProviderError> {
    let body = resp
        .bytes()
        .await
        .map_err(|e| ProviderError::Network(e.to_string()))?;
    serde_json::from_slice(&body).map_err(|e| ProviderError::UnexpectedResponse(e.to_string()))
}

#[async_trait]
impl SpeechToText for AssemblyAiClient {
    fn name(&self) -> &str {
        "assemblyai"
    }

    #[instrument(skip(self, audio), fields(backend = "assemblyai"))]
    async fn recognize(&self, audio: &Path, language_code: &str) -> Result<String, ProviderError> {
        tokio::time::timeout(self.timeout, self.run(audio, language_code))
            .await
            .map_err(|_| ProviderError::Timeout(self.timeout))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, timeout: Duration) -> AssemblyAiClient {
        AssemblyAiClient::new(AssemblyAiConfig {
            base_url: format!("{}/", server.uri()),
            api_key: SecretString::from("test-key".to_string()),
            timeout,
            poll_interval: Duration::from_millis(10),
        })
        .unwrap()
    }

    fn audio_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
        file.write_all(b"RIFF....WAVEfmt ").unwrap();
        file
    }

    async fn mount_upload(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/v2/upload"))
            .and(header("authorization", "test-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"upload_url": "https://cdn.example/a1"})),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn polls_until_completed() {
        let server = MockServer::start().await;
        mount_upload(&server).await;
        Mock::given(method("POST"))
            .and(path("/v2/transcript"))
            .and(body_json(serde_json::json!({
                "audio_url": "https://cdn.example/a1",
                "language_code": "es",
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": "t1", "status": "queued"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/transcript/t1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": "t1", "status": "processing"})),
            )
            .up_to_n_times(2)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/transcript/t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "t1", "status": "completed", "text": "hola mundo"
            })))
            .mount(&server)
            .await;

        let file = audio_file();
        let text = client(&server, Duration::from_secs(5))
            .transcribe(file.path(), "es")
            .await
            .unwrap();
        assert_eq!(text, "hola mundo");
    }

    #[tokio::test]
    async fn null_text_is_empty() {
        let server = MockServer::start().await;
        mount_upload(&server).await;
        Mock::given(method("POST"))
            .and(path("/v2/transcript"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "t2", "status": "completed", "text": null
            })))
            .mount(&server)
            .await;

        let file = audio_file();
        let text = client(&server, Duration::from_secs(5))
            .recognize(file.path(), "en")
            .await
            .unwrap();
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn job_error_is_reported() {
        let server = MockServer::start().await;
        mount_upload(&server).await;
        Mock::given(method("POST"))
            .and(path("/v2/transcript"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "t3", "status": "error", "error": "Audio duration is too short."
            })))
            .mount(&server)
            .await;

        let file = audio_file();
        let err = client(&server, Duration::from_secs(5))
            .transcribe(file.path(), "en")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Transcription error: Audio duration is too short."
        );
    }

    #[tokio::test]
    async fn unauthorized_upload_fails_with_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/upload"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
            .mount(&server)
            .await;

        let file = audio_file();
        let err = client(&server, Duration::from_secs(5))
            .recognize(file.path(), "en")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Status { status: 401, .. }));
    }

    #[tokio::test]
    async fn unexpected_shape_is_rejected() {
        let server = MockServer::start().await;
        mount_upload(&server).await;
        Mock::given(method("POST"))
            .and(path("/v2/transcript"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let file = audio_file();
        let err = client(&server, Duration::from_secs(5))
            .recognize(file.path(), "en")
            .await
            .unwrap_err();
        assert_eq!(err.error_kind(), "unexpected_response");
    }

    #[tokio::test]
    async fn polling_is_bounded_by_timeout() {
        let server = MockServer::start().await;
        mount_upload(&server).await;
        Mock::given(method("POST"))
            .and(path("/v2/transcript"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": "t4", "status": "queued"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/transcript/t4"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": "t4", "status": "processing"})),
            )
            .mount(&server)
            .await;

        let file = audio_file();
        let err = client(&server, Duration::from_millis(300))
            .recognize(file.path(), "en")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(_)));
    }

    #[tokio::test]
    async fn zero_poll_interval_is_clamped() {
        let server = MockServer::start().await;
        mount_upload(&server).await;
        Mock::given(method("POST"))
            .and(path("/v2/transcript"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": "t5", "status": "queued"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/transcript/t5"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": "t5", "status": "processing"})),
            )
            .mount(&server)
            .await;

        let client = AssemblyAiClient::new(AssemblyAiConfig {
            base_url: server.uri(),
            api_key: SecretString::from("test-key".to_string()),
            timeout: Duration::from_millis(300),
            poll_interval: Duration::ZERO,
        })
        .unwrap();
        assert_eq!(client.poll_interval, MIN_POLL_INTERVAL);

        let file = audio_file();
        let err = client.recognize(file.path(), "en").await.unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(_)));

        let polls = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.method.as_str() == "GET")
            .count();
        assert!(polls <= 7, "polled {polls} times in 300ms");
    }

    #[tokio::test]
    async fn missing_audio_file_is_io_error() {
        let server = MockServer::start().await;
        let err = client(&server, Duration::from_secs(1))
            .recognize(Path::new("/definitely/not/here.wav"), "en")
            .await
            .unwrap_err();
        assert_eq!(err.error_kind(), "io");
    }
}
