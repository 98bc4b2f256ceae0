//! Route handlers.

use axum::body::Body;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use tokio_util::io::ReaderStream;
use tracing::debug;
use voxlingo_core::{ArtifactId, TranslationRequest, TranslationResult};

use crate::error::ApiError;
use crate::health::{self, HealthResponse};
use crate::server::AppState;

const INDEX_HTML: &str = include_str!("../static/index.html");
const AUDIO_NOT_FOUND: &str = "Audio file not found";

/// GET /
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(
        state.start_time,
        state.orchestrator.languages().len(),
    ))
}

/// POST /api/translate
///
/// A body that is not multipart at all is treated like a form without audio.
pub async fn translate_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TranslationResult>, ApiError> {
    let request = match multipart {
        Ok(multipart) => read_form(multipart).await?,
        Err(rejection) => {
            debug!(reason = %rejection, "request is not multipart");
            TranslationRequest::default()
        }
    };

    state
        .orchestrator
        .translate_recording(request)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_pipeline(&e, state.expose_error_details))
}

/// Collect the `audio` file part and the `source_language` field; others are
/// ignored. An `audio` part without a filename is a text field, not an upload.
async fn read_form(mut multipart: Multipart) -> Result<TranslationRequest, ApiError> {
    let mut request = TranslationRequest::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("audio") if field.file_name().is_some() => {
                request.audio = Some(field.bytes().await?.to_vec());
            }
            Some("source_language") => request.source_language = Some(field.text().await?),
            _ => {}
        }
    }
    Ok(request)
}

/// GET /api/audio/{filename}
pub async fn audio_handler(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let id = ArtifactId::parse(&filename).ok_or_else(|| ApiError::not_found(AUDIO_NOT_FOUND))?;
    let path = state
        .store
        .resolve(&id)
        .await
        .ok_or_else(|| ApiError::not_found(AUDIO_NOT_FOUND))?;
    // The reaper may win the race between resolve and open.
    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|_| ApiError::not_found(AUDIO_NOT_FOUND))?;

    let mut response = (
        [(header::CONTENT_TYPE, "audio/mpeg")],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response();
    if let Ok(meta) = tokio::fs::metadata(&path).await {
        response
            .headers_mut()
            .insert(header::CONTENT_LENGTH, meta.len().into());
    }
    Ok(response)
}
