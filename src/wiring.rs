//! Construction of the external-service adapters and the orchestrator.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use voxlingo_core::{ArtifactStore, LanguageTable, ProviderError};
use voxlingo_engine::Orchestrator;
use voxlingo_providers::{
    AssemblyAiClient, AssemblyAiConfig, GoogleTranslateClient, GoogleTranslateConfig,
    GoogleTtsClient, GoogleTtsConfig,
};
use voxlingo_settings::Settings;

fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

/// Wire the AssemblyAI and Google adapters into an orchestrator over `store`.
pub fn build_orchestrator(
    settings: &Settings,
    languages: LanguageTable,
    assemblyai_api_key: SecretString,
    store: Arc<dyn ArtifactStore>,
) -> Result<Orchestrator, ProviderError> {
    let stt = AssemblyAiClient::new(AssemblyAiConfig {
        base_url: settings.transcription.base_url.clone(),
        api_key: assemblyai_api_key,
        timeout: millis(settings.transcription.timeout_ms),
        poll_interval: millis(settings.transcription.poll_interval_ms),
    })?;
    let translator = GoogleTranslateClient::new(GoogleTranslateConfig {
        base_url: settings.translation.base_url.clone(),
        timeout: millis(settings.translation.timeout_ms),
        max_chars: settings.translation.max_chars,
    })?;
    let tts = GoogleTtsClient::new(GoogleTtsConfig {
        base_url: settings.speech.base_url.clone(),
        timeout: millis(settings.speech.timeout_ms),
        chunk_chars: settings.speech.chunk_chars,
    })?;

    Ok(Orchestrator::new(
        Arc::new(languages),
        Arc::new(stt),
        Arc::new(translator),
        Arc::new(tts),
        store,
    )
    .with_fan_out(settings.pipeline.fan_out)
    .with_audio_route(settings.pipeline.audio_route.clone()))
}
