//! Request pipeline.
//!
//! One call to [`Orchestrator::translate_recording`] walks these steps:
//!
//! 1. validate the request (audio attached, source language configured)
//! 2. stage the upload as a `.wav` artifact, deleted on every exit path
//! 3. transcribe it; blank text aborts the request
//! 4. record the transcription as the source language's translation
//! 5. synthesize the source text
//! 6. for every other language: translate, then synthesize the translation
//! 7. assemble the result
//!
//! Step 6 isolates failures per language: a failed translation becomes an
//! inline marker and skips synthesis; a failed synthesis only leaves the
//! language out of `audio_paths`.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{field, info, instrument, warn, Span};
use voxlingo_core::{
    ArtifactKind, ArtifactStore, FanOut, Language, LanguageTable, SpeechToText, TextToSpeech,
    TranslationRequest, TranslationResult, Translator,
};

use crate::errors::PipelineError;
use crate::upload::StagedUpload;

const DEFAULT_AUDIO_ROUTE: &str = "/api/audio";

/// Outcome for one target language.
struct TargetOutcome {
    /// Translated text or an error marker.
    text: String,
    /// Retrieval URL of the synthesized audio, when synthesis succeeded.
    audio: Option<String>,
}

/// Drives the transcription, translation and synthesis adapters for one request.
pub struct Orchestrator {
    languages: Arc<LanguageTable>,
    stt: Arc<dyn SpeechToText>,
    translator: Arc<dyn Translator>,
    tts: Arc<dyn TextToSpeech>,
    store: Arc<dyn ArtifactStore>,
    audio_route: String,
    fan_out: FanOut,
}

impl Orchestrator {
    /// Build a pipeline over the given language table and adapters, with
    /// sequential fan-out and the default audio route.
    pub fn new(
        languages: Arc<LanguageTable>,
        stt: Arc<dyn SpeechToText>,
        translator: Arc<dyn Translator>,
        tts: Arc<dyn TextToSpeech>,
        store: Arc<dyn ArtifactStore>,
    ) -> Self {
        Self {
            languages,
            stt,
            translator,
            tts,
            store,
            audio_route: DEFAULT_AUDIO_ROUTE.to_string(),
            fan_out: FanOut::default(),
        }
    }

    /// Process target languages sequentially or concurrently.
    #[must_use]
    pub fn with_fan_out(mut self, fan_out: FanOut) -> Self {
        self.fan_out = fan_out;
        self
    }

    /// Route prefix used to build audio URLs. Normalized to a leading `/`
    /// and no trailing `/`.
    #[must_use]
    pub fn with_audio_route(mut self, route: impl Into<String>) -> Self {
        let route = route.into();
        let trimmed = route.trim_matches('/');
        self.audio_route = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        };
        self
    }

    /// Normalized audio route prefix.
    pub fn audio_route(&self) -> &str {
        &self.audio_route
    }

    /// Configured languages, in processing order.
    pub fn languages(&self) -> &LanguageTable {
        &self.languages
    }

    /// Store holding uploads and synthesized audio.
    pub fn store(&self) -> &Arc<dyn ArtifactStore> {
        &self.store
    }

    /// Run the full pipeline for one recording.
    #[instrument(
        skip_all,
        fields(request_id = %uuid::Uuid::new_v4(), source = field::Empty)
    )]
    pub async fn translate_recording(
        &self,
        request: TranslationRequest,
    ) -> Result<TranslationResult, PipelineError> {
        let audio = request.audio.ok_or(PipelineError::MissingAudio)?;
        let source_name = request
            .source_language
            .unwrap_or_else(|| self.languages.default_language().name.clone());
        let source = self
            .languages
            .get(&source_name)
            .ok_or_else(|| PipelineError::InvalidSourceLanguage(source_name.clone()))?;
        Span::current().record("source", source.name.as_str());

        let upload = StagedUpload::stage(self.store.as_ref(), &audio).await?;
        let text = self
            .stt
            .transcribe(upload.path(), source.transcription_code())
            .await?;
        if text.trim().is_empty() {
            return Err(PipelineError::EmptyTranscription);
        }
        info!(chars = text.chars().count(), stt = self.stt.name(), "transcribed");

        let mut result = TranslationResult {
            original_text: text.clone(),
            ..TranslationResult::default()
        };
        result.translations.insert(source.name.clone(), text.clone());
        if let Some(url) = self.speak(&text, &source.code).await {
            result.audio_paths.insert(source.name.clone(), url);
        }

        let targets: Vec<&Language> = self.languages.others(&source.name).collect();
        let outcomes = match self.fan_out {
            FanOut::Sequential => {
                let mut outcomes = Vec::with_capacity(targets.len());
                for target in &targets {
                    outcomes.push(self.process_target(&text, source, target).await);
                }
                outcomes
            }
            FanOut::Concurrent => {
                join_all(
                    targets
                        .iter()
                        .map(|target| self.process_target(&text, source, target)),
                )
                .await
            }
        };

        for (target, outcome) in targets.iter().zip(outcomes) {
            result.translations.insert(target.name.clone(), outcome.text);
            if let Some(url) = outcome.audio {
                result.audio_paths.insert(target.name.clone(), url);
            }
        }

        info!(
            languages = result.translations.len(),
            audio = result.audio_paths.len(),
            "translation complete"
        );
        upload.release().await;
        Ok(result)
    }

    async fn process_target(&self, text: &str, source: &Language, target: &Language) -> TargetOutcome {
        match self.translator.translate(text, &source.code, &target.code).await {
            Ok(translated) => {
                let audio = self.speak(&translated, &target.code).await;
                TargetOutcome {
                    text: translated,
                    audio,
                }
            }
            Err(e) => {
                warn!(
                    language = %target.name,
                    kind = e.source.error_kind(),
                    error = %e,
                    "translation failed"
                );
                TargetOutcome {
                    text: TranslationResult::error_marker(&e.to_string()),
                    audio: None,
                }
            }
        }
    }

    /// Synthesize `text` and stage it, returning its retrieval URL.
    async fn speak(&self, text: &str, language_code: &str) -> Option<String> {
        let audio = match self.tts.render(text, language_code).await {
            Ok(audio) => audio,
            Err(e) => {
                warn!(
                    language = language_code,
                    kind = e.error_kind(),
                    error = %e,
                    "speech synthesis failed"
                );
                return None;
            }
        };
        match self.store.put(ArtifactKind::Speech, &audio).await {
            Ok(id) => Some(format!("{}/{id}", self.audio_route)),
            Err(e) => {
                warn!(language = language_code, error = %e, "failed to stage synthesized audio");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use voxlingo_core::ProviderError;
    use voxlingo_store::DiskArtifactStore;

    struct FakeStt {
        reply: Result<String, ProviderError>,
        seen: Mutex<Option<(PathBuf, bool, String)>>,
        hang: bool,
    }

    impl FakeStt {
        fn saying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                seen: Mutex::new(None),
                hang: false,
            }
        }

        fn failing(err: ProviderError) -> Self {
            Self {
                reply: Err(err),
                seen: Mutex::new(None),
                hang: false,
            }
        }
    }

    #[async_trait]
    impl SpeechToText for FakeStt {
        fn name(&self) -> &str {
            "fake"
        }

        async fn recognize(&self, audio: &Path, code: &str) -> Result<String, ProviderError> {
            *self.seen.lock().unwrap() = Some((audio.to_path_buf(), audio.is_file(), code.to_string()));
            if self.hang {
                std::future::pending::<()>().await;
            }
            self.reply.clone()
        }
    }

    #[derive(Default)]
    struct FakeTranslator {
        fail_for: Vec<&'static str>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Translator for FakeTranslator {
        fn name(&self) -> &str {
            "fake"
        }

        async fn request(&self, text: &str, _src: &str, tgt: &str) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_for.iter().any(|f| *f == tgt) {
                return Err(ProviderError::Network("unreachable".into()));
            }
            Ok(format!("[{tgt}] {text}"))
        }
    }

    #[derive(Default)]
    struct FakeTts {
        fail_for: Vec<&'static str>,
    }

    #[async_trait]
    impl TextToSpeech for FakeTts {
        fn name(&self) -> &str {
            "fake"
        }

        async fn render(&self, text: &str, code: &str) -> Result<Vec<u8>, ProviderError> {
            if self.fail_for.iter().any(|f| *f == code) {
                return Err(ProviderError::from_status(500, "boom"));
            }
            Ok(format!("mp3:{code}:{text}").into_bytes())
        }
    }

    struct Harness {
        dir: tempfile::TempDir,
        stt: Arc<FakeStt>,
        translator: Arc<FakeTranslator>,
        orchestrator: Orchestrator,
    }

    fn harness(stt: FakeStt, translator: FakeTranslator, tts: FakeTts) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let stt = Arc::new(stt);
        let translator = Arc::new(translator);
        let orchestrator = Orchestrator::new(
            Arc::new(LanguageTable::default()),
            stt.clone(),
            translator.clone(),
            Arc::new(tts),
            Arc::new(DiskArtifactStore::new(dir.path())),
        );
        Harness {
            dir,
            stt,
            translator,
            orchestrator,
        }
    }

    fn request(source: Option<&str>) -> TranslationRequest {
        TranslationRequest {
            audio: Some(b"RIFF....WAVE".to_vec()),
            source_language: source.map(str::to_string),
        }
    }

    fn files_with_ext(dir: &Path, ext: &str) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.path().extension().is_some_and(|x| x == ext))
            .count()
    }

    #[tokio::test]
    async fn full_pipeline_covers_every_language() {
        let h = harness(FakeStt::saying("hola mundo"), FakeTranslator::default(), FakeTts::default());
        let result = h
            .orchestrator
            .translate_recording(request(Some("Spanish")))
            .await
            .unwrap();

        assert_eq!(result.original_text, "hola mundo");
        assert_eq!(result.translations.len(), 7);
        assert_eq!(result.translations["Spanish"], "hola mundo");
        assert_eq!(result.translations["German"], "[de] hola mundo");
        assert_eq!(result.audio_paths.len(), 7);
        for url in result.audio_paths.values() {
            let file = url.strip_prefix("/api/audio/").unwrap();
            assert!(h.dir.path().join(file).is_file());
        }
        assert_eq!(h.translator.calls.load(Ordering::SeqCst), 6);

        let (path, existed, code) = h.stt.seen.lock().unwrap().clone().unwrap();
        assert!(existed, "upload must exist while transcribing");
        assert_eq!(code, "es");
        assert!(!path.exists());
        assert_eq!(files_with_ext(h.dir.path(), "wav"), 0);
        assert_eq!(files_with_ext(h.dir.path(), "mp3"), 7);
    }

    #[tokio::test]
    async fn default_source_is_english() {
        let h = harness(FakeStt::saying("hello"), FakeTranslator::default(), FakeTts::default());
        let result = h.orchestrator.translate_recording(request(None)).await.unwrap();
        assert_eq!(result.translations["English"], "hello");
        assert_eq!(h.stt.seen.lock().unwrap().as_ref().unwrap().2, "en");
    }

    #[tokio::test]
    async fn translation_failure_is_isolated_to_its_language() {
        let translator = FakeTranslator {
            fail_for: vec!["ko"],
            ..FakeTranslator::default()
        };
        let h = harness(FakeStt::saying("hello"), translator, FakeTts::default());
        let result = h.orchestrator.translate_recording(request(None)).await.unwrap();

        assert_eq!(
            result.translations["Korean"],
            "[Translation error: Translation error for ko: network error: unreachable]"
        );
        assert!(!result.audio_paths.contains_key("Korean"));
        assert_eq!(result.translations["Japanese"], "[ja] hello");
        assert_eq!(result.translations.len(), 7);
        assert_eq!(result.audio_paths.len(), 6);
    }

    #[tokio::test]
    async fn synthesis_failure_only_drops_audio() {
        let tts = FakeTts {
            fail_for: vec!["ja", "en"],
        };
        let h = harness(FakeStt::saying("hello"), FakeTranslator::default(), tts);
        let result = h.orchestrator.translate_recording(request(None)).await.unwrap();

        assert_eq!(result.translations["Japanese"], "[ja] hello");
        assert_eq!(result.translations["English"], "hello");
        assert!(!result.audio_paths.contains_key("Japanese"));
        assert!(!result.audio_paths.contains_key("English"));
        assert_eq!(result.audio_paths.len(), 5);
    }

    #[tokio::test]
    async fn blank_transcription_is_fatal() {
        let h = harness(FakeStt::saying("  \n"), FakeTranslator::default(), FakeTts::default());
        let err = h.orchestrator.translate_recording(request(None)).await.unwrap_err();
        assert!(matches!(err, PipelineError::EmptyTranscription));
        assert_eq!(h.translator.calls.load(Ordering::SeqCst), 0);
        assert_eq!(files_with_ext(h.dir.path(), "wav"), 0);
    }

    #[tokio::test]
    async fn transcription_failure_removes_upload() {
        let stt = FakeStt::failing(ProviderError::Rejected("Audio duration is too short.".into()));
        let h = harness(stt, FakeTranslator::default(), FakeTts::default());
        let err = h.orchestrator.translate_recording(request(None)).await.unwrap_err();
        assert_eq!(err.to_string(), "Transcription error: Audio duration is too short.");
        assert!(!err.is_client_error());
        assert_eq!(files_with_ext(h.dir.path(), "wav"), 0);
    }

    #[tokio::test]
    async fn unknown_language_is_rejected_before_staging() {
        let h = harness(FakeStt::saying("x"), FakeTranslator::default(), FakeTts::default());
        let err = h
            .orchestrator
            .translate_recording(request(Some("Klingon")))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid source language: Klingon");
        assert!(h.stt.seen.lock().unwrap().is_none());
        assert_eq!(std::fs::read_dir(h.dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn missing_audio_is_rejected() {
        let h = harness(FakeStt::saying("x"), FakeTranslator::default(), FakeTts::default());
        let err = h
            .orchestrator
            .translate_recording(TranslationRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::MissingAudio));
    }

    #[tokio::test]
    async fn concurrent_fan_out_matches_sequential() {
        let sequential = harness(FakeStt::saying("hi"), FakeTranslator::default(), FakeTts::default());
        let concurrent_h = harness(FakeStt::saying("hi"), FakeTranslator::default(), FakeTts::default());
        let concurrent = concurrent_h.orchestrator.with_fan_out(FanOut::Concurrent);

        let a = sequential.orchestrator.translate_recording(request(None)).await.unwrap();
        let b = concurrent.translate_recording(request(None)).await.unwrap();
        assert_eq!(a.translations, b.translations);
        assert_eq!(
            a.audio_paths.keys().collect::<Vec<_>>(),
            b.audio_paths.keys().collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn concurrent_fan_out_isolates_failures() {
        let translator = FakeTranslator {
            fail_for: vec!["ru"],
            ..FakeTranslator::default()
        };
        let tts = FakeTts {
            fail_for: vec!["hi"],
        };
        let h = harness(FakeStt::saying("hello"), translator, tts);
        let orchestrator = h.orchestrator.with_fan_out(FanOut::Concurrent);
        let result = orchestrator.translate_recording(request(None)).await.unwrap();

        assert_eq!(result.translations.len(), 7);
        let markers: Vec<&str> = result
            .translations
            .iter()
            .filter(|(_, text)| text.starts_with("[Translation error: "))
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(markers, ["Russian"]);
        assert_eq!(result.translations["Hindi"], "[hi] hello");
        assert_eq!(result.translations["Korean"], "[ko] hello");

        let mut missing: Vec<&str> = orchestrator
            .languages()
            .iter()
            .map(|l| l.name.as_str())
            .filter(|name| !result.audio_paths.contains_key(*name))
            .collect();
        missing.sort_unstable();
        assert_eq!(missing, ["Hindi", "Russian"]);
        assert_eq!(result.audio_paths.len(), 5);
        assert_eq!(files_with_ext(h.dir.path(), "wav"), 0);
    }

    #[tokio::test]
    async fn result_keys_follow_source_then_configured_order() {
        for mode in [FanOut::Sequential, FanOut::Concurrent] {
            let h = harness(FakeStt::saying("hola"), FakeTranslator::default(), FakeTts::default());
            let orchestrator = h.orchestrator.with_fan_out(mode);
            let result = orchestrator
                .translate_recording(request(Some("Spanish")))
                .await
                .unwrap();

            let expected = ["Spanish", "English", "Hindi", "Japanese", "Russian", "German", "Korean"];
            assert_eq!(result.translations.keys().collect::<Vec<_>>(), expected);
            assert_eq!(result.audio_paths.keys().collect::<Vec<_>>(), expected);
        }
    }

    #[tokio::test]
    async fn dropped_request_still_removes_upload() {
        let mut stt = FakeStt::saying("never");
        stt.hang = true;
        let h = harness(stt, FakeTranslator::default(), FakeTts::default());

        let outcome = tokio::time::timeout(
            Duration::from_millis(50),
            h.orchestrator.translate_recording(request(None)),
        )
        .await;
        assert!(outcome.is_err());
        assert!(h.stt.seen.lock().unwrap().as_ref().unwrap().1);
        assert_eq!(files_with_ext(h.dir.path(), "wav"), 0);
    }

    #[tokio::test]
    async fn audio_route_prefix_is_configurable() {
        let h = harness(FakeStt::saying("hello"), FakeTranslator::default(), FakeTts::default());
        let orchestrator = h.orchestrator.with_audio_route("media/");
        assert_eq!(orchestrator.audio_route(), "/media");
        let result = orchestrator.translate_recording(request(None)).await.unwrap();
        assert!(result.audio_paths["English"].starts_with("/media/"));
        assert!(!result.audio_paths["English"].starts_with("/media//"));
    }
}
