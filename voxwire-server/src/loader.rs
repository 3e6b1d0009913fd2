//! Model loading, selection, and cross-session adapter sharing

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use voxwire_stt::{
    guess_model, is_constrained_platform, select_library, Capabilities, DecodeOptions,
    EngineHints, SttError, SttLibrary, Transcriber, WhisperTranscriber,
};

/// Identity of one backend adapter: (library, model id)
pub type BackendKey = (SttLibrary, String);

/// One adapter shared across sessions. The mutex is the adapter's
/// exclusive inference lock: engines are not assumed reentrant, so
/// only one transcription runs against an instance at a time. It is
/// taken on blocking worker threads, never on the event loop.
pub type SharedTranscriber = Arc<Mutex<Box<dyn Transcriber>>>;

/// Constructor the loader calls for a never-before-seen key
pub type AdapterFactory =
    dyn Fn(&BackendKey, &LoaderSettings) -> voxwire_stt::Result<Box<dyn Transcriber>>
        + Send
        + Sync;

/// Settings the loader resolves against, fixed at startup
#[derive(Debug, Clone)]
pub struct LoaderSettings {
    pub library: SttLibrary,
    pub model: Option<String>,
    pub language: Option<String>,
    pub decode: DecodeOptions,
    pub hints: EngineHints,
    pub download_dir: PathBuf,
    pub local_files_only: bool,
}

/// Process-wide loader: one adapter per [`BackendKey`], constructed
/// at most once, with per-key locks serializing first-time
/// construction. Distinct keys construct in parallel.
pub struct ModelLoader {
    settings: LoaderSettings,
    capabilities: Capabilities,
    factory: Arc<AdapterFactory>,
    adapters: Mutex<HashMap<BackendKey, SharedTranscriber>>,
    // Coarse lock guards only this map; per-key critical sections
    // are held on the inner tokio mutexes.
    construction_locks: Mutex<HashMap<BackendKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl ModelLoader {
    pub fn new(settings: LoaderSettings, capabilities: Capabilities) -> Self {
        Self::with_factory(settings, capabilities, Arc::new(build_adapter))
    }

    /// Loader with an injected adapter constructor; tests use this to
    /// count constructions without touching real engines.
    pub fn with_factory(
        settings: LoaderSettings,
        capabilities: Capabilities,
        factory: Arc<AdapterFactory>,
    ) -> Self {
        Self {
            settings,
            capabilities,
            factory,
            adapters: Mutex::new(HashMap::new()),
            construction_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &LoaderSettings {
        &self.settings
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Language in effect for a turn: the turn's override, else the
    /// configured default.
    pub fn effective_language(&self, language: Option<&str>) -> Option<String> {
        language
            .map(str::to_string)
            .or_else(|| self.settings.language.clone())
    }

    /// Resolve a turn's language to a concrete backend key.
    pub fn resolve_key(&self, language: Option<&str>) -> BackendKey {
        let language = self.effective_language(language);
        let explicit_model = self.settings.model.is_some();

        let library = select_library(
            self.settings.library,
            explicit_model,
            language.as_deref(),
            self.capabilities,
        );
        if self.settings.library != SttLibrary::Auto && library != self.settings.library {
            warn!(
                "Falling back to {} ({} engine is not available in this build)",
                library, self.settings.library
            );
        }

        let model = self.settings.model.clone().unwrap_or_else(|| {
            guess_model(library, language.as_deref(), is_constrained_platform()).to_string()
        });
        debug!("Selected stt-library '{}' with model '{}'", library, model);

        (library, model)
    }

    /// Resolve and return the shared adapter for a turn, constructing
    /// it on a worker thread if this key has never loaded before.
    pub async fn load(&self, language: Option<&str>) -> Result<SharedTranscriber, SttError> {
        let key = self.resolve_key(language);
        self.load_key(key).await
    }

    /// Get-or-construct the adapter for `key`. Concurrent calls for
    /// the same key wait on one construction; a failed construction
    /// stores nothing, so the next call retries from scratch.
    pub async fn load_key(&self, key: BackendKey) -> Result<SharedTranscriber, SttError> {
        let construction_lock = {
            let mut locks = self.construction_locks.lock();
            Arc::clone(
                locks
                    .entry(key.clone())
                    .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
            )
        };

        let _guard = construction_lock.lock().await;

        if let Some(adapter) = self.adapters.lock().get(&key) {
            return Ok(Arc::clone(adapter));
        }

        debug!("Constructing adapter for {:?}", key);
        let factory = Arc::clone(&self.factory);
        let factory_key = key.clone();
        let settings = self.settings.clone();
        let adapter = tokio::task::spawn_blocking(move || factory(&factory_key, &settings))
            .await
            .map_err(|e| SttError::model_load(format!("adapter construction failed: {e}")))??;

        let shared: SharedTranscriber = Arc::new(Mutex::new(adapter));
        self.adapters.lock().insert(key, Arc::clone(&shared));
        Ok(shared)
    }
}

/// Construct the real adapter for a key. Runs on a blocking worker;
/// may download model artifacts and take seconds to minutes.
fn build_adapter(
    key: &BackendKey,
    settings: &LoaderSettings,
) -> voxwire_stt::Result<Box<dyn Transcriber>> {
    let (library, model) = key;
    match library {
        SttLibrary::Auto | SttLibrary::Whisper => Ok(Box::new(WhisperTranscriber::new(
            model,
            &settings.download_dir,
            settings.local_files_only,
            &settings.hints,
        )?)),
        #[cfg(feature = "parakeet")]
        SttLibrary::Parakeet => Ok(Box::new(voxwire_stt::ParakeetTranscriber::new(
            model,
            &settings.download_dir,
            settings.local_files_only,
            &settings.hints,
        )?)),
        #[cfg(feature = "gigaam")]
        SttLibrary::GigaAm => Ok(Box::new(voxwire_stt::GigaAmTranscriber::new(
            model,
            &settings.download_dir,
            settings.local_files_only,
            &settings.hints,
        )?)),
        #[cfg(not(all(feature = "parakeet", feature = "gigaam")))]
        other => Err(SttError::model_load(format!(
            "{other} engine is not compiled into this build"
        ))),
    }
}
