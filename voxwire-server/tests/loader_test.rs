//! Model loader behavior across concurrent callers

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use voxwire_server::{LoaderSettings, ModelLoader};
use voxwire_stt::{
    guess_model, is_constrained_platform, Capabilities, DecodeOptions, EngineHints, SttError,
    SttLibrary, Transcriber,
};

struct StubTranscriber(&'static str);

impl Transcriber for StubTranscriber {
    fn transcribe(
        &mut self,
        _wav_path: &Path,
        _language: Option<&str>,
        _opts: &DecodeOptions,
    ) -> voxwire_stt::Result<String> {
        Ok(self.0.to_string())
    }
}

fn settings(library: SttLibrary, language: Option<&str>) -> LoaderSettings {
    LoaderSettings {
        library,
        model: None,
        language: language.map(str::to_string),
        decode: DecodeOptions::default(),
        hints: EngineHints::default(),
        download_dir: std::env::temp_dir().join("voxwire-test-models"),
        local_files_only: true,
    }
}

/// Loader whose factory sleeps briefly and counts constructions
fn counting_loader(
    library: SttLibrary,
    language: Option<&str>,
    caps: Capabilities,
) -> (Arc<ModelLoader>, Arc<AtomicUsize>) {
    let constructions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&constructions);
    let loader = ModelLoader::with_factory(
        settings(library, language),
        caps,
        Arc::new(move |_key, _settings| {
            counter.fetch_add(1, Ordering::SeqCst);
            // Long enough that concurrent callers overlap with it
            std::thread::sleep(Duration::from_millis(50));
            Ok(Box::new(StubTranscriber("ok")) as Box<dyn Transcriber>)
        }),
    );
    (Arc::new(loader), constructions)
}

const NO_CAPS: Capabilities = Capabilities {
    parakeet: false,
    gigaam: false,
};
const ALL_CAPS: Capabilities = Capabilities {
    parakeet: true,
    gigaam: true,
};

#[tokio::test]
async fn test_concurrent_loads_construct_once() {
    let (loader, constructions) = counting_loader(SttLibrary::Whisper, None, NO_CAPS);

    let start = Instant::now();
    let mut tasks = Vec::new();
    for _ in 0..8 {
        let loader = Arc::clone(&loader);
        tasks.push(tokio::spawn(async move { loader.load(None).await }));
    }

    let mut adapters = Vec::new();
    for task in tasks {
        adapters.push(task.await.unwrap().unwrap());
    }
    let elapsed = start.elapsed();

    assert_eq!(constructions.load(Ordering::SeqCst), 1);
    for adapter in &adapters[1..] {
        assert!(Arc::ptr_eq(&adapters[0], adapter));
    }
    // Waiters ride the one in-flight construction instead of queueing
    // their own 50 ms each
    assert!(
        elapsed < Duration::from_millis(100),
        "8 same-key loads took {elapsed:?}"
    );
}

#[tokio::test]
async fn test_distinct_keys_construct_in_parallel() {
    let (loader, constructions) = counting_loader(SttLibrary::Whisper, None, NO_CAPS);

    let start = Instant::now();
    let base = {
        let loader = Arc::clone(&loader);
        tokio::spawn(
            async move { loader.load_key((SttLibrary::Whisper, "base-q8_0".into())).await },
        )
    };
    let small = {
        let loader = Arc::clone(&loader);
        tokio::spawn(
            async move { loader.load_key((SttLibrary::Whisper, "small-q8_0".into())).await },
        )
    };
    base.await.unwrap().unwrap();
    small.await.unwrap().unwrap();
    let elapsed = start.elapsed();

    assert_eq!(constructions.load(Ordering::SeqCst), 2);
    // Two 50 ms constructions back to back would take at least 100 ms;
    // distinct keys must not wait on each other
    assert!(
        elapsed < Duration::from_millis(95),
        "distinct-key loads serialized: {elapsed:?}"
    );
}

#[tokio::test]
async fn test_distinct_keys_get_distinct_adapters() {
    let (loader, constructions) = counting_loader(SttLibrary::Whisper, None, NO_CAPS);

    let a = loader
        .load_key((SttLibrary::Whisper, "base-q8_0".to_string()))
        .await
        .unwrap();
    let b = loader
        .load_key((SttLibrary::Whisper, "small-q8_0".to_string()))
        .await
        .unwrap();

    assert_eq!(constructions.load(Ordering::SeqCst), 2);
    assert!(!Arc::ptr_eq(&a, &b));
}

#[tokio::test]
async fn test_failed_construction_is_not_cached() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let loader = ModelLoader::with_factory(
        settings(SttLibrary::Whisper, None),
        NO_CAPS,
        Arc::new(move |_key, _settings| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(SttError::model_load("model file corrupt"))
            } else {
                Ok(Box::new(StubTranscriber("ok")) as Box<dyn Transcriber>)
            }
        }),
    );

    assert!(loader.load(None).await.is_err());
    // Retry constructs from scratch rather than resurrecting the failure
    let adapter = loader.load(None).await.unwrap();
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(
        adapter.lock().transcribe(Path::new("x"), None, &DecodeOptions::default()).unwrap(),
        "ok"
    );
}

#[tokio::test]
async fn test_same_language_across_sessions_shares_one_adapter() {
    let (loader, constructions) = counting_loader(SttLibrary::Auto, None, ALL_CAPS);

    // Sequential turns from different sessions, same language
    let first = loader.load(Some("en")).await.unwrap();
    let second = loader.load(Some("en")).await.unwrap();
    let third = loader.load(Some("en")).await.unwrap();

    assert_eq!(constructions.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&second, &third));
}

#[test]
fn test_resolve_key_follows_language() {
    let (loader, _) = counting_loader(SttLibrary::Auto, None, ALL_CAPS);

    let (library, _) = loader.resolve_key(Some("ru"));
    assert_eq!(library, SttLibrary::GigaAm);

    let (library, _) = loader.resolve_key(Some("en"));
    assert_eq!(library, SttLibrary::Parakeet);

    let (library, _) = loader.resolve_key(Some("de"));
    assert_eq!(library, SttLibrary::Whisper);
}

#[test]
fn test_russian_without_gigaam_build_degrades_to_whisper() {
    let (loader, _) = counting_loader(SttLibrary::GigaAm, Some("ru"), NO_CAPS);

    let (library, model) = loader.resolve_key(None);
    assert_eq!(library, SttLibrary::Whisper);
    assert_eq!(
        model,
        guess_model(SttLibrary::Whisper, Some("ru"), is_constrained_platform())
    );
}

#[test]
fn test_explicit_model_wins_over_guessing() {
    let loader = ModelLoader::with_factory(
        LoaderSettings {
            model: Some("small-q8_0".to_string()),
            ..settings(SttLibrary::Auto, Some("en"))
        },
        ALL_CAPS,
        Arc::new(|_key, _settings| {
            Ok(Box::new(StubTranscriber("ok")) as Box<dyn Transcriber>)
        }),
    );

    let (library, model) = loader.resolve_key(None);
    assert_eq!(library, SttLibrary::Whisper);
    assert_eq!(model, "small-q8_0");
}
