//! Service description assembly
//!
//! Built once at startup from the resolved settings and the compiled
//! engine set, then replayed verbatim for every `describe`.

use voxwire_events::{AsrInfo, AsrModel, AsrProgram, Attribution};
use voxwire_stt::{guess_model, is_constrained_platform, Capabilities, SttLibrary, PARAKEET_LANGUAGES};

use crate::loader::LoaderSettings;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common language codes advertised for the whisper engine; the
/// models themselves cover far more.
const WHISPER_LANGUAGES: &[&str] = &[
    "en", "zh", "de", "es", "ru", "ko", "fr", "ja", "pt", "tr", "pl", "ca", "nl", "ar", "sv",
    "it", "id", "hi", "fi", "vi", "uk", "el", "cs", "ro", "da", "hu", "no", "th",
];

/// Description covering every engine this build knows about, with
/// `installed` reflecting which ones are actually compiled in.
pub fn describe_info(settings: &LoaderSettings, caps: Capabilities) -> AsrInfo {
    AsrInfo {
        asr: vec![
            whisper_program(settings),
            parakeet_program(settings, caps),
            gigaam_program(caps),
        ],
    }
}

/// Model id the description advertises for an engine: the explicit
/// model if one was configured, otherwise the engine's default.
fn advertised_model(settings: &LoaderSettings, library: SttLibrary) -> String {
    settings.model.clone().unwrap_or_else(|| {
        guess_model(library, settings.language.as_deref(), is_constrained_platform()).to_string()
    })
}

fn whisper_program(settings: &LoaderSettings) -> AsrProgram {
    let model = advertised_model(settings, SttLibrary::Whisper);
    AsrProgram {
        name: "whisper".to_string(),
        description: "whisper.cpp transcription".to_string(),
        attribution: Attribution {
            name: "Georgi Gerganov".to_string(),
            url: "https://github.com/ggerganov/whisper.cpp".to_string(),
        },
        installed: true,
        version: VERSION.to_string(),
        models: vec![AsrModel {
            name: model.clone(),
            description: model,
            attribution: Attribution {
                name: "OpenAI".to_string(),
                url: "https://github.com/openai/whisper".to_string(),
            },
            installed: true,
            languages: WHISPER_LANGUAGES.iter().map(|l| l.to_string()).collect(),
            version: "1".to_string(),
        }],
    }
}

fn parakeet_program(settings: &LoaderSettings, caps: Capabilities) -> AsrProgram {
    let model = advertised_model(settings, SttLibrary::Parakeet);
    AsrProgram {
        name: "parakeet".to_string(),
        description: "Parakeet-TDT transducer via sherpa-onnx".to_string(),
        attribution: Attribution {
            name: "k2-fsa".to_string(),
            url: "https://github.com/k2-fsa/sherpa-onnx".to_string(),
        },
        installed: caps.parakeet,
        version: VERSION.to_string(),
        models: vec![AsrModel {
            name: model.clone(),
            description: model,
            attribution: Attribution {
                name: "NVIDIA".to_string(),
                url: "https://huggingface.co/nvidia/parakeet-tdt-0.6b-v3".to_string(),
            },
            installed: caps.parakeet,
            languages: PARAKEET_LANGUAGES.iter().map(|l| l.to_string()).collect(),
            version: "1".to_string(),
        }],
    }
}

fn gigaam_program(caps: Capabilities) -> AsrProgram {
    let model = guess_model(SttLibrary::GigaAm, Some("ru"), is_constrained_platform()).to_string();
    AsrProgram {
        name: "gigaam".to_string(),
        description: "GigaAM v2 Russian transducer via sherpa-onnx".to_string(),
        attribution: Attribution {
            name: "SaluteDevices".to_string(),
            url: "https://github.com/salute-developers/GigaAM".to_string(),
        },
        installed: caps.gigaam,
        version: VERSION.to_string(),
        models: vec![AsrModel {
            name: model.clone(),
            description: model,
            attribution: Attribution {
                name: "SaluteDevices".to_string(),
                url: "https://github.com/salute-developers/GigaAM".to_string(),
            },
            installed: caps.gigaam,
            languages: vec!["ru".to_string()],
            version: "1".to_string(),
        }],
    }
}
