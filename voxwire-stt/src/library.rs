//! Library selection and model guessing
//!
//! Both policies are pure functions over explicit inputs; engine
//! availability enters as [`Capabilities`] data computed once at
//! startup, never probed mid-selection.

use std::fmt;
use std::str::FromStr;

use crate::error::SttError;

/// Languages the Parakeet-TDT v3 model covers
pub const PARAKEET_LANGUAGES: &[&str] = &[
    "bg", "hr", "cs", "da", "nl", "en", "et", "fi", "fr", "de", "el", "hu", "it", "lv", "lt",
    "mt", "pl", "pt", "ro", "sk", "sl", "es", "sv", "ru", "uk",
];

/// Closed set of speech-to-text libraries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SttLibrary {
    /// Pick automatically based on language and availability
    Auto,
    /// whisper.cpp — the baseline, always compiled
    Whisper,
    /// Parakeet-TDT transducer via sherpa-onnx
    Parakeet,
    /// GigaAM v2 Russian transducer via sherpa-onnx
    GigaAm,
}

impl SttLibrary {
    pub fn as_str(&self) -> &'static str {
        match self {
            SttLibrary::Auto => "auto",
            SttLibrary::Whisper => "whisper",
            SttLibrary::Parakeet => "parakeet",
            SttLibrary::GigaAm => "gigaam",
        }
    }
}

impl fmt::Display for SttLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SttLibrary {
    type Err = SttError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(SttLibrary::Auto),
            "whisper" => Ok(SttLibrary::Whisper),
            "parakeet" => Ok(SttLibrary::Parakeet),
            "gigaam" => Ok(SttLibrary::GigaAm),
            other => Err(SttError::UnknownLibrary(other.to_string())),
        }
    }
}

/// Which optional engines this build carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub parakeet: bool,
    pub gigaam: bool,
}

impl Capabilities {
    /// Compiled-in engine set
    pub fn detect() -> Self {
        Self {
            parakeet: cfg!(feature = "parakeet"),
            gigaam: cfg!(feature = "gigaam"),
        }
    }
}

/// True on platforms where the smallest models should be preferred
pub fn is_constrained_platform() -> bool {
    cfg!(any(target_arch = "arm", target_arch = "aarch64"))
}

/// Resolve the requested library to a concrete one.
///
/// `Auto` picks by language when the model is also auto; an explicit
/// model id forces the baseline engine. An explicitly requested
/// engine that is not compiled in degrades to the baseline — the
/// caller logs that downgrade.
pub fn select_library(
    requested: SttLibrary,
    explicit_model: bool,
    language: Option<&str>,
    caps: Capabilities,
) -> SttLibrary {
    match requested {
        SttLibrary::Auto => {
            if explicit_model {
                return SttLibrary::Whisper;
            }
            match language {
                Some("ru") if caps.gigaam => SttLibrary::GigaAm,
                None | Some("en") if caps.parakeet => SttLibrary::Parakeet,
                _ => SttLibrary::Whisper,
            }
        }
        SttLibrary::Parakeet if !caps.parakeet => SttLibrary::Whisper,
        SttLibrary::GigaAm if !caps.gigaam => SttLibrary::Whisper,
        other => other,
    }
}

/// Default model id for a resolved library.
///
/// Total and pure: no I/O, always returns an id.
pub fn guess_model(
    library: SttLibrary,
    language: Option<&str>,
    is_constrained: bool,
) -> &'static str {
    match library {
        SttLibrary::Parakeet => match language {
            Some("en") => "sherpa-onnx-nemo-parakeet-tdt-0.6b-v2-int8",
            // The v3 model claims auto-detection but needs the
            // multilingual variant for non-English input.
            _ => "sherpa-onnx-nemo-parakeet-tdt-0.6b-v3-int8",
        },
        SttLibrary::GigaAm => "sherpa-onnx-nemo-transducer-giga-am-v2-russian-2025-04-19",
        SttLibrary::Auto | SttLibrary::Whisper => {
            if is_constrained {
                "tiny-q8_0"
            } else {
                "base-q8_0"
            }
        }
    }
}
