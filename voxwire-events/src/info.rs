//! Service description payload sent in response to `describe`

use serde::{Deserialize, Serialize};

/// Credit for an engine or model
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Attribution {
    pub name: String,
    pub url: String,
}

/// One model an engine can serve
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AsrModel {
    pub name: String,
    pub description: String,
    pub attribution: Attribution,
    pub installed: bool,
    pub languages: Vec<String>,
    pub version: String,
}

/// One speech-recognition engine
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AsrProgram {
    pub name: String,
    pub description: String,
    pub attribution: Attribution,
    pub installed: bool,
    pub version: String,
    pub models: Vec<AsrModel>,
}

/// Full service description
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AsrInfo {
    pub asr: Vec<AsrProgram>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_serialization() {
        let info = AsrInfo {
            asr: vec![AsrProgram {
                name: "whisper".to_string(),
                description: "whisper.cpp transcription".to_string(),
                attribution: Attribution {
                    name: "Georgi Gerganov".to_string(),
                    url: "https://github.com/ggerganov/whisper.cpp".to_string(),
                },
                installed: true,
                version: "0.1.0".to_string(),
                models: vec![AsrModel {
                    name: "base-q8_0".to_string(),
                    description: "base-q8_0".to_string(),
                    attribution: Attribution {
                        name: "OpenAI".to_string(),
                        url: "https://github.com/openai/whisper".to_string(),
                    },
                    installed: true,
                    languages: vec!["en".to_string()],
                    version: "1".to_string(),
                }],
            }],
        };

        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"name\":\"whisper\""));
        assert!(json.contains("\"installed\":true"));

        let back: AsrInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, info);
    }
}
