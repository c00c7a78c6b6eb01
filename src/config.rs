use serde::Deserialize;
use std::fs;

/// Pretrained-vector source formats understood by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Line-oriented `word c1 .. cN` text as written by the Stanford
    /// GloVe tooling.
    #[default]
    Stanford,
}

/// Encoder configuration loaded from a TOML or JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct EncoderConfig {
    /// Length of every produced index sequence; longer documents are
    /// truncated, shorter ones padded.
    #[serde(default = "default_max_document_length")]
    pub max_document_length: usize,
    /// Whether unseen tokens resolve to the OOV sentinel or are dropped.
    #[serde(default = "default_allow_oov")]
    pub allow_oov: bool,
    /// Format of the pretrained-vector source.
    #[serde(default)]
    pub format: SourceFormat,
}

fn default_max_document_length() -> usize {
    100
}

fn default_allow_oov() -> bool {
    true
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            max_document_length: default_max_document_length(),
            allow_oov: default_allow_oov(),
            format: SourceFormat::default(),
        }
    }
}

impl EncoderConfig {
    /// Load configuration from the given path.  Supports TOML or JSON based
    /// on the file extension. Returns `None` if parsing fails.
    pub fn from_path(path: &str) -> Option<Self> {
        let Ok(content) = fs::read_to_string(path) else {
            return None;
        };
        if path.ends_with(".json") {
            serde_json::from_str(&content).ok()
        } else {
            toml::from_str(&content).ok()
        }
    }
}
