use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{RagError, RagResult};

pub const DEFAULT_MODEL: &str = "deepseek-r1:32b";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_STORAGE_DIR: &str = "document_store/pdfs";
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
pub const DEFAULT_TOP_K: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Ollama,
    OpenAI,
}

impl ProviderKind {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::Ollama => DEFAULT_OLLAMA_URL,
            ProviderKind::OpenAI => DEFAULT_OPENAI_URL,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Ollama => "ollama",
            ProviderKind::OpenAI => "openai",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(ProviderKind::Ollama),
            "openai" => Ok(ProviderKind::OpenAI),
            other => Err(RagError::Config(format!(
                "Unknown provider: {}. Available providers: ollama, openai",
                other
            ))),
        }
    }
}

/// Connection settings for one model backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub model: String,
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub temperature: f32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Ollama,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            api_key: None,
            timeout_secs: 120,
            temperature: 0.7,
        }
    }
}

impl ProviderConfig {
    /// Reads `<PREFIX>_PROVIDER`, `<PREFIX>_MODEL`, `<PREFIX>_BASE_URL`,
    /// `<PREFIX>_API_KEY`, `<PREFIX>_TIMEOUT_SECS` and `<PREFIX>_TEMPERATURE`.
    pub fn from_env(prefix: &str) -> RagResult<Self> {
        let prefix = prefix.to_uppercase();
        let defaults = Self::default();

        let kind = match env::var(format!("{}_PROVIDER", prefix)) {
            Ok(value) => value.parse()?,
            Err(_) => defaults.kind,
        };

        let model = env::var(format!("{}_MODEL", prefix)).unwrap_or(defaults.model);

        let base_url = env::var(format!("{}_BASE_URL", prefix))
            .unwrap_or_else(|_| kind.default_base_url().to_string());

        // Fall back to the conventional OpenAI variable so one key serves both backends
        let api_key = env::var(format!("{}_API_KEY", prefix))
            .ok()
            .or_else(|| match kind {
                ProviderKind::OpenAI => env::var("OPENAI_API_KEY").ok(),
                ProviderKind::Ollama => None,
            });

        let timeout_secs = parse_env(&format!("{}_TIMEOUT_SECS", prefix))?
            .unwrap_or(defaults.timeout_secs);

        let temperature = parse_env(&format!("{}_TEMPERATURE", prefix))?
            .unwrap_or(defaults.temperature);

        Ok(Self {
            kind,
            model,
            base_url,
            api_key,
            timeout_secs,
            temperature,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Fixed-window chunking parameters, measured in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkConfig {
    pub max_len: usize,
    pub overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl ChunkConfig {
    pub fn new(max_len: usize, overlap: usize) -> RagResult<Self> {
        let config = Self { max_len, overlap };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> RagResult<()> {
        if self.max_len == 0 {
            return Err(RagError::Config("chunk size must be greater than zero".to_string()));
        }
        if self.overlap >= self.max_len {
            return Err(RagError::Config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                self.overlap, self.max_len
            )));
        }
        Ok(())
    }

    /// Distance between the starts of two consecutive chunks.
    pub fn stride(&self) -> usize {
        self.max_len - self.overlap
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    pub storage_dir: PathBuf,
    pub chunk: ChunkConfig,
    pub top_k: usize,
    pub embedding: ProviderConfig,
    pub generation: ProviderConfig,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            chunk: ChunkConfig::default(),
            top_k: DEFAULT_TOP_K,
            embedding: ProviderConfig::default(),
            generation: ProviderConfig::default(),
        }
    }
}

impl RagConfig {
    /// Reads `DOCUMIND_*` and the backend variables over the defaults.
    /// Not validated, so callers can apply overrides first and then call
    /// [`RagConfig::validate`].
    pub fn from_env() -> RagResult<Self> {
        let defaults = Self::default();

        let storage_dir = env::var("DOCUMIND_STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.storage_dir);

        let chunk = ChunkConfig {
            max_len: parse_env("DOCUMIND_CHUNK_SIZE")?.unwrap_or(defaults.chunk.max_len),
            overlap: parse_env("DOCUMIND_CHUNK_OVERLAP")?.unwrap_or(defaults.chunk.overlap),
        };

        Ok(Self {
            storage_dir,
            chunk,
            top_k: parse_env("DOCUMIND_TOP_K")?.unwrap_or(defaults.top_k),
            embedding: ProviderConfig::from_env("EMBEDDING")?,
            generation: ProviderConfig::from_env("GENERATION")?,
        })
    }

    pub fn validate(&self) -> RagResult<()> {
        self.chunk.validate()?;
        if self.top_k == 0 {
            return Err(RagError::Config("top_k must be at least 1".to_string()));
        }
        if self.embedding.model.trim().is_empty() || self.generation.model.trim().is_empty() {
            return Err(RagError::Config("model identifier must not be empty".to_string()));
        }
        Ok(())
    }
}

fn parse_env<T: FromStr>(key: &str) -> RagResult<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| RagError::Config(format!("invalid value for {}: {}", key, e))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let config = RagConfig::default();
        assert_eq!(config.chunk.max_len, 1000);
        assert_eq!(config.chunk.overlap, 200);
        assert_eq!(config.top_k, 4);
        assert_eq!(config.embedding.model, "deepseek-r1:32b");
        assert_eq!(config.storage_dir, PathBuf::from("document_store/pdfs"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn overlap_equal_to_size_is_rejected() {
        let err = ChunkConfig::new(1000, 1000).unwrap_err();
        assert!(matches!(err, RagError::Config(_)));
        assert!(ChunkConfig::new(1000, 1200).is_err());
        assert!(ChunkConfig::new(0, 0).is_err());
        assert_eq!(ChunkConfig::new(1000, 200).unwrap().stride(), 800);
    }

    #[test]
    fn zero_top_k_is_rejected() {
        let config = RagConfig {
            top_k: 0,
            ..RagConfig::default()
        };
        assert!(matches!(config.validate(), Err(RagError::Config(_))));
    }

    #[test]
    fn env_values_are_checked_only_by_validate() {
        env::set_var("DOCUMIND_CHUNK_OVERLAP", "5000");
        let loaded = RagConfig::from_env();
        env::remove_var("DOCUMIND_CHUNK_OVERLAP");

        let mut config = loaded.unwrap();
        assert_eq!(config.chunk.overlap, 5000);
        assert!(config.validate().is_err());

        config.chunk.overlap = 100;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn provider_kind_parses_case_insensitively() {
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAI);
        assert_eq!(" ollama ".parse::<ProviderKind>().unwrap(), ProviderKind::Ollama);
        assert!("gemini".parse::<ProviderKind>().is_err());
    }
}
