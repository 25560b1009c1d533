use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelsConfig {
    #[serde(default = "default_model_provider")]
    pub provider: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_summarizer_model")]
    pub summarizer_model: String,
    #[serde(default = "default_qa_model")]
    pub qa_model: String,
    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            provider: default_model_provider(),
            base_url: default_base_url(),
            summarizer_model: default_summarizer_model(),
            qa_model: default_qa_model(),
            timeout_secs: default_model_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_model_provider() -> String {
    "huggingface".to_string()
}
fn default_base_url() -> String {
    "https://api-inference.huggingface.co".to_string()
}
fn default_summarizer_model() -> String {
    "Falconsai/text_summarization".to_string()
}
fn default_qa_model() -> String {
    "deepset/roberta-base-squad2".to_string()
}
fn default_model_timeout() -> u64 {
    60
}
fn default_max_retries() -> u32 {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

fn default_chunk_size() -> usize {
    2500
}
fn default_chunk_overlap() -> usize {
    250
}

#[derive(Debug, Deserialize, Clone)]
pub struct OcrConfig {
    #[serde(default = "default_ocr_provider")]
    pub provider: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_ocr_timeout")]
    pub timeout_secs: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            provider: default_ocr_provider(),
            endpoint: None,
            timeout_secs: default_ocr_timeout(),
        }
    }
}

fn default_ocr_provider() -> String {
    "disabled".to_string()
}
fn default_ocr_timeout() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    #[serde(default = "default_history_path")]
    pub path: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: default_history_path(),
        }
    }
}

fn default_history_path() -> PathBuf {
    PathBuf::from("./docchat_history.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7878".to_string()
}

/// Load and validate configuration. A missing file yields the defaults so
/// the CLI works out of the box; a present but unparsable file is an error.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        let config = Config::default();
        validate(&config)?;
        return Ok(config);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.chunking.chunk_size == 0 {
        anyhow::bail!("chunking.chunk_size must be > 0");
    }
    if config.chunking.chunk_overlap >= config.chunking.chunk_size {
        anyhow::bail!("chunking.chunk_overlap must be < chunking.chunk_size");
    }
    if config.models.timeout_secs == 0 {
        anyhow::bail!("models.timeout_secs must be > 0");
    }

    match config.models.provider.as_str() {
        "disabled" | "huggingface" => {}
        other => anyhow::bail!(
            "Unknown model provider: '{}'. Must be disabled or huggingface.",
            other
        ),
    }

    match config.ocr.provider.as_str() {
        "disabled" => {}
        "http" => {
            if config.ocr.endpoint.is_none() {
                anyhow::bail!("ocr.endpoint must be set when ocr.provider is 'http'");
            }
        }
        other => anyhow::bail!("Unknown OCR provider: '{}'. Must be disabled or http.", other),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_config(Path::new("/nonexistent/docchat.toml")).unwrap();
        assert_eq!(config.chunking.chunk_size, 2500);
        assert_eq!(config.chunking.chunk_overlap, 250);
        assert_eq!(config.models.provider, "huggingface");
        assert_eq!(config.ocr.provider, "disabled");
    }

    #[test]
    fn overlap_must_stay_below_chunk_size() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[chunking]\nchunk_size = 100\nchunk_overlap = 100").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn http_ocr_requires_an_endpoint() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[ocr]\nprovider = \"http\"").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn unknown_model_provider_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[models]\nprovider = \"magic\"").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn partial_config_keeps_remaining_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[models]\nqa_model = \"my/model\"").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.models.qa_model, "my/model");
        assert_eq!(config.models.summarizer_model, "Falconsai/text_summarization");
    }
}
