//! Configuration structures for the ledger pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::ocr::{Language, LanguageProfile};

/// Environment variable naming the Drive folder to scan.
pub const ENV_FOLDER_ID: &str = "DRIVE_FOLDER_ID";
/// Environment variable naming the service-account credentials file.
pub const ENV_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";
/// Environment variable naming the output CSV path.
pub const ENV_OUTPUT: &str = "SHIWAKE_OUTPUT";

/// Main configuration for the shiwake pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShiwakeConfig {
    /// Where documents come from.
    pub source: SourceConfig,

    /// Where the ledger goes.
    pub output: OutputConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// OCR configuration.
    pub ocr: OcrConfig,
}

/// Document source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Drive folder id to scan.
    pub folder_id: Option<String>,

    /// Service-account credentials file.
    pub credentials_path: PathBuf,

    /// Local directory to scan instead of Drive.
    pub local_dir: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            folder_id: None,
            credentials_path: PathBuf::from("credentials.json"),
            local_dir: None,
        }
    }
}

/// What to emit for a document that could not be processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnDocumentError {
    /// Leave the document out of the ledger.
    #[default]
    Skip,
    /// Emit a row with every cell empty.
    EmptyRow,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Ledger CSV destination.
    pub path: PathBuf,

    /// Policy for documents that fail rasterization or OCR start-up.
    pub on_document_error: OnDocumentError,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("output.csv"),
            on_document_error: OnDocumentError::Skip,
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Path to the pdfium shared library or the directory holding it.
    pub pdfium_library: Option<PathBuf>,
}

/// OCR backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OcrBackend {
    /// PaddleOCR ONNX models through pure-onnx-ocr.
    #[default]
    Paddle,
    /// Tesseract (requires the `tesseract` feature).
    Tesseract,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Which engine recognizes rasterized pages.
    pub backend: OcrBackend,

    /// Operating language.
    pub primary_language: Language,

    /// Latin-script language for mixed scripts and numerals.
    pub fallback_language: Language,

    /// Directory holding the PaddleOCR model files.
    pub model_dir: Option<PathBuf>,

    /// Directory holding Tesseract `*.traineddata` files.
    pub tessdata_dir: Option<PathBuf>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            backend: OcrBackend::Paddle,
            primary_language: Language::Japanese,
            fallback_language: Language::English,
            model_dir: None,
            tessdata_dir: None,
        }
    }
}

impl OcrConfig {
    /// The dual-language profile engines are built with.
    pub fn profile(&self) -> LanguageProfile {
        LanguageProfile::new(self.primary_language, self.fallback_language)
    }
}

impl ShiwakeConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Override options from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Override options from any key lookup. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(folder_id) = get(ENV_FOLDER_ID) {
            self.source.folder_id = Some(folder_id);
        }
        if let Some(credentials) = get(ENV_CREDENTIALS) {
            self.source.credentials_path = PathBuf::from(credentials);
        }
        if let Some(output) = get(ENV_OUTPUT) {
            self.output.path = PathBuf::from(output);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ShiwakeConfig::default();
        assert_eq!(config.source.credentials_path, PathBuf::from("credentials.json"));
        assert_eq!(config.output.path, PathBuf::from("output.csv"));
        assert_eq!(config.output.on_document_error, OnDocumentError::Skip);
        assert_eq!(config.ocr.profile().tesseract_languages(), "jpn+eng");
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: ShiwakeConfig = serde_json::from_str(
            r#"{"source": {"folder_id": "abc"}, "output": {"on_document_error": "empty-row"}}"#,
        )
        .unwrap();

        assert_eq!(config.source.folder_id.as_deref(), Some("abc"));
        assert_eq!(config.source.credentials_path, PathBuf::from("credentials.json"));
        assert_eq!(config.output.on_document_error, OnDocumentError::EmptyRow);
        assert_eq!(config.ocr.backend, OcrBackend::Paddle);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_FOLDER_ID, "folder-1"),
            (ENV_CREDENTIALS, "/secrets/sa.json"),
            (ENV_OUTPUT, ""),
        ]
        .into_iter()
        .collect();

        let mut config = ShiwakeConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.source.folder_id.as_deref(), Some("folder-1"));
        assert_eq!(config.source.credentials_path, PathBuf::from("/secrets/sa.json"));
        assert_eq!(config.output.path, PathBuf::from("output.csv"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = ShiwakeConfig::default();
        config.source.local_dir = Some(PathBuf::from("inbox"));
        config.save(&path).unwrap();

        let loaded = ShiwakeConfig::from_file(&path).unwrap();
        assert_eq!(loaded.source.local_dir, Some(PathBuf::from("inbox")));
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            ShiwakeConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
