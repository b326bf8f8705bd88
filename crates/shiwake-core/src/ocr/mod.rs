//! OCR over rasterized pages.
//!
//! Pages are binarized by [`ImagePreprocessor`] and recognized by an
//! [`OcrEngine`] configured with a two-language [`LanguageProfile`]: the
//! operating language plus a Latin-script fallback, since invoices mix
//! scripts and numerals.

mod deferred;
mod preprocessing;
#[cfg(feature = "native")]
mod pure_engine;
#[cfg(feature = "tesseract")]
mod tesseract;

pub use deferred::DeferredEngine;
pub use preprocessing::{BINARIZE_THRESHOLD, ImagePreprocessor, PageImage};
#[cfg(feature = "native")]
pub use pure_engine::{PureOcrEngine, TextBox, DETECTION_MODEL};
#[cfg(feature = "tesseract")]
pub use self::tesseract::TesseractEngine;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::OcrError;
use crate::models::config::{OcrBackend, OcrConfig};
use crate::models::ExtractedText;

/// A recognition language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "jpn")]
    Japanese,
    #[serde(rename = "eng")]
    English,
}

impl Language {
    /// Tesseract language code.
    pub fn tesseract_code(self) -> &'static str {
        match self {
            Language::Japanese => "jpn",
            Language::English => "eng",
        }
    }

    /// PaddleOCR recognition model file name.
    pub fn recognition_model(self) -> &'static str {
        match self {
            Language::Japanese => "japan_rec.onnx",
            Language::English => "latin_rec.onnx",
        }
    }

    /// PaddleOCR character dictionary file name.
    pub fn dictionary(self) -> &'static str {
        match self {
            Language::Japanese => "japan_dict.txt",
            Language::English => "latin_dict.txt",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tesseract_code())
    }
}

/// Operating language plus Latin-script fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageProfile {
    pub primary: Language,
    pub fallback: Language,
}

impl LanguageProfile {
    pub fn new(primary: Language, fallback: Language) -> Self {
        Self { primary, fallback }
    }

    /// Languages in the order they are tried, without duplicates.
    pub fn languages(&self) -> Vec<Language> {
        if self.primary == self.fallback {
            vec![self.primary]
        } else {
            vec![self.primary, self.fallback]
        }
    }

    /// Tesseract language string, e.g. `jpn+eng`.
    pub fn tesseract_languages(&self) -> String {
        self.languages()
            .iter()
            .map(|l| l.tesseract_code())
            .collect::<Vec<_>>()
            .join("+")
    }
}

impl Default for LanguageProfile {
    fn default() -> Self {
        Self::new(Language::Japanese, Language::English)
    }
}

/// Text recognition over preprocessed pages.
pub trait OcrEngine {
    /// Recognize a single page.
    fn recognize(&self, page: &PageImage) -> Result<String, OcrError>;

    /// Recognize pages in order, one call per page, each followed by `\n`.
    ///
    /// A page that fails contributes an empty string. Only
    /// [`OcrError::ModelLoad`] stops the run, since no page can succeed then.
    fn recognize_pages(&self, pages: &[PageImage]) -> Result<ExtractedText, OcrError> {
        let mut text = String::new();

        for (index, page) in pages.iter().enumerate() {
            match self.recognize(page) {
                Ok(page_text) => text.push_str(&page_text),
                Err(OcrError::ModelLoad(reason)) => return Err(OcrError::ModelLoad(reason)),
                Err(e) => warn!("OCR failed on page {}: {}", index + 1, e),
            }
            text.push('\n');
        }

        Ok(ExtractedText::new(text))
    }
}

impl<E: OcrEngine + ?Sized> OcrEngine for Box<E> {
    fn recognize(&self, page: &PageImage) -> Result<String, OcrError> {
        (**self).recognize(page)
    }
}

impl<E: OcrEngine + ?Sized> OcrEngine for &E {
    fn recognize(&self, page: &PageImage) -> Result<String, OcrError> {
        (**self).recognize(page)
    }
}

/// Build the configured OCR backend.
pub fn create_engine(config: &OcrConfig) -> Result<Box<dyn OcrEngine>, OcrError> {
    let profile = config.profile();

    match config.backend {
        OcrBackend::Paddle => {
            #[cfg(feature = "native")]
            {
                let model_dir = config.model_dir.as_deref().ok_or_else(|| {
                    OcrError::ModelLoad("no OCR model directory configured".to_string())
                })?;
                Ok(Box::new(PureOcrEngine::from_dir(model_dir, profile)?))
            }
            #[cfg(not(feature = "native"))]
            {
                let _ = profile;
                Err(OcrError::ModelLoad(
                    "built without the `native` feature".to_string(),
                ))
            }
        }
        OcrBackend::Tesseract => {
            #[cfg(feature = "tesseract")]
            {
                Ok(Box::new(TesseractEngine::new(
                    config.tessdata_dir.as_deref(),
                    profile,
                )?))
            }
            #[cfg(not(feature = "tesseract"))]
            {
                let _ = profile;
                Err(OcrError::ModelLoad(
                    "built without the `tesseract` feature".to_string(),
                ))
            }
        }
    }
}

/// An engine that is only built when the first page needs recognizing.
pub fn deferred_engine(config: &OcrConfig) -> DeferredEngine {
    let config = config.clone();
    DeferredEngine::new(move || create_engine(&config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    struct Scripted {
        calls: Cell<usize>,
        fail_on: Option<usize>,
    }

    impl OcrEngine for Scripted {
        fn recognize(&self, _page: &PageImage) -> Result<String, OcrError> {
            let call = self.calls.get();
            self.calls.set(call + 1);
            if Some(call) == self.fail_on {
                return Err(OcrError::Recognition("smudged".to_string()));
            }
            Ok(format!("page {}", call + 1))
        }
    }

    fn pages(n: usize) -> Vec<PageImage> {
        let preprocessor = ImagePreprocessor::new();
        (0..n)
            .map(|_| preprocessor.preprocess(&DynamicImage::ImageLuma8(GrayImage::new(4, 4))))
            .collect()
    }

    #[test]
    fn test_profile_languages() {
        let profile = LanguageProfile::default();
        assert_eq!(profile.tesseract_languages(), "jpn+eng");
        assert_eq!(
            LanguageProfile::new(Language::English, Language::English).tesseract_languages(),
            "eng"
        );
    }

    #[test]
    fn test_recognize_pages_in_order() {
        let engine = Scripted { calls: Cell::new(0), fail_on: None };
        let text = engine.recognize_pages(&pages(3)).unwrap();

        assert_eq!(text.as_str(), "page 1\npage 2\npage 3\n");
        assert_eq!(engine.calls.get(), 3);
    }

    #[test]
    fn test_failed_page_contributes_empty_string() {
        let engine = Scripted { calls: Cell::new(0), fail_on: Some(1) };
        let text = engine.recognize_pages(&pages(3)).unwrap();

        assert_eq!(text.as_str(), "page 1\n\npage 3\n");
    }

    #[test]
    fn test_missing_backend_is_model_load_error() {
        let config = OcrConfig {
            model_dir: None,
            ..OcrConfig::default()
        };
        assert!(matches!(create_engine(&config), Err(OcrError::ModelLoad(_))));
    }

    #[test]
    fn test_language_serde_codes() {
        assert_eq!(serde_json::to_string(&Language::Japanese).unwrap(), "\"jpn\"");
        let lang: Language = serde_json::from_str("\"eng\"").unwrap();
        assert_eq!(lang, Language::English);
    }
}
