//! Tesseract OCR backend.

use std::path::Path;

use ::tesseract::Tesseract;
use tracing::{debug, info};

use super::{LanguageProfile, OcrEngine, PageImage};
use crate::error::OcrError;
use crate::pdf::RENDER_DPI;

/// OCR engine backed by libtesseract with a combined language string
/// such as `jpn+eng`.
pub struct TesseractEngine {
    datapath: Option<String>,
    languages: String,
}

impl TesseractEngine {
    /// Check that the language data loads, then keep the settings.
    pub fn new(datapath: Option<&Path>, profile: LanguageProfile) -> Result<Self, OcrError> {
        let datapath = datapath.map(|p| p.display().to_string());
        let languages = profile.tesseract_languages();

        Tesseract::new(datapath.as_deref(), Some(&languages))
            .map_err(|e| OcrError::ModelLoad(format!("tesseract ({}): {}", languages, e)))?;

        info!("Tesseract ready with languages {}", languages);
        Ok(Self { datapath, languages })
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, page: &PageImage) -> Result<String, OcrError> {
        let pixels = page.pixels();
        let (width, height) = pixels.dimensions();

        let text = Tesseract::new(self.datapath.as_deref(), Some(&self.languages))
            .map_err(|e| OcrError::ModelLoad(format!("tesseract: {}", e)))?
            .set_frame(pixels.as_raw(), width as i32, height as i32, 1, width as i32)
            .map_err(|e| OcrError::InvalidImage(format!("tesseract: {}", e)))?
            .set_source_resolution(RENDER_DPI as i32)
            .recognize()
            .map_err(|e| OcrError::Recognition(format!("tesseract: {}", e)))?
            .get_text()
            .map_err(|e| OcrError::Recognition(format!("tesseract: {}", e)))?;

        debug!("Tesseract recognized {} chars on {}x{} page", text.len(), width, height);
        Ok(text)
    }
}
