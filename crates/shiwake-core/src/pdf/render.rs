//! Page rasterization through pdfium.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, trace};

use super::{Rasterizer, Result, RENDER_DPI};
use crate::error::PdfError;
use crate::models::Document;

/// Environment variable pointing at the pdfium library or its directory.
pub const PDFIUM_LIBRARY_ENV: &str = "PDFIUM_LIBRARY_PATH";

/// PDF points per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// Renders every page of a document with pdfium at [`RENDER_DPI`].
#[derive(Debug, Clone, Default)]
pub struct PdfiumRasterizer {
    library: Option<PathBuf>,
}

impl PdfiumRasterizer {
    pub fn new() -> Self {
        Self { library: None }
    }

    /// Prefer a specific pdfium library (file or directory) when binding.
    pub fn with_library(mut self, library: Option<PathBuf>) -> Self {
        self.library = library;
        self
    }

    fn bind(&self) -> Result<Pdfium> {
        let env_path = std::env::var_os(PDFIUM_LIBRARY_ENV).map(PathBuf::from);

        for candidate in self.library.iter().chain(env_path.iter()) {
            match bind_path(candidate) {
                Ok(pdfium) => return Ok(pdfium),
                Err(e) => debug!("pdfium not usable at {}: {}", candidate.display(), e),
            }
        }

        Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map(Pdfium::new)
            .map_err(|e| PdfError::Library(format!("{:?}", e)))
    }
}

fn bind_path(path: &Path) -> Result<Pdfium> {
    let library = if path.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(path)
    } else {
        path.to_path_buf()
    };

    Pdfium::bind_to_library(library)
        .map(Pdfium::new)
        .map_err(|e| PdfError::Library(format!("{:?}", e)))
}

/// Pixel width of a page `width_pt` points wide rendered at `dpi`.
pub(crate) fn target_pixels(width_pt: f32, dpi: u32) -> i32 {
    ((width_pt * dpi as f32) / POINTS_PER_INCH).round().max(1.0) as i32
}

impl Rasterizer for PdfiumRasterizer {
    fn rasterize(&self, document: &Document) -> Result<Vec<DynamicImage>> {
        let pdfium = self.bind()?;

        let pdf = pdfium
            .load_pdf_from_byte_slice(&document.bytes, None)
            .map_err(|e| {
                let detail = format!("{:?}", e);
                if detail.contains("Password") {
                    PdfError::Encrypted
                } else {
                    PdfError::Parse(detail)
                }
            })?;

        let pages = pdf.pages();
        if pages.len() == 0 {
            return Err(PdfError::NoPages);
        }

        let mut images = Vec::with_capacity(pages.len() as usize);

        for (index, page) in pages.iter().enumerate() {
            let width = target_pixels(page.width().value, RENDER_DPI);
            let config = PdfRenderConfig::new().set_target_width(width);

            let bitmap = page
                .render_with_config(&config)
                .map_err(|e| PdfError::Render {
                    page: index + 1,
                    reason: format!("{:?}", e),
                })?;

            let image = bitmap.as_image();
            trace!(
                "Rendered page {} of {} -> {}x{} px",
                index + 1,
                document.name,
                image.width(),
                image.height()
            );
            images.push(image);
        }

        debug!("Rasterized {} pages of {} at {} DPI", images.len(), document.name, RENDER_DPI);
        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_target_pixels_at_300_dpi() {
        // A4 portrait is 595 x 842 pt.
        assert_eq!(target_pixels(595.0, RENDER_DPI), 2479);
        assert_eq!(target_pixels(72.0, RENDER_DPI), 300);
        assert_eq!(target_pixels(0.0, RENDER_DPI), 1);
    }

    #[test]
    fn test_garbage_fails_rasterization() {
        let doc = Document::new("bad", "bad.pdf", b"not a pdf".to_vec());
        let result = PdfiumRasterizer::new().rasterize(&doc);

        // Without pdfium installed this is a library error; with it, a parse error.
        assert!(matches!(
            result,
            Err(PdfError::Library(_)) | Err(PdfError::Parse(_))
        ));
    }
}
