//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use super::{Language, LanguageProfile, OcrEngine, PageImage};
use crate::error::OcrError;

/// Text detection model shared by every language.
pub const DETECTION_MODEL: &str = "det.onnx";

/// A recognized text region.
#[derive(Debug, Clone)]
pub struct TextBox {
    /// Quadrilateral corners `[x1, y1, x2, y2, x3, y3, x4, y4]`.
    pub bbox: [f32; 8],
    pub text: String,
    pub confidence: f32,
}

impl TextBox {
    /// Axis-aligned bounding rectangle `(min_x, min_y, max_x, max_y)`.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// Order boxes top-to-bottom, then left-to-right within a 20 px band.
fn sort_by_reading_order(boxes: &mut [TextBox]) {
    boxes.sort_by(|a, b| {
        let (ax, ay, _, _) = a.rect();
        let (bx, by, _, _) = b.rect();
        let row_a = (ay / 20.0) as i32;
        let row_b = (by / 20.0) as i32;
        if row_a != row_b {
            row_a.cmp(&row_b)
        } else {
            ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal)
        }
    });
}

/// One recognizer per language, all sharing the detection model.
struct LanguageModel {
    language: Language,
    engine: pure_onnx_ocr::engine::OcrEngine,
}

/// OCR engine backed by `pure-onnx-ocr` (PaddleOCR models, no native runtime).
///
/// Each page goes through the primary language model; the fallback model
/// runs only when the primary one recognizes nothing.
pub struct PureOcrEngine {
    models: Vec<LanguageModel>,
}

impl PureOcrEngine {
    /// Load the detection model and a recognizer per profile language.
    pub fn from_dir(model_dir: &Path, profile: LanguageProfile) -> Result<Self, OcrError> {
        let det_path = model_dir.join(DETECTION_MODEL);
        if !det_path.exists() {
            return Err(OcrError::ModelLoad(format!(
                "detection model not found at {}",
                det_path.display()
            )));
        }

        let mut models = Vec::new();
        for language in profile.languages() {
            let rec_path = model_dir.join(language.recognition_model());
            let dict_path = model_dir.join(language.dictionary());

            let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
                .det_model_path(&det_path)
                .rec_model_path(&rec_path)
                .dictionary_path(&dict_path)
                .build()
                .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr ({}): {}", language, e)))?;

            debug!("Loaded {} recognizer from {}", language, rec_path.display());
            models.push(LanguageModel { language, engine });
        }

        info!(
            "Loaded pure-onnx-ocr engine ({}) from {}",
            profile.tesseract_languages(),
            model_dir.display()
        );

        Ok(Self { models })
    }

    /// Detect and recognize text boxes with one language model.
    fn run(&self, model: &LanguageModel, page: &PageImage) -> Result<Vec<TextBox>, OcrError> {
        let image = page.to_dynamic();
        let results = model
            .engine
            .run_from_image(&image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr ({}): {}", model.language, e)))?;

        let mut boxes: Vec<TextBox> = results
            .iter()
            .map(|r| TextBox {
                bbox: polygon_to_bbox(&r.bounding_box),
                text: r.text.replace("[UNK]", " "),
                confidence: r.confidence,
            })
            .collect();

        sort_by_reading_order(&mut boxes);
        Ok(boxes)
    }
}

impl OcrEngine for PureOcrEngine {
    fn recognize(&self, page: &PageImage) -> Result<String, OcrError> {
        let start = Instant::now();
        let (width, height) = page.dimensions();

        for model in &self.models {
            let boxes = self.run(model, page)?;
            let text = boxes
                .iter()
                .map(|b| b.text.as_str())
                .collect::<Vec<_>>()
                .join("\n");

            if !text.trim().is_empty() {
                debug!(
                    "OCR ({}) on {}x{} page: {} text boxes in {}ms",
                    model.language,
                    width,
                    height,
                    boxes.len(),
                    start.elapsed().as_millis()
                );
                return Ok(text);
            }
            debug!("OCR ({}) found no text, trying next language", model.language);
        }

        Ok(String::new())
    }
}

/// Convert a `Polygon<f64>` to our `[f32; 8]` bbox format.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text_box(x: f32, y: f32, text: &str) -> TextBox {
        TextBox {
            bbox: [x, y, x + 50.0, y, x + 50.0, y + 10.0, x, y + 10.0],
            text: text.to_string(),
            confidence: 0.9,
        }
    }

    #[test]
    fn test_reading_order() {
        let mut boxes = vec![
            text_box(300.0, 105.0, "合計"),
            text_box(10.0, 12.0, "株式会社サンプル"),
            text_box(10.0, 101.0, "請求金額"),
            text_box(400.0, 5.0, "2024/03/15"),
        ];
        sort_by_reading_order(&mut boxes);

        let order: Vec<&str> = boxes.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(order, vec!["株式会社サンプル", "2024/03/15", "請求金額", "合計"]);
    }

    #[test]
    fn test_missing_models() {
        let dir = tempfile::tempdir().unwrap();
        let result = PureOcrEngine::from_dir(dir.path(), LanguageProfile::default());
        assert!(matches!(result, Err(OcrError::ModelLoad(_))));
    }
}
