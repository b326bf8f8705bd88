//! Lazily constructed OCR engine.

use std::cell::OnceCell;

use tracing::{error, info};

use super::{OcrEngine, PageImage};
use crate::error::OcrError;

type Factory = Box<dyn Fn() -> Result<Box<dyn OcrEngine>, OcrError>>;

/// Builds the wrapped engine on first use and caches the outcome.
///
/// Loading OCR models is slow and needs files a text-only batch never uses,
/// so construction waits until a document actually falls back to OCR. A
/// failed construction is cached too and reported as
/// [`OcrError::ModelLoad`] on every later call.
pub struct DeferredEngine {
    factory: Factory,
    engine: OnceCell<Result<Box<dyn OcrEngine>, String>>,
}

impl DeferredEngine {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn OcrEngine>, OcrError> + 'static,
    {
        Self {
            factory: Box::new(factory),
            engine: OnceCell::new(),
        }
    }

    /// Whether the engine has been built (successfully or not).
    pub fn is_initialized(&self) -> bool {
        self.engine.get().is_some()
    }

    fn engine(&self) -> Result<&dyn OcrEngine, OcrError> {
        let slot = self.engine.get_or_init(|| match (self.factory)() {
            Ok(engine) => {
                info!("OCR engine ready");
                Ok(engine)
            }
            Err(e) => {
                error!("OCR engine unavailable: {}", e);
                Err(e.to_string())
            }
        });

        match slot {
            Ok(engine) => Ok(engine.as_ref()),
            Err(reason) => Err(OcrError::ModelLoad(reason.clone())),
        }
    }
}

impl OcrEngine for DeferredEngine {
    fn recognize(&self, page: &PageImage) -> Result<String, OcrError> {
        self.engine()?.recognize(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::ImagePreprocessor;
    use image::{DynamicImage, GrayImage};
    use std::rc::Rc;
    use std::cell::Cell;

    struct Echo;

    impl OcrEngine for Echo {
        fn recognize(&self, _page: &PageImage) -> Result<String, OcrError> {
            Ok("echo".to_string())
        }
    }

    fn page() -> PageImage {
        ImagePreprocessor::new().preprocess(&DynamicImage::ImageLuma8(GrayImage::new(2, 2)))
    }

    #[test]
    fn test_builds_once_on_first_use() {
        let builds = Rc::new(Cell::new(0));
        let counter = builds.clone();
        let engine = DeferredEngine::new(move || {
            counter.set(counter.get() + 1);
            Ok(Box::new(Echo) as Box<dyn OcrEngine>)
        });

        assert!(!engine.is_initialized());
        assert_eq!(engine.recognize(&page()).unwrap(), "echo");
        assert_eq!(engine.recognize(&page()).unwrap(), "echo");
        assert_eq!(builds.get(), 1);
    }

    #[test]
    fn test_failed_build_is_cached() {
        let builds = Rc::new(Cell::new(0));
        let counter = builds.clone();
        let engine = DeferredEngine::new(move || {
            counter.set(counter.get() + 1);
            Err(OcrError::ModelLoad("det.onnx missing".to_string()))
        });

        assert!(matches!(engine.recognize(&page()), Err(OcrError::ModelLoad(_))));
        assert!(matches!(engine.recognize(&page()), Err(OcrError::ModelLoad(_))));
        assert_eq!(builds.get(), 1);
    }
}
