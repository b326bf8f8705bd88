//! Image preprocessing for OCR.

use image::{DynamicImage, GrayImage};
use tracing::trace;

/// Intensities below this become black, the rest white.
pub const BINARIZE_THRESHOLD: u8 = 128;

/// A rasterized page ready for recognition.
#[derive(Debug, Clone)]
pub struct PageImage {
    pixels: GrayImage,
    binarized: bool,
}

impl PageImage {
    /// Single-channel pixel buffer.
    pub fn pixels(&self) -> &GrayImage {
        &self.pixels
    }

    pub fn is_binarized(&self) -> bool {
        self.binarized
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Copy into a `DynamicImage` for engines that take one.
    pub fn to_dynamic(&self) -> DynamicImage {
        DynamicImage::ImageLuma8(self.pixels.clone())
    }
}

/// Grayscale conversion followed by fixed-threshold binarization.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImagePreprocessor;

impl ImagePreprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Turn one rendered page into a binarized [`PageImage`].
    pub fn preprocess(&self, image: &DynamicImage) -> PageImage {
        let mut gray = image.to_luma8();
        binarize(&mut gray);

        trace!("Binarized {}x{} page", gray.width(), gray.height());
        PageImage {
            pixels: gray,
            binarized: true,
        }
    }

    /// Preprocess pages, keeping their order.
    pub fn preprocess_all(&self, images: &[DynamicImage]) -> Vec<PageImage> {
        images.iter().map(|img| self.preprocess(img)).collect()
    }
}

fn binarize(image: &mut GrayImage) {
    for pixel in image.pixels_mut() {
        pixel[0] = if pixel[0] < BINARIZE_THRESHOLD { 0 } else { 255 };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_threshold_boundary() {
        let mut gray = GrayImage::new(4, 1);
        for (x, value) in [0u8, 127, 128, 255].into_iter().enumerate() {
            gray.put_pixel(x as u32, 0, Luma([value]));
        }

        let page = ImagePreprocessor::new().preprocess(&DynamicImage::ImageLuma8(gray));
        let values: Vec<u8> = page.pixels().pixels().map(|p| p[0]).collect();

        assert_eq!(values, vec![0, 0, 255, 255]);
        assert!(page.is_binarized());
    }

    #[test]
    fn test_color_input_becomes_single_channel() {
        let mut rgb = RgbImage::from_pixel(3, 2, Rgb([255, 255, 255]));
        rgb.put_pixel(0, 0, Rgb([0, 0, 0]));
        rgb.put_pixel(1, 0, Rgb([200, 30, 30]));

        let page = ImagePreprocessor::new().preprocess(&DynamicImage::ImageRgb8(rgb));

        assert_eq!(page.dimensions(), (3, 2));
        assert_eq!(page.pixels().get_pixel(0, 0)[0], 0);
        // Dark red falls under the threshold.
        assert_eq!(page.pixels().get_pixel(1, 0)[0], 0);
        assert_eq!(page.pixels().get_pixel(2, 1)[0], 255);
    }

    #[test]
    fn test_output_is_strictly_two_valued() {
        let gray = GrayImage::from_fn(16, 16, |x, y| Luma([(x * 16 + y) as u8]));
        let page = ImagePreprocessor::new().preprocess(&DynamicImage::ImageLuma8(gray));

        assert!(page.pixels().pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn test_preprocess_is_deterministic() {
        let gray = GrayImage::from_fn(8, 8, |x, y| Luma([((x * 37 + y * 11) % 256) as u8]));
        let image = DynamicImage::ImageLuma8(gray);
        let preprocessor = ImagePreprocessor::new();

        assert_eq!(
            preprocessor.preprocess(&image).pixels().as_raw(),
            preprocessor.preprocess(&image).pixels().as_raw()
        );
    }
}
