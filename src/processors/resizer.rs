// photo-batch/src/processors/resizer.rs
use crate::core::{resize_footprint, Result, StudioError, MAX_ALLOCATION_BYTES, MAX_DIMENSION};
use image::{imageops::FilterType, DynamicImage, GenericImageView};

pub struct Resizer {
    filter: FilterType,
}

impl Resizer {
    pub fn new() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }

    /// Proportional resize by `scale_percent`. On failure the input is
    /// returned unchanged.
    pub fn resize(&self, image: &DynamicImage, scale_percent: f64) -> DynamicImage {
        match self.try_resize(image, scale_percent) {
            Ok(resized) => resized,
            Err(e) => {
                log::warn!("Resize skipped: {}", e);
                image.clone()
            }
        }
    }

    pub fn try_resize(&self, image: &DynamicImage, scale_percent: f64) -> Result<DynamicImage> {
        let (width, height) = calculate_dimensions(image.dimensions(), scale_percent)?;

        if (width, height) == image.dimensions() {
            log::debug!("Image dimensions unchanged, skipping resize");
            return Ok(image.clone());
        }

        let bytes = resize_footprint(
            image.dimensions(),
            (width, height),
            image.color().bytes_per_pixel() as u64,
        );
        if bytes > MAX_ALLOCATION_BYTES {
            return Err(StudioError::Resize(format!(
                "{}x{} needs {} bytes, over the {} byte allocation limit",
                width, height, bytes, MAX_ALLOCATION_BYTES
            )));
        }

        log::debug!(
            "Resizing image from {}x{} to {}x{}",
            image.width(),
            image.height(),
            width,
            height
        );

        Ok(image.resize_exact(width, height, self.filter))
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new()
    }
}

pub fn calculate_dimensions((width, height): (u32, u32), scale_percent: f64) -> Result<(u32, u32)> {
    if !scale_percent.is_finite() || scale_percent <= 0.0 {
        return Err(StudioError::Resize(format!(
            "Invalid scale percentage: {}",
            scale_percent
        )));
    }

    let new_width = (width as f64 * scale_percent / 100.0).round();
    let new_height = (height as f64 * scale_percent / 100.0).round();

    if new_width < 1.0 || new_height < 1.0 {
        return Err(StudioError::Resize(format!(
            "{}x{} at {}% collapses to an empty image",
            width, height, scale_percent
        )));
    }

    if new_width > MAX_DIMENSION as f64 || new_height > MAX_DIMENSION as f64 {
        return Err(StudioError::Resize(format!(
            "{}x{} at {}% exceeds maximum dimension {}",
            width, height, scale_percent, MAX_DIMENSION
        )));
    }

    Ok((new_width as u32, new_height as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn test_calculate_dimensions() {
        assert_eq!(calculate_dimensions((800, 600), 50.0).unwrap(), (400, 300));
        assert_eq!(calculate_dimensions((801, 601), 50.0).unwrap(), (401, 301));
        assert_eq!(calculate_dimensions((100, 30), 150.0).unwrap(), (150, 45));
        assert_eq!(calculate_dimensions((333, 333), 33.0).unwrap(), (110, 110));
    }

    #[test]
    fn test_calculate_dimensions_rejects_bad_scale() {
        assert!(calculate_dimensions((800, 600), 0.0).is_err());
        assert!(calculate_dimensions((800, 600), -10.0).is_err());
        assert!(calculate_dimensions((800, 600), f64::INFINITY).is_err());
        assert!(calculate_dimensions((10, 10), 1.0).is_err());
    }

    #[test]
    fn test_resize_produces_new_image() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(120, 80));
        let resized = Resizer::new().resize(&image, 25.0);

        assert_eq!(resized.dimensions(), (30, 20));
        assert_eq!(image.dimensions(), (120, 80));
    }

    #[test]
    fn test_resize_failure_returns_input() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(4, 4));
        let resizer = Resizer::new();

        assert!(matches!(resizer.try_resize(&image, 1.0), Err(StudioError::Resize(_))));
        assert_eq!(resizer.resize(&image, 1.0), image);
    }

    #[test]
    fn test_resize_over_allocation_limit_returns_input() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(800, 600));
        let resizer = Resizer::new();

        // 40000x30000 is under MAX_DIMENSION but needs gigabytes
        assert_eq!(calculate_dimensions((800, 600), 5000.0).unwrap(), (40_000, 30_000));
        assert!(matches!(resizer.try_resize(&image, 5000.0), Err(StudioError::Resize(_))));

        let result = resizer.resize(&image, 5000.0);
        assert_eq!(result.dimensions(), (800, 600));
        assert_eq!(result, image);
    }

    #[test]
    fn test_resize_full_scale_is_noop() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(64, 48));
        assert_eq!(Resizer::new().resize(&image, 100.0), image);
    }
}
