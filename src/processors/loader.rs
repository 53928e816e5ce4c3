// photo-batch/src/processors/loader.rs
use crate::core::{Result, StudioError, MAX_DIMENSION};
use image::{imageops::FilterType, DynamicImage, GenericImageView, ImageReader};
use std::path::Path;

/// Gallery thumbnail bounding box.
pub const THUMBNAIL_SIZE: (u32, u32) = (100, 100);
/// Preview bounding box.
pub const PREVIEW_SIZE: (u32, u32) = (800, 600);

/// Anything that can turn a path into a decoded image.
pub trait ImageSource {
    fn load(&self, path: &Path) -> Result<DynamicImage>;
}

#[derive(Debug, Clone)]
pub struct Loader {
    max_dimensions: Option<(u32, u32)>,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            max_dimensions: Some((MAX_DIMENSION, MAX_DIMENSION)),
        }
    }

    pub fn with_max_dimensions(mut self, width: u32, height: u32) -> Self {
        self.max_dimensions = Some((width, height));
        self
    }

    /// Opens and decodes an image file. Every failure is reported as
    /// `StudioError::Decode`.
    pub fn load(&self, path: &Path) -> Result<DynamicImage> {
        log::debug!("Loading image from: {}", path.display());

        self.validate_path(path)?;

        let image = ImageReader::open(path)
            .map_err(|e| decode_error(path, e))?
            .with_guessed_format()
            .map_err(|e| decode_error(path, e))?
            .decode()
            .map_err(|e| decode_error(path, e))?;

        let (width, height) = image.dimensions();
        if let Some((max_w, max_h)) = self.max_dimensions {
            if width > max_w || height > max_h {
                return Err(StudioError::Decode(format!(
                    "{}: dimensions {}x{} exceed maximum {}x{}",
                    path.display(),
                    width,
                    height,
                    max_w,
                    max_h
                )));
            }
        }

        log::debug!(
            "Loaded image: {}x{} pixels, format: {:?}",
            width,
            height,
            image.color()
        );

        Ok(image)
    }

    /// Same as [`Loader::load`] but collapses the failure into `None`.
    pub fn try_load(&self, path: &Path) -> Option<DynamicImage> {
        match self.load(path) {
            Ok(image) => Some(image),
            Err(e) => {
                log::warn!("{}", e);
                None
            }
        }
    }

    pub fn thumbnail(&self, image: &DynamicImage) -> Option<DynamicImage> {
        self.thumbnail_within(image, THUMBNAIL_SIZE)
    }

    /// Fast downscale to fit `box_size`. Never enlarges.
    pub fn thumbnail_within(&self, image: &DynamicImage, box_size: (u32, u32)) -> Option<DynamicImage> {
        let (width, height) = fit_within(image.dimensions(), box_size)?;
        if (width, height) == image.dimensions() {
            return Some(image.clone());
        }
        Some(image.thumbnail_exact(width, height))
    }

    pub fn preview(&self, image: &DynamicImage) -> Option<DynamicImage> {
        self.preview_within(image, PREVIEW_SIZE)
    }

    /// Lanczos downscale to fit `box_size`. Never enlarges.
    pub fn preview_within(&self, image: &DynamicImage, box_size: (u32, u32)) -> Option<DynamicImage> {
        let (width, height) = fit_within(image.dimensions(), box_size)?;
        if (width, height) == image.dimensions() {
            return Some(image.clone());
        }
        Some(image.resize_exact(width, height, FilterType::Lanczos3))
    }

    fn validate_path(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(StudioError::Decode(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let metadata = path.metadata().map_err(|e| decode_error(path, e))?;
        if metadata.len() == 0 {
            return Err(StudioError::Decode(format!(
                "File is empty: {}",
                path.display()
            )));
        }

        Ok(())
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageSource for Loader {
    fn load(&self, path: &Path) -> Result<DynamicImage> {
        Loader::load(self, path)
    }
}

fn decode_error(path: &Path, e: impl std::fmt::Display) -> StudioError {
    StudioError::Decode(format!("{}: {}", path.display(), e))
}

/// Largest size with the same aspect ratio that fits inside `box_size`,
/// or the original size if it already fits.
pub(crate) fn fit_within((width, height): (u32, u32), (box_w, box_h): (u32, u32)) -> Option<(u32, u32)> {
    if box_w == 0 || box_h == 0 || width == 0 || height == 0 {
        return None;
    }

    if width <= box_w && height <= box_h {
        return Some((width, height));
    }

    let ratio = (box_w as f64 / width as f64).min(box_h as f64 / height as f64);
    let new_w = ((width as f64 * ratio).round() as u32).clamp(1, box_w);
    let new_h = ((height as f64 * ratio).round() as u32).clamp(1, box_h);

    Some((new_w, new_h))
}
