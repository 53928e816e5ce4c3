// photo-batch/src/processors/watermark.rs
use crate::core::{
    resize_footprint, Result, StudioError, WatermarkPosition, MAX_ALLOCATION_BYTES, MAX_DIMENSION,
};
use crate::processors::loader::Loader;
use image::{imageops, imageops::FilterType, DynamicImage, GenericImageView, RgbaImage};
use std::path::Path;

/// Corner margin as a fraction of the base width.
pub const CORNER_PADDING: f64 = 0.05;

/// Placement parameters for one watermark pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatermarkParams {
    pub position: WatermarkPosition,
    pub manual_x: f64,
    pub manual_y: f64,
    pub opacity: f64,
    pub scale: f64,
}

pub struct WatermarkStage {
    loader: Loader,
}

impl WatermarkStage {
    pub fn new() -> Self {
        Self {
            loader: Loader::new(),
        }
    }

    /// Composites the overlay at `overlay_path` onto a copy of `base`.
    ///
    /// Best effort: on any failure the error is logged and an unmodified
    /// copy of `base` is returned.
    pub fn apply(&self, base: &DynamicImage, overlay_path: &Path, params: &WatermarkParams) -> DynamicImage {
        match self.try_apply(base, overlay_path, params) {
            Ok(image) => image,
            Err(e) => {
                log::warn!("Watermark skipped: {}", e);
                base.clone()
            }
        }
    }

    pub fn try_apply(
        &self,
        base: &DynamicImage,
        overlay_path: &Path,
        params: &WatermarkParams,
    ) -> Result<DynamicImage> {
        let overlay = self
            .loader
            .load(overlay_path)
            .map_err(|e| StudioError::Watermark(e.to_string()))?;

        self.composite(base, &overlay, params)
    }

    /// Same as [`WatermarkStage::try_apply`] with an already decoded overlay.
    pub fn composite(
        &self,
        base: &DynamicImage,
        overlay: &DynamicImage,
        params: &WatermarkParams,
    ) -> Result<DynamicImage> {
        let (base_w, base_h) = base.dimensions();
        let (wm_w, wm_h) = overlay_size(base_w, overlay.dimensions(), params.scale)?;

        log::debug!(
            "Placing {}x{} watermark at {} on {}x{} image",
            wm_w,
            wm_h,
            params.position,
            base_w,
            base_h
        );

        let mut mark = imageops::resize(&overlay.to_rgba8(), wm_w, wm_h, FilterType::Lanczos3);
        apply_opacity(&mut mark, params.opacity);

        let (x, y) = overlay_origin(
            params.position,
            (base_w, base_h),
            (wm_w, wm_h),
            (params.manual_x, params.manual_y),
        );

        let mut canvas = base.to_rgba8();
        imageops::overlay(&mut canvas, &mark, x, y);

        Ok(DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8()))
    }
}

impl Default for WatermarkStage {
    fn default() -> Self {
        Self::new()
    }
}

/// Overlay size for a base image of width `base_w`: the width is
/// `round(base_w * scale)` and the height follows the overlay's own aspect
/// ratio.
pub fn overlay_size(base_w: u32, (overlay_w, overlay_h): (u32, u32), scale: f64) -> Result<(u32, u32)> {
    if overlay_w == 0 || overlay_h == 0 {
        return Err(StudioError::Watermark("Overlay image is empty".to_string()));
    }

    if !scale.is_finite() || scale <= 0.0 {
        return Err(StudioError::Watermark(format!("Invalid watermark scale: {}", scale)));
    }

    let aspect = overlay_w as f64 / overlay_h as f64;
    let width = (base_w as f64 * scale).round();
    let height = (width / aspect).round();

    if width < 1.0 || height < 1.0 {
        return Err(StudioError::Watermark(format!(
            "Watermark would be {}x{} pixels",
            width, height
        )));
    }

    if width > MAX_DIMENSION as f64 || height > MAX_DIMENSION as f64 {
        return Err(StudioError::Watermark(format!(
            "Watermark would be {}x{} pixels",
            width, height
        )));
    }

    let size = (width as u32, height as u32);
    let bytes = resize_footprint((overlay_w, overlay_h), size, 4);
    if bytes > MAX_ALLOCATION_BYTES {
        return Err(StudioError::Watermark(format!(
            "{}x{} watermark needs {} bytes, over the {} byte allocation limit",
            size.0, size.1, bytes, MAX_ALLOCATION_BYTES
        )));
    }

    Ok(size)
}

/// Top-left corner of the overlay on the base image. May be negative or past
/// the far edge; the composite clips whatever falls outside.
pub fn overlay_origin(
    position: WatermarkPosition,
    (base_w, base_h): (u32, u32),
    (wm_w, wm_h): (u32, u32),
    (manual_x, manual_y): (f64, f64),
) -> (i64, i64) {
    let (bw, bh) = (base_w as i64, base_h as i64);
    let (ww, wh) = (wm_w as i64, wm_h as i64);
    let padding = (base_w as f64 * CORNER_PADDING).round() as i64;

    match position {
        WatermarkPosition::Manual => (
            (base_w as f64 * manual_x - wm_w as f64 / 2.0).round() as i64,
            (base_h as f64 * manual_y - wm_h as f64 / 2.0).round() as i64,
        ),
        WatermarkPosition::Center => ((bw - ww).div_euclid(2), (bh - wh).div_euclid(2)),
        WatermarkPosition::TopLeft => (padding, padding),
        WatermarkPosition::TopRight => (bw - ww - padding, padding),
        WatermarkPosition::BottomLeft => (padding, bh - wh - padding),
        WatermarkPosition::BottomRight => (bw - ww - padding, bh - wh - padding),
        WatermarkPosition::Unrecognized => (0, 0),
    }
}

/// Scales the existing alpha plane by `opacity`, saturating at fully opaque.
pub fn apply_opacity(mark: &mut RgbaImage, opacity: f64) {
    let factor = opacity.max(0.0);
    for pixel in mark.pixels_mut() {
        pixel[3] = (pixel[3] as f64 * factor).round().min(255.0) as u8;
    }
}
