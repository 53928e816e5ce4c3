// photo-batch/src/processors/compressor.rs
use crate::core::{OutputFormat, Result, StudioError};
use crate::processors::loader::fit_within;
use image::codecs::ico::IcoEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{imageops::FilterType, ColorType, DynamicImage, GenericImageView};
use oxipng::{optimize_from_memory, Options};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const DEFAULT_QUALITY: u8 = 95;

/// Largest edge an ICO entry can hold.
pub const ICO_MAX_EDGE: u32 = 256;

pub struct Compressor {
    quality: u8,
    optimize_png: bool,
}

impl Compressor {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
            optimize_png: false,
        }
    }

    pub fn with_png_optimization(mut self, optimize: bool) -> Self {
        self.optimize_png = optimize;
        self
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn save_with_format(&self, image: &DynamicImage, path: &Path, format: OutputFormat) -> Result<()> {
        log::debug!(
            "Saving image to {} with format {}, quality: {}",
            path.display(),
            format,
            self.quality
        );

        let prepared = prepare_for_format(image, format);

        match format {
            OutputFormat::Jpg => self.save_jpeg(&prepared, path),
            OutputFormat::Png => self.save_png(&prepared, path),
            OutputFormat::Webp => self.save_webp(&prepared, path),
            OutputFormat::Ico => self.save_ico(&prepared, path),
        }
    }

    fn save_jpeg(&self, image: &DynamicImage, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        image.write_with_encoder(JpegEncoder::new_with_quality(&mut writer, self.quality))?;
        writer.flush()?;
        self.log_save_result(path)
    }

    fn save_png(&self, image: &DynamicImage, path: &Path) -> Result<()> {
        if self.optimize_png {
            let mut buffer = Vec::new();
            image.write_with_encoder(PngEncoder::new(&mut buffer))?;

            let optimized = optimize_from_memory(&buffer, &Options::default()).map_err(|e| {
                StudioError::Encode(format!("PNG optimization failed: {}", e))
            })?;

            std::fs::write(path, optimized)?;
        } else {
            let mut writer = BufWriter::new(File::create(path)?);
            image.write_with_encoder(PngEncoder::new_with_quality(
                &mut writer,
                CompressionType::Best,
                PngFilterType::Adaptive,
            ))?;
            writer.flush()?;
        }

        self.log_save_result(path)
    }

    fn save_webp(&self, image: &DynamicImage, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        image.write_with_encoder(WebPEncoder::new_lossless(&mut writer))?;
        writer.flush()?;
        self.log_save_result(path)
    }

    fn save_ico(&self, image: &DynamicImage, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        image.write_with_encoder(IcoEncoder::new(&mut writer))?;
        writer.flush()?;
        self.log_save_result(path)
    }

    fn log_save_result(&self, path: &Path) -> Result<()> {
        let file_size = std::fs::metadata(path)?.len();
        log::debug!("Saved image: {} ({} bytes)", path.display(), file_size);
        Ok(())
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new(DEFAULT_QUALITY)
    }
}

/// Converts `image` into a pixel layout the target encoder accepts.
///
/// JPEG has no alpha channel, so anything carrying alpha is flattened to
/// RGB first. ICO entries are capped at 256x256.
pub fn prepare_for_format(image: &DynamicImage, format: OutputFormat) -> Cow<'_, DynamicImage> {
    match format {
        OutputFormat::Jpg => match image.color() {
            ColorType::L8 | ColorType::Rgb8 => Cow::Borrowed(image),
            _ => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
        },
        OutputFormat::Png => match image.color() {
            ColorType::Rgb32F | ColorType::Rgba32F => {
                Cow::Owned(DynamicImage::ImageRgba16(image.to_rgba16()))
            }
            _ => Cow::Borrowed(image),
        },
        OutputFormat::Webp => match image.color() {
            ColorType::Rgb8 | ColorType::Rgba8 => Cow::Borrowed(image),
            color if color.has_alpha() => Cow::Owned(DynamicImage::ImageRgba8(image.to_rgba8())),
            _ => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
        },
        OutputFormat::Ico => {
            let dims = image.dimensions();
            let fitted = fit_within(dims, (ICO_MAX_EDGE, ICO_MAX_EDGE)).unwrap_or(dims);
            let image = if fitted != dims {
                Cow::Owned(image.resize_exact(fitted.0, fitted.1, FilterType::Lanczos3))
            } else {
                Cow::Borrowed(image)
            };
            match image.color() {
                ColorType::Rgba8 => image,
                _ => Cow::Owned(DynamicImage::ImageRgba8(image.to_rgba8())),
            }
        }
    }
}
