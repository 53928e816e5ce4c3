// photo-batch/src/core/mod.rs
pub mod pipeline;
pub mod processor;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Largest width or height, in pixels, the tool will decode or produce.
pub const MAX_DIMENSION: u32 = 100_000;

/// Upper bound, in bytes, for any single buffer a stage allocates. Matches the
/// default `image::Limits::max_alloc`.
pub const MAX_ALLOCATION_BYTES: u64 = 512 * 1024 * 1024;

/// Bytes `image::imageops::resize` needs to go from `src` to `dst` with
/// `bytes_per_pixel` output channels. The separable filter keeps an RGBA f32
/// intermediate of `src.0 x dst.1` alongside the output buffer.
pub fn resize_footprint(src: (u32, u32), dst: (u32, u32), bytes_per_pixel: u64) -> u64 {
    let output = (dst.0 as u64 * dst.1 as u64).saturating_mul(bytes_per_pixel);
    let intermediate = (src.0 as u64 * dst.1 as u64).saturating_mul(16);
    output.saturating_add(intermediate)
}

/// Where the watermark overlay is anchored on the base image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatermarkPosition {
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Manual,
    /// Any position name this build does not know. Placed at the origin.
    #[serde(other)]
    Unrecognized,
}

impl WatermarkPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatermarkPosition::Center => "center",
            WatermarkPosition::TopLeft => "top_left",
            WatermarkPosition::TopRight => "top_right",
            WatermarkPosition::BottomLeft => "bottom_left",
            WatermarkPosition::BottomRight => "bottom_right",
            WatermarkPosition::Manual => "manual",
            WatermarkPosition::Unrecognized => "unrecognized",
        }
    }
}

impl FromStr for WatermarkPosition {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let position = match s.trim().to_lowercase().replace('-', "_").as_str() {
            "center" => WatermarkPosition::Center,
            "top_left" => WatermarkPosition::TopLeft,
            "top_right" => WatermarkPosition::TopRight,
            "bottom_left" => WatermarkPosition::BottomLeft,
            "bottom_right" => WatermarkPosition::BottomRight,
            "manual" => WatermarkPosition::Manual,
            _ => WatermarkPosition::Unrecognized,
        };
        Ok(position)
    }
}

impl fmt::Display for WatermarkPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    #[serde(rename = "JPG", alias = "JPEG")]
    Jpg,
    #[serde(rename = "PNG")]
    Png,
    #[serde(rename = "WEBP")]
    Webp,
    #[serde(rename = "ICO")]
    Ico,
}

impl OutputFormat {
    /// Lowercase file extension used for exported files.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Webp => "webp",
            OutputFormat::Ico => "ico",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "JPG" | "JPEG" => Ok(OutputFormat::Jpg),
            "PNG" => Ok(OutputFormat::Png),
            "WEBP" => Ok(OutputFormat::Webp),
            "ICO" => Ok(OutputFormat::Ico),
            other => Err(StudioError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.extension().to_uppercase())
    }
}

/// Snapshot of everything the pipeline and the exporter need to know.
///
/// The pipeline only ever borrows it, so a run always sees one consistent
/// set of values even if the front end edits its own copy afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub watermark_enabled: bool,
    pub watermark_source_path: Option<PathBuf>,
    pub watermark_position: WatermarkPosition,
    pub watermark_manual_x: f64,
    pub watermark_manual_y: f64,
    pub watermark_opacity: f64,
    /// Fraction of the base image width the overlay should span.
    pub watermark_scale: f64,
    pub resize_enabled: bool,
    pub resize_scale_percent: f64,
    pub output_format: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            watermark_enabled: false,
            watermark_source_path: None,
            watermark_position: WatermarkPosition::Center,
            watermark_manual_x: 0.5,
            watermark_manual_y: 0.5,
            watermark_opacity: 0.8,
            watermark_scale: 0.3,
            resize_enabled: false,
            resize_scale_percent: 100.0,
            output_format: OutputFormat::Jpg,
        }
    }
}

impl Settings {
    /// True when the watermark stage will actually run.
    pub fn watermark_active(&self) -> bool {
        self.watermark_enabled && self.watermark_source_path.is_some()
    }

    /// Range checks for values coming from a user. The pipeline itself never
    /// calls this; it degrades to a no-op stage instead.
    pub fn validate(&self) -> Result<()> {
        if !(self.watermark_opacity > 0.0 && self.watermark_opacity <= 1.0) {
            return Err(StudioError::InvalidParameter(
                "Watermark opacity must be in (0, 1]".to_string(),
            ));
        }

        if !(self.watermark_scale > 0.0 && self.watermark_scale <= 1.0) {
            return Err(StudioError::InvalidParameter(
                "Watermark scale must be in (0, 1]".to_string(),
            ));
        }

        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !in_unit(self.watermark_manual_x) || !in_unit(self.watermark_manual_y) {
            return Err(StudioError::InvalidParameter(
                "Manual watermark coordinates must be in [0, 1]".to_string(),
            ));
        }

        if !self.resize_scale_percent.is_finite() || self.resize_scale_percent <= 0.0 {
            return Err(StudioError::InvalidParameter(
                "Resize percentage must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum StudioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Watermark error: {0}")]
    Watermark(String),

    #[error("Resize error: {0}")]
    Resize(String),

    #[error("Failed to export {}: {source}", path.display())]
    ExportFile {
        path: PathBuf,
        #[source]
        source: Box<StudioError>,
    },

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("History error: {0}")]
    History(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, StudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(!settings.watermark_enabled);
        assert!(!settings.resize_enabled);
        assert_eq!(settings.watermark_opacity, 0.8);
        assert_eq!(settings.watermark_scale, 0.3);
        assert_eq!(settings.resize_scale_percent, 100.0);
        assert_eq!(settings.watermark_position, WatermarkPosition::Center);
        assert_eq!(settings.output_format, OutputFormat::Jpg);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_watermark_active_requires_path() {
        let mut settings = Settings {
            watermark_enabled: true,
            ..Default::default()
        };
        assert!(!settings.watermark_active());

        settings.watermark_source_path = Some(PathBuf::from("logo.png"));
        assert!(settings.watermark_active());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let opacity = Settings {
            watermark_opacity: 0.0,
            ..Default::default()
        };
        assert!(opacity.validate().is_err());

        let manual = Settings {
            watermark_manual_x: 1.5,
            ..Default::default()
        };
        assert!(manual.validate().is_err());

        let resize = Settings {
            resize_scale_percent: f64::NAN,
            ..Default::default()
        };
        assert!(resize.validate().is_err());
    }

    #[test]
    fn test_resize_footprint() {
        assert_eq!(resize_footprint((10, 10), (20, 5), 3), 20 * 5 * 3 + 10 * 5 * 16);
        assert!(resize_footprint((800, 600), (40_000, 30_000), 3) > MAX_ALLOCATION_BYTES);
        assert!(resize_footprint((800, 600), (400, 300), 3) < MAX_ALLOCATION_BYTES);
        assert_eq!(resize_footprint((u32::MAX, 1), (u32::MAX, u32::MAX), 16), u64::MAX);
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("jpg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpg);
        assert_eq!("JPEG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpg);
        assert_eq!("WebP".parse::<OutputFormat>().unwrap(), OutputFormat::Webp);
        assert_eq!(OutputFormat::Ico.extension(), "ico");
        assert_eq!(OutputFormat::Png.to_string(), "PNG");
        assert!("tiff".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_unknown_position_is_not_an_error() {
        let pos: WatermarkPosition = "somewhere".parse().unwrap();
        assert_eq!(pos, WatermarkPosition::Unrecognized);

        let pos: WatermarkPosition = "bottom-right".parse().unwrap();
        assert_eq!(pos, WatermarkPosition::BottomRight);
    }

    #[test]
    fn test_settings_json_fills_defaults() {
        let json = r#"{
            "watermark_enabled": true,
            "watermark_source_path": "logo.png",
            "watermark_position": "diagonal",
            "output_format": "JPEG"
        }"#;

        let settings: Settings = serde_json::from_str(json).unwrap();
        assert!(settings.watermark_active());
        assert_eq!(settings.watermark_position, WatermarkPosition::Unrecognized);
        assert_eq!(settings.output_format, OutputFormat::Jpg);
        assert_eq!(settings.watermark_opacity, 0.8);
        assert_eq!(settings.resize_scale_percent, 100.0);
    }
}
