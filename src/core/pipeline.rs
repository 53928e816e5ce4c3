// photo-batch/src/core/pipeline.rs
use super::Settings;
use crate::processors::{Resizer, WatermarkParams, WatermarkStage};
use image::DynamicImage;

/// Runs the enabled stages in their fixed order: watermark, then resize.
///
/// Output format is not applied here. The same result feeds both the
/// on-screen preview and the exporter, which picks the encoding at save time.
pub struct PipelineRunner {
    watermark: WatermarkStage,
    resizer: Resizer,
}

impl PipelineRunner {
    pub fn new() -> Self {
        Self {
            watermark: WatermarkStage::new(),
            resizer: Resizer::new(),
        }
    }

    pub fn run(&self, image: &DynamicImage, settings: &Settings) -> DynamicImage {
        let mut current = image.clone();

        if settings.watermark_enabled {
            if let Some(overlay_path) = &settings.watermark_source_path {
                current = self.watermark.apply(&current, overlay_path, &watermark_params(settings));
            }
        }

        if settings.resize_enabled {
            current = self.resizer.resize(&current, settings.resize_scale_percent);
        }

        current
    }
}

impl Default for PipelineRunner {
    fn default() -> Self {
        Self::new()
    }
}

fn watermark_params(settings: &Settings) -> WatermarkParams {
    WatermarkParams {
        position: settings.watermark_position,
        manual_x: settings.watermark_manual_x,
        manual_y: settings.watermark_manual_y,
        opacity: settings.watermark_opacity,
        scale: settings.watermark_scale,
    }
}
