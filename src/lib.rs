pub mod cli;
mod core;
mod history;
mod processors;
mod utils;

pub use crate::core::pipeline::PipelineRunner;
pub use crate::core::processor::ImageProcessor;
pub use crate::core::{
    resize_footprint, OutputFormat, Result, Settings, StudioError, WatermarkPosition,
    MAX_ALLOCATION_BYTES, MAX_DIMENSION,
};
pub use crate::history::{HistoryEntry, HistoryStore, DEFAULT_HISTORY_FILE, TIMESTAMP_FORMAT};
pub use crate::processors::{
    apply_opacity, calculate_dimensions, overlay_origin, overlay_size, prepare_for_format,
    BatchExporter, Compressor, ExportReport, FileOutcome, ImageSource, Loader, Resizer,
    WatermarkParams, WatermarkStage, BATCH_EXPORT_OPERATION, DEFAULT_QUALITY, PREVIEW_SIZE,
    THUMBNAIL_SIZE,
};
pub use crate::utils::{collect_image_paths, format_file_size, is_supported_format, output_file_name, output_path};

pub mod prelude {
    pub use crate::{
        BatchExporter, HistoryStore, ImageProcessor, ImageSource, Loader, PipelineRunner, Settings,
    };
}

// Re-export commonly used types
pub use image::DynamicImage;
