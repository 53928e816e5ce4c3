// photo-batch/src/processors/mod.rs
mod batch;
mod compressor;
mod loader;
mod resizer;
mod watermark;

pub use batch::{BatchExporter, ExportReport, FileOutcome, BATCH_EXPORT_OPERATION};
pub use compressor::{prepare_for_format, Compressor, DEFAULT_QUALITY};
pub use loader::{ImageSource, Loader, PREVIEW_SIZE, THUMBNAIL_SIZE};
pub use resizer::{calculate_dimensions, Resizer};
pub use watermark::{apply_opacity, overlay_origin, overlay_size, WatermarkParams, WatermarkStage};

pub mod prelude {
    pub use super::{BatchExporter, Compressor, ImageSource, Loader, Resizer, WatermarkStage};
}
