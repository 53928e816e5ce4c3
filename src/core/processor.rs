// photo-batch/src/core/processor.rs
use super::pipeline::PipelineRunner;
use super::Settings;
use crate::history::HistoryStore;
use crate::processors::{BatchExporter, Compressor, ExportReport, FileOutcome, Loader};
use image::DynamicImage;
use std::path::{Path, PathBuf};

/// Everything a front end needs: loading, previews, the pipeline, batch
/// export and the export history.
pub struct ImageProcessor {
    loader: Loader,
    pipeline: PipelineRunner,
    exporter: BatchExporter,
    history: HistoryStore,
}

impl ImageProcessor {
    pub fn new<P: AsRef<Path>>(history_path: P) -> Self {
        Self {
            loader: Loader::new(),
            pipeline: PipelineRunner::new(),
            exporter: BatchExporter::new(),
            history: HistoryStore::open(history_path),
        }
    }

    pub fn with_compressor(mut self, compressor: Compressor) -> Self {
        self.exporter = self.exporter.with_compressor(compressor);
        self
    }

    /// `None` when the file cannot be decoded.
    pub fn load_image(&self, path: &Path) -> Option<DynamicImage> {
        self.loader.try_load(path)
    }

    pub fn thumbnail(&self, image: &DynamicImage) -> Option<DynamicImage> {
        self.loader.thumbnail(image)
    }

    pub fn preview(&self, image: &DynamicImage) -> Option<DynamicImage> {
        self.loader.preview(image)
    }

    pub fn preview_within(&self, image: &DynamicImage, box_size: (u32, u32)) -> Option<DynamicImage> {
        self.loader.preview_within(image, box_size)
    }

    pub fn run_pipeline(&self, image: &DynamicImage, settings: &Settings) -> DynamicImage {
        self.pipeline.run(image, settings)
    }

    /// Exports every path and returns how many were written.
    pub fn export_all(&mut self, paths: &[PathBuf], output_dir: &Path, settings: Settings) -> usize {
        self.export_report(paths, output_dir, settings, |_| {}).exported
    }

    pub fn export_report<F>(
        &mut self,
        paths: &[PathBuf],
        output_dir: &Path,
        settings: Settings,
        on_file: F,
    ) -> ExportReport
    where
        F: FnMut(&FileOutcome),
    {
        self.exporter
            .export_all_with_progress(paths, output_dir, settings, &mut self.history, on_file)
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }
}
