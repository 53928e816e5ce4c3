// photo-batch/src/processors/batch.rs
use crate::core::pipeline::PipelineRunner;
use crate::core::{Result, Settings, StudioError};
use crate::history::HistoryStore;
use crate::processors::{Compressor, ImageSource, Loader};
use crate::utils::output_path;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Operation name recorded in the history log for every batch.
pub const BATCH_EXPORT_OPERATION: &str = "Batch Export";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Exported { input: PathBuf, output: PathBuf },
    Skipped { input: PathBuf, reason: String },
}

impl FileOutcome {
    pub fn input(&self) -> &Path {
        match self {
            FileOutcome::Exported { input, .. } | FileOutcome::Skipped { input, .. } => input,
        }
    }

    pub fn is_exported(&self) -> bool {
        matches!(self, FileOutcome::Exported { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub exported: usize,
    pub outcomes: Vec<FileOutcome>,
    /// Output files written more than once in this batch. Only the last
    /// write survives on disk.
    pub overwritten: Vec<PathBuf>,
}

impl ExportReport {
    pub fn skipped(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| !o.is_exported())
    }

    fn record(mut self, outcome: FileOutcome) -> Self {
        if outcome.is_exported() {
            self.exported += 1;
        }
        self.outcomes.push(outcome);
        self
    }
}

/// Runs the pipeline over a list of files and saves each result.
///
/// Files are handled one at a time, in order. A file that fails to load,
/// transform or save is skipped and the batch moves on; exactly one history
/// entry is appended when the batch finishes.
pub struct BatchExporter<S: ImageSource = Loader> {
    source: S,
    pipeline: PipelineRunner,
    compressor: Compressor,
}

impl BatchExporter<Loader> {
    pub fn new() -> Self {
        Self::with_source(Loader::new())
    }
}

impl Default for BatchExporter<Loader> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ImageSource> BatchExporter<S> {
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            pipeline: PipelineRunner::new(),
            compressor: Compressor::default(),
        }
    }

    pub fn with_compressor(mut self, compressor: Compressor) -> Self {
        self.compressor = compressor;
        self
    }

    pub fn export_all(
        &self,
        paths: &[PathBuf],
        output_dir: &Path,
        settings: Settings,
        history: &mut HistoryStore,
    ) -> ExportReport {
        self.export_all_with_progress(paths, output_dir, settings, history, |_| {})
    }

    /// Like [`BatchExporter::export_all`], calling `on_file` after each file.
    pub fn export_all_with_progress<F>(
        &self,
        paths: &[PathBuf],
        output_dir: &Path,
        settings: Settings,
        history: &mut HistoryStore,
        mut on_file: F,
    ) -> ExportReport
    where
        F: FnMut(&FileOutcome),
    {
        log::info!(
            "Exporting {} images to {} as {}",
            paths.len(),
            output_dir.display(),
            settings.output_format
        );

        if let Err(e) = std::fs::create_dir_all(output_dir) {
            log::warn!("Cannot create output directory {}: {}", output_dir.display(), e);
        }

        let initial = (ExportReport::default(), HashSet::new());
        let (report, _) = paths.iter().fold(initial, |(mut report, mut written), input| {
            let outcome = match self.export_one(input, output_dir, &settings) {
                Ok(output) => {
                    log::info!("Exported {} -> {}", input.display(), output.display());
                    if !written.insert(output.clone()) {
                        log::warn!(
                            "{} overwrote an earlier export from this batch: {}",
                            input.display(),
                            output.display()
                        );
                        report.overwritten.push(output.clone());
                    }
                    FileOutcome::Exported {
                        input: input.clone(),
                        output,
                    }
                }
                Err(e) => {
                    log::warn!("{}", e);
                    FileOutcome::Skipped {
                        input: input.clone(),
                        reason: e.to_string(),
                    }
                }
            };

            on_file(&outcome);
            (report.record(outcome), written)
        });

        log::info!(
            "Batch complete: {} of {} images exported",
            report.exported,
            paths.len()
        );

        if let Err(e) = history.add_entry(BATCH_EXPORT_OPERATION, report.exported, output_dir) {
            log::error!("Failed to write history to {}: {}", history.path().display(), e);
        }

        report
    }

    fn export_one(&self, input: &Path, output_dir: &Path, settings: &Settings) -> Result<PathBuf> {
        let wrap = |source: StudioError| StudioError::ExportFile {
            path: input.to_path_buf(),
            source: Box::new(source),
        };

        let image = self.source.load(input).map_err(wrap)?;
        let processed = self.pipeline.run(&image, settings);

        let output = output_path(input, output_dir, settings.output_format).map_err(wrap)?;
        self.compressor
            .save_with_format(&processed, &output, settings.output_format)
            .map_err(wrap)?;

        Ok(output)
    }
}
