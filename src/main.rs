use anyhow::{bail, Context};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use photo_batch::cli::{Cli, Commands, PipelineArgs};
use photo_batch::{collect_image_paths, format_file_size, Compressor, FileOutcome, ImageProcessor, DEFAULT_QUALITY};
use std::path::{Path, PathBuf};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    match cli.command {
        Commands::Export {
            inputs,
            output,
            recursive,
            optimize_png,
            pipeline,
        } => {
            process_export(&cli.history, inputs, output, recursive, optimize_png, &pipeline)?;
        }
        Commands::Preview {
            input,
            output,
            width,
            height,
            pipeline,
        } => {
            process_preview(&cli.history, input, output, (width, height), &pipeline)?;
        }
        Commands::History => {
            process_history(&cli.history);
        }
    }

    Ok(())
}

fn process_export(
    history: &Path,
    inputs: Vec<PathBuf>,
    output: PathBuf,
    recursive: bool,
    optimize_png: bool,
    pipeline: &PipelineArgs,
) -> anyhow::Result<()> {
    let settings = pipeline.to_settings().context("Invalid pipeline settings")?;

    let paths = collect_image_paths(&inputs, recursive);
    if paths.is_empty() {
        bail!("No input images found");
    }

    let mut processor = ImageProcessor::new(history)
        .with_compressor(Compressor::new(DEFAULT_QUALITY).with_png_optimization(optimize_png));

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("#>-"),
    );

    let mut bytes_written = 0;
    let report = processor.export_report(&paths, &output, settings, |outcome| {
        if let FileOutcome::Exported { output, .. } = outcome {
            bytes_written += std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);
        }
        pb.inc(1);
    });

    pb.finish_with_message(format!("{} written", format_file_size(bytes_written)));

    for skipped in report.skipped() {
        if let FileOutcome::Skipped { input, reason } = skipped {
            eprintln!("Skipped {}: {}", input.display(), reason);
        }
    }

    for output in &report.overwritten {
        eprintln!("Overwritten within this batch: {}", output.display());
    }

    println!(
        "Exported {} of {} images to: {}",
        report.exported,
        paths.len(),
        output.display()
    );

    Ok(())
}

fn process_preview(
    history: &Path,
    input: PathBuf,
    output: PathBuf,
    box_size: (u32, u32),
    pipeline: &PipelineArgs,
) -> anyhow::Result<()> {
    let settings = pipeline.to_settings().context("Invalid pipeline settings")?;
    let processor = ImageProcessor::new(history);

    let Some(image) = processor.load_image(&input) else {
        bail!("Could not open image: {}", input.display());
    };

    let processed = processor.run_pipeline(&image, &settings);
    let Some(preview) = processor.preview_within(&processed, box_size) else {
        bail!("Could not render a {}x{} preview", box_size.0, box_size.1);
    };

    preview
        .save(&output)
        .with_context(|| format!("Failed to write preview to {}", output.display()))?;

    println!(
        "Preview ({}x{}) saved to: {}",
        preview.width(),
        preview.height(),
        output.display()
    );

    Ok(())
}

fn process_history(history: &Path) {
    let processor = ImageProcessor::new(history);
    let entries = processor.history().get_all();

    if entries.is_empty() {
        println!("No history yet");
        return;
    }

    println!("=== Export History ===");
    for entry in entries {
        println!(
            "{}  {:<14} {:>5} files  {}",
            entry.timestamp,
            entry.operation,
            entry.count,
            entry.location.display()
        );
    }
}
