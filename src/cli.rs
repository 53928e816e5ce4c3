// photo-batch/src/cli.rs
use crate::core::{OutputFormat, Result, Settings, WatermarkPosition};
use crate::history::DEFAULT_HISTORY_FILE;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "photo-batch", version, about = "Watermark, resize and convert photos in bulk")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// History log file
    #[arg(long, global = true, default_value = DEFAULT_HISTORY_FILE)]
    pub history: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the pipeline over every input and save the results
    Export {
        /// Image files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Descend into subdirectories of directory inputs
        #[arg(short, long)]
        recursive: bool,

        /// Losslessly recompress PNG output
        #[arg(long)]
        optimize_png: bool,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Render the pipeline result for one image at preview size
    Preview {
        input: PathBuf,

        /// Where to write the preview (format from extension)
        #[arg(short, long)]
        output: PathBuf,

        /// Preview box width
        #[arg(long, default_value_t = 800)]
        width: u32,

        /// Preview box height
        #[arg(long, default_value_t = 600)]
        height: u32,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Show past export batches, newest first
    History,
}

/// Pipeline flags shared by `export` and `preview`. Anything given here
/// overrides the value from `--settings`.
#[derive(Args, Debug, Default, Clone)]
pub struct PipelineArgs {
    /// JSON settings file to start from
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Watermark image (enables the watermark stage)
    #[arg(long)]
    pub watermark: Option<PathBuf>,

    /// center, top_left, top_right, bottom_left, bottom_right or manual
    #[arg(long)]
    pub position: Option<String>,

    /// Manual anchor x in [0, 1]
    #[arg(long)]
    pub x: Option<f64>,

    /// Manual anchor y in [0, 1]
    #[arg(long)]
    pub y: Option<f64>,

    #[arg(long)]
    pub opacity: Option<f64>,

    /// Watermark width as a fraction of the image width
    #[arg(long)]
    pub watermark_scale: Option<f64>,

    /// Resize percentage (enables the resize stage)
    #[arg(long)]
    pub resize: Option<f64>,

    /// JPG, PNG, WEBP or ICO
    #[arg(short, long)]
    pub format: Option<String>,
}

impl PipelineArgs {
    pub fn to_settings(&self) -> Result<Settings> {
        let base = match &self.settings {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                serde_json::from_str(&content)?
            }
            None => Settings::default(),
        };

        self.apply(base)
    }

    pub fn apply(&self, mut settings: Settings) -> Result<Settings> {
        if let Some(path) = &self.watermark {
            settings.watermark_enabled = true;
            settings.watermark_source_path = Some(path.clone());
        }

        if let Some(position) = &self.position {
            settings.watermark_position = position.parse::<WatermarkPosition>().unwrap_or(WatermarkPosition::Unrecognized);
        }

        if let Some(x) = self.x {
            settings.watermark_manual_x = x;
        }

        if let Some(y) = self.y {
            settings.watermark_manual_y = y;
        }

        if let Some(opacity) = self.opacity {
            settings.watermark_opacity = opacity;
        }

        if let Some(scale) = self.watermark_scale {
            settings.watermark_scale = scale;
        }

        if let Some(percent) = self.resize {
            settings.resize_enabled = true;
            settings.resize_scale_percent = percent;
        }

        if let Some(format) = &self.format {
            settings.output_format = format.parse::<OutputFormat>()?;
        }

        settings.validate()?;
        Ok(settings)
    }
}
