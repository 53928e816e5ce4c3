// photo-batch/src/utils/mod.rs
use crate::core::{OutputFormat, Result, StudioError};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const OUTPUT_PREFIX: &str = "Processed_";

const SUPPORTED_EXTENSIONS: [&str; 9] = [
    "jpg", "jpeg", "png", "webp", "gif", "bmp", "tiff", "tif", "ico",
];

/// `Processed_<stem>.<ext>` for `input` exported as `format`.
pub fn output_file_name(input_path: &Path, format: OutputFormat) -> Result<String> {
    let stem = input_path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            StudioError::InvalidParameter(format!("Invalid file name: {}", input_path.display()))
        })?;

    Ok(format!("{}{}.{}", OUTPUT_PREFIX, stem, format.extension()))
}

pub fn output_path(input_path: &Path, output_dir: &Path, format: OutputFormat) -> Result<PathBuf> {
    Ok(output_dir.join(output_file_name(input_path, format)?))
}

pub fn is_supported_format(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Expands `inputs` into a flat file list, keeping the given order. Files
/// are taken as-is; directories contribute their supported images, sorted
/// by name.
pub fn collect_image_paths(inputs: &[PathBuf], recursive: bool) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    for input in inputs {
        if !input.is_dir() {
            if !paths.contains(input) {
                paths.push(input.clone());
            }
            continue;
        }

        let walker = if recursive {
            WalkDir::new(input)
        } else {
            WalkDir::new(input).max_depth(1)
        };

        let found = walker
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| is_supported_format(entry.path()))
            .map(|entry| entry.into_path());

        for path in found {
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }

    paths
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let exponent = ((bytes as f64).log(1024.0).floor() as usize).min(UNITS.len() - 1);
    let size = bytes as f64 / 1024_f64.powi(exponent as i32);

    format!("{:.2} {}", size, UNITS[exponent])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_name() {
        let name = output_file_name(Path::new("/photos/beach.day.JPG"), OutputFormat::Png).unwrap();
        assert_eq!(name, "Processed_beach.day.png");

        let name = output_file_name(Path::new("scan"), OutputFormat::Webp).unwrap();
        assert_eq!(name, "Processed_scan.webp");

        assert!(output_file_name(Path::new("/"), OutputFormat::Jpg).is_err());
    }

    #[test]
    fn test_output_path() {
        let path = output_path(Path::new("in/cat.png"), Path::new("out"), OutputFormat::Ico).unwrap();
        assert_eq!(path, PathBuf::from("out/Processed_cat.ico"));
    }

    #[test]
    fn test_is_supported_format() {
        assert!(is_supported_format(Path::new("a.JPEG")));
        assert!(is_supported_format(Path::new("a.webp")));
        assert!(!is_supported_format(Path::new("notes.txt")));
        assert!(!is_supported_format(Path::new("README")));
    }

    #[test]
    fn test_collect_image_paths() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        for name in ["b.png", "a.jpg", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::write(nested.join("c.webp"), b"x").unwrap();

        let flat = collect_image_paths(&[dir.path().to_path_buf()], false);
        assert_eq!(flat, vec![dir.path().join("a.jpg"), dir.path().join("b.png")]);

        let deep = collect_image_paths(&[dir.path().to_path_buf()], true);
        assert_eq!(deep.len(), 3);

        // explicit files are kept even with odd extensions, duplicates dropped
        let explicit = vec![dir.path().join("notes.txt"), dir.path().join("a.jpg")];
        let mixed = collect_image_paths(&[explicit[0].clone(), explicit[1].clone(), dir.path().to_path_buf()], false);
        assert_eq!(mixed, vec![explicit[0].clone(), explicit[1].clone(), dir.path().join("b.png")]);
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512.00 B");
        assert_eq!(format_file_size(1536), "1.50 KB");
    }
}
