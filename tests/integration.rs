#[cfg(test)]
mod tests {
    use assert_fs::prelude::*;
    use assert_fs::TempDir;
    use image::{GenericImageView, Rgb, RgbImage, Rgba, RgbaImage};
    use photo_batch::{
        HistoryStore, ImageProcessor, OutputFormat, Settings, WatermarkPosition,
        BATCH_EXPORT_OPERATION,
    };
    use std::fs;

    #[test]
    fn test_resize_export_end_to_end() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.child("holiday.jpg");
        RgbImage::from_pixel(800, 600, Rgb([90, 140, 200]))
            .save(input.path())
            .unwrap();

        let out_dir = temp_dir.child("export");
        let history_file = temp_dir.child("history.json");

        let settings = Settings {
            watermark_enabled: false,
            resize_enabled: true,
            resize_scale_percent: 50.0,
            output_format: OutputFormat::Png,
            ..Default::default()
        };

        let mut processor = ImageProcessor::new(history_file.path());
        let count = processor.export_all(&[input.path().to_path_buf()], out_dir.path(), settings);
        assert_eq!(count, 1);

        let exported = out_dir.child("Processed_holiday.png");
        assert!(exported.path().exists());

        let saved = image::open(exported.path()).unwrap();
        assert_eq!(saved.dimensions(), (400, 300));
        assert_eq!(
            image::ImageFormat::from_path(exported.path()).unwrap(),
            image::ImageFormat::Png
        );

        let history = HistoryStore::open(history_file.path());
        assert_eq!(history.len(), 1);
        assert_eq!(history.get_all()[0].count, 1);
        assert_eq!(history.get_all()[0].operation, BATCH_EXPORT_OPERATION);
    }

    #[test]
    fn test_corrupt_inputs_do_not_abort_batch() {
        let temp_dir = TempDir::new().unwrap();
        let good = temp_dir.child("good.png");
        RgbImage::new(64, 64).save(good.path()).unwrap();

        let corrupt = temp_dir.child("corrupt.jpg");
        corrupt.write_binary(b"\xff\xd8 truncated").unwrap();

        let empty = temp_dir.child("empty.png");
        empty.touch().unwrap();

        let missing = temp_dir.child("missing.webp");

        let out_dir = temp_dir.child("out");
        let mut processor = ImageProcessor::new(temp_dir.child("history.json").path());

        let paths = vec![
            corrupt.path().to_path_buf(),
            good.path().to_path_buf(),
            empty.path().to_path_buf(),
            missing.path().to_path_buf(),
        ];
        let count = processor.export_all(&paths, out_dir.path(), Settings::default());

        assert_eq!(count, 1);
        assert!(out_dir.child("Processed_good.jpg").path().exists());
        assert_eq!(processor.history().len(), 1);
        assert_eq!(processor.history().get_all()[0].count, 1);
    }

    #[test]
    fn test_watermarked_jpeg_export() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.child("street.png");
        RgbaImage::from_pixel(400, 200, Rgba([0, 0, 0, 255]))
            .save(input.path())
            .unwrap();

        let logo = temp_dir.child("logo.png");
        RgbaImage::from_pixel(20, 10, Rgba([255, 255, 255, 255]))
            .save(logo.path())
            .unwrap();

        let settings = Settings {
            watermark_enabled: true,
            watermark_source_path: Some(logo.path().to_path_buf()),
            watermark_position: WatermarkPosition::BottomRight,
            watermark_opacity: 1.0,
            watermark_scale: 0.25,
            output_format: OutputFormat::Jpg,
            ..Default::default()
        };

        let out_dir = temp_dir.child("out");
        let mut processor = ImageProcessor::new(temp_dir.child("history.json").path());
        assert_eq!(processor.export_all(&[input.path().to_path_buf()], out_dir.path(), settings), 1);

        let saved = image::open(out_dir.child("Processed_street.jpg").path()).unwrap();
        assert!(!saved.color().has_alpha());
        assert_eq!(saved.dimensions(), (400, 200));

        // 100x50 logo, 20 px from the right and bottom edges
        let rgb = saved.to_rgb8();
        assert!(rgb.get_pixel(330, 155)[0] > 200);
        assert!(rgb.get_pixel(50, 50)[0] < 30);
    }

    #[test]
    fn test_history_survives_restart() {
        let temp_dir = TempDir::new().unwrap();
        let history_file = temp_dir.child("history.json");
        let out_dir = temp_dir.child("out");

        {
            let mut processor = ImageProcessor::new(history_file.path());
            processor.export_all(&[], out_dir.path(), Settings::default());
            processor.export_all(&[], out_dir.path(), Settings::default());
        }

        let processor = ImageProcessor::new(history_file.path());
        assert_eq!(processor.history().len(), 2);

        history_file.write_str("[{\"broken\": ").unwrap();
        let processor = ImageProcessor::new(history_file.path());
        assert!(processor.history().is_empty());
    }

    #[test]
    fn test_preview_does_not_touch_source() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.child("big.png");
        RgbImage::new(1600, 1200).save(input.path()).unwrap();
        let before = fs::read(input.path()).unwrap();

        let processor = ImageProcessor::new(temp_dir.child("history.json").path());
        let image = processor.load_image(input.path()).unwrap();

        let settings = Settings {
            resize_enabled: true,
            resize_scale_percent: 75.0,
            ..Default::default()
        };

        let processed = processor.run_pipeline(&image, &settings);
        let preview = processor.preview(&processed).unwrap();

        assert_eq!(processed.dimensions(), (1200, 900));
        assert_eq!(preview.dimensions(), (800, 600));
        assert_eq!(image.dimensions(), (1600, 1200));
        assert_eq!(fs::read(input.path()).unwrap(), before);
    }
}
