use super::CompressError;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, ImageFormat};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Width/height after clamping the width to `max_width`, preserving aspect
/// ratio. Narrower images keep their size.
pub fn target_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width || width == 0 {
        return (width, height);
    }

    let scaled = (u64::from(height) * u64::from(max_width) + u64::from(width) / 2) / u64::from(width);
    (max_width, (scaled as u32).max(1))
}

/// Decode `input` as `format`, shrink it to `max_width` with Lanczos3 and
/// write it to `output` as a baseline JPEG at the encoder's default quality.
pub fn compress_image(
    input: &Path,
    format: ImageFormat,
    output: &Path,
    max_width: u32,
) -> Result<(), CompressError> {
    let reader = BufReader::new(File::open(input)?);
    let img = image::load(reader, format)?;

    let (width, height) = target_dimensions(img.width(), img.height(), max_width);
    let resized = if (width, height) == (img.width(), img.height()) {
        img
    } else {
        img.resize_exact(width, height, FilterType::Lanczos3)
    };

    // JPEG has no alpha channel
    let rgb = resized.to_rgb8();

    let mut writer = BufWriter::new(File::create(output)?);
    {
        let mut encoder = JpegEncoder::new(&mut writer);
        encoder.encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn write_fixture(path: &Path, width: u32, height: u32, format: ImageOutputFormat) {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 128, 200])
        });
        let img = match format {
            ImageOutputFormat::Png => DynamicImage::ImageRgba8(img),
            _ => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(img).to_rgb8()),
        };
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
        std::fs::write(path, buf).unwrap();
    }

    #[test]
    fn test_target_dimensions() {
        assert_eq!(target_dimensions(1600, 1200, 800), (800, 600));
        assert_eq!(target_dimensions(1000, 333, 800), (800, 266));
        assert_eq!(target_dimensions(1001, 3, 800), (800, 2));
        assert_eq!(target_dimensions(4000, 1, 800), (800, 1));
        assert_eq!(target_dimensions(640, 480, 800), (640, 480));
        assert_eq!(target_dimensions(800, 10, 800), (800, 10));
    }

    #[test]
    fn test_wide_png_becomes_800px_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.jpg");
        write_fixture(&input, 1200, 900, ImageOutputFormat::Png);

        compress_image(&input, ImageFormat::Png, &output, 800).unwrap();

        let bytes = std::fs::read(&output).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
        let out = image::load_from_memory(&bytes).unwrap();
        assert_eq!((out.width(), out.height()), (800, 600));
    }

    #[test]
    fn test_small_jpeg_is_not_upscaled() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.jpg");
        let output = dir.path().join("out.jpg");
        write_fixture(&input, 320, 200, ImageOutputFormat::Jpeg(95));

        compress_image(&input, ImageFormat::Jpeg, &output, 800).unwrap();

        let out = image::open(&output).unwrap();
        assert_eq!((out.width(), out.height()), (320, 200));
    }

    #[test]
    fn test_wrong_decoder_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.jpg");
        write_fixture(&input, 16, 16, ImageOutputFormat::Png);

        let err = compress_image(&input, ImageFormat::Jpeg, &dir.path().join("o.jpg"), 800)
            .unwrap_err();
        assert!(matches!(err, CompressError::Image(_)));
    }

    #[test]
    fn test_missing_input_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = compress_image(
            &dir.path().join("nope.png"),
            ImageFormat::Png,
            &dir.path().join("o.jpg"),
            800,
        )
        .unwrap_err();
        assert!(matches!(err, CompressError::Io(_)));
    }
}
