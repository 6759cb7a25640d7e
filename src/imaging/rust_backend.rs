//! Pure Rust optimizer backend built on the `image` crate.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (BMP, GIF, JPEG, PNG, WebP) | `image` crate (pure Rust decoders) |
//! | Orientation | EXIF orientation read by the decoder, applied as a pixel transform |
//! | Encode → JPEG | `JpegEncoder::new_with_quality` |
//! | Encode → PNG | `PngEncoder` with best compression + adaptive filtering |
//! | Encode → WebP | `WebPEncoder::new_lossless` (the only WebP encoder in `image`) |
//! | Encode → GIF / BMP | `GifEncoder` / `BmpEncoder` |
//!
//! Output never carries orientation metadata: pixels are rotated instead, so
//! the result renders upright everywhere. Alpha is dropped, which is lossy.

use super::backend::{BackendError, ImageOptimizer};
use super::params::OptimizeParams;
use image::codecs::bmp::BmpEncoder;
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{ColorType, DynamicImage, ExtendedColorType, ImageDecoder, ImageReader};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Raster extensions the optimizer re-encodes. Everything else is copied.
const RASTER_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Whether `path` has a raster extension the optimizer handles.
pub fn is_raster_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| RASTER_EXTENSIONS.iter().any(|r| e.eq_ignore_ascii_case(r)))
}

/// Pure Rust optimizer using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustOptimizer;

impl RustOptimizer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

fn processing(path: &Path, what: &str, e: impl std::fmt::Display) -> BackendError {
    BackendError::ProcessingFailed(format!("{what} {}: {e}", path.display()))
}

/// Load an image and apply its embedded orientation to the pixels.
fn load_upright(path: &Path) -> Result<DynamicImage, BackendError> {
    let reader = ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?;
    let mut decoder = reader
        .into_decoder()
        .map_err(|e| processing(path, "Failed to open decoder for", e))?;
    let orientation = decoder
        .orientation()
        .map_err(|e| processing(path, "Failed to read orientation of", e))?;
    let mut img = DynamicImage::from_decoder(decoder)
        .map_err(|e| processing(path, "Failed to decode", e))?;
    img.apply_orientation(orientation);
    Ok(img)
}

/// Flatten alpha and palettes into plain RGB; keep 8-bit gray and RGB as is.
fn normalize_color(img: DynamicImage) -> DynamicImage {
    match img.color() {
        ColorType::L8 | ColorType::Rgb8 => img,
        ColorType::L16 => DynamicImage::ImageLuma8(img.to_luma8()),
        _ => DynamicImage::ImageRgb8(img.to_rgb8()),
    }
}

/// Encode `img` to `path`, picking the encoder from the extension.
fn save_image(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if !RASTER_EXTENSIONS.contains(&ext.as_str()) {
        return Err(BackendError::ProcessingFailed(format!(
            "Unsupported output format: {}",
            ext
        )));
    }

    let file = std::fs::File::create(path).map_err(BackendError::Io)?;
    let mut writer = BufWriter::new(file);
    let encoded = match ext.as_str() {
        "jpg" | "jpeg" => {
            img.write_with_encoder(JpegEncoder::new_with_quality(&mut writer, quality as u8))
        }
        "png" => img.write_with_encoder(PngEncoder::new_with_quality(
            &mut writer,
            CompressionType::Best,
            PngFilter::Adaptive,
        )),
        "webp" => img.write_with_encoder(WebPEncoder::new_lossless(&mut writer)),
        "bmp" => img.write_with_encoder(BmpEncoder::new(&mut writer)),
        "gif" => {
            let rgb = img.to_rgb8();
            // Speed 1..=30 trades palette quality for time; map quality onto it.
            let speed = (31 - (quality.clamp(1, 100) * 30 / 100) as i32).clamp(1, 30);
            GifEncoder::new_with_speed(&mut writer, speed).encode(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                ExtendedColorType::Rgb8,
            )
        }
        _ => unreachable!("extension checked against RASTER_EXTENSIONS"),
    };
    encoded.map_err(|e| processing(path, "Failed to encode", e))?;
    writer.flush().map_err(BackendError::Io)
}

impl ImageOptimizer for RustOptimizer {
    fn optimize(&self, params: &OptimizeParams) -> Result<(), BackendError> {
        let img = normalize_color(load_upright(&params.source)?);
        save_image(&img, &params.output, params.quality.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Quality;
    use image::{ImageEncoder, RgbImage, RgbaImage};

    /// Create a small valid JPEG file with the given dimensions.
    fn create_test_jpeg(path: &Path, width: u32, height: u32) {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let file = std::fs::File::create(path).unwrap();
        let writer = BufWriter::new(file);
        JpegEncoder::new(writer)
            .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
            .unwrap();
    }

    /// Create a small RGBA PNG.
    fn create_test_png_rgba(path: &Path, width: u32, height: u32) {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([(x % 256) as u8, (y % 256) as u8, 64, 128])
        });
        img.save(path).unwrap();
    }

    fn params(source: &Path, output: &Path) -> OptimizeParams {
        OptimizeParams {
            source: source.to_path_buf(),
            output: output.to_path_buf(),
            quality: Quality::new(85),
        }
    }

    #[test]
    fn raster_extensions_are_recognized() {
        for name in ["a.png", "a.JPG", "a.jpeg", "a.gif", "a.bmp", "a.webp"] {
            assert!(is_raster_extension(Path::new(name)), "{name}");
        }
        for name in ["a.svg", "a.mp4", "a.pdf", "noext"] {
            assert!(!is_raster_extension(Path::new(name)), "{name}");
        }
    }

    #[test]
    fn optimize_jpeg_keeps_dimensions() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        let output = tmp.path().join("out.jpg");
        create_test_jpeg(&source, 64, 48);

        RustOptimizer::new()
            .optimize(&params(&source, &output))
            .unwrap();

        let (w, h) = image::image_dimensions(&output).unwrap();
        assert_eq!((w, h), (64, 48));
    }

    #[test]
    fn optimize_png_drops_alpha() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.png");
        let output = tmp.path().join("out.png");
        create_test_png_rgba(&source, 20, 10);

        RustOptimizer::new()
            .optimize(&params(&source, &output))
            .unwrap();

        let decoded = image::open(&output).unwrap();
        assert_eq!(decoded.color(), ColorType::Rgb8);
        assert_eq!((decoded.width(), decoded.height()), (20, 10));
    }

    #[test]
    fn optimize_gif_and_bmp_and_webp() {
        let tmp = tempfile::TempDir::new().unwrap();
        for ext in ["gif", "bmp", "webp"] {
            let source = tmp.path().join(format!("source.{ext}"));
            let output = tmp.path().join(format!("out.{ext}"));
            create_test_png_rgba(&tmp.path().join("seed.png"), 8, 8);
            image::open(tmp.path().join("seed.png"))
                .unwrap()
                .save(&source)
                .unwrap();

            RustOptimizer::new()
                .optimize(&params(&source, &output))
                .unwrap();
            assert!(output.exists(), "{ext}");
            assert_eq!(image::image_dimensions(&output).unwrap(), (8, 8), "{ext}");
        }
    }

    #[test]
    fn optimize_corrupt_file_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("broken.png");
        std::fs::write(&source, b"definitely not a png").unwrap();

        let result = RustOptimizer::new().optimize(&params(&source, &tmp.path().join("o.png")));
        assert!(result.is_err());
    }

    #[test]
    fn optimize_nonexistent_file_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let result = RustOptimizer::new().optimize(&params(
            Path::new("/nonexistent/image.jpg"),
            &tmp.path().join("o.jpg"),
        ));
        assert!(matches!(result, Err(BackendError::Io(_))));
    }

    #[test]
    fn optimize_unsupported_output_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 16, 16);

        let result =
            RustOptimizer::new().optimize(&params(&source, &tmp.path().join("out.tiff")));
        assert!(result.is_err());
    }
}
