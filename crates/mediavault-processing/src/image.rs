//! Image metadata extraction and thumbnailing.

use anyhow::{Context, Result};
use exif::{In, Tag, Value};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::collections::BTreeMap;
use std::io::Cursor;

/// Logical thumbnail width target.
pub const THUMBNAIL_WIDTH: u32 = 320;
const JPEG_QUALITY: u8 = 85;

/// Decoded facts about a source image.
#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// Bits per pixel of the decoded color model.
    pub color_depth: u16,
    pub dpi_x: Option<i32>,
    pub dpi_y: Option<i32>,
    /// EXIF tag name -> display value, primary IFD only.
    pub exif: BTreeMap<String, String>,
}

/// A generated thumbnail ready for upload.
#[derive(Debug, Clone)]
pub struct ImageThumbnail {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub content_type: &'static str,
    pub extension: &'static str,
}

fn decode(data: &[u8]) -> Result<(DynamicImage, Option<ImageFormat>)> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .context("Failed to sniff image format")?;
    let format = reader.format();
    let img = reader.decode().context("Failed to decode image")?;
    Ok((img, format))
}

/// Extract dimensions, color depth, DPI, and the EXIF tag map.
pub fn extract_metadata(data: &[u8]) -> Result<ImageInfo> {
    let (img, _) = decode(data)?;
    let (width, height) = img.dimensions();
    let color_depth = img.color().bits_per_pixel();

    let mut info = ImageInfo {
        width,
        height,
        color_depth,
        dpi_x: None,
        dpi_y: None,
        exif: BTreeMap::new(),
    };

    // EXIF is optional; most PNGs and many JPEGs carry none.
    if let Ok(exif) = exif::Reader::new().read_from_container(&mut Cursor::new(data)) {
        for field in exif.fields().filter(|f| f.ifd_num == In::PRIMARY) {
            info.exif.insert(
                field.tag.to_string(),
                field.display_value().with_unit(&exif).to_string(),
            );
        }
        info.dpi_x = rational_field(&exif, Tag::XResolution);
        info.dpi_y = rational_field(&exif, Tag::YResolution);
    }

    Ok(info)
}

fn rational_field(exif: &exif::Exif, tag: Tag) -> Option<i32> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Rational(v) => v.first().map(|r| r.to_f64().round() as i32),
        _ => None,
    }
}

/// Generate a representative still: width 320 preserving aspect ratio for
/// wider sources, original size capped at 320x320 otherwise. Sources with
/// an alpha channel or palette encode to PNG to preserve transparency;
/// everything else flattens to RGB JPEG at quality 85.
pub fn generate_thumbnail(data: &[u8]) -> Result<ImageThumbnail> {
    let (img, format) = decode(data)?;
    let (src_w, src_h) = img.dimensions();

    let thumb = if src_w > THUMBNAIL_WIDTH {
        img.thumbnail(THUMBNAIL_WIDTH, u32::MAX)
    } else if src_h > THUMBNAIL_WIDTH {
        img.thumbnail(THUMBNAIL_WIDTH, THUMBNAIL_WIDTH)
    } else {
        img
    };
    let (width, height) = thumb.dimensions();

    let preserve_transparency =
        thumb.color().has_alpha() || matches!(format, Some(ImageFormat::Gif));

    let mut buffer = Vec::new();
    if preserve_transparency {
        thumb
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .context("Failed to encode PNG thumbnail")?;
        Ok(ImageThumbnail {
            data: buffer,
            width,
            height,
            content_type: "image/png",
            extension: "png",
        })
    } else {
        let rgb = thumb.to_rgb8();
        let mut encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
        encoder
            .encode_image(&rgb)
            .context("Failed to encode JPEG thumbnail")?;
        Ok(ImageThumbnail {
            data: buffer,
            width,
            height,
            content_type: "image/jpeg",
            extension: "jpg",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn png_bytes(img: DynamicImage) -> Vec<u8> {
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn test_alpha_source_yields_png() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            64,
            64,
            Rgba([255, 0, 0, 128]),
        ));
        let thumb = generate_thumbnail(&png_bytes(img)).unwrap();
        assert_eq!(thumb.content_type, "image/png");
        assert_eq!(thumb.extension, "png");
    }

    #[test]
    fn test_opaque_rgb_source_yields_jpeg() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 64, Rgb([0, 128, 255])));
        let thumb = generate_thumbnail(&png_bytes(img)).unwrap();
        assert_eq!(thumb.content_type, "image/jpeg");
        assert_eq!(thumb.extension, "jpg");
    }

    #[test]
    fn test_wide_source_scaled_to_width_320() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(1000, 500, Rgb([1, 2, 3])));
        let thumb = generate_thumbnail(&png_bytes(img)).unwrap();
        assert_eq!(thumb.width, 320);
        assert_eq!(thumb.height, 160);
    }

    #[test]
    fn test_small_source_keeps_original_size() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 80, Rgb([1, 2, 3])));
        let thumb = generate_thumbnail(&png_bytes(img)).unwrap();
        assert_eq!((thumb.width, thumb.height), (100, 80));
    }

    #[test]
    fn test_tall_narrow_source_capped() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 800, Rgb([1, 2, 3])));
        let thumb = generate_thumbnail(&png_bytes(img)).unwrap();
        assert!(thumb.height <= 320);
        assert!(thumb.width <= 320);
    }

    #[test]
    fn test_extract_metadata_dimensions_and_depth() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(12, 7, Rgba([0, 0, 0, 255])));
        let info = extract_metadata(&png_bytes(img)).unwrap();
        assert_eq!((info.width, info.height), (12, 7));
        assert_eq!(info.color_depth, 32);
        assert!(info.exif.is_empty());
    }

    #[test]
    fn test_extract_metadata_rejects_garbage() {
        assert!(extract_metadata(b"not an image").is_err());
    }
}
