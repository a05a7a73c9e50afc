//! Turns whatever the camera or phone uploads into a plain RGB JPEG.
//!
//! Uploads arrive as base64 (optionally as a data URL). They can be PNG with
//! alpha, palette images, WebP, or phone photos that carry an EXIF rotation or
//! use HEIC. The face collection and the gallery only ever see the normalized
//! JPEG produced here.

use super::ImageError;
use crate::utils::content_hash;
use app_state::ImageSettings;
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions {
    pub max_dimension: u32,
    pub jpeg_quality: u8,
}

impl From<&ImageSettings> for NormalizeOptions {
    fn from(settings: &ImageSettings) -> Self {
        Self {
            max_dimension: settings.max_dimension,
            jpeg_quality: settings.jpeg_quality,
        }
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            max_dimension: 1920,
            jpeg_quality: 90,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Mime type of the upload before conversion.
    pub source_format: String,
    /// SHA-256 of `jpeg`, used to recognise repeated uploads. The stored photo
    /// hashes to the same value, so the hash can be recomputed from storage.
    pub content_hash: String,
}

/// Decode a base64 payload, accepting an optional `data:<mime>;base64,` prefix.
pub fn decode_base64_image(input: &str) -> Result<Vec<u8>, ImageError> {
    let trimmed = input.trim();
    let payload = trimmed
        .split_once(',')
        .map_or(trimmed, |(_, payload)| payload);
    let payload: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    if payload.is_empty() {
        return Err(ImageError::Missing);
    }

    let bytes = [STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD]
        .iter()
        .find_map(|engine| engine.decode(&payload).ok())
        .ok_or(ImageError::InvalidBase64)?;
    if bytes.is_empty() {
        return Err(ImageError::Missing);
    }
    Ok(bytes)
}

/// Decode base64 and normalize in one go. Runs the CPU heavy part on the blocking pool.
pub async fn normalize_base64_image(
    input: &str,
    options: NormalizeOptions,
) -> Result<NormalizedImage, ImageError> {
    let bytes = decode_base64_image(input)?;
    tokio::task::spawn_blocking(move || normalize_image(&bytes, &options))
        .await
        .map_err(|e| ImageError::Decode(format!("image worker failed: {e}")))?
}

#[must_use]
pub fn is_heif_mime(mime: &str) -> bool {
    matches!(
        mime,
        "image/heif" | "image/heic" | "image/heif-sequence" | "image/heic-sequence"
    )
}

pub fn normalize_image(
    bytes: &[u8],
    options: &NormalizeOptions,
) -> Result<NormalizedImage, ImageError> {
    let detected_mime = infer::get(bytes).map(|kind| kind.mime_type().to_string());

    let (img, source_format) = match detected_mime.as_deref() {
        Some(mime) if is_heif_mime(mime) => (decode_heif(bytes, mime)?, mime.to_string()),
        _ => {
            let format = image::guess_format(bytes).map_err(|_| {
                ImageError::UnsupportedFormat(
                    detected_mime
                        .clone()
                        .unwrap_or_else(|| "unknown".to_string()),
                )
            })?;
            let img = image::load_from_memory_with_format(bytes, format)
                .map_err(|e| ImageError::Decode(e.to_string()))?;
            let img = match exif_orientation(bytes, format) {
                Some(orientation) => apply_orientation(img, orientation),
                None => img,
            };
            let source_format = detected_mime.unwrap_or_else(|| {
                format
                    .to_mime_type()
                    .to_string()
            });
            (img, source_format)
        }
    };

    let img = if img.width().max(img.height()) > options.max_dimension {
        img.resize(options.max_dimension, options.max_dimension, FilterType::Triangle)
    } else {
        img
    };

    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let mut jpeg = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut jpeg, options.jpeg_quality))
        .map_err(|e| ImageError::Encode(e.to_string()))?;

    debug!(
        "Normalized {source_format} upload of {} bytes into {width}x{height} JPEG of {} bytes",
        bytes.len(),
        jpeg.len()
    );

    let content_hash = content_hash(&jpeg);
    Ok(NormalizedImage {
        jpeg,
        width,
        height,
        source_format,
        content_hash,
    })
}

fn exif_orientation(bytes: &[u8], format: ImageFormat) -> Option<u32> {
    if !matches!(
        format,
        ImageFormat::Jpeg | ImageFormat::Tiff | ImageFormat::WebP | ImageFormat::Png
    ) {
        return None;
    }
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    field.value.get_uint(0)
}

/// Rotate/flip according to the EXIF orientation tag (1..=8).
fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

#[cfg(feature = "heic")]
fn decode_heif(bytes: &[u8], _mime: &str) -> Result<DynamicImage, ImageError> {
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    let lib_heif = LibHeif::new();
    let context =
        HeifContext::read_from_bytes(bytes).map_err(|e| ImageError::Decode(e.to_string()))?;
    let handle = context
        .primary_image_handle()
        .map_err(|e| ImageError::Decode(e.to_string()))?;
    // libheif applies the container's rotation/mirroring itself.
    let decoded = lib_heif
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
        .map_err(|e| ImageError::Decode(e.to_string()))?;

    let planes = decoded.planes();
    let plane = planes
        .interleaved
        .ok_or_else(|| ImageError::Decode("HEIF image has no interleaved plane".to_string()))?;
    let (width, height, stride) = (plane.width, plane.height, plane.stride);
    let row_len = width as usize * 3;

    let mut data = Vec::with_capacity(row_len * height as usize);
    for row in plane.data.chunks(stride).take(height as usize) {
        data.extend_from_slice(&row[..row_len]);
    }
    let buffer = image::RgbImage::from_raw(width, height, data)
        .ok_or_else(|| ImageError::Decode("HEIF plane has an unexpected size".to_string()))?;
    Ok(DynamicImage::ImageRgb8(buffer))
}

#[cfg(not(feature = "heic"))]
fn decode_heif(_bytes: &[u8], mime: &str) -> Result<DynamicImage, ImageError> {
    Err(ImageError::UnsupportedFormat(format!(
        "{mime} (server built without HEIC support)"
    )))
}
