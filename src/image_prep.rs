//! Upload validation, resizing, and data-URL encoding for vision APIs.
//!
//! Photos are resized to at most 2048px on the longest edge and re-encoded
//! as JPEG before being sent to a provider, to keep payloads within vision
//! API limits.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use log::debug;

use crate::config::ImageConfig;
use crate::error::AnalysisError;

/// MIME types accepted for upload.
pub const ALLOWED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// ISO-BMFF major brands that mark HEIF/HEIC containers.
const HEIF_BRANDS: [&[u8; 4]; 6] = [b"heic", b"heix", b"hevc", b"hevx", b"mif1", b"msf1"];

/// A resized, JPEG re-encoded image ready for a provider payload.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub size: usize,
}

impl PreparedImage {
    /// Base64 data URL for vision API payloads.
    pub fn to_data_url(&self) -> String {
        format!("data:image/jpeg;base64,{}", STANDARD.encode(&self.bytes))
    }
}

/// Reject uploads that are too large or not a supported image type.
///
/// HEIF/HEIC gets its own message. Browsers and phones often upload those
/// with a generic MIME type, so the payload is also sniffed for the
/// container brand.
pub fn validate_upload(
    bytes: &[u8],
    mime_type: &str,
    config: &ImageConfig,
) -> Result<(), AnalysisError> {
    if bytes.len() > config.max_size_bytes {
        return Err(AnalysisError::InvalidImage(format!(
            "Image size must be less than {}MB.",
            config.max_size_bytes / 1024 / 1024
        )));
    }

    if is_heif(mime_type, bytes) {
        return Err(AnalysisError::InvalidImage(
            "HEIF/HEIC format is not supported. Please convert to JPEG or PNG first.".to_string(),
        ));
    }

    if !ALLOWED_MIME_TYPES.contains(&mime_type) {
        return Err(AnalysisError::InvalidImage(
            "Please upload a valid image file (JPG, PNG, or WebP).".to_string(),
        ));
    }

    Ok(())
}

fn is_heif(mime_type: &str, bytes: &[u8]) -> bool {
    if mime_type == "image/heif" || mime_type == "image/heic" {
        return true;
    }
    // ISO-BMFF layout: 4-byte box size, "ftyp", 4-byte major brand.
    if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
        let brand = &bytes[8..12];
        return HEIF_BRANDS.iter().any(|b| brand == *b);
    }
    false
}

/// Decode the upload and re-encode it as a JPEG bounded to the configured
/// dimension.
pub fn prepare_image(bytes: &[u8], config: &ImageConfig) -> Result<PreparedImage, AnalysisError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| AnalysisError::ImageProcessingFailed(format!("failed to decode image: {e}")))?;
    debug!("Decoded image: {}x{}", img.width(), img.height());

    let resized = resize_if_needed(img, config.max_dimension);
    let (width, height) = (resized.width(), resized.height());

    let jpeg = encode_jpeg(&resized, config.jpeg_quality)?;
    let size = jpeg.len();
    debug!("Prepared image: {}x{}, {} bytes", width, height, size);

    Ok(PreparedImage {
        bytes: jpeg,
        width,
        height,
        size,
    })
}

/// Resize only when a dimension exceeds the bound; never upscale.
fn resize_if_needed(img: DynamicImage, max_dimension: u32) -> DynamicImage {
    let (width, height) = (img.width(), img.height());
    if width <= max_dimension && height <= max_dimension {
        return img;
    }

    let scale = max_dimension as f64 / width.max(height) as f64;
    let new_width = ((width as f64 * scale).round() as u32).max(1);
    let new_height = ((height as f64 * scale).round() as u32).max(1);
    img.resize(new_width, new_height, FilterType::Lanczos3)
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, AnalysisError> {
    // JPEG has no alpha channel; flatten to RGB before encoding.
    let rgb = img.to_rgb8();
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
    encoder
        .encode_image(&rgb)
        .map_err(|e| AnalysisError::ImageProcessingFailed(format!("failed to encode JPEG: {e}")))?;
    Ok(out)
}
