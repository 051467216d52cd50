use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{GenericImageView, RgbImage};

use crate::error::{AppError, AppResult};

/// Neither side of a compressed image exceeds this many pixels.
pub const MAX_DIMENSION: u32 = 1920;

const INITIAL_QUALITY: u8 = 90;
const QUALITY_STEP: u8 = 10;
const MIN_QUALITY: u8 = 10;

pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// An uploaded file as received from the browser.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct Compressed {
    pub file: ImageFile,
    pub quality: u8,
    pub width: u32,
    pub height: u32,
}

/// Scale down (never up) so the longer side is at most [`MAX_DIMENSION`],
/// keeping the aspect ratio.
pub fn target_dimensions(width: u32, height: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= MAX_DIMENSION {
        return (width, height);
    }

    let scale = MAX_DIMENSION as f64 / longest as f64;
    let scaled = |side: u32| ((side as f64 * scale).round() as u32).max(1);
    if width >= height {
        (MAX_DIMENSION, scaled(height))
    } else {
        (scaled(width), MAX_DIMENSION)
    }
}

fn encode_jpeg(image: &RgbImage, quality: u8) -> AppResult<Vec<u8>> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(image)
        .map_err(|e| AppError::Internal(format!("JPEG encode failed: {}", e)))?;
    Ok(out)
}

fn jpeg_file_name(file_name: &str) -> String {
    let stem = std::path::Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("image");
    format!("{}.jpg", stem)
}

/// Decode, resize and re-encode as JPEG, lowering quality from 0.9 in steps
/// of 0.1 until the result fits `max_size_mb` or quality reaches 0.1.
pub fn try_compress(file: &ImageFile, max_size_mb: f64) -> AppResult<Compressed> {
    let decoded = image::load_from_memory(&file.data)
        .map_err(|e| AppError::Internal(format!("Image decode failed: {}", e)))?;

    let (width, height) = decoded.dimensions();
    let (target_width, target_height) = target_dimensions(width, height);
    let resized = if (target_width, target_height) != (width, height) {
        decoded.resize_exact(target_width, target_height, FilterType::Triangle)
    } else {
        decoded
    };
    let rgb = resized.to_rgb8();

    let budget = (max_size_mb * 1024.0 * 1024.0) as usize;
    let mut quality = INITIAL_QUALITY;
    let mut encoded = encode_jpeg(&rgb, quality)?;
    while encoded.len() > budget && quality > MIN_QUALITY {
        quality -= QUALITY_STEP;
        encoded = encode_jpeg(&rgb, quality)?;
    }

    tracing::debug!(
        "Compressed {}: {}x{} -> {}x{}, quality={}, {} -> {} bytes",
        file.file_name,
        width,
        height,
        target_width,
        target_height,
        quality,
        file.data.len(),
        encoded.len()
    );

    Ok(Compressed {
        file: ImageFile {
            file_name: jpeg_file_name(&file.file_name),
            content_type: JPEG_CONTENT_TYPE.to_string(),
            data: encoded,
        },
        quality,
        width: target_width,
        height: target_height,
    })
}

/// Best-effort compression: any failure returns the original file untouched.
pub fn compress_image(file: ImageFile, max_size_mb: f64) -> ImageFile {
    match try_compress(&file, max_size_mb) {
        Ok(compressed) => compressed.file,
        Err(e) => {
            tracing::warn!("Keeping original image {}: {}", file.file_name, e);
            file
        }
    }
}

/// [`compress_image`] on the blocking pool.
pub async fn compress(file: ImageFile, max_size_mb: f64) -> ImageFile {
    let original = file.clone();
    match tokio::task::spawn_blocking(move || compress_image(file, max_size_mb)).await {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!("Compression task failed for {}: {}", original.file_name, e);
            original
        }
    }
}
