//! Decode/encode boundary between compressed bytes and [`PixelBuffer`].
//!
//! Everything crossing this boundary is RGB, in that order. The decoder
//! rejects sources with any other channel count instead of silently
//! reinterpreting them, and the scanline-to-flat-buffer mapping is pinned
//! down by unit tests per channel.

use std::fs;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};
use rayon::prelude::*;

use crate::buffer::{Geometry, LumaBuffer, PixelBuffer};
use crate::error::FacemarkError;

/// Decode a compressed image file into an RGB pixel buffer.
pub fn decode_file(path: &Path) -> Result<PixelBuffer, FacemarkError> {
    let bytes = fs::read(path).map_err(|e| FacemarkError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    decode_image(&bytes).map_err(|reason| FacemarkError::Decode {
        path: path.to_path_buf(),
        reason,
    })
}

/// Encode an RGB pixel buffer to a JPEG file at the given quality (0-100).
pub fn encode_file(buffer: &PixelBuffer, path: &Path, quality: u8) -> Result<(), FacemarkError> {
    let bytes = encode_image(buffer, quality).map_err(|reason| FacemarkError::Encode {
        path: path.to_path_buf(),
        reason,
    })?;
    fs::write(path, bytes).map_err(|e| FacemarkError::Encode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Encode a luma buffer to a single-channel JPEG file. Debug-preview
/// output; callers decide whether a failure here matters.
pub fn encode_luma_file(luma: &LumaBuffer, path: &Path, quality: u8) -> Result<(), FacemarkError> {
    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
    encoder
        .write_image(luma.data(), luma.width(), luma.height(), ExtendedColorType::L8)
        .map_err(|e| FacemarkError::Encode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    fs::write(path, bytes).map_err(|e| FacemarkError::Encode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Decode compressed bytes. The source must carry exactly three channels;
/// scanlines land top-to-bottom at `buffer[row]`, one copy worker per row.
pub(crate) fn decode_image(bytes: &[u8]) -> Result<PixelBuffer, String> {
    let decoded = image::load_from_memory(bytes).map_err(|e| e.to_string())?;

    if decoded.width() == 0 || decoded.height() == 0 {
        return Err("image dimensions are zero".to_string());
    }

    let rgb = match decoded {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => {
            return Err(format!(
                "unsupported channel count {} (only 3-channel color images are supported)",
                other.color().channel_count()
            ));
        }
    };

    let geometry = Geometry::new(rgb.width(), rgb.height());
    let stride = geometry.row_stride();
    let mut data = vec![0u8; geometry.byte_len()];
    data.par_chunks_mut(stride)
        .zip(rgb.as_raw().par_chunks(stride))
        .for_each(|(dst, src)| dst.copy_from_slice(src));

    Ok(PixelBuffer::new(geometry, data))
}

/// Encode an RGB pixel buffer as JPEG bytes.
///
/// Irregular buffers are unrepresentable with flat storage; the remaining
/// precondition is that the buffer is non-empty and its data length matches
/// its geometry, which indicates a pipeline bug upstream if violated.
pub(crate) fn encode_image(buffer: &PixelBuffer, quality: u8) -> Result<Vec<u8>, String> {
    let geometry = buffer.geometry();
    if geometry.is_empty() || buffer.data().is_empty() {
        return Err("refusing to encode an empty pixel buffer".to_string());
    }
    if buffer.data().len() != geometry.byte_len() {
        return Err(format!(
            "buffer length {} does not match {}x{} RGB geometry",
            buffer.data().len(),
            geometry.width,
            geometry.height
        ));
    }

    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
    encoder
        .write_image(buffer.data(), geometry.width, geometry.height, ExtendedColorType::Rgb8)
        .map_err(|e| e.to_string())?;
    Ok(bytes)
}
