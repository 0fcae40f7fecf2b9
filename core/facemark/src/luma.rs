//! RGB to luma projection.
//!
//! The BT.601 weights below are the ones the SeetaFace cascade was trained
//! against; substituting a different grayscale formula silently degrades
//! detection, so this module and the detector backend are a matched pair.

use rayon::prelude::*;

use crate::buffer::{Geometry, LumaBuffer, PixelBuffer};

/// Project an RGB buffer to its luma representation. Pure and
/// deterministic; one worker per row.
pub fn project(buffer: &PixelBuffer) -> LumaBuffer {
    let geometry = buffer.geometry();
    let stride = geometry.row_stride();
    let width = geometry.width as usize;

    let mut data = vec![0u8; geometry.pixel_count()];
    data.par_chunks_mut(width)
        .zip(buffer.data().par_chunks(stride))
        .for_each(|(dst, src)| {
            for (out, rgb) in dst.iter_mut().zip(src.chunks_exact(Geometry::CHANNELS)) {
                *out = luma_of(rgb[0], rgb[1], rgb[2]);
            }
        });

    LumaBuffer::new(geometry, data)
}

/// `round(0.299*R + 0.587*G + 0.114*B)`, clamped to [0, 255].
fn luma_of(r: u8, g: u8, b: u8) -> u8 {
    let value = 0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b);
    value.round().clamp(0.0, 255.0) as u8
}
