//! Region overlay and crop extraction.

use rayon::prelude::*;

use crate::buffer::{Geometry, PixelBuffer, Region};
use crate::error::FacemarkError;

/// Outline width in pixels, after the original tool's rectangle style.
const OUTLINE_THICKNESS: u32 = 2;

/// Outline color, RGB.
const OUTLINE_COLOR: [u8; 3] = [0, 255, 0];

/// Draw a rectangle outline for every region onto a copy of `buffer`.
///
/// The input is never mutated, so the pre-annotation pixels stay available
/// for crop extraction. One worker per destination row; each row draws its
/// intersection with every region, so overlapping rectangles need no
/// locking. Regions must already satisfy the region invariant.
pub fn overlay(buffer: &PixelBuffer, regions: &[Region]) -> PixelBuffer {
    let mut out = buffer.clone();
    let stride = out.geometry().row_stride();
    out.data_mut()
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            for region in regions {
                draw_row_intersection(row, y as u32, region);
            }
        });
    out
}

fn draw_row_intersection(row: &mut [u8], y: u32, region: &Region) {
    if y < region.y || y >= region.y + region.height {
        return;
    }
    let thickness = OUTLINE_THICKNESS.min(region.width).min(region.height);
    let in_top_edge = y < region.y + thickness;
    let in_bottom_edge = y >= region.y + region.height - thickness;
    if in_top_edge || in_bottom_edge {
        paint_span(row, region.x, region.x + region.width);
    } else {
        paint_span(row, region.x, region.x + thickness);
        paint_span(row, region.x + region.width - thickness, region.x + region.width);
    }
}

fn paint_span(row: &mut [u8], x0: u32, x1: u32) {
    let start = x0 as usize * Geometry::CHANNELS;
    let end = x1 as usize * Geometry::CHANNELS;
    for pixel in row[start..end].chunks_exact_mut(Geometry::CHANNELS) {
        pixel.copy_from_slice(&OUTLINE_COLOR);
    }
}

/// Copy the addressed sub-rectangle into a new, independently owned buffer.
///
/// Re-validates the region even though the adapter has already filtered
/// detector output; this is a reusable primitive, and a bad region here
/// means an internal invariant broke upstream.
pub fn crop(buffer: &PixelBuffer, region: Region) -> Result<PixelBuffer, FacemarkError> {
    let geometry = buffer.geometry();
    if !region.fits(geometry) {
        return Err(FacemarkError::RegionOutOfBounds {
            region,
            width: geometry.width,
            height: geometry.height,
        });
    }

    let out_geometry = Geometry::new(region.width, region.height);
    let mut data = Vec::with_capacity(out_geometry.byte_len());
    let x0 = region.x as usize * Geometry::CHANNELS;
    let x1 = x0 + region.width as usize * Geometry::CHANNELS;
    for y in region.y..region.y + region.height {
        data.extend_from_slice(&buffer.row(y)[x0..x1]);
    }
    Ok(PixelBuffer::new(out_geometry, data))
}
