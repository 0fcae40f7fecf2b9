//! Face detection seam and region validation.
//!
//! Detector output is advisory, not authoritative: backends report raw
//! [`FaceBounds`] in detector coordinates, which may be fractional,
//! negative, or partially outside the image. Only [`filter_regions`] turns
//! them into validated [`Region`]s; anything violating the region invariant
//! is dropped there rather than surfaced as an error.

use tracing::debug;

use crate::buffer::{Geometry, LumaBuffer, Region};

/// Bounding box of a detected face, as reported by a backend.
#[derive(Debug, Clone)]
pub struct FaceBounds {
    /// X coordinate of the top-left corner (pixels).
    pub x: f64,
    /// Y coordinate of the top-left corner (pixels).
    pub y: f64,
    /// Width of the bounding box (pixels).
    pub width: f64,
    /// Height of the bounding box (pixels).
    pub height: f64,
    /// Detection confidence score.
    pub confidence: f64,
}

/// Pluggable face detection backend.
///
/// Implement this trait to substitute another engine, or a deterministic
/// fake in tests, decoupling pipeline tests from model-file availability.
pub trait FaceDetector: Send + Sync {
    /// Detect faces in a luma buffer, in emission order.
    fn detect(&self, luma: &LumaBuffer) -> Vec<FaceBounds>;
}

/// Detector tunables. Exposed rather than hard-coded so callers can trade
/// scan cost against hit rate.
#[derive(Debug, Clone, Copy)]
pub struct DetectorParams {
    /// Pyramid step between scan scales, in (0, 1); closer to 1.0 scans
    /// more scales (slower, more candidates).
    pub scale_factor: f32,
    /// Minimum overlapping-detection support to accept a candidate, mapped
    /// onto the classifier score threshold; higher means fewer false
    /// positives and more missed faces.
    pub min_neighbors: u32,
    /// Smallest detection window considered, in pixels.
    pub min_size: u32,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            scale_factor: 0.8,
            min_neighbors: 3,
            min_size: 20,
        }
    }
}

/// Validate raw detector output against the image bounds.
///
/// Fractional coordinates are truncated; candidates with a negative origin,
/// zero extent, or any pixel outside `geometry` are dropped. Emission order
/// is preserved; crop filenames are numbered from it.
pub fn filter_regions(candidates: &[FaceBounds], geometry: Geometry) -> Vec<Region> {
    candidates
        .iter()
        .filter_map(|bounds| {
            if bounds.x < 0.0 || bounds.y < 0.0 || bounds.width < 1.0 || bounds.height < 1.0 {
                debug!(?bounds, "dropping candidate with negative or empty box");
                return None;
            }
            // `as` saturates, so oversized values fail the fit check below.
            let region = Region {
                x: bounds.x as u32,
                y: bounds.y as u32,
                width: bounds.width as u32,
                height: bounds.height as u32,
            };
            if region.fits(geometry) {
                Some(region)
            } else {
                debug!(?bounds, "dropping out-of-bounds candidate");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(x: f64, y: f64, width: f64, height: f64) -> FaceBounds {
        FaceBounds {
            x,
            y,
            width,
            height,
            confidence: 1.0,
        }
    }

    #[test]
    fn valid_candidates_pass_through_in_order() {
        let geometry = Geometry::new(100, 100);
        let regions = filter_regions(
            &[bounds(10.0, 20.0, 30.0, 30.0), bounds(0.0, 0.0, 100.0, 100.0)],
            geometry,
        );
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0], Region { x: 10, y: 20, width: 30, height: 30 });
        assert_eq!(regions[1], Region { x: 0, y: 0, width: 100, height: 100 });
    }

    #[test]
    fn fractional_coordinates_are_truncated() {
        let geometry = Geometry::new(100, 100);
        let regions = filter_regions(&[bounds(10.9, 20.2, 30.7, 31.5)], geometry);
        assert_eq!(regions, vec![Region { x: 10, y: 20, width: 30, height: 31 }]);
    }

    #[test]
    fn negative_origin_is_dropped() {
        let geometry = Geometry::new(100, 100);
        assert!(filter_regions(&[bounds(-3.0, 5.0, 20.0, 20.0)], geometry).is_empty());
    }

    #[test]
    fn zero_extent_is_dropped() {
        let geometry = Geometry::new(100, 100);
        assert!(filter_regions(&[bounds(5.0, 5.0, 0.0, 20.0)], geometry).is_empty());
        assert!(filter_regions(&[bounds(5.0, 5.0, 20.0, 0.5)], geometry).is_empty());
    }

    #[test]
    fn out_of_bounds_is_dropped_not_clamped() {
        let geometry = Geometry::new(100, 100);
        assert!(filter_regions(&[bounds(90.0, 90.0, 20.0, 20.0)], geometry).is_empty());
    }

    #[test]
    fn oversized_candidate_is_dropped() {
        let geometry = Geometry::new(100, 100);
        assert!(filter_regions(&[bounds(0.0, 0.0, 1e12, 1e12)], geometry).is_empty());
    }

    #[test]
    fn every_surviving_region_fits() {
        let geometry = Geometry::new(64, 48);
        let mixed = [
            bounds(-1.0, 0.0, 10.0, 10.0),
            bounds(5.0, 5.0, 10.0, 10.0),
            bounds(60.0, 40.0, 10.0, 10.0),
            bounds(54.0, 38.0, 10.0, 10.0),
        ];
        for region in filter_regions(&mixed, geometry) {
            assert!(region.fits(geometry));
        }
    }
}
