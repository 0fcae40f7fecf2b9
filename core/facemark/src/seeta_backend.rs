//! Face detector backed by the `rustface` crate (SeetaFace engine).

use std::fs;
use std::io::Cursor;
use std::path::Path;

use crate::buffer::LumaBuffer;
use crate::error::FacemarkError;
use crate::face_detector::{DetectorParams, FaceBounds, FaceDetector};

/// SeetaFace multi-scale sliding-window detector.
///
/// The model is loaded once from a caller-supplied path; a missing or
/// corrupt model file is a [`FacemarkError::ModelLoad`], which the pipeline
/// treats as fatal to the detection stage only.
pub struct SeetaDetector {
    model: rustface::Model,
    params: DetectorParams,
}

impl std::fmt::Debug for SeetaDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // `rustface::Model` is not `Debug`; omit it.
        f.debug_struct("SeetaDetector")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl SeetaDetector {
    /// Load the SeetaFace model at `path`.
    pub fn from_file(path: &Path, params: DetectorParams) -> Result<Self, FacemarkError> {
        let bytes = fs::read(path).map_err(|e| FacemarkError::ModelLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let model = rustface::read_model(Cursor::new(bytes)).map_err(|e| {
            FacemarkError::ModelLoad {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self { model, params })
    }
}

impl FaceDetector for SeetaDetector {
    fn detect(&self, luma: &LumaBuffer) -> Vec<FaceBounds> {
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        // rustface rejects windows below 20px and scale factors outside
        // (0.01, 0.99).
        detector.set_min_face_size(self.params.min_size.max(20));
        detector.set_score_thresh(f64::from(self.params.min_neighbors.max(1)));
        detector.set_pyramid_scale_factor(self.params.scale_factor.clamp(0.01, 0.99));
        detector.set_slide_window_step(4, 4);

        let faces = detector.detect(&rustface::ImageData::new(
            luma.data(),
            luma.width(),
            luma.height(),
        ));

        faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                FaceBounds {
                    x: bbox.x() as f64,
                    y: bbox.y() as f64,
                    width: bbox.width() as f64,
                    height: bbox.height() as f64,
                    confidence: face.score(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_model_file_is_a_load_error() {
        let err = SeetaDetector::from_file(
            Path::new("/nonexistent/model.bin"),
            DetectorParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, FacemarkError::ModelLoad { .. }));
    }

    #[test]
    fn corrupt_model_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        fs::write(&path, b"definitely not a seeta model").unwrap();
        let err = SeetaDetector::from_file(&path, DetectorParams::default()).unwrap_err();
        assert!(matches!(err, FacemarkError::ModelLoad { .. }));
    }
}
