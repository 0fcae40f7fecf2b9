//! Face detection and region extraction for compressed images: decode,
//! derive luma, detect faces, mark them, and save per-face crops.
//!
//! # Example
//!
//! ```no_run
//! use facemark::FacePipeline;
//!
//! let report = FacePipeline::new("photo.jpg", "photo_marked.jpg")
//!     .quality(90)
//!     .run()
//!     .unwrap();
//! println!("{} face(s) found", report.regions.len());
//! ```
#![warn(missing_docs)]

pub mod buffer;
pub mod codec;
mod error;
pub mod face_detector;
pub mod luma;
mod pipeline;
pub mod render;
pub mod seeta_backend;

use std::path::PathBuf;

/// Geometry, pixel, and region data model.
pub use buffer::{Geometry, LumaBuffer, PixelBuffer, Region};
/// Error type returned by facemark operations.
pub use error::FacemarkError;
/// Face detection seam and tunables.
pub use face_detector::{DetectorParams, FaceBounds, FaceDetector};
/// Pipeline result summary.
pub use pipeline::ProcessReport;
/// Built-in detector backend.
pub use seeta_backend::SeetaDetector;

/// Where the SeetaFace model is looked up when no other path is configured.
pub const DEFAULT_MODEL_PATH: &str = "data/seeta_fd_frontal_v1.0.bin";

/// Default JPEG quality for every encoded output.
pub const DEFAULT_QUALITY: u8 = 90;

/// Builder for one pipeline run.
///
/// Output locations, quality, and detector tunables are explicit
/// configuration here rather than ambient file-system convention, so tests
/// can redirect everything to a scratch directory.
pub struct FacePipeline {
    pub(crate) input: PathBuf,
    pub(crate) output: PathBuf,
    pub(crate) quality: u8,
    pub(crate) invert: bool,
    pub(crate) model_path: PathBuf,
    pub(crate) params: DetectorParams,
    pub(crate) luma_preview: Option<PathBuf>,
    /// User-provided detector. When `None`, the SeetaFace backend is loaded
    /// from `model_path`; a load failure downgrades the run to
    /// decode-and-reencode with a warning.
    pub(crate) detector: Option<Box<dyn FaceDetector>>,
}

impl FacePipeline {
    /// Create a pipeline reading `input` and writing the annotated image to
    /// `output`. Crop files land in a `<output_stem>_regions` directory
    /// beside the output.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            quality: DEFAULT_QUALITY,
            invert: false,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            params: DetectorParams::default(),
            luma_preview: None,
            detector: None,
        }
    }

    /// Set the JPEG quality in [0, 100] for all outputs (default: 90).
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Invert colors before detection and re-encode (default: off).
    pub fn invert(mut self, enable: bool) -> Self {
        self.invert = enable;
        self
    }

    /// Set the SeetaFace model path (default: [`DEFAULT_MODEL_PATH`]).
    pub fn model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    /// Set the detector tunables.
    pub fn detector_params(mut self, params: DetectorParams) -> Self {
        self.params = params;
        self
    }

    /// Also write the intermediate grayscale image to `path`. Debug aid;
    /// a failure here is logged and ignored.
    pub fn luma_preview(mut self, path: impl Into<PathBuf>) -> Self {
        self.luma_preview = Some(path.into());
        self
    }

    /// Provide a custom face detector instead of the SeetaFace backend.
    ///
    /// ```no_run
    /// use facemark::{FaceBounds, FaceDetector, FacePipeline, LumaBuffer};
    ///
    /// struct MyDetector;
    /// impl FaceDetector for MyDetector {
    ///     fn detect(&self, _luma: &LumaBuffer) -> Vec<FaceBounds> {
    ///         vec![]
    ///     }
    /// }
    ///
    /// let report = FacePipeline::new("in.jpg", "out.jpg")
    ///     .face_detector(Box::new(MyDetector))
    ///     .run()
    ///     .unwrap();
    /// ```
    pub fn face_detector(mut self, detector: Box<dyn FaceDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Run the pipeline with the configured settings.
    pub fn run(self) -> Result<ProcessReport, FacemarkError> {
        pipeline::execute(self)
    }
}
