//! Pipeline orchestration: decode, project, detect, annotate, persist.
//!
//! The stage sequence is linear with one branch on the detection result.
//! Recoverable conditions (no regions, missing detector model, preview
//! write failure) are absorbed and logged; buffer invariant violations and
//! file I/O failures surface to the caller and fail the run.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{error, info, warn};

use crate::buffer::{Geometry, Region};
use crate::codec;
use crate::error::FacemarkError;
use crate::face_detector::{filter_regions, FaceBounds, FaceDetector};
use crate::luma;
use crate::render;
use crate::seeta_backend::SeetaDetector;
use crate::FacePipeline;

/// What a pipeline run produced.
#[derive(Debug)]
pub struct ProcessReport {
    /// Geometry of the decoded input.
    pub geometry: Geometry,
    /// Regions that survived validation, in detector emission order.
    pub regions: Vec<Region>,
    /// Where the annotated image was written.
    pub annotated_path: PathBuf,
    /// Crop files actually written, in region order.
    pub crop_paths: Vec<PathBuf>,
    /// True when the detector model could not be loaded and detection was
    /// skipped.
    pub detection_skipped: bool,
}

pub(crate) fn execute(pipeline: FacePipeline) -> Result<ProcessReport, FacemarkError> {
    let FacePipeline {
        input,
        output,
        quality,
        invert,
        model_path,
        params,
        luma_preview,
        detector,
    } = pipeline;

    if quality > 100 {
        return Err(FacemarkError::InvalidQuality(quality));
    }
    if !input.is_file() {
        return Err(FacemarkError::Input { path: input });
    }

    let mut buffer = codec::decode_file(&input)?;
    let geometry = buffer.geometry();
    info!(
        width = geometry.width,
        height = geometry.height,
        "decoded {}",
        input.display()
    );

    if invert {
        buffer.invert();
    }

    let luma = luma::project(&buffer);
    if let Some(path) = &luma_preview {
        // Debug output, not a stable contract.
        if let Err(e) = codec::encode_luma_file(&luma, path, quality) {
            warn!("could not write luma preview: {e}");
        }
    }

    let (candidates, detection_skipped) = match detector {
        Some(detector) => (detector.detect(&luma), false),
        None => match SeetaDetector::from_file(&model_path, params) {
            Ok(detector) => (detector.detect(&luma), false),
            Err(e) => {
                warn!("{e}; continuing without detection");
                (Vec::new(), true)
            }
        },
    };
    let regions = filter_regions(&candidates, geometry);
    log_detection(&candidates, &regions, detection_skipped);

    if regions.is_empty() {
        codec::encode_file(&buffer, &output, quality)?;
        info!("wrote {}", output.display());
        return Ok(ProcessReport {
            geometry,
            regions,
            annotated_path: output,
            crop_paths: Vec::new(),
            detection_skipped,
        });
    }

    let annotated = render::overlay(&buffer, &regions);
    codec::encode_file(&annotated, &output, quality)?;
    info!("wrote {}", output.display());

    let results_dir = results_dir_for(&output);
    fs::create_dir_all(&results_dir).map_err(|e| FacemarkError::Encode {
        path: results_dir.clone(),
        reason: e.to_string(),
    })?;
    let extension = output
        .extension()
        .and_then(OsStr::to_str)
        .unwrap_or("jpg")
        .to_string();

    // Crops come from the pre-annotation buffer, one worker per region;
    // filenames are numbered by emission order so reruns are reproducible.
    let outcomes: Vec<Result<PathBuf, FacemarkError>> = regions
        .par_iter()
        .enumerate()
        .map(|(index, &region)| {
            let path = results_dir.join(format!("region_{index}.{extension}"));
            let face = render::crop(&buffer, region)?;
            codec::encode_file(&face, &path, quality)?;
            Ok(path)
        })
        .collect();

    let mut crop_paths = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            Ok(path) => crop_paths.push(path),
            // An out-of-bounds region past the adapter is an internal
            // invariant violation; abandon that region, keep the run.
            Err(e @ FacemarkError::RegionOutOfBounds { .. }) => {
                error!("{e}; skipping that region");
            }
            Err(e) => return Err(e),
        }
    }
    info!(
        "saved {} region crop(s) under {}",
        crop_paths.len(),
        results_dir.display()
    );

    Ok(ProcessReport {
        geometry,
        regions,
        annotated_path: output,
        crop_paths,
        detection_skipped,
    })
}

fn log_detection(candidates: &[FaceBounds], regions: &[Region], skipped: bool) {
    if skipped {
        return;
    }
    let dropped = candidates.len() - regions.len();
    if dropped > 0 {
        warn!("dropped {dropped} invalid detector candidate(s)");
    }
    info!("detected {} region(s)", regions.len());
}

/// Crop files land in a directory derived from the output path:
/// `photo_marked.jpg` -> `photo_marked_regions/`.
fn results_dir_for(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("output");
    output.with_file_name(format!("{stem}_regions"))
}
