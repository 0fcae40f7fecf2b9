use std::path::PathBuf;

use thiserror::Error;

use crate::buffer::Region;

/// Error type returned by facemark operations.
#[derive(Debug, Error)]
pub enum FacemarkError {
    /// Source file is missing or unreadable; raised before any pipeline
    /// stage runs.
    #[error("input file '{}' is missing or unreadable", .path.display())]
    Input {
        /// The offending input path.
        path: PathBuf,
    },

    /// Compressed data could not be decoded into a three-channel buffer.
    #[error("failed to decode '{}': {reason}", .path.display())]
    Decode {
        /// The offending input path.
        path: PathBuf,
        /// What the decoder rejected.
        reason: String,
    },

    /// Detector model could not be loaded. Recovered by the orchestrator:
    /// detection is skipped, the re-encode still runs.
    #[error("failed to load detector model '{}': {reason}", .path.display())]
    ModelLoad {
        /// The offending model path.
        path: PathBuf,
        /// What the model loader rejected.
        reason: String,
    },

    /// A region addressed pixels outside its source buffer. Unreachable
    /// through the default pipeline (the adapter filters candidates first);
    /// raised only when the crop primitive is called directly with a bad
    /// region.
    #[error("region {region:?} exceeds the {width}x{height} image bounds")]
    RegionOutOfBounds {
        /// The rejected region.
        region: Region,
        /// Source buffer width.
        width: u32,
        /// Source buffer height.
        height: u32,
    },

    /// Destination could not be written, or the buffer failed the encode
    /// precondition.
    #[error("failed to encode '{}': {reason}", .path.display())]
    Encode {
        /// The offending output path.
        path: PathBuf,
        /// What the encoder rejected.
        reason: String,
    },

    /// Quality must be in [0, 100].
    #[error("quality must be between 0 and 100, got {0}")]
    InvalidQuality(u8),
}
