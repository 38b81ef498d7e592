//! Canonical recognition request

use anpr_types::Rect;
use std::path::{Path, PathBuf};

/// The closed set of inputs the engine's recognition call accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionRequest {
    /// Image file on disk
    ByFilePath(PathBuf),
    /// Encoded image (JPEG, PNG, ...)
    ByImageBytes(Vec<u8>),
    /// Encoded image restricted to regions of interest
    ByImageBytesWithRegions { bytes: Vec<u8>, regions: Vec<Rect> },
    /// Raw pixel buffer with explicit dimensions
    ByRawPixels {
        pixels: Vec<u8>,
        width: u32,
        height: u32,
        regions: Vec<Rect>,
    },
}

impl RecognitionRequest {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        RecognitionRequest::ByFilePath(path.as_ref().to_path_buf())
    }

    /// Regions of interest carried by the request (empty means whole image)
    pub fn regions(&self) -> &[Rect] {
        match self {
            RecognitionRequest::ByFilePath(_) | RecognitionRequest::ByImageBytes(_) => &[],
            RecognitionRequest::ByImageBytesWithRegions { regions, .. }
            | RecognitionRequest::ByRawPixels { regions, .. } => regions,
        }
    }

    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            RecognitionRequest::ByFilePath(_) => "file",
            RecognitionRequest::ByImageBytes(_) => "bytes",
            RecognitionRequest::ByImageBytesWithRegions { .. } => "bytes+regions",
            RecognitionRequest::ByRawPixels { .. } => "raw-pixels",
        }
    }
}
