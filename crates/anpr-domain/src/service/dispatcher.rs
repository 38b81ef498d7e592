//! Overloaded recognition entry point
//!
//! Hosts pass loosely-typed argument lists (a string, a buffer, numbers, a
//! list of regions). This module turns one such list into a single
//! [`RecognitionRequest`] at the boundary, so nothing downstream re-inspects
//! argument shapes.

use crate::model::RecognitionRequest;
use anpr_types::{Error, Rect, Result};
use std::path::PathBuf;

/// One positional argument as received from the host
#[derive(Debug, Clone, PartialEq)]
pub enum RecognizeArg {
    Str(String),
    Bytes(Vec<u8>),
    Number(f64),
    Regions(Vec<Rect>),
}

impl RecognizeArg {
    fn type_name(&self) -> &'static str {
        match self {
            RecognizeArg::Str(_) => "string",
            RecognizeArg::Bytes(_) => "bytes",
            RecognizeArg::Number(_) => "number",
            RecognizeArg::Regions(_) => "list",
        }
    }
}

impl From<&str> for RecognizeArg {
    fn from(value: &str) -> Self {
        RecognizeArg::Str(value.to_string())
    }
}

impl From<String> for RecognizeArg {
    fn from(value: String) -> Self {
        RecognizeArg::Str(value)
    }
}

impl From<Vec<u8>> for RecognizeArg {
    fn from(value: Vec<u8>) -> Self {
        RecognizeArg::Bytes(value)
    }
}

impl From<f64> for RecognizeArg {
    fn from(value: f64) -> Self {
        RecognizeArg::Number(value)
    }
}

impl From<u32> for RecognizeArg {
    fn from(value: u32) -> Self {
        RecognizeArg::Number(value as f64)
    }
}

impl From<Vec<Rect>> for RecognizeArg {
    fn from(value: Vec<Rect>) -> Self {
        RecognizeArg::Regions(value)
    }
}

/// Render the received argument shape, e.g. `(bytes, string)`
fn describe_shape(args: &[RecognizeArg]) -> String {
    let names: Vec<&str> = args.iter().map(RecognizeArg::type_name).collect();
    format!("({})", names.join(", "))
}

/// Convert a host number into a pixel dimension
fn pixel_dimension(value: f64, name: &str) -> Result<u32> {
    if !value.is_finite() || value < 1.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(Error::InvalidArgument(format!(
            "{} must be a positive whole pixel count, got {}",
            name, value
        )));
    }
    Ok(value as u32)
}

/// Classify a host argument list into exactly one request shape.
///
/// First match wins:
/// 1. `(string)` → file path
/// 2. `(bytes)` → encoded image
/// 3. `(bytes, list)` → encoded image with regions
/// 4. `(bytes, number, number, list)` → raw pixels
pub fn dispatch(args: Vec<RecognizeArg>) -> Result<RecognitionRequest> {
    let shape = describe_shape(&args);
    let mut args = args.into_iter();

    let request = match (args.next(), args.next(), args.next(), args.next(), args.next()) {
        (Some(RecognizeArg::Str(path)), None, None, None, None) => {
            RecognitionRequest::ByFilePath(PathBuf::from(path))
        }
        (Some(RecognizeArg::Bytes(bytes)), None, None, None, None) => {
            RecognitionRequest::ByImageBytes(bytes)
        }
        (Some(RecognizeArg::Bytes(bytes)), Some(RecognizeArg::Regions(regions)), None, None, None) => {
            RecognitionRequest::ByImageBytesWithRegions { bytes, regions }
        }
        (
            Some(RecognizeArg::Bytes(pixels)),
            Some(RecognizeArg::Number(width)),
            Some(RecognizeArg::Number(height)),
            Some(RecognizeArg::Regions(regions)),
            None,
        ) => RecognitionRequest::ByRawPixels {
            pixels,
            width: pixel_dimension(width, "width")?,
            height: pixel_dimension(height, "height")?,
            regions,
        },
        _ => {
            return Err(Error::InvalidArgument(format!(
                "no recognise overload accepts {}",
                shape
            )))
        }
    };

    Ok(request)
}
