//! Recognition result schema shared by the engine boundary and its callers
//!
//! Field names follow the engine's JSON output verbatim, including the mixed
//! snake_case / camelCase keys.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Pixel-space rectangle constraining where recognition is attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

impl FromStr for Rect {
    type Err = Error;

    /// Parse `x,y,width,height`
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(Error::InvalidArgument(format!(
                "region must be x,y,width,height: {}",
                s
            )));
        }

        let mut values = [0u32; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| {
                Error::InvalidArgument(format!("region component is not a pixel count: {}", part))
            })?;
        }

        Ok(Rect::new(values[0], values[1], values[2], values[3]))
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{} {}x{}", self.x, self.y, self.width, self.height)
    }
}

/// A point in image coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

/// Per-character detail of a plate candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterDetail {
    pub corners: [Coordinate; 4],
    pub confidence: f64,
    pub character: String,
}

/// One plate reading (best guess or a top-N alternative)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlateCandidate {
    pub characters: String,
    pub overall_confidence: f64,
    #[serde(default)]
    pub character_details: Vec<CharacterDetail>,
    pub matches_template: bool,
}

/// A detected plate with its ranked readings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlateResult {
    pub requested_topn: u32,
    pub country: String,
    #[serde(rename = "bestPlate")]
    pub best_plate: PlateCandidate,
    #[serde(rename = "topNPlates", default)]
    pub top_n_plates: Vec<PlateCandidate>,
    pub processing_time_ms: f64,
    pub plate_points: [Coordinate; 4],
    pub plate_index: i32,
    #[serde(rename = "regionConfidence")]
    pub region_confidence: f64,
    pub region: String,
}

/// Full recognition payload for one image or frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlprResults {
    pub epoch_time: f64,
    pub frame_number: i64,
    pub img_width: u32,
    pub img_height: u32,
    pub total_processing_time_ms: f64,
    #[serde(default)]
    pub plates: Vec<PlateResult>,
    #[serde(rename = "regionsOfInterest", default)]
    pub regions_of_interest: Vec<Rect>,
}

/// What a recognition call hands back to its caller
pub type RecognitionResult = AlprResults;

impl AlprResults {
    /// Decode an engine payload
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Best reading of the highest-confidence plate, if any
    pub fn best_plate(&self) -> Option<&PlateCandidate> {
        self.plates
            .iter()
            .map(|p| &p.best_plate)
            .max_by(|a, b| a.overall_confidence.total_cmp(&b.overall_confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "epoch_time": 1717171717000,
        "frame_number": 3,
        "img_width": 800,
        "img_height": 600,
        "total_processing_time_ms": 100.5,
        "plates": [{
            "requested_topn": 2,
            "country": "us",
            "bestPlate": {
                "characters": "ABC123",
                "overall_confidence": 91.2,
                "character_details": [{
                    "corners": [{"x":1,"y":2},{"x":3,"y":2},{"x":3,"y":8},{"x":1,"y":8}],
                    "confidence": 88.0,
                    "character": "A"
                }],
                "matches_template": true
            },
            "topNPlates": [
                {"characters": "ABC123", "overall_confidence": 91.2, "character_details": [], "matches_template": true},
                {"characters": "A8C123", "overall_confidence": 80.4, "character_details": [], "matches_template": false}
            ],
            "processing_time_ms": 42.0,
            "plate_points": [{"x":10,"y":20},{"x":110,"y":20},{"x":110,"y":60},{"x":10,"y":60}],
            "plate_index": 0,
            "regionConfidence": 0,
            "region": "ca"
        }],
        "regionsOfInterest": [{"x":0,"y":0,"width":800,"height":600}]
    }"#;

    #[test]
    fn test_parse_engine_payload() {
        let results = AlprResults::from_json(SAMPLE).unwrap();
        assert_eq!(results.frame_number, 3);
        assert_eq!(results.plates.len(), 1);
        let plate = &results.plates[0];
        assert_eq!(plate.best_plate.characters, "ABC123");
        assert_eq!(plate.top_n_plates.len(), 2);
        assert_eq!(plate.region, "ca");
        assert_eq!(plate.plate_points[2], Coordinate { x: 110, y: 60 });
        assert_eq!(results.regions_of_interest, vec![Rect::new(0, 0, 800, 600)]);
    }

    #[test]
    fn test_payload_keeps_every_field() {
        let original: serde_json::Value = serde_json::from_str(SAMPLE).unwrap();
        let parsed = AlprResults::from_json(SAMPLE).unwrap();
        let reencoded: serde_json::Value =
            serde_json::from_str(&parsed.to_json().unwrap()).unwrap();

        let keys = |v: &serde_json::Value| -> Vec<String> {
            v.as_object().unwrap().keys().cloned().collect()
        };
        assert_eq!(keys(&original), keys(&reencoded));
        assert_eq!(
            keys(&original["plates"][0]),
            keys(&reencoded["plates"][0])
        );
        assert_eq!(AlprResults::from_json(&parsed.to_json().unwrap()).unwrap(), parsed);
    }

    #[test]
    fn test_invalid_payload_is_json_error() {
        let err = AlprResults::from_json(r#"{"epoch_time": "soon"}"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_best_plate_picks_highest_confidence() {
        let mut results = AlprResults::from_json(SAMPLE).unwrap();
        let mut second = results.plates[0].clone();
        second.best_plate.characters = "XYZ999".to_string();
        second.best_plate.overall_confidence = 95.0;
        results.plates.push(second);
        assert_eq!(results.best_plate().unwrap().characters, "XYZ999");
    }

    #[test]
    fn test_rect_from_str() {
        assert_eq!("10, 20,30,40".parse::<Rect>().unwrap(), Rect::new(10, 20, 30, 40));
        assert!("10,20,30".parse::<Rect>().is_err());
        assert!("a,b,c,d".parse::<Rect>().is_err());
    }
}
