//! Deferred gateway commands

use super::handle::ResultSlot;
use anpr_domain::{AlprEngine, DetectionMask, RecognitionRequest};
use anpr_types::AlprResults;

/// A configuration or recognition call captured for later replay
pub(crate) enum Operation {
    SetCountry(String),
    SetTopN(u32),
    SetDefaultRegion(String),
    SetDetectRegion(bool),
    SetPrewarp(String),
    SetMask(DetectionMask),
    Recognize {
        request: RecognitionRequest,
        slot: ResultSlot,
    },
}

impl Operation {
    fn name(&self) -> &'static str {
        match self {
            Operation::SetCountry(_) => "set_country",
            Operation::SetTopN(_) => "set_top_n",
            Operation::SetDefaultRegion(_) => "set_default_region",
            Operation::SetDetectRegion(_) => "set_detect_region",
            Operation::SetPrewarp(_) => "set_prewarp",
            Operation::SetMask(_) => "set_mask",
            Operation::Recognize { .. } => "recognize",
        }
    }
}

pub(crate) struct QueuedCommand {
    pub ordinal: u64,
    pub operation: Operation,
}

impl QueuedCommand {
    /// Run against the engine, resolving the result slot for recognitions
    pub fn execute<E: AlprEngine + ?Sized>(self, engine: &mut E) {
        let ordinal = self.ordinal;
        tracing::debug!(ordinal, command = self.operation.name(), "executing command");

        match self.operation {
            Operation::SetCountry(country) => engine.set_country(&country),
            Operation::SetTopN(top_n) => engine.set_top_n(top_n),
            Operation::SetDefaultRegion(region) => engine.set_default_region(&region),
            Operation::SetDetectRegion(enabled) => engine.set_detect_region(enabled),
            Operation::SetPrewarp(prewarp) => engine.set_prewarp(&prewarp),
            Operation::SetMask(mask) => engine.set_mask(&mask),
            Operation::Recognize { request, slot } => {
                let result = engine
                    .recognize(&request)
                    .and_then(|json| AlprResults::from_json(&json));
                if let Err(ref e) = result {
                    tracing::warn!(ordinal, kind = request.kind(), error = %e, "recognition failed");
                }
                if slot.send(result).is_err() {
                    tracing::debug!(ordinal, "recognition handle dropped before completion");
                }
            }
        }
    }
}
