//! Engine contract
//!
//! The recognition engine is an external collaborator. Everything in this
//! workspace talks to it through [`AlprEngine`] only.

use crate::model::{DetectionMask, InitParams, RecognitionRequest};
use anpr_types::Result;

/// Capability interface of a plate-recognition engine
pub trait AlprEngine: Send {
    /// Load the engine for a country. Called until it succeeds once.
    fn initialize(&mut self, params: &InitParams) -> Result<()>;

    fn set_country(&mut self, country: &str);

    fn set_top_n(&mut self, top_n: u32);

    fn set_default_region(&mut self, region: &str);

    fn set_detect_region(&mut self, enabled: bool);

    /// Perspective pre-warp transform in the engine's config syntax
    fn set_prewarp(&mut self, prewarp: &str);

    fn set_mask(&mut self, mask: &DetectionMask);

    /// Run recognition and return the JSON-encoded result
    fn recognize(&mut self, request: &RecognitionRequest) -> Result<String>;
}

impl<E: AlprEngine + ?Sized> AlprEngine for Box<E> {
    fn initialize(&mut self, params: &InitParams) -> Result<()> {
        (**self).initialize(params)
    }

    fn set_country(&mut self, country: &str) {
        (**self).set_country(country)
    }

    fn set_top_n(&mut self, top_n: u32) {
        (**self).set_top_n(top_n)
    }

    fn set_default_region(&mut self, region: &str) {
        (**self).set_default_region(region)
    }

    fn set_detect_region(&mut self, enabled: bool) {
        (**self).set_detect_region(enabled)
    }

    fn set_prewarp(&mut self, prewarp: &str) {
        (**self).set_prewarp(prewarp)
    }

    fn set_mask(&mut self, mask: &DetectionMask) {
        (**self).set_mask(mask)
    }

    fn recognize(&mut self, request: &RecognitionRequest) -> Result<String> {
        (**self).recognize(request)
    }
}
