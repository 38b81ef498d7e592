//! Engine initialization parameters

use serde::{Deserialize, Serialize};

/// Parameters for the one-time engine initialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitParams {
    /// Country / locale code (e.g. "us", "eu")
    pub country: String,
    /// Number of ranked readings per plate. Ignored when zero.
    #[serde(default)]
    pub top_n: Option<u32>,
    /// Default region pattern (e.g. "md"). Ignored when empty.
    #[serde(default)]
    pub default_region: Option<String>,
}

impl InitParams {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            top_n: None,
            default_region: None,
        }
    }

    pub fn with_top_n(mut self, top_n: u32) -> Self {
        self.top_n = Some(top_n);
        self
    }

    pub fn with_default_region(mut self, region: impl Into<String>) -> Self {
        self.default_region = Some(region.into());
        self
    }

    /// Top-N to apply, if any
    pub fn effective_top_n(&self) -> Option<u32> {
        self.top_n.filter(|&n| n > 0)
    }

    /// Default region to apply, if any
    pub fn effective_region(&self) -> Option<&str> {
        self.default_region
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }
}
