//! Domain layer: recognition requests, argument dispatch, and the engine contract

pub mod engine;
pub mod model;
pub mod service;

pub use engine::AlprEngine;
pub use model::{DetectionMask, InitParams, RecognitionRequest};
pub use service::{dispatch, RecognizeArg};
