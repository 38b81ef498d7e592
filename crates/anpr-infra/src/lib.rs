//! Infrastructure layer - asset staging and engine adapters

pub mod assets;
pub mod engine;
