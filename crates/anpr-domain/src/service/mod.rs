//! Domain services

pub mod dispatcher;

pub use dispatcher::{dispatch, RecognizeArg};
