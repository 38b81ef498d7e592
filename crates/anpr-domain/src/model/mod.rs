//! Domain model types

pub mod init;
pub mod mask;
pub mod request;

pub use init::InitParams;
pub use mask::DetectionMask;
pub use request::RecognitionRequest;
