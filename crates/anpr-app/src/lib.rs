//! Application service layer - engine gateway, config, asset bootstrap

pub mod bootstrap;
pub mod config;
pub mod gateway;

pub use bootstrap::{open_command_gateway, AssetBootstrap, StagedAssets};
pub use config::Config;
pub use gateway::{EngineGateway, EngineState, RecognitionHandle};
