pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::cli::LocalStorage;
pub use config::prediction::{PredictionRequest, PredictionResponse};
pub use config::SqueezeConfig;
#[cfg(feature = "cli")]
pub use config::CliConfig;

#[cfg(feature = "lambda")]
pub use config::lambda::{LambdaConfig, S3Storage};

pub use crate::core::source::GifSource;
pub use crate::core::{engine::CompressionEngine, pipeline::GifsiclePipeline, runner::GifsicleRunner};
pub use domain::model::{CompressionOptions, CompressionReport, GifInfo};
pub use utils::error::{Result, SqueezeError};
