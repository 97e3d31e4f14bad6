pub mod command;
pub mod engine;
pub mod info;
pub mod pipeline;
pub mod runner;
pub mod source;

pub use crate::domain::model::{
    CompressedGif, CompressionOptions, CompressionReport, GifInfo, PreparedInput,
};
pub use crate::domain::ports::{OptionsProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
