pub mod cli;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod prediction;
pub mod toml_config;

use crate::core::command::DEFAULT_GIFSICLE;
use crate::core::runner::DEFAULT_TIMEOUT_SECONDS;
use crate::core::{CompressionOptions, OptionsProvider};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};
#[cfg(feature = "cli")]
use std::path::PathBuf;

pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// 合併 CLI、預設檔與內建預設值後的最終設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqueezeConfig {
    pub options: CompressionOptions,
    pub gifsicle_path: String,
    pub timeout_seconds: u64,
    pub output_dir: String,
    pub output_name: Option<String>,
    pub monitoring: bool,
}

impl Default for SqueezeConfig {
    fn default() -> Self {
        Self {
            options: CompressionOptions::default(),
            gifsicle_path: DEFAULT_GIFSICLE.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            output_name: None,
            monitoring: false,
        }
    }
}

impl OptionsProvider for SqueezeConfig {
    fn options(&self) -> &CompressionOptions {
        &self.options
    }

    fn gifsicle_path(&self) -> &str {
        &self.gifsicle_path
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn output_name(&self) -> Option<&str> {
        self.output_name.as_deref()
    }

    fn monitoring_enabled(&self) -> bool {
        self.monitoring
    }
}

impl Validate for SqueezeConfig {
    fn validate(&self) -> Result<()> {
        self.options.validate()?;
        validation::validate_non_empty_string("gifsicle_path", &self.gifsicle_path)?;
        validation::validate_positive_number("timeout_seconds", self.timeout_seconds, 1)?;
        validation::validate_path("output_dir", &self.output_dir)?;
        if let Some(name) = &self.output_name {
            validation::validate_file_name("output_name", name, "gif")?;
        }
        Ok(())
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "gif-squeeze")]
#[command(about = "Compress a GIF with gifsicle and report the savings")]
pub struct CliConfig {
    /// Input GIF file to compress
    pub gif: PathBuf,

    /// Optimization level (1-3). Higher = better compression but slower
    #[arg(short = 'O', long)]
    pub optimization_level: Option<u8>,

    /// Lossy compression level (20-200). Lower = better quality. Omit for lossless
    #[arg(long)]
    pub lossy_compression: Option<u32>,

    /// Reduce to this many colors (2-256)
    #[arg(long)]
    pub colors: Option<u32>,

    /// Scale factor (0.1-1.0)
    #[arg(long)]
    pub scale: Option<f64>,

    /// Resize to this width in pixels, keeping aspect ratio. Overrides height and scale
    #[arg(long)]
    pub resize_width: Option<u32>,

    /// Resize to this height in pixels, keeping aspect ratio. Overrides scale
    #[arg(long)]
    pub resize_height: Option<u32>,

    /// Unoptimize before compressing (useful for already-optimized GIFs)
    #[arg(long)]
    pub unoptimize: bool,

    /// Directory the compressed GIF is written to
    #[arg(long)]
    pub output_dir: Option<String>,

    /// File name of the compressed GIF (default: <input>.compressed.gif)
    #[arg(long)]
    pub output_name: Option<String>,

    /// TOML preset file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Path to the gifsicle executable
    #[arg(long)]
    pub gifsicle: Option<String>,

    /// Seconds before gifsicle is killed
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Validate and print the gifsicle command without running it
    #[arg(long)]
    pub dry_run: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Sample gifsicle CPU and memory while it runs
    #[arg(long)]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// CLI 參數 > 預設檔 > 內建預設
    pub fn resolve(&self, preset: Option<&toml_config::TomlConfig>) -> SqueezeConfig {
        let mut config = preset
            .map(toml_config::TomlConfig::to_squeeze_config)
            .unwrap_or_default();

        let options = &mut config.options;
        if let Some(level) = self.optimization_level {
            options.optimization_level = level;
        }
        if self.lossy_compression.is_some() {
            options.lossy_compression = self.lossy_compression;
        }
        if self.colors.is_some() {
            options.colors = self.colors;
        }
        if self.scale.is_some() {
            options.scale = self.scale;
        }
        if self.resize_width.is_some() {
            options.resize_width = self.resize_width;
        }
        if self.resize_height.is_some() {
            options.resize_height = self.resize_height;
        }
        if self.unoptimize {
            options.unoptimize = true;
        }

        if let Some(path) = &self.gifsicle {
            config.gifsicle_path = path.clone();
        }
        if let Some(timeout) = self.timeout {
            config.timeout_seconds = timeout;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if self.output_name.is_some() {
            config.output_name = self.output_name.clone();
        }
        if self.monitor {
            config.monitoring = true;
        }

        config
    }
}
