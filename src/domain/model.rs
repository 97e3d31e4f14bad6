use crate::utils::error::Result;
use crate::utils::format::format_size;
use crate::utils::validation::{self, Validate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tempfile::TempDir;

pub const MIN_OPTIMIZATION_LEVEL: u8 = 1;
pub const MAX_OPTIMIZATION_LEVEL: u8 = 3;
pub const MIN_LOSSY: u32 = 20;
pub const MAX_LOSSY: u32 = 200;
pub const MIN_COLORS: u32 = 2;
pub const MAX_COLORS: u32 = 256;
pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 1.0;

/// gifsicle 的壓縮參數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionOptions {
    pub optimization_level: u8,
    pub lossy_compression: Option<u32>,
    pub colors: Option<u32>,
    pub scale: Option<f64>,
    pub resize_width: Option<u32>,
    pub resize_height: Option<u32>,
    pub unoptimize: bool,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            optimization_level: MAX_OPTIMIZATION_LEVEL,
            lossy_compression: None,
            colors: None,
            scale: None,
            resize_width: None,
            resize_height: None,
            unoptimize: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resize {
    Width(u32),
    Height(u32),
    Scale(f64),
}

impl fmt::Display for Resize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resize::Width(w) => write!(f, "width {}px", w),
            Resize::Height(h) => write!(f, "height {}px", h),
            Resize::Scale(s) => write!(f, "{}x", s),
        }
    }
}

impl CompressionOptions {
    pub fn is_lossless(&self) -> bool {
        self.lossy_compression.is_none()
    }

    /// 寬 > 高 > 縮放比例，只會套用其中一個
    pub fn effective_resize(&self) -> Option<Resize> {
        self.resize_width
            .map(Resize::Width)
            .or(self.resize_height.map(Resize::Height))
            .or(self.scale.map(Resize::Scale))
    }

    /// 有設定但被較高優先序覆蓋的欄位
    pub fn shadowed_resize_fields(&self) -> Vec<&'static str> {
        let mut shadowed = Vec::new();
        match self.effective_resize() {
            Some(Resize::Width(_)) => {
                if self.resize_height.is_some() {
                    shadowed.push("resize_height");
                }
                if self.scale.is_some() {
                    shadowed.push("scale");
                }
            }
            Some(Resize::Height(_)) => {
                if self.scale.is_some() {
                    shadowed.push("scale");
                }
            }
            Some(Resize::Scale(_)) | None => {}
        }
        shadowed
    }
}

impl Validate for CompressionOptions {
    fn validate(&self) -> Result<()> {
        validation::validate_range(
            "optimization_level",
            self.optimization_level,
            MIN_OPTIMIZATION_LEVEL,
            MAX_OPTIMIZATION_LEVEL,
        )?;
        validation::validate_optional_range(
            "lossy_compression",
            self.lossy_compression,
            MIN_LOSSY,
            MAX_LOSSY,
        )?;
        validation::validate_optional_range("colors", self.colors, MIN_COLORS, MAX_COLORS)?;
        validation::validate_optional_range("scale", self.scale, MIN_SCALE, MAX_SCALE)?;

        if let Some(width) = self.resize_width {
            validation::validate_positive_number("resize_width", width, 1)?;
        }
        if let Some(height) = self.resize_height {
            validation::validate_positive_number("resize_height", height, 1)?;
        }

        Ok(())
    }
}

/// `gifsicle --info` 讀回來的資訊
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GifInfo {
    pub frames: usize,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub colors: Option<u32>,
}

impl GifInfo {
    /// 報告與日誌共用的 frames / dimensions / colors 行
    pub fn summary_lines(&self, output: bool) -> Vec<String> {
        let (frames, dimensions, colors) = if output {
            ("Output frames", "Output dimensions", "Output colors")
        } else {
            ("Frames", "Dimensions", "Colors")
        };

        let mut lines = vec![format!("🎬 {}: {}", frames, self.frames)];
        if let Some(value) = self.dimensions() {
            lines.push(format!("📐 {}: {}", dimensions, value));
        }
        if let Some(value) = self.colors {
            lines.push(format!("🎨 {}: {}", colors, value));
        }
        lines
    }

    pub fn dimensions(&self) -> Option<String> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some(format!("{}x{}", w, h)),
            _ => None,
        }
    }
}

pub fn reduction_percent(input_size: u64, output_size: u64) -> f64 {
    if input_size == 0 {
        return 0.0;
    }
    (1.0 - output_size as f64 / input_size as f64) * 100.0
}

pub fn compression_ratio(input_size: u64, output_size: u64) -> Option<f64> {
    if output_size == 0 {
        return None;
    }
    Some(input_size as f64 / output_size as f64)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionReport {
    pub input_name: String,
    pub input_size: u64,
    pub input_info: Option<GifInfo>,
    pub output_size: u64,
    pub output_info: Option<GifInfo>,
    pub output_location: String,
    pub reduction_percent: f64,
    pub compression_ratio: Option<f64>,
    pub options: CompressionOptions,
    pub command: String,
    pub elapsed_ms: u64,
    pub completed_at: DateTime<Utc>,
}

impl CompressionReport {
    /// 固定寬度的文字報告，CLI 與 hosted 回應共用
    pub fn render(&self) -> String {
        let rule = "=".repeat(60);
        let mut lines = vec![
            rule.clone(),
            "GIF COMPRESSION REPORT".to_string(),
            rule.clone(),
            format!("📊 Input file: {}", self.input_name),
            format!("📦 Input size: {}", format_size(self.input_size)),
        ];
        push_info(&mut lines, false, self.input_info.as_ref());

        lines.push(String::new());
        lines.push(format!(
            "⚙️  Optimization level: {}",
            self.options.optimization_level
        ));
        if self.options.unoptimize {
            lines.push("🔄 Unoptimized before compression".to_string());
        }
        match self.options.lossy_compression {
            Some(level) => lines.push(format!("💥 Lossy compression: {}", level)),
            None => lines.push("✨ Lossless compression".to_string()),
        }
        if let Some(colors) = self.options.colors {
            lines.push(format!("🎨 Reduced to {} colors", colors));
        }
        if let Some(resize) = self.options.effective_resize() {
            lines.push(format!("📏 Resized to {}", resize));
        }
        lines.push(format!("🔧 Command: {}", self.command));

        lines.push(String::new());
        lines.push(format!("📦 Output size: {}", format_size(self.output_size)));
        lines.push(format!("💾 Size reduction: {:.1}%", self.reduction_percent));
        match self.compression_ratio {
            Some(ratio) => lines.push(format!("📉 Compression ratio: {:.2}x", ratio)),
            None => lines.push("📉 Compression ratio: n/a".to_string()),
        }
        push_info(&mut lines, true, self.output_info.as_ref());
        lines.push(format!("📁 Saved to: {}", self.output_location));
        lines.push(format!("⏱️  Took {} ms", self.elapsed_ms));
        lines.push(rule);

        lines.join("\n")
    }
}

fn push_info(lines: &mut Vec<String>, output: bool, info: Option<&GifInfo>) {
    if let Some(info) = info {
        lines.extend(info.summary_lines(output));
    }
}

/// 已放進暫存工作目錄、檢查過的輸入檔
#[derive(Debug)]
pub struct PreparedInput {
    pub workdir: TempDir,
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub info: Option<GifInfo>,
}

#[derive(Debug)]
pub struct CompressedGif {
    pub input: PreparedInput,
    pub path: PathBuf,
    pub size: u64,
    pub info: Option<GifInfo>,
    pub command: String,
}
