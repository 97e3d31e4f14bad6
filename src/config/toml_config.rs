use crate::config::{SqueezeConfig, DEFAULT_OUTPUT_DIR};
use crate::core::command::DEFAULT_GIFSICLE;
use crate::core::runner::DEFAULT_TIMEOUT_SECONDS;
use crate::core::CompressionOptions;
use crate::utils::error::{Result, SqueezeError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

/// 壓縮預設檔，每個區塊都可以省略
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub compression: CompressionOptions,
    pub gifsicle: GifsicleSection,
    pub output: OutputSection,
    pub monitoring: MonitoringSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GifsicleSection {
    pub path: String,
    pub timeout_seconds: u64,
}

impl Default for GifsicleSection {
    fn default() -> Self {
        Self {
            path: DEFAULT_GIFSICLE.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub directory: String,
    pub name: Option<String>,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            directory: DEFAULT_OUTPUT_DIR.to_string(),
            name: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringSection {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入設定
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| SqueezeError::ConfigError {
            message: format!("Cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析設定
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| SqueezeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換 ${VAR_NAME}；未設定的變數原樣保留
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn to_squeeze_config(&self) -> SqueezeConfig {
        SqueezeConfig {
            options: self.compression.clone(),
            gifsicle_path: self.gifsicle.path.clone(),
            timeout_seconds: self.gifsicle.timeout_seconds,
            output_dir: self.output.directory.clone(),
            output_name: self.output.name.clone(),
            monitoring: self.monitoring.enabled,
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.compression.validate()?;
        validation::validate_non_empty_string("gifsicle.path", &self.gifsicle.path)?;
        validation::validate_positive_number("gifsicle.timeout_seconds", self.gifsicle.timeout_seconds, 1)?;
        validation::validate_path("output.directory", &self.output.directory)?;
        if let Some(name) = &self.output.name {
            validation::validate_file_name("output.name", name, "gif")?;
        }
        Ok(())
    }
}
