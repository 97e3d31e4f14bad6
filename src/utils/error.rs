use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqueezeError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Download failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid input GIF {path}: {reason}")]
    InputError { path: String, reason: String },

    #[error("Gifsicle not available: {message}")]
    ToolUnavailable { message: String },

    #[error("Gifsicle failed with return code {}", describe_exit_code(.code))]
    ToolFailed { code: Option<i32>, output: String },

    #[error("Gifsicle produced an unusable output: {reason}")]
    InvalidOutput { reason: String },

    #[error("Gifsicle did not finish within {seconds}s")]
    ToolTimeout { seconds: u64 },

    #[error("Storage error: {message}")]
    StorageError { message: String },
}

pub type Result<T> = std::result::Result<T, SqueezeError>;

fn describe_exit_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none (killed by signal)".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Tool,
    Network,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SqueezeError {
    pub fn input(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InputError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::StorageError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::InputError { .. } => ErrorCategory::Input,
            Self::ToolUnavailable { .. }
            | Self::ToolFailed { .. }
            | Self::InvalidOutput { .. }
            | Self::ToolTimeout { .. } => ErrorCategory::Tool,
            Self::HttpError(_) => ErrorCategory::Network,
            Self::IoError(_) | Self::SerializationError(_) | Self::StorageError { .. } => {
                ErrorCategory::Storage
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 網路與逾時可以重送同一個請求
            Self::HttpError(_) | Self::ToolTimeout { .. } => ErrorSeverity::Medium,
            Self::ToolUnavailable { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::InvalidConfigValueError { field, .. } => {
                format!("Adjust `{}` to a value inside its allowed range", field)
            }
            Self::MissingConfigError { field } => format!("Provide a value for `{}`", field),
            Self::ConfigError { .. } | Self::ConfigValidationError { .. } => {
                "Check the preset file and environment variables".to_string()
            }
            Self::InputError { .. } => {
                "Make sure the input exists and is a valid GIF87a/GIF89a file".to_string()
            }
            Self::ToolUnavailable { .. } => {
                "Install gifsicle or point --gifsicle / GIFSICLE_PATH at the binary".to_string()
            }
            Self::ToolFailed { .. } | Self::InvalidOutput { .. } => {
                "Inspect the gifsicle output above; the input may be damaged or the options unsupported"
                    .to_string()
            }
            Self::ToolTimeout { .. } => {
                "Raise the timeout or lower the optimization level for large GIFs".to_string()
            }
            Self::HttpError(_) => "Check that the GIF URL is reachable and try again".to_string(),
            Self::IoError(_) | Self::StorageError { .. } | Self::SerializationError(_) => {
                "Check the output location permissions and free space".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ToolFailed { output, .. } if !output.trim().is_empty() => {
                format!("{}\n{}", self, output.trim_end())
            }
            _ => self.to_string(),
        }
    }
}
