use crate::core::pipeline::compressed_file_name;
use crate::core::source::GifSource;
use crate::core::{CompressionOptions, CompressionReport, OptionsProvider};
use crate::utils::error::{Result, SqueezeError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};

/// hosted 入口收到的一次預測請求
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionRequest {
    pub gif_url: Option<String>,
    pub s3_key: Option<String>,
    pub output_name: Option<String>,
    #[serde(flatten)]
    pub options: CompressionOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    pub message: String,
    pub output_path: String,
    pub input_size: u64,
    pub output_size: u64,
    pub reduction_percent: f64,
    pub compression_ratio: Option<f64>,
    pub logs: String,
}

impl From<&CompressionReport> for PredictionResponse {
    fn from(report: &CompressionReport) -> Self {
        Self {
            message: "GIF compressed successfully".to_string(),
            output_path: report.output_location.clone(),
            input_size: report.input_size,
            output_size: report.output_size,
            reduction_percent: report.reduction_percent,
            compression_ratio: report.compression_ratio,
            logs: report.render(),
        }
    }
}

impl PredictionRequest {
    /// gif_url 與 s3_key 必須剛好給一個
    pub fn source(&self) -> Result<GifSource> {
        match (&self.gif_url, &self.s3_key) {
            (Some(url), None) => {
                validation::validate_url("gif_url", url)?;
                Ok(GifSource::Url(url.clone()))
            }
            (None, Some(key)) => {
                validation::validate_non_empty_string("s3_key", key)?;
                Ok(GifSource::StorageKey(key.clone()))
            }
            (Some(_), Some(_)) => Err(SqueezeError::ConfigError {
                message: "Provide either gif_url or s3_key, not both".to_string(),
            }),
            (None, None) => Err(SqueezeError::MissingConfigError {
                field: "gif_url".to_string(),
            }),
        }
    }

    /// 沒給 output_name 時把 request id 放進檔名，避免不同請求寫到同一個物件
    pub fn into_job(
        self,
        gifsicle_path: &str,
        timeout_seconds: u64,
        request_id: &str,
    ) -> PredictionJob {
        let output_name = match self.output_name {
            Some(name) => name,
            None => {
                let input_name = self
                    .source()
                    .map(|source| source.display_name())
                    .unwrap_or_default();
                compressed_file_name(&input_name, Some(request_id))
            }
        };

        PredictionJob {
            options: self.options,
            gifsicle_path: gifsicle_path.to_string(),
            timeout_seconds,
            output_name: Some(output_name),
        }
    }
}

impl Validate for PredictionRequest {
    fn validate(&self) -> Result<()> {
        self.source()?;
        self.options.validate()?;
        if let Some(name) = &self.output_name {
            validation::validate_file_name("output_name", name, "gif")?;
        }
        Ok(())
    }
}

/// 單次請求的設定
#[derive(Debug, Clone)]
pub struct PredictionJob {
    pub options: CompressionOptions,
    pub gifsicle_path: String,
    pub timeout_seconds: u64,
    pub output_name: Option<String>,
}

impl OptionsProvider for PredictionJob {
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request: PredictionRequest =
            serde_json::from_str(r#"{"gif_url": "https://example.com/cat.gif"}"#).unwrap();

        assert_eq!(request.options, CompressionOptions::default());
        assert_eq!(
            request.source().unwrap(),
            GifSource::Url("https://example.com/cat.gif".to_string())
        );
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_request_with_options() {
        let request: PredictionRequest = serde_json::from_str(
            r#"{
                "s3_key": "uploads/cat.gif",
                "optimization_level": 2,
                "lossy_compression": 80,
                "colors": 64,
                "resize_height": 120,
                "unoptimize": true,
                "output_name": "tiny.gif"
            }"#,
        )
        .unwrap();

        assert_eq!(request.options.optimization_level, 2);
        assert_eq!(request.options.lossy_compression, Some(80));
        assert_eq!(request.options.colors, Some(64));
        assert_eq!(request.options.resize_height, Some(120));
        assert!(request.options.unoptimize);
        assert!(request.validate().is_ok());

        let job = request.into_job("gifsicle", 120, "req-1");
        assert_eq!(job.output_name(), Some("tiny.gif"));
        assert_eq!(job.timeout_seconds(), 120);
        assert!(!job.monitoring_enabled());
    }

    #[test]
    fn test_request_source_rules() {
        let neither: PredictionRequest = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            neither.source(),
            Err(SqueezeError::MissingConfigError { .. })
        ));

        let both: PredictionRequest = serde_json::from_str(
            r#"{"gif_url": "https://example.com/a.gif", "s3_key": "a.gif"}"#,
        )
        .unwrap();
        assert!(both.source().is_err());

        let bad_url: PredictionRequest =
            serde_json::from_str(r#"{"gif_url": "file:///etc/passwd"}"#).unwrap();
        assert!(bad_url.validate().is_err());
    }

    #[test]
    fn test_request_rejects_out_of_range_options() {
        let request: PredictionRequest = serde_json::from_str(
            r#"{"gif_url": "https://example.com/a.gif", "optimization_level": 4}"#,
        )
        .unwrap();
        assert!(request.validate().is_err());

        let request: PredictionRequest =
            serde_json::from_str(r#"{"gif_url": "https://example.com/a.gif", "scale": 1.5}"#)
                .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_default_output_name_is_unique_per_request() {
        let request: PredictionRequest =
            serde_json::from_str(r#"{"s3_key": "uploads/cat.gif"}"#).unwrap();

        let first = request.clone().into_job("gifsicle", 120, "8f14e45f-ceea-467f");
        let second = request.into_job("gifsicle", 120, "c9f0f895-fb98-4b91");

        assert_eq!(first.output_name(), Some("cat.8f14e45f-ceea-467f.compressed.gif"));
        assert_eq!(second.output_name(), Some("cat.c9f0f895-fb98-4b91.compressed.gif"));
        assert_ne!(first.output_name(), second.output_name());
    }
}
