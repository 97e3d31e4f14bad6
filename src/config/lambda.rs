use crate::core::command::DEFAULT_GIFSICLE;
use crate::core::runner::DEFAULT_TIMEOUT_SECONDS;
use crate::core::Storage;
use crate::utils::error::{Result, SqueezeError};
use crate::utils::validation::{self, Validate};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use std::env;

#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub s3_bucket: String,
    pub s3_prefix: String,
    pub s3_region: String,
    pub gifsicle_path: String,
    pub timeout_seconds: u64,
}

impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        let timeout_seconds = match env::var("GIFSICLE_TIMEOUT_SECONDS") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| SqueezeError::InvalidConfigValueError {
                    field: "GIFSICLE_TIMEOUT_SECONDS".to_string(),
                    value: raw.clone(),
                    reason: "Must be a whole number of seconds".to_string(),
                })?,
            Err(_) => DEFAULT_TIMEOUT_SECONDS,
        };

        Ok(Self {
            s3_bucket: env::var("S3_BUCKET").map_err(|_| SqueezeError::ConfigError {
                message: "S3_BUCKET environment variable is required".to_string(),
            })?,
            s3_prefix: env::var("S3_PREFIX").unwrap_or_else(|_| "gif-squeeze".to_string()),
            s3_region: env::var("S3_REGION").unwrap_or_else(|_| "ap-southeast-2".to_string()),
            gifsicle_path: env::var("GIFSICLE_PATH")
                .unwrap_or_else(|_| DEFAULT_GIFSICLE.to_string()),
            timeout_seconds,
        })
    }
}

impl Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        validate_s3_bucket_name("s3_bucket", &self.s3_bucket)?;
        validation::validate_non_empty_string("s3_prefix", &self.s3_prefix)?;
        validate_aws_region("s3_region", &self.s3_region)?;
        validation::validate_non_empty_string("gifsicle_path", &self.gifsicle_path)?;
        validation::validate_positive_number("timeout_seconds", self.timeout_seconds, 1)?;
        // Lambda 單次執行最長 15 分鐘
        validation::validate_range("timeout_seconds", self.timeout_seconds, 1, 900)?;

        tracing::info!("✅ Lambda configuration validation passed");
        Ok(())
    }
}

fn validate_s3_bucket_name(field_name: &str, bucket_name: &str) -> Result<()> {
    if bucket_name.len() < 3 || bucket_name.len() > 63 {
        return Err(SqueezeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: bucket_name.to_string(),
            reason: "S3 bucket name must be between 3 and 63 characters".to_string(),
        });
    }

    if !bucket_name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return Err(SqueezeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: bucket_name.to_string(),
            reason: "S3 bucket name can only contain lowercase letters, numbers, hyphens, and dots"
                .to_string(),
        });
    }

    if bucket_name.starts_with('-') || bucket_name.ends_with('-') {
        return Err(SqueezeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: bucket_name.to_string(),
            reason: "S3 bucket name cannot start or end with a hyphen".to_string(),
        });
    }

    Ok(())
}

fn validate_aws_region(field_name: &str, region: &str) -> Result<()> {
    validation::validate_non_empty_string(field_name, region)?;

    if !region
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(SqueezeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: region.to_string(),
            reason: "AWS region can only contain lowercase letters, numbers, and hyphens"
                .to_string(),
        });
    }

    Ok(())
}

/// 讀取用完整 key，寫入時加上 prefix
#[derive(Debug, Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
    prefix: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: String, prefix: String) -> Self {
        Self {
            client,
            bucket,
            prefix,
        }
    }

    fn output_key(&self, name: &str) -> String {
        let prefix = self.prefix.trim_end_matches('/');
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", prefix, name)
        }
    }
}

impl Storage for S3Storage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| {
                SqueezeError::storage(format!(
                    "Failed to read s3://{}/{}: {}",
                    self.bucket,
                    path,
                    e.into_service_error()
                ))
            })?;

        let data = resp.body.collect().await.map_err(|e| {
            SqueezeError::storage(format!("Failed to collect S3 data: {}", e))
        })?;

        Ok(data.into_bytes().to_vec())
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
        let key = self.output_key(path);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type("image/gif")
            .body(ByteStream::from(data.to_vec()))
            .send()
            .await
            .map_err(|e| {
                SqueezeError::storage(format!(
                    "Failed to write s3://{}/{}: {}",
                    self.bucket,
                    key,
                    e.into_service_error()
                ))
            })?;

        Ok(format!("s3://{}/{}", self.bucket, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LambdaConfig {
        LambdaConfig {
            s3_bucket: "gif-squeeze-output".to_string(),
            s3_prefix: "compressed".to_string(),
            s3_region: "ap-southeast-2".to_string(),
            gifsicle_path: "/opt/bin/gifsicle".to_string(),
            timeout_seconds: 120,
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_invalid_bucket_and_region() {
        let mut bad_bucket = config();
        bad_bucket.s3_bucket = "Bad_Bucket".to_string();
        assert!(bad_bucket.validate().is_err());

        let mut bad_region = config();
        bad_region.s3_region = "AP SOUTHEAST".to_string();
        assert!(bad_region.validate().is_err());

        let mut long_timeout = config();
        long_timeout.timeout_seconds = 3600;
        assert!(long_timeout.validate().is_err());
    }
}
