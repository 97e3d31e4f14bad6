use crate::domain::model::{CompressedGif, CompressionOptions, PreparedInput};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub trait OptionsProvider: Send + Sync {
    fn options(&self) -> &CompressionOptions;
    fn gifsicle_path(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
    fn output_name(&self) -> Option<&str>;
    fn monitoring_enabled(&self) -> bool {
        false
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    fn options(&self) -> &CompressionOptions;
    async fn inspect(&self) -> Result<PreparedInput>;
    async fn compress(&self, input: PreparedInput) -> Result<CompressedGif>;
    async fn store(&self, output: &CompressedGif) -> Result<String>;
}
