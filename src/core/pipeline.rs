use crate::core::command::GifsicleCommand;
use crate::core::runner::GifsicleRunner;
use crate::core::source::{
    check_gif_bytes, check_gif_file, has_gif_signature, read_header, GifSource,
};
use crate::core::{CompressedGif, CompressionOptions, OptionsProvider, Pipeline, PreparedInput, Storage};
use crate::utils::error::{Result, SqueezeError};
use reqwest::Client;
use std::path::Path;

const WORKDIR_PREFIX: &str = "gif-squeeze-";
const STAGED_INPUT: &str = "input.gif";
const COMPRESSED_OUTPUT: &str = "compressed.gif";

pub struct GifsiclePipeline<S: Storage, C: OptionsProvider> {
    storage: S,
    config: C,
    source: GifSource,
    runner: GifsicleRunner,
    client: Client,
}

impl<S: Storage, C: OptionsProvider> GifsiclePipeline<S, C> {
    pub fn new(storage: S, config: C, source: GifSource) -> Self {
        let runner = GifsicleRunner::new(config.gifsicle_path(), config.timeout_seconds())
            .with_monitoring(config.monitoring_enabled());

        Self {
            storage,
            config,
            source,
            runner,
            client: Client::new(),
        }
    }

    pub fn runner(&self) -> &GifsicleRunner {
        &self.runner
    }

    /// 沒指定時用 `<原檔名>.compressed.gif`
    pub fn output_name(&self, input_name: &str) -> String {
        match self.config.output_name() {
            Some(name) => name.to_string(),
            None => compressed_file_name(input_name, None),
        }
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("Downloading GIF from: {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        tracing::debug!("Download response status: {}", response.status());

        let data = response.bytes().await?;
        Ok(data.to_vec())
    }

    async fn stage_bytes(
        &self,
        workdir: tempfile::TempDir,
        name: String,
        data: Vec<u8>,
    ) -> Result<PreparedInput> {
        check_gif_bytes(&name, &data)?;

        let path = workdir.path().join(STAGED_INPUT);
        tokio::fs::write(&path, &data).await?;
        tracing::debug!("Staged {} bytes at {}", data.len(), path.display());

        Ok(PreparedInput {
            workdir,
            path,
            name,
            size: data.len() as u64,
            info: None,
        })
    }
}

/// `<stem>.compressed.gif`，有 tag 時為 `<stem>.<tag>.compressed.gif`
pub fn compressed_file_name(input_name: &str, tag: Option<&str>) -> String {
    let stem = Path::new(input_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "output".to_string());

    let tag: Option<String> = tag
        .map(|t| {
            t.chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
                .collect()
        })
        .filter(|t: &String| !t.is_empty());

    match tag {
        Some(tag) => format!("{}.{}.compressed.gif", stem, tag),
        None => format!("{}.compressed.gif", stem),
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: OptionsProvider> Pipeline for GifsiclePipeline<S, C> {
    fn options(&self) -> &CompressionOptions {
        self.config.options()
    }

    async fn inspect(&self) -> Result<PreparedInput> {
        let workdir = tempfile::Builder::new().prefix(WORKDIR_PREFIX).tempdir()?;
        let name = self.source.display_name();

        let mut prepared = match &self.source {
            GifSource::Path(path) => {
                // 本機檔案直接使用，不複製
                let size = check_gif_file(path).await?;
                PreparedInput {
                    workdir,
                    path: path.clone(),
                    name,
                    size,
                    info: None,
                }
            }
            GifSource::Bytes { data, .. } => self.stage_bytes(workdir, name, data.clone()).await?,
            GifSource::StorageKey(key) => {
                let data = self.storage.read_file(key).await?;
                self.stage_bytes(workdir, name, data).await?
            }
            GifSource::Url(url) => {
                let data = self.download(url).await?;
                self.stage_bytes(workdir, name, data).await?
            }
        };

        prepared.info = self.runner.info(&prepared.path).await;
        Ok(prepared)
    }

    async fn compress(&self, input: PreparedInput) -> Result<CompressedGif> {
        let options = self.config.options();
        let output_path = input.workdir.path().join(COMPRESSED_OUTPUT);

        for field in options.shadowed_resize_fields() {
            tracing::warn!(
                "⚠️ {} ignored: only one resize is applied (width > height > scale)",
                field
            );
        }

        let command =
            GifsicleCommand::compress(self.runner.program(), options, &input.path, &output_path);
        tracing::info!("🔧 Command: {}", command.display());

        self.runner.run(&command).await?;

        let size = match tokio::fs::metadata(&output_path).await {
            Ok(metadata) => metadata.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SqueezeError::InvalidOutput {
                    reason: "no output file was written".to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        if !has_gif_signature(&read_header(&output_path).await?) {
            return Err(SqueezeError::InvalidOutput {
                reason: format!("output is not a well-formed GIF ({} bytes)", size),
            });
        }

        if options.is_lossless() && size > input.size {
            tracing::warn!(
                "⚠️ Lossless output ({} bytes) is larger than the input ({} bytes)",
                size,
                input.size
            );
        }

        let info = self.runner.info(&output_path).await;

        Ok(CompressedGif {
            input,
            path: output_path,
            size,
            info,
            command: command.display(),
        })
    }

    async fn store(&self, output: &CompressedGif) -> Result<String> {
        let name = self.output_name(&output.input.name);
        let data = tokio::fs::read(&output.path).await?;

        tracing::debug!("Writing {} ({} bytes) to storage", name, data.len());
        let location = self.storage.write_file(&name, &data).await?;
        tracing::debug!("Compressed GIF saved to {}", location);

        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CompressionOptions;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put(&self, path: &str, data: &[u8]) {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                SqueezeError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(format!("mock://{}", path))
        }
    }

    struct MockConfig {
        options: CompressionOptions,
        output_name: Option<String>,
    }

    impl MockConfig {
        fn new() -> Self {
            Self {
                options: CompressionOptions::default(),
                output_name: None,
            }
        }
    }

    impl OptionsProvider for MockConfig {
        fn options(&self) -> &CompressionOptions {
            &self.options
        }

        fn gifsicle_path(&self) -> &str {
            "/nonexistent/gifsicle"
        }

        fn timeout_seconds(&self) -> u64 {
            5
        }

        fn output_name(&self) -> Option<&str> {
            self.output_name.as_deref()
        }
    }

    #[test]
    fn test_output_name_defaults_to_input_stem() {
        let pipeline = GifsiclePipeline::new(
            MockStorage::new(),
            MockConfig::new(),
            GifSource::StorageKey("cat.gif".to_string()),
        );
        assert_eq!(pipeline.output_name("cat.gif"), "cat.compressed.gif");
        assert_eq!(pipeline.output_name("archive.tar.gif"), "archive.tar.compressed.gif");
        assert_eq!(pipeline.output_name(""), "output.compressed.gif");
        assert_eq!(
            compressed_file_name("cat.gif", Some("a1b2/c3")),
            "cat.a1b2c3.compressed.gif"
        );
        assert_eq!(compressed_file_name("cat.gif", Some("//")), "cat.compressed.gif");

        let mut config = MockConfig::new();
        config.output_name = Some("small.gif".to_string());
        let pipeline = GifsiclePipeline::new(
            MockStorage::new(),
            config,
            GifSource::StorageKey("cat.gif".to_string()),
        );
        assert_eq!(pipeline.output_name("cat.gif"), "small.gif");
    }

    #[tokio::test]
    async fn test_inspect_stages_storage_input() {
        let storage = MockStorage::new();
        storage.put("uploads/cat.gif", b"GIF89a\x01\x00\x01\x00;").await;

        let pipeline = GifsiclePipeline::new(
            storage,
            MockConfig::new(),
            GifSource::StorageKey("uploads/cat.gif".to_string()),
        );

        // gifsicle 不存在，info 應該是 None 而不是錯誤
        let prepared = pipeline.inspect().await.unwrap();
        assert_eq!(prepared.name, "cat.gif");
        assert_eq!(prepared.size, 11);
        assert!(prepared.path.starts_with(prepared.workdir.path()));
        assert!(prepared.path.exists());
        assert!(prepared.info.is_none());
    }

    #[tokio::test]
    async fn test_inspect_rejects_corrupt_bytes() {
        let pipeline = GifsiclePipeline::new(
            MockStorage::new(),
            MockConfig::new(),
            GifSource::Bytes {
                name: "fake.gif".to_string(),
                data: b"<html>not a gif</html>".to_vec(),
            },
        );

        let err = pipeline.inspect().await.unwrap_err();
        assert!(matches!(err, SqueezeError::InputError { .. }));
    }

    #[tokio::test]
    async fn test_inspect_missing_storage_key() {
        let pipeline = GifsiclePipeline::new(
            MockStorage::new(),
            MockConfig::new(),
            GifSource::StorageKey("missing.gif".to_string()),
        );
        assert!(pipeline.inspect().await.is_err());
    }

    #[tokio::test]
    async fn test_compress_without_gifsicle_is_unavailable() {
        let pipeline = GifsiclePipeline::new(
            MockStorage::new(),
            MockConfig::new(),
            GifSource::Bytes {
                name: "cat.gif".to_string(),
                data: b"GIF89a\x01\x00\x01\x00;".to_vec(),
            },
        );

        let prepared = pipeline.inspect().await.unwrap();
        let err = pipeline.compress(prepared).await.unwrap_err();
        assert!(matches!(err, SqueezeError::ToolUnavailable { .. }));
    }
}
