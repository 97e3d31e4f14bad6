use crate::core::{CompressionReport, Pipeline};
use crate::domain::model::{compression_ratio, reduction_percent, GifInfo};
use crate::utils::error::Result;
use crate::utils::format::format_size;
use crate::utils::validation::Validate;
use std::time::Instant;

pub struct CompressionEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> CompressionEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<CompressionReport> {
        let started = Instant::now();
        let options = self.pipeline.options();

        // 參數不合法就不要呼叫 gifsicle
        options.validate()?;

        banner("GIF COMPRESSION STARTING");

        let input = self.pipeline.inspect().await?;
        tracing::info!("📊 Input file: {}", input.name);
        tracing::info!("📦 Input size: {}", format_size(input.size));
        log_info(false, input.info.as_ref());

        tracing::info!("⚙️  Optimization level: {}", options.optimization_level);
        if options.unoptimize {
            tracing::info!("🔄 Unoptimizing before compression");
        }
        match options.lossy_compression {
            Some(level) => tracing::info!("💥 Lossy compression: {}", level),
            None => tracing::info!("✨ Lossless compression"),
        }
        if let Some(colors) = options.colors {
            tracing::info!("🎨 Reducing to {} colors", colors);
        }
        if let Some(resize) = options.effective_resize() {
            tracing::info!("📏 Resizing to {}", resize);
        }

        banner("PROCESSING...");
        let compressed = self.pipeline.compress(input).await?;

        let input_size = compressed.input.size;
        let reduction = reduction_percent(input_size, compressed.size);
        let ratio = compression_ratio(input_size, compressed.size);

        banner("COMPRESSION COMPLETE");
        tracing::info!("📦 Output size: {}", format_size(compressed.size));
        tracing::info!("💾 Size reduction: {:.1}%", reduction);
        if let Some(ratio) = ratio {
            tracing::info!("📉 Compression ratio: {:.2}x", ratio);
        }
        log_info(true, compressed.info.as_ref());

        let output_location = self.pipeline.store(&compressed).await?;
        tracing::info!("✅ Success! Saved to {}", output_location);

        Ok(CompressionReport {
            input_name: compressed.input.name.clone(),
            input_size,
            input_info: compressed.input.info.clone(),
            output_size: compressed.size,
            output_info: compressed.info.clone(),
            output_location,
            reduction_percent: reduction,
            compression_ratio: ratio,
            options: options.clone(),
            command: compressed.command.clone(),
            elapsed_ms: started.elapsed().as_millis() as u64,
            completed_at: chrono::Utc::now(),
        })
    }
}

fn banner(title: &str) {
    let rule = "=".repeat(60);
    tracing::info!("{}", rule);
    tracing::info!("{}", title);
    tracing::info!("{}", rule);
}

fn log_info(output: bool, info: Option<&GifInfo>) {
    match info {
        Some(info) => {
            for line in info.summary_lines(output) {
                tracing::info!("{}", line);
            }
        }
        None if output => tracing::debug!("No output GIF info available"),
        None => tracing::debug!("No GIF info available"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CompressedGif, CompressionOptions, PreparedInput};
    use crate::utils::error::SqueezeError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakePipeline {
        options: CompressionOptions,
        output_size: u64,
        compress_calls: AtomicUsize,
    }

    impl FakePipeline {
        fn new(options: CompressionOptions, output_size: u64) -> Self {
            Self {
                options,
                output_size,
                compress_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl Pipeline for FakePipeline {
        fn options(&self) -> &CompressionOptions {
            &self.options
        }

        async fn inspect(&self) -> Result<PreparedInput> {
            let workdir = tempfile::tempdir()?;
            let path = workdir.path().join("input.gif");
            Ok(PreparedInput {
                workdir,
                path,
                name: "cat.gif".to_string(),
                size: 1000,
                info: Some(GifInfo {
                    frames: 4,
                    width: Some(64),
                    height: Some(64),
                    colors: Some(256),
                }),
            })
        }

        async fn compress(&self, input: PreparedInput) -> Result<CompressedGif> {
            self.compress_calls.fetch_add(1, Ordering::SeqCst);
            let path = input.workdir.path().join("compressed.gif");
            Ok(CompressedGif {
                input,
                path,
                size: self.output_size,
                info: None,
                command: "gifsicle -O3 input.gif -o compressed.gif".to_string(),
            })
        }

        async fn store(&self, _output: &CompressedGif) -> Result<String> {
            Ok("memory://cat.compressed.gif".to_string())
        }
    }

    #[tokio::test]
    async fn test_run_builds_report() {
        let engine = CompressionEngine::new(FakePipeline::new(CompressionOptions::default(), 600));
        let report = engine.run().await.unwrap();

        assert_eq!(report.input_name, "cat.gif");
        assert_eq!(report.input_size, 1000);
        assert_eq!(report.output_size, 600);
        assert!((report.reduction_percent - 40.0).abs() < 0.05);
        assert_eq!(report.compression_ratio.map(|r| (r * 100.0).round()), Some(167.0));
        assert_eq!(report.output_location, "memory://cat.compressed.gif");
        assert_eq!(report.input_info.as_ref().map(|i| i.frames), Some(4));
        assert!(report.output_info.is_none());
        assert_eq!(engine.pipeline().compress_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_options_never_compress() {
        for options in [
            CompressionOptions {
                optimization_level: 4,
                ..CompressionOptions::default()
            },
            CompressionOptions {
                scale: Some(1.5),
                ..CompressionOptions::default()
            },
        ] {
            let engine = CompressionEngine::new(FakePipeline::new(options, 600));
            let err = engine.run().await.unwrap_err();

            assert!(matches!(err, SqueezeError::InvalidConfigValueError { .. }));
            assert_eq!(engine.pipeline().compress_calls.load(Ordering::SeqCst), 0);
        }
    }
}
