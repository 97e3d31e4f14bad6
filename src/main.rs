use clap::Parser;
use gif_squeeze::config::toml_config::TomlConfig;
use gif_squeeze::core::command::GifsicleCommand;
use gif_squeeze::core::Pipeline;
use gif_squeeze::utils::error::{ErrorSeverity, SqueezeError};
use gif_squeeze::utils::{logger, validation::Validate};
use gif_squeeze::{CliConfig, CompressionEngine, GifSource, GifsiclePipeline, LocalStorage};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);
    tracing::info!("🚀 Starting gif-squeeze");

    // 載入預設檔
    let preset = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading preset from: {}", path.display());
            match TomlConfig::from_file(path) {
                Ok(preset) => Some(preset),
                Err(e) => fail(&e),
            }
        }
        None => None,
    };

    let config = cli.resolve(preset.as_ref());
    if cli.verbose {
        tracing::debug!("Resolved config: {:?}", config);
    }

    // 參數不合法時在呼叫 gifsicle 之前就結束
    if let Err(e) = config.validate() {
        fail(&e);
    }

    let source = GifSource::Path(cli.gif.clone());
    let input_name = source.display_name();
    let output_dir = config.output_dir.clone();
    let storage = LocalStorage::new(output_dir.clone());
    let pipeline = GifsiclePipeline::new(storage, config, source);

    if cli.dry_run {
        let output = Path::new(&output_dir).join(pipeline.output_name(&input_name));
        let command = GifsicleCommand::compress(
            pipeline.runner().program(),
            pipeline.options(),
            &cli.gif,
            &output,
        );
        tracing::info!("🔍 DRY RUN MODE - gifsicle will not be executed");
        println!("{}", command.display());
        return Ok(());
    }

    match pipeline.runner().version().await {
        Ok(version) => tracing::info!("✓ Gifsicle version: {}", version),
        Err(e) => fail(&e),
    }

    let engine = CompressionEngine::new(pipeline);

    match engine.run().await {
        Ok(report) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.render());
            }
        }
        Err(e) => fail(&e),
    }

    Ok(())
}

fn fail(e: &SqueezeError) -> ! {
    tracing::error!(
        "❌ Compression failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
