use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::Client as S3Client;
use gif_squeeze::config::lambda::{LambdaConfig, S3Storage};
use gif_squeeze::utils::error::SqueezeError;
use gif_squeeze::utils::{logger, validation::Validate};
use gif_squeeze::{
    CompressionEngine, GifsiclePipeline, GifsicleRunner, PredictionRequest, PredictionResponse,
};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};

async fn function_handler(
    event: LambdaEvent<PredictionRequest>,
    config: &LambdaConfig,
    storage: &S3Storage,
) -> Result<PredictionResponse, Error> {
    let request_id = event.context.request_id.clone();
    tracing::info!("Starting GIF compression request {}", request_id);

    let request = event.payload;
    request.validate().map_err(log_failure)?;
    let source = request.source().map_err(log_failure)?;

    let job = request.into_job(&config.gifsicle_path, config.timeout_seconds, &request_id);
    let pipeline = GifsiclePipeline::new(storage.clone(), job, source);

    let report = CompressionEngine::new(pipeline)
        .run()
        .await
        .map_err(log_failure)?;

    tracing::info!(
        "GIF compression completed: {} -> {}",
        report.input_name,
        report.output_location
    );
    Ok(PredictionResponse::from(&report))
}

fn log_failure(e: SqueezeError) -> SqueezeError {
    tracing::error!(
        "❌ Compression failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    e
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    let config = LambdaConfig::from_env()?;
    config.validate()?;

    // cold start 時確認 gifsicle 可用
    let version = GifsicleRunner::new(config.gifsicle_path.clone(), config.timeout_seconds)
        .version()
        .await?;
    tracing::info!("✓ Gifsicle version: {}", version);

    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .region(Region::new(config.s3_region.clone()))
        .force_path_style(true)
        .build();
    let storage = S3Storage::new(
        S3Client::from_conf(s3_config),
        config.s3_bucket.clone(),
        config.s3_prefix.clone(),
    );

    let config = &config;
    let storage = &storage;
    run(service_fn(move |event: LambdaEvent<PredictionRequest>| async move {
        function_handler(event, config, storage).await
    }))
    .await
}
