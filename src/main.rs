use clap::Parser;
use ocr_preprocess_server::{config, server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = config::Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from(args);

    tracing::info!(
        "Starting ocr-preprocess-server v{}",
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!(
        "Preprocessing: max_width={}, contrast={}, threshold={} ({:?}), min confidence={}",
        config.preprocess.max_width,
        config.preprocess.contrast_factor,
        config.preprocess.binarize_threshold,
        config.preprocess.binarize_method,
        config.confidence_threshold
    );

    server::run(config).await
}
