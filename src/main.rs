use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use kerf::application::services::{Executor, ExecutorOptions, ScratchSpace};
use kerf::infrastructure::audio::{FfmpegAudioEngine, check_ffmpeg_binary};
use kerf::infrastructure::observability::{TracingConfig, init_tracing};
use kerf::infrastructure::storage::{ObjectStoreTransfer, StoreFactory};
use kerf::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load settings")?;

    init_tracing(&TracingConfig::from_settings(&settings.logging, environment))
        .context("Failed to initialize tracing")?;

    let resolver = StoreFactory::create(&settings.storage).context("Failed to configure storage")?;
    let transfer = Arc::new(ObjectStoreTransfer::new(resolver));

    let ffmpeg = PathBuf::from(&settings.audio.ffmpeg_path);
    match check_ffmpeg_binary(&ffmpeg) {
        Ok(version) => tracing::info!(version = %version, "ffmpeg available"),
        Err(e) => tracing::warn!(
            error = %e,
            "ffmpeg unavailable; only natively decodable input and raw/wav output will work"
        ),
    }
    let engine = Arc::new(FfmpegAudioEngine::new(ffmpeg));

    let executor = Executor::new(
        transfer.clone(),
        transfer,
        engine,
        ScratchSpace::new(settings.audio.scratch_dir.clone()),
    )
    .with_options(ExecutorOptions {
        default_format: settings.audio.default_format.clone(),
        segment_concurrency: settings.audio.segment_concurrency,
    });

    let state = AppState::new(Arc::new(executor), settings.service_name.clone());
    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;
    tracing::info!(
        service = %settings.service_name,
        environment = %environment,
        "Listening on {}",
        addr
    );

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
