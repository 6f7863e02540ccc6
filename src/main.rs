use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use vivavoce::audio::{CaptureDeviceManager, CpalCaptureFactory};
use vivavoce::speech::{SpeechPlayback, SpokenQuestionReader, TtsClient};
use vivavoce::upload::BackendClient;
use vivavoce::{create_router, AppState, Config, SessionDeps};

#[derive(Parser)]
#[command(name = "vivavoce", about = "Timed spoken-question practice interview service")]
struct Args {
    /// Path to the configuration file (without extension)
    #[arg(long, default_value = "config/vivavoce")]
    config: String,

    /// Override the HTTP port from the config file
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("Vivavoce v0.1.0");
    info!("Loaded config: {}", cfg.service.name);

    let api_key = std::env::var(&cfg.speech.api_key_env).unwrap_or_default();
    if api_key.is_empty() {
        warn!(
            "{} is not set; question playback will fall back to the reading allowance",
            cfg.speech.api_key_env
        );
    }

    let tts = TtsClient::new(
        cfg.speech.endpoint.clone(),
        api_key,
        cfg.speech.model.clone(),
        cfg.speech.voice.clone(),
        cfg.speech.speed,
    );
    let speech: Arc<dyn SpeechPlayback> = Arc::new(SpokenQuestionReader::new(tts));

    let devices =
        CaptureDeviceManager::new(Arc::new(CpalCaptureFactory), cfg.audio.to_capture_config());

    let uploader = Arc::new(
        BackendClient::new(
            cfg.backend.base_url.clone(),
            Duration::from_secs(cfg.backend.request_timeout_secs),
        )
        .context("Failed to create backend client")?,
    );

    let deps = SessionDeps {
        speech,
        devices,
        uploader,
    };

    let state = AppState::new(cfg.session.to_session_config(), deps);
    let router = create_router(state);

    let port = args.port.unwrap_or(cfg.service.http.port);
    let addr = format!("{}:{}", cfg.service.http.bind, port);

    info!("HTTP server listening on {}", addr);
    info!("Interview backend: {}", cfg.backend.base_url);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, router)
        .await
        .context("HTTP server failed")?;

    Ok(())
}
