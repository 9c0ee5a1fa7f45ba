use anyhow::Result;
use clap::Parser;
use tracing::info;
use voice_minutes::{create_router, AppState, Config};

#[derive(Parser)]
#[command(
    name = "voice-minutes",
    about = "Voice message transcription and meeting summary bot"
)]
struct Args {
    /// Config file path (without extension); secrets come from
    /// VOICE_MINUTES_* environment variables
    #[arg(long, default_value = "config/voice-minutes")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("Voice Minutes v0.1.0");
    info!("Loaded config: {}", cfg.service.name);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let state = AppState::new(cfg)?;
    let app = create_router(state);

    info!("HTTP server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
