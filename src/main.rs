use anyhow::Result;
use clap::Parser;
use sona_meet::{Config, LiveSessionClient, MediaSwitcher, WsConnector};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "sona-meet", about = "Live AI meeting session core")]
struct Args {
    /// Path to the configuration file (without extension)
    #[arg(long, default_value = "config/sona-meet")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("sona-meet v0.1.0");
    info!("Agent endpoint: {}", cfg.agent.endpoint);
    info!("Model: {} (voice: {})", cfg.agent.model, cfg.agent.voice);

    let session_config = cfg.session_config();
    info!(
        "Capture {}Hz / playback {}Hz, {} samples per mic block",
        session_config.capture_sample_rate,
        session_config.playback_sample_rate,
        session_config.mic_block_samples
    );
    info!(
        "Video snapshots every {:?} at scale {}",
        session_config.snapshot_interval, session_config.video_scale
    );

    let connector = Arc::new(WsConnector::new(&cfg.agent.endpoint, &cfg.agent.api_key));
    let client = LiveSessionClient::new(session_config, connector, MediaSwitcher::new());

    info!(
        "Session client ready (state: {:?}); attach capture sources and connect from the embedding app",
        client.state().await
    );

    Ok(())
}
