use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

use crate::session::SessionConfig;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub agent: AgentConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub video: VideoConfig,
    #[serde(default)]
    pub session: SessionTimings,
}

#[derive(Debug, Deserialize)]
pub struct AgentConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub voice: String,
    pub system_prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    pub capture_sample_rate: u32,
    pub playback_sample_rate: u32,
    pub mic_block_samples: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            capture_sample_rate: 16_000,
            playback_sample_rate: 24_000,
            mic_block_samples: 4096,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VideoConfig {
    pub snapshot_interval_ms: u64,
    pub scale: f64,
    pub jpeg_quality: f32,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            snapshot_interval_ms: 500, // 2 fps
            scale: 0.5,
            jpeg_quality: 0.5,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SessionTimings {
    pub connect_timeout_secs: u64,
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Session parameters derived from the loaded file
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            model: self.agent.model.clone(),
            voice: self.agent.voice.clone(),
            system_prompt: self.agent.system_prompt.clone(),
            capture_sample_rate: self.audio.capture_sample_rate,
            playback_sample_rate: self.audio.playback_sample_rate,
            mic_block_samples: self.audio.mic_block_samples,
            snapshot_interval: Duration::from_millis(self.video.snapshot_interval_ms),
            video_scale: self.video.scale,
            jpeg_quality: self.video.jpeg_quality,
            connect_timeout: Duration::from_secs(self.session.connect_timeout_secs),
            ..SessionConfig::default()
        }
    }
}
