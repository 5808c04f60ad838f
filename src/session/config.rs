use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a live agent session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier (e.g., "meeting-<uuid>")
    pub session_id: String,

    /// Model identifier announced at setup
    pub model: String,

    /// Prebuilt synthetic voice for agent speech
    pub voice: String,

    /// System persona prompt sent at setup
    pub system_prompt: String,

    /// Microphone capture sample rate (the agent expects 16kHz)
    pub capture_sample_rate: u32,

    /// Agent audio playback sample rate (the agent produces 24kHz)
    pub playback_sample_rate: u32,

    /// Samples per outbound microphone block
    pub mic_block_samples: usize,

    /// Interval between video snapshots (500ms = 2 frames/second)
    pub snapshot_interval: Duration,

    /// Snapshot downscale factor relative to the source
    pub video_scale: f64,

    /// JPEG quality for snapshots, in [0.0, 1.0]
    pub jpeg_quality: f32,

    /// How long connection establishment may take before it is abandoned
    pub connect_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("meeting-{}", uuid::Uuid::new_v4()),
            model: "models/gemini-2.0-flash-live-001".to_string(),
            voice: "Puck".to_string(),
            system_prompt:
                "You are a helpful meeting participant. Keep answers short and conversational."
                    .to_string(),
            capture_sample_rate: 16_000,  // Agent expects 16kHz mono input
            playback_sample_rate: 24_000, // Agent produces 24kHz output
            mic_block_samples: 4096,
            snapshot_interval: Duration::from_millis(500), // 2 fps
            video_scale: 0.5,
            jpeg_quality: 0.5,
            connect_timeout: Duration::from_secs(15),
        }
    }
}
