use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::source::{AudioCaptureSource, VideoSource};

/// Capacity of the downstream audio channel, in blocks
const AUDIO_CHANNEL_CAPACITY: usize = 32;

/// Shared handle to the currently selected video source
pub type ActiveVideo = Arc<RwLock<Option<Arc<dyn VideoSource>>>>;

/// Presents many swappable capture sources as one stable stream
///
/// The session takes the downstream audio receiver once and never sees a
/// source change: `switch_audio` stops the old source, starts the new one,
/// and forwards its blocks into the same channel. The video side is a shared
/// slot the session's snapshot task re-reads on every tick.
pub struct MediaSwitcher {
    audio_tx: mpsc::Sender<Vec<f32>>,
    audio_rx: Option<mpsc::Receiver<Vec<f32>>>,
    current_audio: Option<Box<dyn AudioCaptureSource>>,
    forward_task: Option<JoinHandle<()>>,
    video: ActiveVideo,
}

impl MediaSwitcher {
    pub fn new() -> Self {
        let (audio_tx, audio_rx) = mpsc::channel(AUDIO_CHANNEL_CAPACITY);

        Self {
            audio_tx,
            audio_rx: Some(audio_rx),
            current_audio: None,
            forward_task: None,
            video: Arc::new(RwLock::new(None)),
        }
    }

    /// Select the audio capture source, replacing any previous one
    ///
    /// Safe to call while a session is streaming: the downstream channel is
    /// untouched, only the upstream feed changes.
    pub async fn switch_audio(&mut self, mut source: Box<dyn AudioCaptureSource>) -> Result<()> {
        self.stop_audio().await;

        let name = source.name().to_string();
        let mut stream = source
            .start()
            .await
            .with_context(|| format!("Failed to start capture source '{}'", name))?;

        info!("Audio capture source switched to '{}'", name);

        let tx = self.audio_tx.clone();
        let task = tokio::spawn(async move {
            while let Some(block) = stream.recv().await {
                if tx.send(block).await.is_err() {
                    // Downstream receiver dropped; the session is gone.
                    break;
                }
            }
            debug!("Audio forward task for '{}' stopped", name);
        });

        self.current_audio = Some(source);
        self.forward_task = Some(task);

        Ok(())
    }

    /// Stop the current audio source without disturbing the downstream channel
    pub async fn stop_audio(&mut self) {
        if let Some(task) = self.forward_task.take() {
            task.abort();
        }
        if let Some(mut source) = self.current_audio.take() {
            if let Err(e) = source.stop().await {
                warn!("Failed to stop capture source '{}': {}", source.name(), e);
            }
        }
    }

    /// Take the stable downstream audio stream; available exactly once
    pub fn open_stream(&mut self) -> Result<mpsc::Receiver<Vec<f32>>> {
        self.audio_rx
            .take()
            .context("Media stream already opened by a session")
    }

    /// Select the video snapshot source
    pub async fn set_video_source(&self, source: Arc<dyn VideoSource>) {
        info!("Video source switched to '{}'", source.name());
        *self.video.write().await = Some(source);
    }

    /// Clear the video snapshot source (camera off, screen share ended)
    pub async fn clear_video_source(&self) {
        *self.video.write().await = None;
    }

    /// Shared handle the session's snapshot task polls
    pub fn video_handle(&self) -> ActiveVideo {
        Arc::clone(&self.video)
    }
}

impl Default for MediaSwitcher {
    fn default() -> Self {
        Self::new()
    }
}
