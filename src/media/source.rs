use anyhow::Result;
use tokio::sync::mpsc;

/// Audio capture source
///
/// Implementations wrap a hardware device or a synthetic producer. `start`
/// performs the permission request / device open and returns a channel of
/// float sample blocks at the capture rate; a denied permission surfaces as
/// a descriptive error and nothing is captured.
#[async_trait::async_trait]
pub trait AudioCaptureSource: Send {
    /// Begin capturing; returns the block stream
    async fn start(&mut self) -> Result<mpsc::Receiver<Vec<f32>>>;

    /// Stop capturing and release the device
    async fn stop(&mut self) -> Result<()>;

    /// Source name for logging
    fn name(&self) -> &str;
}

/// One captured video snapshot, already JPEG-encoded by the source
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub jpeg: Vec<u8>,
}

impl VideoFrame {
    pub fn has_content(&self) -> bool {
        self.width > 0 && self.height > 0 && !self.jpeg.is_empty()
    }
}

/// Video-producing source: camera, screen, or canvas-backed
///
/// The session polls this on its snapshot cadence; sources that are not yet
/// delivering (camera warming up, zero-sized canvas) return `None` or a
/// zero-dimension frame and the tick is skipped.
pub trait VideoSource: Send + Sync {
    /// Capture one downscaled JPEG snapshot at the requested quality
    fn capture_frame(&self, scale: f64, quality: f32) -> Option<VideoFrame>;

    /// Source name for logging
    fn name(&self) -> &str;
}

/// Audio capture source backed by an external channel
///
/// Used where the samples are produced elsewhere in-process (an effects
/// pipeline, a test fixture) rather than by a device this crate opens.
pub struct ChannelCaptureSource {
    name: String,
    stream: Option<mpsc::Receiver<Vec<f32>>>,
}

impl ChannelCaptureSource {
    pub fn new(name: impl Into<String>, stream: mpsc::Receiver<Vec<f32>>) -> Self {
        Self {
            name: name.into(),
            stream: Some(stream),
        }
    }
}

#[async_trait::async_trait]
impl AudioCaptureSource for ChannelCaptureSource {
    async fn start(&mut self) -> Result<mpsc::Receiver<Vec<f32>>> {
        self.stream
            .take()
            .ok_or_else(|| anyhow::anyhow!("Capture source '{}' already started", self.name))
    }

    async fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
