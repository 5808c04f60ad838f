use std::time::Instant;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::codec::AudioBuffer;

/// Default playback sample rate expected from the live agent
pub const PLAYBACK_SAMPLE_RATE: u32 = 24_000;

/// Time constant for volume ramps, in seconds
///
/// Gain changes are smoothed over this constant instead of stepping, which
/// avoids audible clicks when the user drags a volume slider.
const GAIN_RAMP_TAU_SECS: f32 = 0.05;

/// Capacity of the recording tap channel, in sample blocks
const TAP_CHANNEL_CAPACITY: usize = 64;

/// Where gain-adjusted playback samples are delivered
///
/// The engine computes when each block must start; the sink is the
/// platform-facing half (speaker device, test probe). A sink that ignores
/// everything is valid: the recording tap still observes the stream.
pub trait AudioSink: Send {
    /// Deliver a block of samples scheduled to start at `start_secs` on the
    /// engine's timeline
    fn play_at(&mut self, samples: Vec<f32>, start_secs: f64, sample_rate: u32);
}

/// Sink used when no playback device is attached
pub struct NullSink;

impl AudioSink for NullSink {
    fn play_at(&mut self, _samples: Vec<f32>, _start_secs: f64, _sample_rate: u32) {}
}

/// Smoothed output gain
///
/// The applied gain converges exponentially toward the target so volume
/// changes never produce a step discontinuity in the output samples.
#[derive(Debug)]
pub struct GainControl {
    value: f32,
    target: f32,
}

impl GainControl {
    pub fn new(initial: f32) -> Self {
        Self {
            value: initial,
            target: initial,
        }
    }

    /// Set the gain target; the applied value ramps toward it
    pub fn set_target(&mut self, target: f32) {
        self.target = target.clamp(0.0, 1.0);
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// Apply the gain in place, advancing the ramp one sample at a time
    pub fn apply(&mut self, samples: &mut [f32], sample_rate: u32) {
        let decay = (-1.0 / (GAIN_RAMP_TAU_SECS * sample_rate as f32)).exp();
        for sample in samples.iter_mut() {
            self.value = self.target + (self.value - self.target) * decay;
            *sample *= self.value;
        }
    }
}

/// Playback engine for agent audio
///
/// Keeps a monotonically advancing cursor on its own timeline so decoded
/// chunks play back-to-back regardless of network arrival jitter: each chunk
/// starts at `max(cursor, now)` and the cursor advances by the chunk's
/// duration. Every chunk is delivered pre-gain to the recording tap and
/// post-gain to the sink.
pub struct PlaybackEngine {
    sample_rate: u32,
    epoch: Instant,
    cursor: f64,
    gain: GainControl,
    sink: Box<dyn AudioSink>,
    tap: broadcast::Sender<Vec<f32>>,
    closed: bool,
}

impl PlaybackEngine {
    pub fn new(sample_rate: u32, sink: Box<dyn AudioSink>) -> Self {
        let (tap, _) = broadcast::channel(TAP_CHANNEL_CAPACITY);

        info!("Playback engine initialized: {}Hz", sample_rate);

        Self {
            sample_rate,
            epoch: Instant::now(),
            cursor: 0.0,
            gain: GainControl::new(1.0),
            sink,
            tap,
            closed: false,
        }
    }

    /// Seconds elapsed on the engine's timeline
    pub fn current_time(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Schedule a decoded chunk for gapless playback
    ///
    /// Returns the start time chosen for the chunk. The start never lies in
    /// the past, and never leaves a gap after the previous chunk when the
    /// engine is keeping up.
    pub fn schedule(&mut self, buffer: &AudioBuffer) -> Option<f64> {
        if self.closed || buffer.is_empty() {
            return None;
        }

        let start = self.cursor.max(self.current_time());

        // Recording tap sees the stream before the volume control.
        let _ = self.tap.send(buffer.samples.clone());

        let mut gained = buffer.samples.clone();
        self.gain.apply(&mut gained, self.sample_rate);
        self.sink.play_at(gained, start, self.sample_rate);

        self.cursor = start + buffer.duration_secs();

        debug!(
            "Scheduled {} samples at {:.3}s (cursor now {:.3}s)",
            buffer.samples.len(),
            start,
            self.cursor
        );

        Some(start)
    }

    /// Ramp the output volume toward `level` in [0.0, 1.0]
    pub fn set_volume(&mut self, level: f32) {
        self.gain.set_target(level);
    }

    pub fn volume(&self) -> f32 {
        self.gain.target()
    }

    /// Subscribe to the pre-gain recording tap
    pub fn tap(&self) -> broadcast::Receiver<Vec<f32>> {
        self.tap.subscribe()
    }

    /// Release the engine; further scheduling is refused
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            info!("Playback engine closed at {:.3}s", self.current_time());
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
