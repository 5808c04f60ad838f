pub mod codec;
pub mod engine;

pub use codec::{AudioBuffer, MediaBlob};
pub use engine::{AudioSink, GainControl, NullSink, PlaybackEngine, PLAYBACK_SAMPLE_RATE};
