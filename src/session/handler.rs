use crate::audio::AudioBuffer;

use super::transcript::TranscriptItem;

/// Callbacks the view/orchestration layer registers at connect time
///
/// All methods default to no-ops so a consumer only implements what it
/// renders. Callbacks are invoked from the session's own tasks and must not
/// block.
pub trait SessionHandler: Send + Sync {
    /// The connection is established and media is flowing
    fn on_open(&self) {}

    /// The remote agent closed the connection
    fn on_close(&self) {}

    /// The session failed and has been torn down
    fn on_error(&self, _message: &str) {}

    /// One decoded inbound audio chunk, before playback (level metering)
    fn on_audio_data(&self, _buffer: &AudioBuffer) {}

    /// One finalized transcript item per completed turn per speaker
    fn on_transcription(&self, _item: TranscriptItem) {}
}

/// Handler that ignores every event
pub struct NullHandler;

impl SessionHandler for NullHandler {}
