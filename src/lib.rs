pub mod audio;
pub mod config;
pub mod media;
pub mod protocol;
pub mod session;

pub use audio::{AudioBuffer, AudioSink, MediaBlob, NullSink, PlaybackEngine};
pub use config::Config;
pub use media::{AudioCaptureSource, ChannelCaptureSource, MediaSwitcher, VideoFrame, VideoSource};
pub use protocol::{LiveConnection, LiveConnector, LiveTransport, TransportEvent, WsConnector};
pub use session::{
    LiveSessionClient, NullHandler, Sender, SessionConfig, SessionHandler, SessionState,
    TranscriptItem,
};
