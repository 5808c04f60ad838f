//! Live agent session management
//!
//! This module provides the `LiveSessionClient` abstraction that manages:
//! - Connection establishment with a deadline
//! - Microphone streaming to the agent (16kHz PCM blocks)
//! - Video snapshot streaming (2 fps JPEG)
//! - Gapless playback of synthesized agent audio
//! - Transcription turn reconstruction for both speakers
//! - Idempotent teardown from every exit path

mod client;
mod config;
mod handler;
mod transcript;

pub use client::{LiveSessionClient, SessionState};
pub use config::SessionConfig;
pub use handler::{NullHandler, SessionHandler};
pub use transcript::{Sender, TranscriptItem, TurnBuffer};
