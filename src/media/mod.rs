//! Media source adapter
//!
//! Wraps hardware capture (microphone, camera, screen) and synthetic capture
//! (processed canvas, whiteboard) behind a uniform "current active stream"
//! that can be swapped without disrupting an open session.

pub mod source;
pub mod switcher;

pub use source::{AudioCaptureSource, ChannelCaptureSource, VideoFrame, VideoSource};
pub use switcher::{ActiveVideo, MediaSwitcher};
