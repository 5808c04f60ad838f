use anyhow::Result;
use tokio::sync::mpsc;

use super::messages::{ServerMessage, Setup};

/// Events delivered by an established connection, in arrival order
#[derive(Debug)]
pub enum TransportEvent {
    /// Parsed server message
    Message(ServerMessage),
    /// Remote side closed the connection
    Closed,
    /// Connection failed mid-session
    Error(String),
}

/// Outbound half of an established live connection
///
/// All sends are fire-and-forget from the session's perspective: delivery
/// ordering of individual frames is the transport's concern.
#[async_trait::async_trait]
pub trait LiveTransport: Send + Sync {
    /// Stream a compact PCM audio frame as realtime input
    async fn send_realtime_audio(&self, mime_type: &str, data: &str) -> Result<()>;

    /// Stream a JPEG snapshot as realtime input
    async fn send_realtime_image(&self, mime_type: &str, data: &str) -> Result<()>;

    /// Submit one complete user text turn
    async fn send_text_turn(&self, text: &str) -> Result<()>;

    /// Whether the transport supports discrete text-turn submission
    fn supports_client_content(&self) -> bool {
        true
    }

    /// Request connection closure (best-effort)
    async fn close(&self) -> Result<()>;
}

/// An established connection: the outbound handle plus the inbound event feed
pub struct LiveConnection {
    pub transport: std::sync::Arc<dyn LiveTransport>,
    pub events: mpsc::Receiver<TransportEvent>,
}

/// Establishes live connections to the agent
///
/// The session client only ever talks to this trait, so tests can stand in a
/// channel-backed connector and the production build supplies the websocket
/// one.
#[async_trait::async_trait]
pub trait LiveConnector: Send + Sync {
    async fn connect(&self, setup: Setup) -> Result<LiveConnection>;
}
