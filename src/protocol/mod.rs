//! Wire protocol for the live agent session
//!
//! `messages` holds the serde shapes exchanged with the agent,
//! `transport` the connector/transport traits the session core depends on,
//! and `ws` the production websocket implementation.

pub mod messages;
pub mod transport;
pub mod ws;

pub use messages::{ServerContent, ServerMessage, Setup};
pub use transport::{LiveConnection, LiveConnector, LiveTransport, TransportEvent};
pub use ws::WsConnector;
