use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tracing::{debug, info, warn};
use url::Url;

use super::messages::{
    ClientContentMessage, RealtimeInputMessage, ServerMessage, Setup, SetupMessage,
};
use super::transport::{LiveConnection, LiveConnector, LiveTransport, TransportEvent};

/// Capacity of the outbound write queue, in frames
const WRITE_QUEUE_CAPACITY: usize = 256;

/// Capacity of the inbound event queue
const EVENT_QUEUE_CAPACITY: usize = 256;

/// Websocket connector for the live agent endpoint
///
/// Opens the socket, sends the setup message, then hands the session a
/// transport handle backed by a writer task and an event feed backed by a
/// reader task. The two tasks own the split socket halves; dropping the
/// transport's write queue shuts the writer down.
pub struct WsConnector {
    endpoint: String,
    api_key: String,
}

impl WsConnector {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    fn session_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.endpoint)
            .with_context(|| format!("Invalid live endpoint: {}", self.endpoint))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl LiveConnector for WsConnector {
    async fn connect(&self, setup: Setup) -> Result<LiveConnection> {
        let url = self.session_url()?;

        info!("Connecting to live agent at {}", self.endpoint);

        let (ws_stream, _) = connect_async(url.as_str())
            .await
            .context("Failed to open live agent websocket")?;

        info!("Live agent websocket open");

        let (mut write, mut read) = ws_stream.split();

        let setup_json = serde_json::to_string(&SetupMessage { setup })?;
        write
            .send(Message::Text(setup_json))
            .await
            .context("Failed to send session setup")?;

        // Writer task: drains the outbound queue until all senders drop.
        let (write_tx, mut write_rx) = mpsc::channel::<Message>(WRITE_QUEUE_CAPACITY);
        tokio::spawn(async move {
            while let Some(msg) = write_rx.recv().await {
                if let Err(e) = write.send(msg).await {
                    warn!("Live websocket write failed: {}", e);
                    break;
                }
            }
            debug!("Live websocket writer task stopped");
        });

        // Reader task: parses JSON frames (the agent uses both text and
        // binary frames) and forwards them in arrival order.
        let (event_tx, event_rx) = mpsc::channel::<TransportEvent>(EVENT_QUEUE_CAPACITY);
        tokio::spawn(async move {
            while let Some(frame) = read.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        forward_json(&event_tx, text.as_bytes()).await;
                    }
                    Ok(Message::Binary(data)) => {
                        forward_json(&event_tx, &data).await;
                    }
                    Ok(Message::Close(frame)) => {
                        info!("Live agent closed the connection: {:?}", frame);
                        let _ = event_tx.send(TransportEvent::Closed).await;
                        return;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        let _ = event_tx.send(TransportEvent::Error(e.to_string())).await;
                        return;
                    }
                }
            }
            let _ = event_tx.send(TransportEvent::Closed).await;
        });

        Ok(LiveConnection {
            transport: Arc::new(WsTransport { write_tx }),
            events: event_rx,
        })
    }
}

async fn forward_json(event_tx: &mpsc::Sender<TransportEvent>, payload: &[u8]) {
    match serde_json::from_slice::<ServerMessage>(payload) {
        Ok(msg) => {
            let _ = event_tx.send(TransportEvent::Message(msg)).await;
        }
        Err(e) => {
            warn!("Ignoring unparseable live agent frame: {}", e);
        }
    }
}

struct WsTransport {
    write_tx: mpsc::Sender<Message>,
}

impl WsTransport {
    async fn send_json<T: serde::Serialize>(&self, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.write_tx
            .send(Message::Text(json))
            .await
            .context("Live websocket writer is gone")?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl LiveTransport for WsTransport {
    async fn send_realtime_audio(&self, mime_type: &str, data: &str) -> Result<()> {
        self.send_json(&RealtimeInputMessage::media(mime_type, data))
            .await
    }

    async fn send_realtime_image(&self, mime_type: &str, data: &str) -> Result<()> {
        self.send_json(&RealtimeInputMessage::media(mime_type, data))
            .await
    }

    async fn send_text_turn(&self, text: &str) -> Result<()> {
        self.send_json(&ClientContentMessage::user_turn(text)).await
    }

    async fn close(&self) -> Result<()> {
        self.write_tx
            .send(Message::Close(None))
            .await
            .context("Live websocket writer is gone")?;
        Ok(())
    }
}
