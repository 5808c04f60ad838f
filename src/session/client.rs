use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::audio::codec;
use crate::audio::engine::{AudioSink, NullSink, PlaybackEngine};
use crate::media::switcher::{ActiveVideo, MediaSwitcher};
use crate::media::VideoSource;
use crate::protocol::messages::{ServerContent, ServerMessage, Setup};
use crate::protocol::transport::{LiveConnector, LiveTransport, TransportEvent};

use super::config::SessionConfig;
use super::handler::SessionHandler;
use super::transcript::TurnBuffer;

/// Message used when a connection error carries no detail of its own
const GENERIC_CONNECTION_ERROR: &str = "Live session connection error";

/// Lifecycle of the live agent connection
///
/// `Connecting` is never re-entered while the session is `Connecting` or
/// `Open`; timeout and errors fall straight back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Open,
    Closing,
}

struct Inner {
    config: SessionConfig,
    active: AtomicBool,
    state: Mutex<SessionState>,
    shutdown: Notify,
    media: Arc<Mutex<MediaSwitcher>>,
    video: ActiveVideo,
    transport: Mutex<Option<Arc<dyn LiveTransport>>>,
    playback: Mutex<Option<PlaybackEngine>>,
    mic_task: Mutex<Option<JoinHandle<()>>>,
    inbound_task: Mutex<Option<JoinHandle<()>>>,
    video_task: Mutex<Option<JoinHandle<()>>>,
}

/// Client for one live agent session
///
/// Owns the streaming connection, the capture and playback pipelines, and
/// the transcription turn state. The view layer drives it through the public
/// operations and hears back through its [`SessionHandler`].
pub struct LiveSessionClient {
    inner: Arc<Inner>,
    connector: Arc<dyn LiveConnector>,
    sink: Mutex<Option<Box<dyn AudioSink>>>,
}

impl LiveSessionClient {
    pub fn new(
        config: SessionConfig,
        connector: Arc<dyn LiveConnector>,
        media: MediaSwitcher,
    ) -> Self {
        let video = media.video_handle();

        Self {
            inner: Arc::new(Inner {
                config,
                active: AtomicBool::new(false),
                state: Mutex::new(SessionState::Idle),
                shutdown: Notify::new(),
                media: Arc::new(Mutex::new(media)),
                video,
                transport: Mutex::new(None),
                playback: Mutex::new(None),
                mic_task: Mutex::new(None),
                inbound_task: Mutex::new(None),
                video_task: Mutex::new(None),
            }),
            connector,
            sink: Mutex::new(None),
        }
    }

    /// Attach a playback sink (speaker device); without one, agent audio is
    /// still scheduled and observable on the recording tap
    pub fn with_sink(mut self, sink: Box<dyn AudioSink>) -> Self {
        *self.sink.get_mut() = Some(sink);
        self
    }

    /// Media adapter handle for swapping capture sources mid-session
    pub fn media(&self) -> Arc<Mutex<MediaSwitcher>> {
        Arc::clone(&self.inner.media)
    }

    pub async fn state(&self) -> SessionState {
        *self.inner.state.lock().await
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Establish the session and start bidirectional media flow
    ///
    /// No-op while a session is connecting or open. The connection attempt
    /// is raced against the configured deadline; losing the race tears
    /// everything down and reports a timeout through `on_error`.
    pub async fn connect(&self, handler: Arc<dyn SessionHandler>) -> Result<()> {
        {
            let mut state = self.inner.state.lock().await;
            if *state != SessionState::Idle {
                warn!("connect() ignored: session state is {:?}", *state);
                return Ok(());
            }
            *state = SessionState::Connecting;
        }

        info!(
            "Connecting live session {} (model {})",
            self.inner.config.session_id, self.inner.config.model
        );

        // Capture permission / device acquisition happens before any network
        // work; a denied microphone means the session never starts.
        let mic_stream = {
            let mut media = self.inner.media.lock().await;
            match media.open_stream() {
                Ok(stream) => stream,
                Err(e) => {
                    *self.inner.state.lock().await = SessionState::Idle;
                    return Err(e.context("Microphone capture unavailable"));
                }
            }
        };

        self.inner.active.store(true, Ordering::SeqCst);

        let setup = Setup::new(
            &self.inner.config.model,
            &self.inner.config.voice,
            &self.inner.config.system_prompt,
        );

        let connection = match tokio::time::timeout(
            self.inner.config.connect_timeout,
            self.connector.connect(setup),
        )
        .await
        {
            Ok(Ok(connection)) => connection,
            Ok(Err(e)) => {
                Self::cleanup(&self.inner).await;
                let message = format!("Failed to open live session: {}", e);
                handler.on_error(&message);
                return Err(e.context("Failed to open live session"));
            }
            Err(_) => {
                Self::cleanup(&self.inner).await;
                let message = format!(
                    "Live session connection timed out after {:?}",
                    self.inner.config.connect_timeout
                );
                handler.on_error(&message);
                anyhow::bail!(message);
            }
        };

        // The connector resolved, but a disconnect may have raced it. The
        // session is wired up under the state lock so that a teardown either
        // happened entirely before (state left `Connecting`, the fresh
        // connection is discarded) or runs entirely after `Open` is set.
        {
            let mut state = self.inner.state.lock().await;
            if *state != SessionState::Connecting || !self.is_active() {
                info!(
                    "Live session {} cancelled during establishment",
                    self.inner.config.session_id
                );
                let transport = Arc::clone(&connection.transport);
                tokio::spawn(async move {
                    if let Err(e) = transport.close().await {
                        debug!("Transport close after cancelled establishment: {}", e);
                    }
                });
                return Ok(());
            }

            let sink = self
                .sink
                .lock()
                .await
                .take()
                .unwrap_or_else(|| Box::new(NullSink));
            *self.inner.playback.lock().await = Some(PlaybackEngine::new(
                self.inner.config.playback_sample_rate,
                sink,
            ));

            let transport = Arc::clone(&connection.transport);
            *self.inner.transport.lock().await = Some(Arc::clone(&transport));

            // Microphone pump: fixed-size blocks, encoded and fire-and-forget.
            let mic_task = tokio::spawn(Self::pump_microphone(
                Arc::clone(&self.inner),
                Arc::clone(&transport),
                mic_stream,
            ));
            *self.inner.mic_task.lock().await = Some(mic_task);

            // Inbound loop: decodes audio, reconstructs transcription turns.
            let inbound_task = tokio::spawn(Self::run_inbound(
                Arc::clone(&self.inner),
                Arc::clone(&handler),
                connection.events,
            ));
            *self.inner.inbound_task.lock().await = Some(inbound_task);

            *state = SessionState::Open;
        }

        info!("Live session {} open", self.inner.config.session_id);
        handler.on_open();

        Ok(())
    }

    /// Forward user text as one complete conversational turn
    ///
    /// Failures are logged, never surfaced: losing a text message does not
    /// end the session.
    pub async fn send_text_message(&self, text: &str) {
        if !self.is_active() {
            warn!("Ignoring text message: no active session");
            return;
        }

        let transport = self.inner.transport.lock().await.clone();
        let Some(transport) = transport else {
            warn!("Ignoring text message: no open connection");
            return;
        };

        if !transport.supports_client_content() {
            warn!("Transport does not support text turns; message dropped");
            return;
        }

        if let Err(e) = transport.send_text_turn(text).await {
            warn!("Failed to send text message: {}", e);
        }
    }

    /// Ramp the output volume toward `level` in [0.0, 1.0]
    ///
    /// No-op when no session is playing audio.
    pub async fn set_volume(&self, level: f32) {
        if let Some(engine) = self.inner.playback.lock().await.as_mut() {
            engine.set_volume(level);
        }
    }

    /// Start streaming snapshots of a video source to the agent
    ///
    /// Cancels any snapshot task already running, then captures a downscaled
    /// JPEG on the configured cadence while the session stays active.
    /// Sources swapped through the media adapter are picked up on the next
    /// tick.
    pub async fn start_video_streaming(&self, source: Arc<dyn VideoSource>) {
        self.stop_video_streaming().await;

        let transport = self.inner.transport.lock().await.clone();
        let Some(transport) = transport else {
            warn!("Video streaming requested without an open session");
            return;
        };

        self.inner
            .media
            .lock()
            .await
            .set_video_source(source)
            .await;

        let task = tokio::spawn(Self::stream_video(Arc::clone(&self.inner), transport));
        *self.inner.video_task.lock().await = Some(task);
    }

    /// Cancel the snapshot cadence
    pub async fn stop_video_streaming(&self) {
        if let Some(task) = self.inner.video_task.lock().await.take() {
            task.abort();
            debug!("Video streaming stopped");
        }
    }

    /// Live pre-gain output tap, suitable for an external recorder
    ///
    /// `None` when no session exists.
    pub async fn remote_audio_stream(&self) -> Option<broadcast::Receiver<Vec<f32>>> {
        self.inner
            .playback
            .lock()
            .await
            .as_ref()
            .map(|engine| engine.tap())
    }

    /// Mark the session inactive and release every resource
    ///
    /// Idempotent, callable from any state.
    pub async fn disconnect(&self) {
        {
            let mut state = self.inner.state.lock().await;
            if *state == SessionState::Idle && !self.is_active() {
                debug!("disconnect() ignored: no session");
                return;
            }
            *state = SessionState::Closing;
        }

        info!("Disconnecting live session {}", self.inner.config.session_id);
        Self::cleanup(&self.inner).await;
    }

    /// Release all session resources
    ///
    /// Called from disconnect, remote close, transport error, and the
    /// establishment timeout. Safe to call repeatedly and when some of the
    /// resources were never created.
    async fn cleanup(inner: &Inner) {
        inner.active.store(false, Ordering::SeqCst);
        inner.shutdown.notify_waiters();

        if let Some(task) = inner.video_task.lock().await.take() {
            task.abort();
        }
        if let Some(task) = inner.mic_task.lock().await.take() {
            task.abort();
        }
        // The inbound task exits through the shutdown notify; cleanup may be
        // running on it, so it is detached rather than aborted.
        drop(inner.inbound_task.lock().await.take());

        inner.media.lock().await.stop_audio().await;

        if let Some(transport) = inner.transport.lock().await.take() {
            tokio::spawn(async move {
                if let Err(e) = transport.close().await {
                    debug!("Transport close after teardown: {}", e);
                }
            });
        }

        if let Some(mut engine) = inner.playback.lock().await.take() {
            engine.close();
        }

        *inner.state.lock().await = SessionState::Idle;
        debug!("Session resources released");
    }

    async fn pump_microphone(
        inner: Arc<Inner>,
        transport: Arc<dyn LiveTransport>,
        mut stream: tokio::sync::mpsc::Receiver<Vec<f32>>,
    ) {
        let block_size = inner.config.mic_block_samples;
        let sample_rate = inner.config.capture_sample_rate;
        let mut pending: Vec<f32> = Vec::with_capacity(block_size * 2);

        debug!("Microphone pump started ({} samples/block)", block_size);

        while let Some(samples) = stream.recv().await {
            if !inner.active.load(Ordering::SeqCst) {
                break;
            }

            pending.extend_from_slice(&samples);

            while pending.len() >= block_size {
                let chunk: Vec<f32> = pending.drain(..block_size).collect();
                let blob = codec::encode_frame(&chunk, sample_rate);

                if let Err(e) = transport.send_realtime_audio(&blob.mime_type, &blob.data).await {
                    if inner.active.load(Ordering::SeqCst) {
                        warn!("Failed to send microphone frame: {}", e);
                    }
                    // During teardown the writer is already gone; stay quiet.
                }
            }
        }

        debug!("Microphone pump stopped");
    }

    async fn stream_video(inner: Arc<Inner>, transport: Arc<dyn LiveTransport>) {
        let mut ticker = tokio::time::interval(inner.config.snapshot_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            if !inner.active.load(Ordering::SeqCst) {
                break;
            }

            let source = inner.video.read().await.clone();
            let Some(source) = source else {
                continue;
            };

            let Some(frame) =
                source.capture_frame(inner.config.video_scale, inner.config.jpeg_quality)
            else {
                continue;
            };
            if !frame.has_content() {
                continue;
            }

            let data = codec::encode_bytes(&frame.jpeg);
            if let Err(e) = transport.send_realtime_image("image/jpeg", &data).await {
                if inner.active.load(Ordering::SeqCst) {
                    warn!("Failed to send video frame: {}", e);
                }
            }
        }

        debug!("Video streaming task stopped");
    }

    async fn run_inbound(
        inner: Arc<Inner>,
        handler: Arc<dyn SessionHandler>,
        mut events: tokio::sync::mpsc::Receiver<TransportEvent>,
    ) {
        let mut turn = TurnBuffer::new();

        // The waiter must outlive the loop body: `notify_waiters` stores no
        // permit, so a shutdown fired while a message is being handled would
        // otherwise be lost.
        let shutdown = inner.shutdown.notified();
        tokio::pin!(shutdown);

        loop {
            let event = tokio::select! {
                _ = shutdown.as_mut() => break,
                event = events.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };

            match event {
                TransportEvent::Message(message) => {
                    // Frames that raced the teardown are dropped, not
                    // surfaced to the handler.
                    if !inner.active.load(Ordering::SeqCst) {
                        break;
                    }
                    Self::handle_server_message(&inner, handler.as_ref(), &mut turn, message)
                        .await;
                }
                TransportEvent::Closed => {
                    if inner.active.load(Ordering::SeqCst) {
                        info!("Live session closed by the agent");
                        Self::cleanup(&inner).await;
                        handler.on_close();
                    }
                    break;
                }
                TransportEvent::Error(message) => {
                    if inner.active.load(Ordering::SeqCst) {
                        let message = if message.is_empty() {
                            GENERIC_CONNECTION_ERROR.to_string()
                        } else {
                            message
                        };
                        Self::cleanup(&inner).await;
                        handler.on_error(&message);
                    }
                    break;
                }
            }
        }

        debug!("Inbound loop stopped");
    }

    async fn handle_server_message(
        inner: &Inner,
        handler: &dyn SessionHandler,
        turn: &mut TurnBuffer,
        message: ServerMessage,
    ) {
        let Some(content) = message.server_content else {
            return;
        };

        Self::handle_inline_audio(inner, handler, &content).await;

        if let Some(text) = content
            .output_transcription
            .as_ref()
            .and_then(|t| t.text.as_deref())
        {
            turn.append_agent(text);
        } else if let Some(text) = content
            .input_transcription
            .as_ref()
            .and_then(|t| t.text.as_deref())
        {
            turn.append_user(text);
        }

        if content.turn_complete {
            for item in turn.complete_turn() {
                handler.on_transcription(item);
            }
        }
    }

    async fn handle_inline_audio(
        inner: &Inner,
        handler: &dyn SessionHandler,
        content: &ServerContent,
    ) {
        let Some(model_turn) = &content.model_turn else {
            return;
        };

        for part in &model_turn.parts {
            let Some(inline) = &part.inline_data else {
                continue;
            };
            if !inline.mime_type.starts_with("audio/") {
                continue;
            }

            match codec::decode_blob(&inline.data, inner.config.playback_sample_rate) {
                Ok(buffer) => {
                    handler.on_audio_data(&buffer);
                    if let Some(engine) = inner.playback.lock().await.as_mut() {
                        engine.schedule(&buffer);
                    }
                }
                Err(e) => {
                    // A malformed chunk is dropped; the session carries on.
                    warn!("Dropping undecodable audio chunk: {}", e);
                }
            }
        }
    }
}
