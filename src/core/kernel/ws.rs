use crate::core::errors::ExchangeError;
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, tungstenite, MaybeTlsStream, WebSocketStream};
use tracing::{error, instrument, warn};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Websocket transport configuration
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Optional per-read timeout in milliseconds. The protocol itself does
    /// not require one; off by default.
    pub read_timeout_ms: Option<u64>,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 10_000,
            read_timeout_ms: None,
        }
    }
}

/// Websocket session trait - pure transport layer.
///
/// One session owns one connection: it is the sole writer (the handshake
/// frame) and the sole reader. Message interpretation lives in `WsCodec`;
/// nothing here looks inside a frame.
#[async_trait]
pub trait WsSession: Send {
    /// Connect to the websocket
    async fn connect(&mut self) -> Result<(), ExchangeError>;

    /// Send a raw message
    async fn send_raw(&mut self, msg: Message) -> Result<(), ExchangeError>;

    /// Receive the next data frame.
    ///
    /// Control frames are absorbed at this level. `None` means the peer
    /// closed the connection cleanly; `Some(Err(_))` is a transport failure.
    async fn next_raw(&mut self) -> Option<Result<Message, ExchangeError>>;

    /// Close the connection
    async fn close(&mut self) -> Result<(), ExchangeError>;

    /// Check if the connection is alive
    fn is_connected(&self) -> bool;
}

/// Tungstenite-based websocket implementation
pub struct TungsteniteWs {
    url: String,
    exchange_name: String,
    write: Option<WsSink>,
    read: Option<WsStream>,
    connected: bool,
    config: WsConfig,
}

impl TungsteniteWs {
    /// Create a new websocket session
    ///
    /// # Arguments
    /// * `url` - The websocket URL to connect to
    /// * `exchange_name` - Name of the exchange for logging/tracing
    pub fn new(url: String, exchange_name: String) -> Self {
        Self {
            url,
            exchange_name,
            write: None,
            read: None,
            connected: false,
            config: WsConfig::default(),
        }
    }

    /// Set custom websocket configuration
    #[must_use]
    pub fn with_config(mut self, config: WsConfig) -> Self {
        self.config = config;
        self
    }
}

#[async_trait]
impl WsSession for TungsteniteWs {
    #[instrument(skip(self), fields(exchange = %self.exchange_name, url = %self.url))]
    async fn connect(&mut self) -> Result<(), ExchangeError> {
        let connect_timeout = Duration::from_millis(self.config.connect_timeout_ms);

        let (ws_stream, _) =
            tokio::time::timeout(connect_timeout, connect_async(self.url.as_str()))
                .await
                .map_err(|_| {
                    ExchangeError::NetworkError("Websocket connection timeout".to_string())
                })?
                .map_err(|e| match e {
                    // Rejected protocol upgrade: keep the server's verdict.
                    tungstenite::Error::Http(response) => {
                        let status = response.status().as_u16();
                        let body = response
                            .body()
                            .as_ref()
                            .map(|b| String::from_utf8_lossy(b).into_owned())
                            .unwrap_or_default();
                        ExchangeError::ConnectionRejected { status, body }
                    }
                    other => ExchangeError::NetworkError(format!(
                        "Websocket connection failed: {}",
                        other
                    )),
                })?;

        let (write, read) = ws_stream.split();
        self.write = Some(write);
        self.read = Some(read);
        self.connected = true;

        Ok(())
    }

    #[instrument(skip(self, msg), fields(exchange = %self.exchange_name))]
    async fn send_raw(&mut self, msg: Message) -> Result<(), ExchangeError> {
        if !self.connected {
            return Err(ExchangeError::NetworkError(
                "Websocket not connected".to_string(),
            ));
        }

        let write = self.write.as_mut().ok_or_else(|| {
            ExchangeError::NetworkError("Websocket write stream not available".to_string())
        })?;

        write.send(msg).await.map_err(|e| {
            self.connected = false;
            ExchangeError::NetworkError(format!("Failed to send websocket message: {}", e))
        })?;

        Ok(())
    }

    async fn next_raw(&mut self) -> Option<Result<Message, ExchangeError>> {
        loop {
            let frame = {
                let read = self.read.as_mut()?;
                match self.config.read_timeout_ms {
                    Some(ms) => {
                        match tokio::time::timeout(Duration::from_millis(ms), read.next()).await {
                            Ok(frame) => frame,
                            Err(_) => {
                                self.connected = false;
                                return Some(Err(ExchangeError::NetworkError(
                                    "Websocket read timed out".to_string(),
                                )));
                            }
                        }
                    }
                    None => read.next().await,
                }
            };

            match frame {
                Some(Ok(Message::Ping(data))) => {
                    // Answer pings at transport level
                    if let Err(e) = self.send_raw(Message::Pong(data)).await {
                        warn!("Failed to send pong response: {}", e);
                    }
                }
                Some(Ok(Message::Pong(_))) => {}
                Some(Ok(Message::Close(_))) | None => {
                    self.connected = false;
                    return None;
                }
                Some(Ok(message)) => return Some(Ok(message)),
                Some(Err(e)) => {
                    self.connected = false;
                    return Some(Err(ExchangeError::NetworkError(format!(
                        "Websocket error: {}",
                        e
                    ))));
                }
            }
        }
    }

    #[instrument(skip(self), fields(exchange = %self.exchange_name))]
    async fn close(&mut self) -> Result<(), ExchangeError> {
        if let Some(write) = self.write.as_mut() {
            let _ = write.send(Message::Close(None)).await;
        }
        self.connected = false;
        self.write = None;
        self.read = None;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Wrapper that adds automatic reconnection capabilities.
///
/// The core session treats a dropped transport as terminal; this decorator is
/// the explicit opt-in for anything else. After a successful reconnect it
/// replays the stored handshake frame so the server starts pushing events
/// again.
pub struct ReconnectWs<W: WsSession> {
    inner: W,
    max_reconnect_attempts: u32,
    reconnect_delay: Duration,
    handshake: Option<Message>,
}

impl<W: WsSession> ReconnectWs<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            max_reconnect_attempts: 5,
            reconnect_delay: Duration::from_secs(1),
            handshake: None,
        }
    }

    /// Set the maximum number of reconnection attempts
    #[must_use]
    pub fn with_max_reconnect_attempts(mut self, max_attempts: u32) -> Self {
        self.max_reconnect_attempts = max_attempts;
        self
    }

    /// Set the initial delay between reconnection attempts
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Set the handshake frame to replay after reconnecting
    #[must_use]
    pub fn with_handshake(mut self, handshake: Message) -> Self {
        self.handshake = Some(handshake);
        self
    }

    async fn attempt_reconnect(&mut self) -> Result<(), ExchangeError> {
        let mut attempts = 0;
        let mut delay = self.reconnect_delay;

        while attempts < self.max_reconnect_attempts {
            attempts += 1;

            match self.inner.connect().await {
                Ok(()) => {
                    if let Some(handshake) = self.handshake.clone() {
                        if let Err(e) = self.inner.send_raw(handshake).await {
                            warn!("Failed to replay handshake after reconnection: {}", e);
                            continue;
                        }
                    }
                    return Ok(());
                }
                Err(e) => {
                    error!("Reconnection attempt {} failed: {}", attempts, e);
                    if attempts < self.max_reconnect_attempts {
                        sleep(delay).await;
                        delay = std::cmp::min(delay * 2, Duration::from_secs(60));
                    }
                }
            }
        }

        Err(ExchangeError::NetworkError(format!(
            "Failed to reconnect after {} attempts",
            self.max_reconnect_attempts
        )))
    }
}

#[async_trait]
impl<W: WsSession> WsSession for ReconnectWs<W> {
    async fn connect(&mut self) -> Result<(), ExchangeError> {
        self.inner.connect().await
    }

    async fn send_raw(&mut self, msg: Message) -> Result<(), ExchangeError> {
        if !self.inner.is_connected() {
            self.attempt_reconnect().await?;
        }
        self.inner.send_raw(msg).await
    }

    async fn next_raw(&mut self) -> Option<Result<Message, ExchangeError>> {
        loop {
            if !self.inner.is_connected() {
                if let Err(e) = self.attempt_reconnect().await {
                    return Some(Err(e));
                }
            }

            match self.inner.next_raw().await {
                Some(Ok(msg)) => return Some(Ok(msg)),
                // Transport dropped: try to pick the stream back up.
                Some(Err(_)) | None => {
                    if let Err(reconnect_err) = self.attempt_reconnect().await {
                        return Some(Err(reconnect_err));
                    }
                }
            }
        }
    }

    async fn close(&mut self) -> Result<(), ExchangeError> {
        self.inner.close().await
    }

    fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }
}
