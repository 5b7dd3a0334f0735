use crate::core::errors::ExchangeError;
use tokio_tungstenite::tungstenite::Message;

/// Codec trait for exchange-specific websocket message encoding/decoding.
///
/// The codec owns the two protocol concerns the transport cannot: producing
/// the one-shot client-identification frame sent after connecting, and
/// turning raw frames into typed messages.
pub trait WsCodec: Send + Sync + 'static {
    /// The type representing parsed messages from this exchange
    type Message: Send + Sync;

    /// Encode the client-identification frame sent once after connecting.
    fn encode_handshake(&self) -> Result<Message, ExchangeError>;

    /// Decode one raw frame into zero or more typed messages.
    ///
    /// Batched payloads expand into multiple messages, preserving wire order.
    /// An empty vector means the frame was recognized but carries nothing for
    /// the consumer (acknowledgments, periodic notifications, unknown tags).
    ///
    /// # Errors
    /// A returned error is a per-frame decode failure; the transport is
    /// unaffected and the caller may keep reading.
    fn decode_message(&self, message: Message) -> Result<Vec<Self::Message>, ExchangeError>;
}
