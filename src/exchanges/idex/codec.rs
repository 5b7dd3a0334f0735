use crate::core::errors::ExchangeError;
use crate::core::kernel::codec::WsCodec;
use crate::exchanges::idex::types::{OrderInserted, PushCancel, TradeInserted};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use serde_json::json;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// Client-identification values sent in the handshake frame
const HANDSHAKE_CLIENT_TYPE: &str = "client";
const HANDSHAKE_VERSION: &str = "2.0";

/// Events surfaced to stream consumers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdexStreamEvent {
    TradeInserted(TradeInserted),
    OrderInserted(OrderInserted),
    Cancel(PushCancel),
}

/// Unit delivered through the event channel: one event or one error per
/// message. Decode errors are followed by further messages; a transport
/// error is the last message before the channel closes.
pub type StreamMessage = Result<IdexStreamEvent, ExchangeError>;

/// Outer frame wrapper, decoded before committing to a payload schema.
///
/// The payload shape depends on the method tag, so a full-schema decode up
/// front would reject valid frames of every other kind.
#[derive(Debug, Deserialize)]
struct Envelope {
    method: String,
}

#[derive(Debug, Deserialize)]
struct TradesFrame {
    payload: Vec<TradeInserted>,
}

#[derive(Debug, Deserialize)]
struct OrderFrame {
    payload: OrderInserted,
}

#[derive(Debug, Deserialize)]
struct CancelFrame {
    payload: PushCancel,
}

#[derive(Debug, Deserialize)]
struct CancelsFrame {
    payload: Vec<PushCancel>,
}

/// IDEX websocket codec implementation
#[derive(Clone)]
pub struct IdexCodec {
    ws_key: Secret<String>,
}

impl IdexCodec {
    /// Create a new IDEX codec carrying the handshake access key
    pub fn new(ws_key: Secret<String>) -> Self {
        Self { ws_key }
    }
}

impl WsCodec for IdexCodec {
    type Message = IdexStreamEvent;

    fn encode_handshake(&self) -> Result<Message, ExchangeError> {
        let msg = json!({
            "method": "handshake",
            "payload": {
                "type": HANDSHAKE_CLIENT_TYPE,
                "version": HANDSHAKE_VERSION,
                "key": self.ws_key.expose_secret(),
            }
        });
        Ok(Message::Text(msg.to_string()))
    }

    fn decode_message(&self, message: Message) -> Result<Vec<Self::Message>, ExchangeError> {
        let text = match message {
            Message::Text(text) => text,
            _ => return Ok(Vec::new()),
        };

        let envelope: Envelope = serde_json::from_str(&text)
            .map_err(|e| ExchangeError::EnvelopeError(e.to_string()))?;

        match envelope.method.as_str() {
            "handshake" => {
                info!("Handshake successful");
                Ok(Vec::new())
            }
            "notifyTradesInserted" => {
                let frame: TradesFrame =
                    serde_json::from_str(&text).map_err(|e| payload_error(&envelope.method, &e))?;
                Ok(frame
                    .payload
                    .into_iter()
                    .map(IdexStreamEvent::TradeInserted)
                    .collect())
            }
            "notifyOrderInserted" => {
                let frame: OrderFrame =
                    serde_json::from_str(&text).map_err(|e| payload_error(&envelope.method, &e))?;
                Ok(vec![IdexStreamEvent::OrderInserted(frame.payload)])
            }
            "pushCancel" => {
                let frame: CancelFrame =
                    serde_json::from_str(&text).map_err(|e| payload_error(&envelope.method, &e))?;
                Ok(vec![IdexStreamEvent::Cancel(frame.payload)])
            }
            "pushCancels" => {
                let frame: CancelsFrame =
                    serde_json::from_str(&text).map_err(|e| payload_error(&envelope.method, &e))?;
                Ok(frame
                    .payload
                    .into_iter()
                    .map(IdexStreamEvent::Cancel)
                    .collect())
            }
            "pushEthPrice" | "pushServerBlock" | "pushRewardPoolSize" => {
                debug!(method = %envelope.method, "ignoring periodic notification");
                Ok(Vec::new())
            }
            other => {
                warn!(method = %other, "unrecognized stream method");
                Ok(Vec::new())
            }
        }
    }
}

fn payload_error(method: &str, err: &serde_json::Error) -> ExchangeError {
    ExchangeError::PayloadError {
        method: method.to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> IdexCodec {
        IdexCodec::new(Secret::new("test-key".to_string()))
    }

    #[test]
    fn handshake_frame_identifies_the_client() {
        let message = codec().encode_handshake().unwrap();
        let Message::Text(text) = message else {
            panic!("Expected text message");
        };
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["method"], "handshake");
        assert_eq!(value["payload"]["type"], "client");
        assert_eq!(value["payload"]["version"], "2.0");
        assert_eq!(value["payload"]["key"], "test-key");
    }

    #[test]
    fn trades_batch_expands_in_array_order() {
        let frame = r#"{"method":"notifyTradesInserted","payload":[
            {"id":1,"hash":"0xaa","v":28},
            {"id":2,"hash":"0xbb","v":"27"},
            {"id":3,"hash":"0xcc","v":28}
        ]}"#;
        let events = codec().decode_message(Message::Text(frame.to_string())).unwrap();
        assert_eq!(events.len(), 3);
        let ids: Vec<i64> = events
            .iter()
            .map(|e| match e {
                IdexStreamEvent::TradeInserted(t) => t.id,
                other => panic!("Expected trade event, got {:?}", other),
            })
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn order_inserted_yields_one_event() {
        let frame = r#"{"method":"notifyOrderInserted","payload":
            {"id":9,"hash":"0xdd","user":"0x12","v":"28","nonce":42}}"#;
        let events = codec().decode_message(Message::Text(frame.to_string())).unwrap();
        assert_eq!(events.len(), 1);
        let IdexStreamEvent::OrderInserted(order) = &events[0] else {
            panic!("Expected order event");
        };
        assert_eq!(order.v, 28);
        assert_eq!(order.nonce, 42);
    }

    #[test]
    fn single_cancel_yields_one_event() {
        let frame = r#"{"method":"pushCancel","payload":{"hash":"0xef46","v":27}}"#;
        let events = codec().decode_message(Message::Text(frame.to_string())).unwrap();
        assert_eq!(events.len(), 1);
        let IdexStreamEvent::Cancel(cancel) = &events[0] else {
            panic!("Expected cancel event");
        };
        assert_eq!(cancel.hash, "0xef46");
    }

    #[test]
    fn inert_methods_produce_nothing() {
        for frame in [
            r#"{"method":"handshake","payload":{}}"#,
            r#"{"method":"pushEthPrice","payload":"312.06"}"#,
            r#"{"method":"pushServerBlock","payload":5213041}"#,
            r#"{"method":"pushRewardPoolSize","payload":"100"}"#,
        ] {
            let events = codec().decode_message(Message::Text(frame.to_string())).unwrap();
            assert!(events.is_empty(), "frame should be inert: {}", frame);
        }
    }

    #[test]
    fn unrecognized_method_produces_nothing() {
        let frame = r#"{"method":"notifySomethingElse","payload":{}}"#;
        let events = codec().decode_message(Message::Text(frame.to_string())).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn missing_method_is_an_envelope_error() {
        let result = codec().decode_message(Message::Text(r#"{"payload":{}}"#.to_string()));
        assert!(matches!(result, Err(ExchangeError::EnvelopeError(_))));
    }

    #[test]
    fn invalid_json_is_an_envelope_error() {
        let result = codec().decode_message(Message::Text("not json".to_string()));
        assert!(matches!(result, Err(ExchangeError::EnvelopeError(_))));
    }

    #[test]
    fn malformed_batch_fails_the_whole_frame() {
        // payload should be an array of trades
        let frame = r#"{"method":"notifyTradesInserted","payload":{"id":1}}"#;
        let result = codec().decode_message(Message::Text(frame.to_string()));
        match result {
            Err(ExchangeError::PayloadError { method, .. }) => {
                assert_eq!(method, "notifyTradesInserted");
            }
            other => panic!("Expected payload error, got {:?}", other),
        }
    }

    #[test]
    fn invalid_recovery_field_is_a_payload_error() {
        let frame = r#"{"method":"pushCancel","payload":{"hash":"0xef46","v":"not-a-number"}}"#;
        let result = codec().decode_message(Message::Text(frame.to_string()));
        assert!(matches!(
            result,
            Err(ExchangeError::PayloadError { .. })
        ));
    }

    #[test]
    fn binary_frames_are_ignored() {
        let events = codec().decode_message(Message::Binary(vec![1, 2, 3])).unwrap();
        assert!(events.is_empty());
    }
}
