/// Unified transport layer.
///
/// The kernel contains only transport logic and generic interfaces; nothing
/// in it knows about IDEX message schemas. Exchange specifics plug in through
/// three seams:
///
/// - `RestClient`: HTTP request/response plumbing
/// - `WsSession`: websocket connection lifecycle and raw frames
/// - `WsCodec`: handshake encoding and frame decoding
///
/// Everything is trait-based so tests can inject scripted transports instead
/// of live sockets.
pub mod codec;
pub mod rest;
pub mod ws;

// Re-export key types for convenience
pub use codec::WsCodec;
pub use rest::{ReqwestRest, RestClient, RestClientBuilder, RestClientConfig};
pub use ws::{ReconnectWs, TungsteniteWs, WsConfig, WsSession};
