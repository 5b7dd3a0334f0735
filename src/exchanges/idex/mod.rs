pub mod codec;
pub mod connector;
pub mod rest;
pub mod types;

use crate::core::{
    config::ExchangeConfig,
    errors::ExchangeError,
    kernel::{
        ReconnectWs, ReqwestRest, RestClientBuilder, RestClientConfig, TungsteniteWs, WsCodec,
    },
};
use codec::IdexCodec;

// Re-export main types for easier importing
pub use codec::{IdexStreamEvent, StreamMessage};
pub use connector::IdexConnector;
pub use rest::IdexRestClient;
pub use types::{
    Balance, Currency, Deposit, DepositsWithdrawals, OpenOrder, Order, OrderBook, OrderInserted,
    OrderParams, PushCancel, Ticker, Trade, TradeInserted, Volume, Withdrawal,
};

const EXCHANGE_NAME: &str = "idex";

fn build_rest(config: &ExchangeConfig) -> Result<ReqwestRest, ExchangeError> {
    let rest_config = RestClientConfig::new(config.api_url.clone(), EXCHANGE_NAME.to_string());
    RestClientBuilder::new(rest_config).build()
}

/// Create a connector with REST-only support
pub fn build_connector(
    config: ExchangeConfig,
) -> Result<IdexConnector<ReqwestRest, TungsteniteWs>, ExchangeError> {
    let rest = build_rest(&config)?;
    Ok(IdexConnector::new(rest, None, config))
}

/// Create a connector with event stream support
pub fn build_connector_with_websocket(
    config: ExchangeConfig,
) -> Result<IdexConnector<ReqwestRest, TungsteniteWs>, ExchangeError> {
    let rest = build_rest(&config)?;
    let ws = TungsteniteWs::new(config.ws_url.clone(), EXCHANGE_NAME.to_string());
    Ok(IdexConnector::new(rest, Some(ws), config))
}

/// Create a connector whose event stream survives transport drops.
///
/// The reconnect decorator replays the client handshake after every
/// successful reconnect; consumers see one uninterrupted stream.
pub fn build_connector_with_reconnection(
    config: ExchangeConfig,
) -> Result<IdexConnector<ReqwestRest, ReconnectWs<TungsteniteWs>>, ExchangeError> {
    let rest = build_rest(&config)?;
    let handshake = IdexCodec::new(config.ws_key_secret()).encode_handshake()?;
    let base_ws = TungsteniteWs::new(config.ws_url.clone(), EXCHANGE_NAME.to_string());
    let reconnect_ws = ReconnectWs::new(base_ws)
        .with_max_reconnect_attempts(10)
        .with_reconnect_delay(std::time::Duration::from_secs(2))
        .with_handshake(handshake);
    Ok(IdexConnector::new(rest, Some(reconnect_ws), config))
}
