use crate::core::config::{ConfigError, ExchangeConfig};
use crate::core::errors::ExchangeError;
use crate::core::kernel::{RestClient, WsCodec, WsSession};
use crate::exchanges::idex::codec::{IdexCodec, StreamMessage};
use crate::exchanges::idex::rest::IdexRestClient;
use crate::exchanges::idex::types::{
    Balance, Currency, DepositsWithdrawals, OpenOrder, OrderBook, Ticker, Trade, Volume,
};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, error};

const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// IDEX connector built on the kernel transports.
///
/// The REST client and websocket session are injected, never reached through
/// process-wide defaults, so tests can swap either for a scripted double.
pub struct IdexConnector<R: RestClient, W: WsSession + 'static> {
    rest: IdexRestClient<R>,
    ws: Option<W>,
    codec: IdexCodec,
    config: ExchangeConfig,
    channel_capacity: usize,
}

impl<R: RestClient, W: WsSession + 'static> IdexConnector<R, W> {
    /// Create a new connector with dependency injection
    pub fn new(rest: R, ws: Option<W>, config: ExchangeConfig) -> Self {
        let codec = IdexCodec::new(config.ws_key_secret());
        Self {
            rest: IdexRestClient::new(rest),
            ws,
            codec,
            config,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Bound of the event channel handed to the consumer. A full channel
    /// stalls the read loop instead of buffering.
    #[must_use]
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Get the current configuration
    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    /// Get the typed REST client
    pub fn rest(&self) -> &IdexRestClient<R> {
        &self.rest
    }

    /// Check if the websocket is connected
    pub fn is_websocket_connected(&self) -> bool {
        self.ws.as_ref().is_some_and(WsSession::is_connected)
    }
}

/// Event stream functionality
impl<R: RestClient, W: WsSession + 'static> IdexConnector<R, W> {
    /// Connect, send the client handshake, and spawn the read loop.
    ///
    /// Returns the consumer end of the event channel. Messages arrive in the
    /// exact order their frames were received; batched frames expand into one
    /// message per record. Handoff is blocking: a slow consumer stalls the
    /// read loop. The channel closes exactly once, when the loop exits.
    ///
    /// The session is consumed; restarting the stream takes a new connector
    /// (or a `ReconnectWs`-wrapped session, which restarts transparently).
    pub async fn subscribe_events(
        &mut self,
    ) -> Result<mpsc::Receiver<StreamMessage>, ExchangeError> {
        let mut session = self.ws.take().ok_or_else(|| {
            ExchangeError::ConfigError(ConfigError::InvalidConfiguration(
                "websocket session not configured".to_string(),
            ))
        })?;

        session.connect().await?;

        let handshake = self.codec.encode_handshake()?;
        session.send_raw(handshake).await?;

        let codec = self.codec.clone();
        let (tx, rx) = mpsc::channel(self.channel_capacity);

        tokio::spawn(async move {
            read_loop(session, &codec, tx).await;
        });

        Ok(rx)
    }
}

/// Sequential frame loop: read one frame, dispatch it, deliver every
/// resulting message, then read the next. Decode failures are delivered and
/// the loop keeps going; transport failures are delivered once and end it.
async fn read_loop<W: WsSession>(
    mut session: W,
    codec: &IdexCodec,
    tx: mpsc::Sender<StreamMessage>,
) {
    loop {
        match session.next_raw().await {
            Some(Ok(frame)) => match codec.decode_message(frame) {
                Ok(events) => {
                    for event in events {
                        if tx.send(Ok(event)).await.is_err() {
                            debug!("event consumer dropped, closing stream");
                            return;
                        }
                    }
                }
                Err(err) => {
                    if tx.send(Err(err)).await.is_err() {
                        debug!("event consumer dropped, closing stream");
                        return;
                    }
                }
            },
            Some(Err(err)) => {
                error!("stream transport failed: {}", err);
                let _ = tx.send(Err(err)).await;
                return;
            }
            None => {
                debug!("stream closed by peer");
                return;
            }
        }
    }
}

/// REST API functionality
impl<R: RestClient, W: WsSession + 'static> IdexConnector<R, W> {
    /// Ticker for one market
    pub async fn ticker(&self, market: &str) -> Result<Ticker, ExchangeError> {
        self.rest.ticker(market).await
    }

    /// Tickers for all markets
    pub async fn tickers(&self) -> Result<HashMap<String, Ticker>, ExchangeError> {
        self.rest.tickers().await
    }

    /// 24-hour volume for all markets
    pub async fn volume_24h(&self) -> Result<Volume, ExchangeError> {
        self.rest.volume_24h().await
    }

    /// Order book for a market
    pub async fn order_book(&self, market: &str) -> Result<OrderBook, ExchangeError> {
        self.rest.order_book(market).await
    }

    /// All open orders for a market and/or user address
    pub async fn open_orders(
        &self,
        market: &str,
        address: &str,
    ) -> Result<Vec<OpenOrder>, ExchangeError> {
        self.rest.open_orders(market, address).await
    }

    /// Trade history for a market
    pub async fn trade_history_market(
        &self,
        market: &str,
        address: &str,
        start: i64,
        end: i64,
    ) -> Result<Vec<Trade>, ExchangeError> {
        self.rest
            .trade_history_market(market, address, start, end)
            .await
    }

    /// Trade history for a user across all markets
    pub async fn trade_history_user(
        &self,
        address: &str,
        start: i64,
        end: i64,
    ) -> Result<HashMap<String, Vec<Trade>>, ExchangeError> {
        self.rest.trade_history_user(address, start, end).await
    }

    /// All supported currencies
    pub async fn currencies(&self) -> Result<HashMap<String, Currency>, ExchangeError> {
        self.rest.currencies().await
    }

    /// Available balances for an address
    pub async fn balances(&self, address: &str) -> Result<HashMap<String, String>, ExchangeError> {
        self.rest.balances(address).await
    }

    /// Available balances together with amounts in open orders
    pub async fn complete_balances(
        &self,
        address: &str,
    ) -> Result<HashMap<String, Balance>, ExchangeError> {
        self.rest.complete_balances(address).await
    }

    /// Deposits and withdrawals for an address
    pub async fn deposits_withdrawals(
        &self,
        address: &str,
        start: i64,
        end: i64,
    ) -> Result<DepositsWithdrawals, ExchangeError> {
        self.rest.deposits_withdrawals(address, start, end).await
    }

    /// All trades involved in an order hash
    pub async fn order_trades(&self, hash: &str) -> Result<Vec<Trade>, ExchangeError> {
        self.rest.order_trades(hash).await
    }

    /// Next available nonce for an address
    pub async fn next_nonce(&self, address: &str) -> Result<i64, ExchangeError> {
        self.rest.next_nonce(address).await
    }

    /// The IDEX contract address
    pub async fn contract_address(&self) -> Result<String, ExchangeError> {
        self.rest.contract_address().await
    }
}
