use crate::core::errors::ExchangeError;
use crate::core::kernel::RestClient;
use crate::exchanges::idex::types::{
    Balance, Currency, DepositsWithdrawals, OpenOrder, OrderBook, Ticker, Trade, Volume,
};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;

/// Thin typed wrapper around `RestClient` for the IDEX HTTP API.
///
/// Every endpoint is a POST with an optional JSON body. Validation is limited
/// to the non-empty checks the API itself requires.
pub struct IdexRestClient<R: RestClient> {
    client: R,
}

fn require(value: &str, name: &str) -> Result<(), ExchangeError> {
    if value.is_empty() {
        return Err(ExchangeError::InvalidParameters(format!(
            "{} is required",
            name
        )));
    }
    Ok(())
}

impl<R: RestClient> IdexRestClient<R> {
    pub fn new(client: R) -> Self {
        Self { client }
    }

    /// Access the underlying transport
    pub fn inner(&self) -> &R {
        &self.client
    }

    /// Ticker for one market
    pub async fn ticker(&self, market: &str) -> Result<Ticker, ExchangeError> {
        require(market, "market")?;

        let value = self
            .client
            .post("returnTicker", Some(&json!({ "market": market })))
            .await?;

        // An unknown market comes back as an empty object, not an error status.
        if value.as_object().is_some_and(serde_json::Map::is_empty) {
            return Err(ExchangeError::Other(format!(
                "market {} not found",
                market
            )));
        }

        Ok(serde_json::from_value(value)?)
    }

    /// Tickers for all markets
    pub async fn tickers(&self) -> Result<HashMap<String, Ticker>, ExchangeError> {
        self.client.post_json("returnTicker", None).await
    }

    /// 24-hour volume for all markets
    pub async fn volume_24h(&self) -> Result<Volume, ExchangeError> {
        self.client.post_json("return24Volume", None).await
    }

    /// Order book for a market
    pub async fn order_book(&self, market: &str) -> Result<OrderBook, ExchangeError> {
        require(market, "market")?;
        self.client
            .post_json("returnOrderBook", Some(&json!({ "market": market })))
            .await
    }

    /// All open orders for a market and/or user address
    pub async fn open_orders(
        &self,
        market: &str,
        address: &str,
    ) -> Result<Vec<OpenOrder>, ExchangeError> {
        if market.is_empty() && address.is_empty() {
            return Err(ExchangeError::InvalidParameters(
                "market or address is required".to_string(),
            ));
        }

        self.client
            .post_json(
                "returnOpenOrders",
                Some(&json!({ "market": market, "address": address })),
            )
            .await
    }

    /// Trade history for a market, filterable by user and timestamps.
    /// The API caps the response at 200 trades.
    pub async fn trade_history_market(
        &self,
        market: &str,
        address: &str,
        start: i64,
        end: i64,
    ) -> Result<Vec<Trade>, ExchangeError> {
        require(market, "market")?;

        let body = if address.is_empty() {
            json!({ "market": market, "start": start, "end": end })
        } else {
            json!({ "market": market, "address": address, "start": start, "end": end })
        };

        self.client
            .post_json("returnTradeHistory", Some(&body))
            .await
    }

    /// Trade history for a user across all markets, filterable by timestamps.
    /// The API caps the response at 200 trades.
    pub async fn trade_history_user(
        &self,
        address: &str,
        start: i64,
        end: i64,
    ) -> Result<HashMap<String, Vec<Trade>>, ExchangeError> {
        require(address, "address")?;
        self.client
            .post_json(
                "returnTradeHistory",
                Some(&json!({ "address": address, "start": start, "end": end })),
            )
            .await
    }

    /// All supported currencies
    pub async fn currencies(&self) -> Result<HashMap<String, Currency>, ExchangeError> {
        self.client.post_json("returnCurrencies", None).await
    }

    /// Available balances for an address
    pub async fn balances(&self, address: &str) -> Result<HashMap<String, String>, ExchangeError> {
        require(address, "address")?;
        self.client
            .post_json("returnBalances", Some(&json!({ "address": address })))
            .await
    }

    /// Available balances together with amounts committed to open orders
    pub async fn complete_balances(
        &self,
        address: &str,
    ) -> Result<HashMap<String, Balance>, ExchangeError> {
        require(address, "address")?;
        self.client
            .post_json(
                "returnCompleteBalances",
                Some(&json!({ "address": address })),
            )
            .await
    }

    /// Deposits and withdrawals for an address within a timestamp range
    pub async fn deposits_withdrawals(
        &self,
        address: &str,
        start: i64,
        end: i64,
    ) -> Result<DepositsWithdrawals, ExchangeError> {
        require(address, "address")?;
        self.client
            .post_json(
                "returnDepositsWithdrawals",
                Some(&json!({ "address": address, "start": start, "end": end })),
            )
            .await
    }

    /// All trades involved in an order hash
    pub async fn order_trades(&self, hash: &str) -> Result<Vec<Trade>, ExchangeError> {
        require(hash, "hash")?;
        self.client
            .post_json("returnOrderTrades", Some(&json!({ "orderHash": hash })))
            .await
    }

    /// Next available nonce for an address
    pub async fn next_nonce(&self, address: &str) -> Result<i64, ExchangeError> {
        require(address, "address")?;

        #[derive(Deserialize)]
        struct NonceResponse {
            nonce: i64,
        }

        let response: NonceResponse = self
            .client
            .post_json("returnNextNonce", Some(&json!({ "address": address })))
            .await?;
        Ok(response.nonce)
    }

    /// The IDEX contract address
    pub async fn contract_address(&self) -> Result<String, ExchangeError> {
        #[derive(Deserialize)]
        struct AddressResponse {
            address: String,
        }

        let response: AddressResponse = self
            .client
            .post_json("returnContractAddress", None)
            .await?;
        Ok(response.address)
    }
}
