use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Decode the signature-recovery field `v`.
///
/// The feed encodes it as either a JSON number or a string of digits,
/// inconsistently across message kinds and even across messages of the same
/// kind. Both forms must yield the same integer; anything else fails the
/// containing payload.
pub(crate) fn recovery_byte<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u8::try_from(n).ok())
            .ok_or_else(|| de::Error::custom(format!("field v out of range: {}", n))),
        Value::String(s) => s
            .parse::<u8>()
            .map_err(|_| de::Error::custom(format!("field v is not numeric: {:?}", s))),
        other => Err(de::Error::custom(format!(
            "field v must be a number or numeric string, got {}",
            other
        ))),
    }
}

/// Ticker data
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Ticker {
    pub last: String,
    pub high: String,
    pub low: String,
    pub lowest_ask: String,
    pub highest_bid: String,
    pub percent_change: String,
    pub base_volume: String,
    pub quote_volume: String,
}

/// Bid and ask sides of a market's book
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct OrderBook {
    pub bids: Vec<Order>,
    pub asks: Vec<Order>,
}

/// One resting order in an `OrderBook`
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Order {
    pub price: String,
    pub amount: String,
    pub total: String,
    pub order_hash: String,
    pub params: Option<OrderParams>,
}

/// Signed order parameters attached to book and open orders
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderParams {
    pub token_buy: String,
    pub buy_symbol: String,
    pub buy_precision: i64,
    pub amount_buy: String,
    pub token_sell: String,
    pub sell_symbol: String,
    pub sell_precision: i64,
    pub amount_sell: String,
    pub expires: i64,
    pub nonce: i64,
    pub user: String,
}

/// Open order for a market or user
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OpenOrder {
    pub timestamp: i64,
    pub price: String,
    pub amount: String,
    pub total: String,
    pub order_hash: String,
    pub market: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub order_number: i64,
    pub params: Option<OrderParams>,
}

/// One executed trade from the history endpoints
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Trade {
    pub date: String,
    pub amount: String,
    #[serde(rename = "type")]
    pub trade_type: String,
    pub total: String,
    pub price: String,
    pub order_hash: String,
    pub uuid: String,
    pub buyer_fee: String,
    pub seller_fee: String,
    pub gas_fee: String,
    pub timestamp: i64,
    pub maker: String,
    pub taker: String,
    pub transaction_hash: String,
    pub usd_value: String,
}

/// Supported currency details
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Currency {
    pub name: String,
    pub decimals: i64,
    pub address: String,
}

/// Token balance available and committed to open orders
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Balance {
    pub available: String,
    pub on_orders: String,
}

/// One deposit into the exchange contract
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Deposit {
    pub deposit_number: i64,
    pub currency: String,
    pub amount: String,
    pub timestamp: i64,
    pub transaction_hash: String,
}

/// One withdrawal from the exchange contract
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Withdrawal {
    // The upstream API reuses the deposit key here.
    #[serde(rename = "depositNumber")]
    pub withdrawal_number: i64,
    pub currency: String,
    pub amount: String,
    pub timestamp: i64,
    pub transaction_hash: String,
    pub status: String,
}

/// Combined response of the deposits/withdrawals endpoint
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct DepositsWithdrawals {
    pub deposits: Vec<Deposit>,
    pub withdrawals: Vec<Withdrawal>,
}

/// 24-hour volume per market.
///
/// The wire object keys markets to per-currency amounts but also carries the
/// exchange-wide `totalETH` string in the same object, so this needs a custom
/// decode that pulls the total out of the map.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Volume {
    pub markets: HashMap<String, HashMap<String, String>>,
    pub total_eth: String,
}

impl<'de> Deserialize<'de> for Volume {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut raw: HashMap<String, Value> = HashMap::deserialize(deserializer)?;

        let total_eth = match raw.remove("totalETH") {
            Some(Value::String(s)) => s,
            Some(other) => {
                return Err(de::Error::custom(format!(
                    "totalETH must be a string, got {}",
                    other
                )))
            }
            None => String::new(),
        };

        let mut markets = HashMap::with_capacity(raw.len());
        for (market, amounts) in raw {
            let amounts: HashMap<String, String> =
                serde_json::from_value(amounts).map_err(de::Error::custom)?;
            markets.insert(market, amounts);
        }

        Ok(Self { markets, total_eth })
    }
}

/// Trade execution pushed over the event stream. Arrives in batches.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TradeInserted {
    pub id: i64,
    pub price: String,
    pub amount_precision: String,
    pub total_precision: String,
    pub date: String,
    pub timestamp: i64,
    pub seller_fee: String,
    pub buyer_fee: String,
    #[serde(rename = "type")]
    pub trade_type: String,
    pub token_buy: String,
    pub amount_buy: String,
    pub token_sell: String,
    pub amount_sell: String,
    pub fee_make: String,
    pub fee_take: String,
    pub gas_fee: String,
    pub buy: String,
    #[serde(deserialize_with = "recovery_byte")]
    pub v: u8,
    pub r: String,
    pub s: String,
    pub user: String,
    pub sell: String,
    pub hash: String,
    pub nonce: i64,
    pub amount: String,
    pub usd_value: String,
    pub gas_fee_adjusted: String,
    pub uuid: String,
    pub updated_at: String,
    pub created_at: String,
}

/// Newly placed order pushed over the event stream
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderInserted {
    pub complete: bool,
    pub id: i64,
    pub token_buy: String,
    pub amount_buy: String,
    pub token_sell: String,
    pub amount_sell: String,
    pub expires: i64,
    pub nonce: i64,
    pub user: String,
    #[serde(deserialize_with = "recovery_byte")]
    pub v: u8,
    pub r: String,
    pub s: String,
    pub hash: String,
    pub fee_discount: String,
    pub rewards_multiple: String,
    pub updated_at: String,
    pub created_at: String,
}

/// Order cancellation pushed over the event stream, singly or in batches
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PushCancel {
    pub id: i64,
    pub hash: String,
    pub user: String,
    #[serde(deserialize_with = "recovery_byte")]
    pub v: u8,
    pub r: String,
    pub s: String,
    pub updated_at: String,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovery_field_accepts_number_and_string() {
        let from_number: PushCancel =
            serde_json::from_str(r#"{"hash":"0xab","v":28}"#).unwrap();
        let from_string: PushCancel =
            serde_json::from_str(r#"{"hash":"0xab","v":"28"}"#).unwrap();
        assert_eq!(from_number.v, 28);
        assert_eq!(from_number.v, from_string.v);
    }

    #[test]
    fn recovery_field_rejects_non_numeric_string() {
        let result = serde_json::from_str::<PushCancel>(r#"{"hash":"0xab","v":"high"}"#);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("v"), "error should name the field: {}", err);
        assert!(err.contains("high"), "error should carry the value: {}", err);
    }

    #[test]
    fn recovery_field_rejects_other_json_types() {
        assert!(serde_json::from_str::<PushCancel>(r#"{"v":[28]}"#).is_err());
        assert!(serde_json::from_str::<PushCancel>(r#"{"v":true}"#).is_err());
        assert!(serde_json::from_str::<PushCancel>(r#"{"v":28.5}"#).is_err());
    }

    #[test]
    fn volume_pulls_total_out_of_market_map() {
        let json = r#"{
            "ETH_AURA": {"ETH": "1.2", "AURA": "810.4"},
            "ETH_SAN": {"ETH": "0.6", "SAN": "32.1"},
            "totalETH": "1.8"
        }"#;
        let volume: Volume = serde_json::from_str(json).unwrap();
        assert_eq!(volume.total_eth, "1.8");
        assert_eq!(volume.markets.len(), 2);
        assert_eq!(volume.markets["ETH_AURA"]["AURA"], "810.4");
        assert!(!volume.markets.contains_key("totalETH"));
    }

    #[test]
    fn withdrawal_number_reads_the_deposit_key() {
        let json = r#"{"depositNumber":64,"currency":"ETH","amount":"0.5",
            "timestamp":1516751522,"transactionHash":"0x12","status":"COMPLETE"}"#;
        let withdrawal: Withdrawal = serde_json::from_str(json).unwrap();
        assert_eq!(withdrawal.withdrawal_number, 64);
        assert_eq!(withdrawal.status, "COMPLETE");
    }

    #[test]
    fn open_order_reads_the_type_key() {
        let json = r#"{"timestamp":1516415000,"market":"ETH_AURA","type":"buy",
            "orderNumber":2101,"price":"0.3","amount":"7","total":"2.1",
            "orderHash":"0x3f","params":{"tokenBuy":"0x00","buySymbol":"ETH",
            "buyPrecision":18,"amountBuy":"2100000000000000000","tokenSell":"0xcd",
            "sellSymbol":"AURA","sellPrecision":18,"amountSell":"7000000000000000000",
            "expires":100000,"nonce":1,"user":"0x34"}}"#;
        let order: OpenOrder = serde_json::from_str(json).unwrap();
        assert_eq!(order.order_type, "buy");
        assert_eq!(order.order_number, 2101);
        let params = order.params.expect("params present");
        assert_eq!(params.sell_symbol, "AURA");
        assert_eq!(params.nonce, 1);
    }

    #[test]
    fn missing_payload_fields_fall_back_to_defaults() {
        let order: OrderInserted =
            serde_json::from_str(r#"{"hash":"0xcd","nonce":7}"#).unwrap();
        assert_eq!(order.hash, "0xcd");
        assert_eq!(order.nonce, 7);
        assert_eq!(order.v, 0);
        assert!(!order.complete);
    }
}
