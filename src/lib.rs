pub mod core;
pub mod exchanges;

pub use crate::core::{config::ExchangeConfig, errors::ExchangeError};
pub use crate::exchanges::idex::IdexConnector;
pub use crate::exchanges::idex::{IdexStreamEvent, StreamMessage};
