//! Public ticker models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Ticker values for one symbol, named in the exchange's positional order.
///
/// Values serialize as JSON numbers, the shape the exchange sends them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerEntry {
    /// Flash return rate.
    #[serde(with = "rust_decimal::serde::float")]
    pub frr: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub bid: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub bid_period: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub bid_size: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub ask: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub ask_period: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub ask_size: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub daily_change: Decimal,
    /// Daily change as a fraction (0.01 = 1%).
    #[serde(with = "rust_decimal::serde::float")]
    pub daily_change_relative: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub last_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub volume: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub high: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub low: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub frr_amount_available: Decimal,
}

/// A decoded ticker tagged with the configured symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSnapshot {
    pub symbol: String,
    #[serde(flatten)]
    pub entry: TickerEntry,
}
