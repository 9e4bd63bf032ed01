//! Response decoding into typed snapshots.
//!
//! Bitfinex v2 answers with positional JSON arrays. Each row is turned
//! into a named struct here so the rest of the crate never indexes into
//! raw arrays.

use rust_decimal::Decimal;
use serde_json::Value;

use crate::Result;
use crate::error::WatchError;
use crate::models::alert::AlertSnapshot;
use crate::models::ticker::{TickerEntry, TickerSnapshot};
use crate::models::wallet::{WalletEntry, WalletSnapshot};
use crate::models::{Mode, Snapshot};

/// Minimum positions in a wallet row.
const WALLET_ROW_LEN: usize = 7;

/// Positions in a ticker array that map to [`TickerEntry`] fields.
const TICKER_ROW_LEN: usize = 14;

/// Length of the funding ticker as served by `/v2/ticker/f<CCY>`, with two
/// `null` placeholders before `FRR_AMOUNT_AVAILABLE`.
const FUNDING_TICKER_ROW_LEN: usize = 16;

/// Decodes a raw response body for `mode`.
///
/// `symbol` is only used in [`Mode::Ticker`], where it is attached to the
/// decoded values.
///
/// # Errors
///
/// Returns [`WatchError::Json`] if the body is not valid JSON, or
/// [`WatchError::Decode`] if it does not have the shape the mode expects.
pub fn decode(mode: Mode, symbol: &str, body: &[u8]) -> Result<Snapshot> {
    let value: Value = serde_json::from_slice(body)?;

    match mode {
        Mode::GetBalances => decode_wallets(&value).map(Snapshot::Wallets),
        Mode::AlertsList => Ok(Snapshot::Alerts(AlertSnapshot(value))),
        Mode::Ticker => {
            let entry = ticker_entry_from_row(&value)?;
            Ok(Snapshot::Ticker(TickerSnapshot {
                symbol: symbol.to_string(),
                entry,
            }))
        }
    }
}

/// Decodes the wallets array-of-arrays.
fn decode_wallets(value: &Value) -> Result<WalletSnapshot> {
    let rows = value
        .as_array()
        .ok_or_else(|| WatchError::Decode("wallets response is not an array".into()))?;

    rows.iter()
        .enumerate()
        .map(|(index, row)| wallet_entry_from_row(index, row))
        .collect()
}

/// Maps one wallet row
/// `[TYPE, CURRENCY, BALANCE, UNSETTLED_INTEREST, AVAILABLE_BALANCE, LAST_CHANGE, TRADE_DETAILS]`.
fn wallet_entry_from_row(index: usize, row: &Value) -> Result<WalletEntry> {
    let context = format!("wallet row {index}");
    let fields = row
        .as_array()
        .ok_or_else(|| WatchError::Decode(format!("{context} is not an array")))?;

    if fields.len() < WALLET_ROW_LEN {
        return Err(WatchError::Decode(format!(
            "{context} has {} positions, expected at least {WALLET_ROW_LEN}",
            fields.len()
        )));
    }

    Ok(WalletEntry {
        wallet_type: string_at(fields, 0, &context)?,
        currency: string_at(fields, 1, &context)?,
        balance: decimal_at(fields, 2, &context)?,
        unsettled_interest: decimal_at(fields, 3, &context)?,
        available_balance: optional_decimal_at(fields, 4, &context)?,
        last_change: fields[5].as_str().map(String::from),
        trade_details: Some(&fields[6]).filter(|v| !v.is_null()).cloned(),
    })
}

/// Maps the flat ticker array onto named fields.
///
/// This is the only place that knows the exchange's positional layout.
/// Both the compact 14-position form and the 16-position funding form
/// (`..., HIGH, LOW, null, null, FRR_AMOUNT_AVAILABLE`) are accepted.
/// Trading-pair tickers (10 positions, no FRR) are rejected.
pub fn ticker_entry_from_row(value: &Value) -> Result<TickerEntry> {
    let context = "ticker";
    let f = value
        .as_array()
        .ok_or_else(|| WatchError::Decode("ticker response is not an array".into()))?;

    if f.len() < TICKER_ROW_LEN {
        return Err(WatchError::Decode(format!(
            "ticker has {} positions, expected at least {TICKER_ROW_LEN}",
            f.len()
        )));
    }

    let placeholders = f.len() >= FUNDING_TICKER_ROW_LEN && f[13].is_null() && f[14].is_null();
    let frr_amount_pos = if placeholders { 15 } else { 13 };

    Ok(TickerEntry {
        frr: decimal_at(f, 0, context)?,
        bid: decimal_at(f, 1, context)?,
        bid_period: decimal_at(f, 2, context)?,
        bid_size: decimal_at(f, 3, context)?,
        ask: decimal_at(f, 4, context)?,
        ask_period: decimal_at(f, 5, context)?,
        ask_size: decimal_at(f, 6, context)?,
        daily_change: decimal_at(f, 7, context)?,
        daily_change_relative: decimal_at(f, 8, context)?,
        last_price: decimal_at(f, 9, context)?,
        volume: decimal_at(f, 10, context)?,
        high: decimal_at(f, 11, context)?,
        low: decimal_at(f, 12, context)?,
        frr_amount_available: decimal_at(f, frr_amount_pos, context)?,
    })
}

fn string_at(fields: &[Value], pos: usize, context: &str) -> Result<String> {
    fields[pos]
        .as_str()
        .map(String::from)
        .ok_or_else(|| WatchError::Decode(format!("{context}: position {pos} is not a string")))
}

fn decimal_at(fields: &[Value], pos: usize, context: &str) -> Result<Decimal> {
    optional_decimal_at(fields, pos, context)?
        .ok_or_else(|| WatchError::Decode(format!("{context}: position {pos} is null")))
}

/// Reads a JSON number as a [`Decimal`]; `null` maps to `None`.
fn optional_decimal_at(fields: &[Value], pos: usize, context: &str) -> Result<Option<Decimal>> {
    let value = &fields[pos];
    if value.is_null() {
        return Ok(None);
    }
    if !value.is_number() {
        return Err(WatchError::Decode(format!(
            "{context}: position {pos} is not numeric: {value}"
        )));
    }
    serde_json::from_value(value.clone())
        .map(Some)
        .map_err(|e| WatchError::Decode(format!("{context}: position {pos}: {e}")))
}
