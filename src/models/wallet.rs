//! Wallet balance models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of `/v2/auth/r/wallets`.
///
/// Amounts serialize as JSON numbers, matching the emitted event shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletEntry {
    /// Wallet type: "exchange", "margin" or "funding".
    pub wallet_type: String,
    /// Currency code (e.g., "BTC", "USD").
    pub currency: String,
    /// Total balance.
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    /// Unsettled interest.
    #[serde(with = "rust_decimal::serde::float")]
    pub unsettled_interest: Decimal,
    /// Balance available for orders; `null` until the exchange computes it.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub available_balance: Option<Decimal>,
    /// Description of the last ledger entry touching this wallet.
    pub last_change: Option<String>,
    /// Extra detail about the last change, as sent by the exchange.
    pub trade_details: Option<serde_json::Value>,
}

impl WalletEntry {
    /// Whether `other` is the same observation: wallet type, currency and
    /// balance all match. Every other field is ignored.
    pub fn same_identity(&self, other: &WalletEntry) -> bool {
        self.wallet_type == other.wallet_type
            && self.currency == other.currency
            && self.balance == other.balance
    }
}

/// Every wallet row from one poll, in response order.
pub type WalletSnapshot = Vec<WalletEntry>;

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn entry(currency: &str, balance: Decimal, interest: Decimal) -> WalletEntry {
        WalletEntry {
            wallet_type: "exchange".to_string(),
            currency: currency.to_string(),
            balance,
            unsettled_interest: interest,
            available_balance: None,
            last_change: None,
            trade_details: None,
        }
    }

    #[test]
    fn identity_ignores_secondary_fields() {
        let a = entry("BTC", dec!(1.0), dec!(0));
        let mut b = entry("BTC", dec!(1.0), dec!(5));
        b.available_balance = Some(dec!(0.5));
        b.last_change = Some("Trading fees".to_string());

        assert!(a.same_identity(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn identity_compares_balance_by_value() {
        let a = entry("BTC", dec!(1.0), dec!(0));
        let b = entry("BTC", dec!(1.00), dec!(0));
        assert!(a.same_identity(&b));
    }

    #[test]
    fn identity_differs_on_each_key_field() {
        let base = entry("BTC", dec!(1.0), dec!(0));

        let other_currency = entry("ETH", dec!(1.0), dec!(0));
        assert!(!base.same_identity(&other_currency));

        let other_balance = entry("BTC", dec!(2.0), dec!(0));
        assert!(!base.same_identity(&other_balance));

        let mut other_wallet = entry("BTC", dec!(1.0), dec!(0));
        other_wallet.wallet_type = "margin".to_string();
        assert!(!base.same_identity(&other_wallet));
    }
}
