//! Typed snapshots for the three polled endpoints.
//!
//! Contains the operating [`Mode`], the decoded [`Snapshot`] of one poll,
//! the [`PersistedState`] slot the host keeps between cycles, and the
//! [`Notification`] records emitted downstream.

pub mod alert;
pub mod ticker;
pub mod wallet;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use alert::AlertSnapshot;
use ticker::TickerSnapshot;
use wallet::{WalletEntry, WalletSnapshot};

/// What a configured instance polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Authenticated wallet balances (`/v2/auth/r/wallets`).
    GetBalances,
    /// Authenticated price alerts (`/v2/auth/r/alerts`).
    AlertsList,
    /// Public ticker for one symbol (`/v2/ticker/<symbol>`).
    Ticker,
}

impl Mode {
    /// All modes in configuration order.
    pub const ALL: [Mode; 3] = [Self::GetBalances, Self::AlertsList, Self::Ticker];

    /// Returns the configuration name of this mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GetBalances => "get_balances",
            Self::AlertsList => "alerts_list",
            Self::Ticker => "ticker",
        }
    }

    /// Whether requests in this mode must be signed.
    pub fn requires_credentials(self) -> bool {
        match self {
            Self::GetBalances | Self::AlertsList => true,
            Self::Ticker => false,
        }
    }

    /// Path segment after `/v2/auth/r/` for signed modes.
    pub fn auth_resource(self) -> Option<&'static str> {
        match self {
            Self::GetBalances => Some("wallets"),
            Self::AlertsList => Some("alerts"),
            Self::Ticker => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = crate::WatchError;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| {
                crate::WatchError::Config(format!(
                    "mode has invalid value {s:?}: should be 'get_balances', 'alerts_list' or 'ticker'"
                ))
            })
    }
}

/// The full decoded result of one poll.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    Wallets(WalletSnapshot),
    Alerts(AlertSnapshot),
    Ticker(TickerSnapshot),
}

/// The single value a host stores between cycles.
///
/// Replaced wholesale at the end of a cycle, never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum PersistedState {
    Wallets(WalletSnapshot),
    Ticker(TickerSnapshot),
}

/// A record handed to the event sink.
///
/// Serializes flat, without a variant tag, matching the event shape
/// downstream consumers already read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Notification {
    Wallet(WalletEntry),
    Ticker(TickerSnapshot),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_round_trips_through_config_names() {
        for mode in Mode::ALL {
            assert_eq!(mode.as_str().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn unknown_mode_is_a_config_error() {
        let err = "withdrawals".parse::<Mode>().unwrap_err();
        assert!(matches!(err, crate::WatchError::Config(_)));
        assert!(err.to_string().contains("withdrawals"));
    }

    #[test]
    fn only_private_modes_need_credentials() {
        assert!(Mode::GetBalances.requires_credentials());
        assert!(Mode::AlertsList.requires_credentials());
        assert!(!Mode::Ticker.requires_credentials());
        assert_eq!(Mode::Ticker.auth_resource(), None);
        assert_eq!(Mode::AlertsList.auth_resource(), Some("alerts"));
    }
}
