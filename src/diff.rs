//! Change detection between consecutive snapshots.
//!
//! Given the state persisted after the previous cycle and the snapshot
//! just decoded, [`detect`] decides which records to emit and what the
//! host should store next.

use tracing::info;

use crate::models::alert::AlertSnapshot;
use crate::models::ticker::TickerSnapshot;
use crate::models::wallet::WalletSnapshot;
use crate::models::{Notification, PersistedState, Snapshot};

/// Outcome of comparing a snapshot against the previous state.
#[derive(Debug, Clone, PartialEq)]
pub struct Diff {
    /// Records to publish, in snapshot order.
    pub emit: Vec<Notification>,
    /// Value the host should store. `None` leaves the slot as it is.
    pub next_state: Option<PersistedState>,
}

/// Knobs that change how wallet snapshots are compared.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffOptions {
    /// Emit only entries whose identity triple is new, instead of every
    /// entry every cycle.
    pub changes_only: bool,
    /// Log each identity lookup result.
    pub trace_matches: bool,
}

/// Compares `current` against `previous`.
///
/// A stored state of a different kind than `current` (for example after
/// the instance switched mode) is treated as absent.
pub fn detect(previous: Option<&PersistedState>, current: &Snapshot, options: DiffOptions) -> Diff {
    match current {
        Snapshot::Ticker(ticker) => {
            let previous = match previous {
                Some(PersistedState::Ticker(p)) => Some(p),
                _ => None,
            };
            detect_ticker(previous, ticker)
        }
        Snapshot::Wallets(wallets) => {
            let previous = match previous {
                Some(PersistedState::Wallets(p)) => Some(p),
                _ => None,
            };
            detect_wallets(previous, wallets, options)
        }
        Snapshot::Alerts(alerts) => detect_alerts(alerts),
    }
}

/// Whole-value comparison: one record when anything changed.
fn detect_ticker(previous: Option<&TickerSnapshot>, current: &TickerSnapshot) -> Diff {
    match previous {
        Some(previous) if previous == current => Diff {
            emit: Vec::new(),
            next_state: Some(PersistedState::Ticker(previous.clone())),
        },
        _ => Diff {
            emit: vec![Notification::Ticker(current.clone())],
            next_state: Some(PersistedState::Ticker(current.clone())),
        },
    }
}

fn detect_wallets(
    previous: Option<&WalletSnapshot>,
    current: &WalletSnapshot,
    options: DiffOptions,
) -> Diff {
    let unchanged = previous.is_some_and(|p| p == current);
    let next_state = match previous {
        Some(previous) if unchanged => PersistedState::Wallets(previous.clone()),
        _ => PersistedState::Wallets(current.clone()),
    };

    if !options.changes_only {
        return Diff {
            emit: all_entries(current),
            next_state: Some(next_state),
        };
    }

    if unchanged {
        return Diff {
            emit: Vec::new(),
            next_state: Some(next_state),
        };
    }

    let previous = match previous {
        Some(previous) if !previous.is_empty() => previous,
        _ => {
            return Diff {
                emit: all_entries(current),
                next_state: Some(next_state),
            };
        }
    };

    // O(n·m) membership scan by identity triple.
    let emit = current
        .iter()
        .filter(|entry| {
            let found = previous.iter().any(|p| entry.same_identity(p));
            if options.trace_matches {
                info!(
                    wallet_type = %entry.wallet_type,
                    currency = %entry.currency,
                    "found is {found}"
                );
            }
            !found
        })
        .cloned()
        .map(Notification::Wallet)
        .collect();

    Diff {
        emit,
        next_state: Some(next_state),
    }
}

/// Alerts are fetched for logging only.
fn detect_alerts(_alerts: &AlertSnapshot) -> Diff {
    Diff {
        emit: Vec::new(),
        next_state: None,
    }
}

fn all_entries(current: &WalletSnapshot) -> Vec<Notification> {
    current.iter().cloned().map(Notification::Wallet).collect()
}
