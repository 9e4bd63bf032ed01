//! JSON file holding one instance's state between invocations.
//!
//! The file is replaced atomically: the new content is written to a
//! sibling temp file and renamed over the old one, so an interrupted
//! save never leaves a half-written slot behind.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::engine::CycleOutcome;
use crate::models::PersistedState;
use crate::sink::EventSink;

/// Everything the reference host keeps between cycles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredState {
    /// Last snapshot returned by the change detector.
    #[serde(default)]
    pub snapshot: Option<PersistedState>,
    /// Unix seconds of the last cycle that completed without error.
    #[serde(default)]
    pub last_success_at: Option<u64>,
    /// Unix seconds of the last cycle that emitted at least one record.
    #[serde(default)]
    pub last_event_at: Option<u64>,
    /// Unix seconds of the last failed cycle.
    #[serde(default)]
    pub last_error_at: Option<u64>,
}

impl StoredState {
    /// Publishes a successful cycle's records, then advances the snapshot
    /// and timestamps. Returns how many records were published.
    ///
    /// Nothing is changed unless every record reached the sink.
    ///
    /// # Errors
    ///
    /// Returns the sink's error; the state is left as it was.
    pub fn apply_outcome<S: EventSink>(
        &mut self,
        outcome: CycleOutcome,
        sink: &mut S,
    ) -> Result<usize> {
        for record in &outcome.emitted {
            sink.emit(record)?;
        }

        let now = unix_secs(outcome.completed_at);
        self.last_success_at = Some(now);
        if !outcome.emitted.is_empty() {
            self.last_event_at = Some(now);
        }
        if let Some(next_state) = outcome.next_state {
            self.snapshot = Some(next_state);
        }
        Ok(outcome.emitted.len())
    }

    /// Marks a failed cycle at `at`. The snapshot is never touched.
    pub fn record_failure(&mut self, at: SystemTime) {
        self.last_error_at = Some(unix_secs(at));
    }
}

/// Converts a wall-clock time to whole unix seconds.
pub fn unix_secs(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

/// State slot backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored state; a missing file is the first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<StoredState> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoredState::default());
            }
            Err(e) => {
                return Err(crate::WatchError::Io(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };
        if contents.trim().is_empty() {
            return Ok(StoredState::default());
        }
        let state: StoredState = serde_json::from_str(&contents)?;
        Ok(state)
    }

    /// Replaces the stored state.
    ///
    /// # Errors
    ///
    /// Returns an error if the temp file cannot be written or renamed.
    pub fn save(&self, state: &StoredState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, json).map_err(|e| {
            crate::WatchError::Io(format!("failed to write {}: {e}", tmp.display()))
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            crate::WatchError::Io(format!(
                "failed to replace {}: {e}",
                self.path.display()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::Notification;
    use crate::models::wallet::WalletEntry;
    use crate::sink::VecSink;

    /// Sink that accepts `capacity` records, then fails.
    struct FullSink {
        capacity: usize,
        accepted: Vec<Notification>,
    }

    impl EventSink for FullSink {
        fn emit(&mut self, record: &Notification) -> Result<()> {
            if self.accepted.len() == self.capacity {
                return Err(crate::WatchError::Io("broken pipe".into()));
            }
            self.accepted.push(record.clone());
            Ok(())
        }
    }

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn changed_wallets() -> PersistedState {
        PersistedState::Wallets(vec![WalletEntry {
            wallet_type: "exchange".to_string(),
            currency: "CLO".to_string(),
            balance: dec!(20000000),
            unsettled_interest: dec!(0),
            available_balance: None,
            last_change: Some("Deposit".to_string()),
            trade_details: None,
        }])
    }

    fn sample_state() -> StoredState {
        StoredState {
            snapshot: Some(PersistedState::Wallets(vec![WalletEntry {
                wallet_type: "exchange".to_string(),
                currency: "CLO".to_string(),
                balance: dec!(10000000.0000000),
                unsettled_interest: dec!(0),
                available_balance: Some(dec!(0)),
                last_change: None,
                trade_details: None,
            }])),
            last_success_at: Some(1_700_000_000),
            last_event_at: Some(1_700_000_000),
            last_error_at: None,
        }
    }

    #[test]
    fn failed_cycle_keeps_snapshot_and_stamps_error() {
        let mut state = sample_state();
        let before = serde_json::to_string(&state.snapshot).unwrap();

        state.record_failure(at(1_700_003_600));

        assert_eq!(serde_json::to_string(&state.snapshot).unwrap(), before);
        assert_eq!(state.last_error_at, Some(1_700_003_600));
        assert_eq!(state.last_success_at, Some(1_700_000_000));
    }

    #[test]
    fn successful_cycle_publishes_then_replaces_snapshot() {
        let mut state = sample_state();
        let next = changed_wallets();
        let PersistedState::Wallets(entries) = &next else {
            unreachable!()
        };
        let outcome = CycleOutcome {
            emitted: vec![Notification::Wallet(entries[0].clone())],
            next_state: Some(next.clone()),
            completed_at: at(1_700_003_600),
        };
        let mut sink = VecSink::default();

        let published = state.apply_outcome(outcome, &mut sink).unwrap();

        assert_eq!(published, 1);
        assert_eq!(sink.records.len(), 1);
        assert_eq!(state.snapshot, Some(next));
        assert_eq!(state.last_success_at, Some(1_700_003_600));
        assert_eq!(state.last_event_at, Some(1_700_003_600));
    }

    #[test]
    fn quiet_cycle_advances_success_but_not_event_time() {
        let mut state = sample_state();
        let outcome = CycleOutcome {
            emitted: Vec::new(),
            next_state: state.snapshot.clone(),
            completed_at: at(1_700_003_600),
        };

        state.apply_outcome(outcome, &mut VecSink::default()).unwrap();

        assert_eq!(state.last_success_at, Some(1_700_003_600));
        assert_eq!(state.last_event_at, Some(1_700_000_000));
    }

    #[test]
    fn cycle_without_next_state_keeps_slot() {
        let mut state = sample_state();
        let before = state.snapshot.clone();
        let outcome = CycleOutcome {
            emitted: Vec::new(),
            next_state: None,
            completed_at: at(1_700_003_600),
        };

        state.apply_outcome(outcome, &mut VecSink::default()).unwrap();

        assert_eq!(state.snapshot, before);
        assert_eq!(state.last_success_at, Some(1_700_003_600));
    }

    #[test]
    fn sink_failure_leaves_state_untouched() {
        let mut state = sample_state();
        let before = state.clone();
        let next = changed_wallets();
        let PersistedState::Wallets(entries) = &next else {
            unreachable!()
        };
        let record = Notification::Wallet(entries[0].clone());
        let outcome = CycleOutcome {
            emitted: vec![record.clone(), record],
            next_state: Some(next),
            completed_at: at(1_700_003_600),
        };
        let mut sink = FullSink {
            capacity: 1,
            accepted: Vec::new(),
        };

        let err = state.apply_outcome(outcome, &mut sink).unwrap_err();

        assert!(matches!(err, crate::WatchError::Io(_)));
        assert_eq!(sink.accepted.len(), 1);
        assert_eq!(state, before);
    }

    #[test]
    fn missing_file_loads_as_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));
        assert_eq!(store.load().unwrap(), StoredState::default());
    }

    #[test]
    fn saved_state_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));
        let state = sample_state();

        store.save(&state).unwrap();

        assert_eq!(store.load().unwrap(), state);
        assert!(!dir.path().join("state.json.tmp").exists());
    }

    #[test]
    fn save_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));

        store.save(&sample_state()).unwrap();
        store.save(&StoredState::default()).unwrap();

        assert_eq!(store.load().unwrap(), StoredState::default());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{\"snapshot\": [").unwrap();

        let err = JsonFileStore::new(path).load().unwrap_err();
        assert!(matches!(err, crate::WatchError::Json(_)));
    }
}
