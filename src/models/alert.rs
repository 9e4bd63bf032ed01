//! Alerts endpoint model.

use serde::{Deserialize, Serialize};

/// Raw alerts payload, kept as decoded JSON.
///
/// Alerts are fetched and logged only; no identity key is defined for
/// them, so they never reach the change detector's emit path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertSnapshot(pub serde_json::Value);
