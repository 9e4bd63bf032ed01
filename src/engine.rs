//! One polling cycle, start to finish.
//!
//! [`PollEngine::run_cycle`] builds the request for the configured mode,
//! signs it when the endpoint is private, sends it, decodes the body and
//! runs change detection. It never touches the caller's state: the
//! previous value is borrowed and a replacement is returned, so an error
//! anywhere leaves the host's slot exactly as it was.

use std::time::SystemTime;

use tracing::info;

use crate::Result;
use crate::auth::{auth_payload, next_nonce, sign};
use crate::config::{Credentials, WatchSettings};
use crate::decode::decode;
use crate::diff::{DiffOptions, detect};
use crate::error::WatchError;
use crate::models::alert::AlertSnapshot;
use crate::models::{Mode, Notification, PersistedState, Snapshot};
use crate::transport::{HttpRequest, Method, Transport};

/// Body sent to the alerts endpoint (and included in its signature).
const ALERTS_REQUEST_BODY: &str = r#"{"type":"price"}"#;

/// Result of a successful cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleOutcome {
    /// Records to hand to the event sink, in order.
    pub emitted: Vec<Notification>,
    /// Value to store for the next cycle; `None` keeps the current slot.
    pub next_state: Option<PersistedState>,
    /// Wall-clock time the cycle finished.
    pub completed_at: SystemTime,
}

/// Drives polling cycles for one configured instance.
pub struct PollEngine<T> {
    settings: WatchSettings,
    credentials: Option<Credentials>,
    transport: T,
}

impl<T: Transport> PollEngine<T> {
    /// Creates an engine after checking that `credentials` fit the mode.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::Config`] if a private mode has no credentials
    /// or the ticker mode has no symbol.
    pub fn new(
        settings: WatchSettings,
        credentials: Option<Credentials>,
        transport: T,
    ) -> Result<Self> {
        if settings.mode.requires_credentials() && credentials.is_none() {
            return Err(WatchError::Config(format!(
                "mode {} requires an API key and secret",
                settings.mode
            )));
        }
        if settings.mode == Mode::Ticker && settings.ticker_symbol.is_empty() {
            return Err(WatchError::Config("mode ticker requires a symbol".to_string()));
        }
        Ok(Self {
            settings,
            credentials,
            transport,
        })
    }

    /// Returns the settings this engine was built with.
    pub fn settings(&self) -> &WatchSettings {
        &self.settings
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Runs one fetch → decode → diff cycle against `previous`.
    ///
    /// # Errors
    ///
    /// Returns a [`WatchError`] if the request cannot be signed or sent,
    /// the exchange answers with a non-2xx status, or the body cannot be
    /// decoded. No state is produced in that case.
    pub async fn run_cycle(&self, previous: Option<&PersistedState>) -> Result<CycleOutcome> {
        let request = self.build_request()?;
        let response = self.transport.send(&request).await?;

        info!("request status: {}", response.status);
        if self.settings.debug {
            info!(body = %String::from_utf8_lossy(&response.body), "response body");
        }

        if !response.is_success() {
            return Err(WatchError::Status {
                status: response.status,
                body: String::from_utf8_lossy(&response.body).into_owned(),
            });
        }

        let snapshot = decode(self.settings.mode, &self.settings.ticker_symbol, &response.body)?;
        if let Snapshot::Alerts(AlertSnapshot(alerts)) = &snapshot {
            let count = alerts.as_array().map_or(0, Vec::len);
            info!(count, "fetched alerts");
        }

        let diff = detect(
            previous,
            &snapshot,
            DiffOptions {
                changes_only: self.settings.changes_only,
                trace_matches: self.settings.debug,
            },
        );

        Ok(CycleOutcome {
            emitted: diff.emit,
            next_state: diff.next_state,
            completed_at: SystemTime::now(),
        })
    }

    /// Builds the request for the configured mode, signing it if needed.
    pub fn build_request(&self) -> Result<HttpRequest> {
        let mut headers = vec![("Accept".to_string(), "application/json".to_string())];

        let Some(resource) = self.settings.mode.auth_resource() else {
            let url = format!(
                "{}/v2/ticker/{}",
                self.settings.public_url.trim_end_matches('/'),
                self.settings.ticker_symbol
            );
            return Ok(HttpRequest {
                method: Method::Get,
                url,
                headers,
                body: String::new(),
            });
        };

        let credentials = self.credentials.as_ref().ok_or_else(|| {
            WatchError::Config(format!("mode {} requires credentials", self.settings.mode))
        })?;

        let body = match self.settings.mode {
            Mode::AlertsList => ALERTS_REQUEST_BODY.to_string(),
            Mode::GetBalances | Mode::Ticker => String::new(),
        };
        if !body.is_empty() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        let nonce = next_nonce();
        let signature = sign(&credentials.api_secret, &auth_payload(resource, &nonce, &body))?;

        headers.push(("bfx-nonce".to_string(), nonce));
        headers.push(("bfx-apikey".to_string(), credentials.api_key.clone()));
        headers.push(("bfx-signature".to_string(), signature));

        Ok(HttpRequest {
            method: Method::Post,
            url: format!(
                "{}/v2/auth/r/{resource}",
                self.settings.auth_url.trim_end_matches('/')
            ),
            headers,
            body,
        })
    }
}
