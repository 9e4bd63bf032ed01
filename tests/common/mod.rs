//! Shared test utilities.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use zeroize::Zeroizing;

use bfx_watch::config::{Credentials, DEFAULT_AUTH_URL, DEFAULT_PUBLIC_URL, WatchSettings};
use bfx_watch::models::Mode;
use bfx_watch::transport::{HttpRequest, RawResponse, Transport};
use bfx_watch::{Result, WatchError};

/// Bitfinex public REST host.
pub const BITFINEX_PUBLIC_URL: &str = DEFAULT_PUBLIC_URL;

/// Transport that replays canned responses and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<RawResponse>>>,
    pub requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    /// Queues a response with `status` and `body`.
    pub fn respond(self, status: u16, body: &str) -> Self {
        self.responses.lock().unwrap().push_back(Ok(RawResponse {
            status,
            body: body.as_bytes().to_vec(),
        }));
        self
    }

    /// Queues a failure that never produced a response.
    pub fn fail(self, error: WatchError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn sent(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: &HttpRequest) -> Result<RawResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(WatchError::Io("no scripted response left".into())))
    }
}

/// Settings for `mode` pointing at the default hosts.
pub fn settings(mode: Mode, changes_only: bool) -> WatchSettings {
    WatchSettings {
        mode,
        ticker_symbol: if mode == Mode::Ticker {
            "fUSD".to_string()
        } else {
            String::new()
        },
        changes_only,
        debug: true,
        expected_receive_period_days: 2,
        auth_url: DEFAULT_AUTH_URL.to_string(),
        public_url: DEFAULT_PUBLIC_URL.to_string(),
    }
}

pub fn credentials() -> Option<Credentials> {
    Some(Credentials {
        api_key: "test-key".to_string(),
        api_secret: Zeroizing::new("test-secret".to_string()),
    })
}
