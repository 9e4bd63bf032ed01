//! Instance configuration loaded from environment variables.
//!
//! - `BFX_MODE` — `get_balances`, `alerts_list` or `ticker` (required)
//! - `BFX_API_KEY` / `BFX_API_SECRET` — required for the private modes
//! - `BFX_TICKER_SYMBOL` — required for `ticker` (e.g. `tBTCUSD`, `fUSD`)
//! - `BFX_CHANGES_ONLY` — `true`/`false`, default `true`
//! - `BFX_DEBUG` — `true`/`false`, default `false`
//! - `BFX_EXPECTED_RECEIVE_PERIOD_DAYS` — positive integer, default `2`
//!
//! Endpoints, the HTTP timeout, an extra CA bundle, the state file path
//! and dry-run mode can be overridden as well; see [`AppConfig`].

use std::path::PathBuf;
use std::time::Duration;

use zeroize::Zeroizing;

use crate::models::Mode;

/// Default authenticated REST host.
pub const DEFAULT_AUTH_URL: &str = "https://api.bitfinex.com";

/// Default public REST host.
pub const DEFAULT_PUBLIC_URL: &str = "https://api-pub.bitfinex.com";

const DEFAULT_EXPECTED_RECEIVE_PERIOD_DAYS: u32 = 2;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_STATE_PATH: &str = "bfx-watch-state.json";

/// Top-level application configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub watch: WatchSettings,
    pub credentials: Option<Credentials>,
    pub host: HostConfig,
}

/// Settings the polling engine needs every cycle.
#[derive(Debug, Clone)]
pub struct WatchSettings {
    pub mode: Mode,
    /// Symbol for [`Mode::Ticker`]; empty otherwise.
    pub ticker_symbol: String,
    pub changes_only: bool,
    pub debug: bool,
    pub expected_receive_period_days: u32,
    pub auth_url: String,
    pub public_url: String,
}

/// API key pair for signed endpoints.
pub struct Credentials {
    pub api_key: String,
    pub api_secret: Zeroizing<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Settings for the reference host around the engine.
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub timeout: Duration,
    pub ca_bundle: Option<PathBuf>,
    pub state_path: PathBuf,
    /// Run the cycle and print events without saving state.
    pub dry_run: bool,
}

/// Loads and validates the configuration from the process environment.
///
/// # Errors
///
/// Returns [`WatchError::Config`](crate::WatchError::Config) describing the
/// first invalid or missing value.
pub fn fetch_config() -> crate::Result<AppConfig> {
    config_from(non_empty_var)
}

/// Builds the configuration from an arbitrary variable lookup.
///
/// `lookup` returns `None` for unset variables; empty strings should be
/// filtered out by the caller.
pub fn config_from<F>(lookup: F) -> crate::Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mode: Mode = lookup("BFX_MODE")
        .ok_or_else(|| crate::WatchError::Config("BFX_MODE is required".to_string()))?
        .parse()?;

    let api_key = lookup("BFX_API_KEY");
    let api_secret = lookup("BFX_API_SECRET");
    let credentials = if mode.requires_credentials() {
        let api_key = api_key.ok_or_else(|| {
            crate::WatchError::Config(format!("BFX_API_KEY is required for mode {mode}"))
        })?;
        let api_secret = api_secret.ok_or_else(|| {
            crate::WatchError::Config(format!("BFX_API_SECRET is required for mode {mode}"))
        })?;
        Some(Credentials {
            api_key,
            api_secret: Zeroizing::new(api_secret),
        })
    } else {
        None
    };

    let ticker_symbol = match mode {
        Mode::Ticker => lookup("BFX_TICKER_SYMBOL").ok_or_else(|| {
            crate::WatchError::Config("BFX_TICKER_SYMBOL is required for mode ticker".to_string())
        })?,
        Mode::GetBalances | Mode::AlertsList => String::new(),
    };

    let changes_only = bool_var(&lookup, "BFX_CHANGES_ONLY", true)?;
    let debug = bool_var(&lookup, "BFX_DEBUG", false)?;
    let dry_run = bool_var(&lookup, "BFX_DRY_RUN", false)?;

    let expected_receive_period_days = positive_var(
        &lookup,
        "BFX_EXPECTED_RECEIVE_PERIOD_DAYS",
        u64::from(DEFAULT_EXPECTED_RECEIVE_PERIOD_DAYS),
    )?;
    let expected_receive_period_days = u32::try_from(expected_receive_period_days).map_err(|_| {
        crate::WatchError::Config("BFX_EXPECTED_RECEIVE_PERIOD_DAYS is too large".to_string())
    })?;
    let timeout_secs = positive_var(&lookup, "BFX_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;

    Ok(AppConfig {
        watch: WatchSettings {
            mode,
            ticker_symbol,
            changes_only,
            debug,
            expected_receive_period_days,
            auth_url: lookup("BFX_AUTH_URL").unwrap_or_else(|| DEFAULT_AUTH_URL.to_string()),
            public_url: lookup("BFX_PUBLIC_URL").unwrap_or_else(|| DEFAULT_PUBLIC_URL.to_string()),
        },
        credentials,
        host: HostConfig {
            timeout: Duration::from_secs(timeout_secs),
            ca_bundle: lookup("BFX_CA_BUNDLE").map(PathBuf::from),
            state_path: lookup("BFX_STATE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_PATH)),
            dry_run,
        },
    })
}

/// Parses a `true`/`false` flag, falling back to `default` when unset.
fn bool_var<F>(lookup: &F, name: &str, default: bool) -> crate::Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name).as_deref().map(str::trim) {
        None => Ok(default),
        Some(v) if v.eq_ignore_ascii_case("true") => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") => Ok(false),
        Some(v) => Err(crate::WatchError::Config(format!(
            "if provided, {name} must be true or false, got {v:?}"
        ))),
    }
}

/// Parses a strictly positive integer, falling back to `default` when unset.
fn positive_var<F>(lookup: &F, name: &str, default: u64) -> crate::Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(crate::WatchError::Config(format!(
            "{name} must be a positive integer, got {raw:?}"
        ))),
    }
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}
