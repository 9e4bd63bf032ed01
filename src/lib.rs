//! Change-detecting poller for the Bitfinex REST API.
//!
//! Each cycle fetches wallet balances, price alerts or a public ticker,
//! decodes the positional JSON into typed snapshots and compares them with
//! the state kept from the previous cycle, so downstream consumers only
//! see what actually changed. Scheduling is left to the host: run one
//! cycle per invocation (see [`engine::PollEngine::run_cycle`]).

pub mod auth;
pub mod config;
pub mod credentials;
pub mod decode;
pub mod diff;
pub mod engine;
pub mod error;
pub mod health;
pub mod models;
pub mod sink;
pub mod store;
pub mod tls;
pub mod transport;

pub use error::{Result, WatchError};
