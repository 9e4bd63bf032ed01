use std::process::ExitCode;
use std::time::SystemTime;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use bfx_watch::config::fetch_config;
use bfx_watch::engine::PollEngine;
use bfx_watch::sink::JsonLinesSink;
use bfx_watch::store::JsonFileStore;
use bfx_watch::tls::build_tls_config;
use bfx_watch::transport::HttpTransport;
use bfx_watch::{Result, credentials, health};

fn main() -> ExitCode {
    // Events go to stdout, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    credentials::populate_env_from_keychain();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "failed to start runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "cycle failed");
            ExitCode::FAILURE
        }
    }
}

/// Runs a single cycle and records its outcome.
async fn run() -> Result<()> {
    let config = fetch_config()?;
    let store = JsonFileStore::new(&config.host.state_path);
    let mut stored = store.load()?;

    let tls_config = build_tls_config(config.host.ca_bundle.as_deref())?;
    let transport = HttpTransport::new(tls_config, config.host.timeout)?;

    let period_days = config.watch.expected_receive_period_days;
    let dry_run = config.host.dry_run;
    let engine = PollEngine::new(config.watch, config.credentials, transport)?;
    info!(mode = %engine.settings().mode, state = %store.path().display(), "starting cycle");

    let result = engine
        .run_cycle(stored.snapshot.as_ref())
        .await
        .and_then(|outcome| {
            let mut sink = JsonLinesSink::new(std::io::stdout().lock());
            stored.apply_outcome(outcome, &mut sink)
        });

    let published = match result {
        Ok(published) => published,
        Err(e) => {
            if !dry_run {
                stored.record_failure(SystemTime::now());
                if let Err(save_err) = store.save(&stored) {
                    warn!(error = %save_err, "failed to record error time");
                }
            }
            return Err(e);
        }
    };
    info!(emitted = published, "cycle complete");

    if dry_run {
        info!("dry run, state not saved");
    } else {
        store.save(&stored)?;
    }

    let now = stored.last_success_at.unwrap_or_default();
    if !health::is_working(&stored, period_days, now) {
        warn!(
            expected_receive_period_days = period_days,
            "no event within the expected receive period"
        );
    }

    Ok(())
}
