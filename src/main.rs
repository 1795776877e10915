//! mapsyncd: a live-map synchronizer daemon.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use mapsyncd::config::Config;
use mapsyncd::triggers::mqtt::MqttSource;
use mapsyncd::triggers::signal::SignalSource;
use mapsyncd::triggers::timer::TimerSource;
use mapsyncd::{http, queue, sync_loop};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let config = Config::parse();
    init_logging(&config.log_level);

    let client = match http::build_client() {
        Ok(client) => client,
        Err(err) => {
            tracing::error!(error = %err, "failed to build HTTP client");
            return ExitCode::FAILURE;
        }
    };

    let (tx, rx) = queue::channel();

    // Scoped resources: each trigger source is released (thread joined, handlers
    // restored, connection closed) when it falls out of scope at the end of main.
    // Rust drops locals in reverse declaration order, so `_signals` is declared
    // first to guarantee it is torn down *last* -- signal handling must stay
    // installed while the subscription and timer scopes are still unwinding, so a
    // second SIGINT/SIGTERM during their teardown still hits the handler instead
    // of falling through to the OS default.
    let _signals = match SignalSource::install(tx.clone()) {
        Ok(signals) => Some(signals),
        Err(err) => {
            tracing::error!(error = %err, "failed to install signal handlers");
            None
        }
    };
    let _timer = TimerSource::start(Duration::from_secs(config.polling_interval), tx.clone());
    let _mqtt = config
        .mqtt_config()
        .map(|mqtt_config| MqttSource::connect(mqtt_config, tx));

    sync_loop::polling_sync(
        &config.maps_directory,
        &client,
        &config.live_maps_url,
        config.delete_after,
        &rx,
        config.healthcheck_url.as_deref(),
    );

    ExitCode::SUCCESS
}

fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
