//! Healthcheck ping: fired after every successful reconciliation pass, if configured.

use std::time::Duration;

use tracing::warn;

const HEALTHCHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// GET `url` with a short timeout; any failure or non-2xx response is logged and
/// swallowed. Never affects the outcome of a sync pass.
pub fn send_healthcheck(client: &reqwest::blocking::Client, url: &str) {
    let result = client.get(url).timeout(HEALTHCHECK_TIMEOUT).send();
    match result {
        Ok(response) => {
            if let Err(err) = response.error_for_status() {
                warn!(%url, error = %err, "healthcheck returned a non-2xx status");
            }
        }
        Err(err) => {
            warn!(%url, error = %err, "healthcheck request failed");
        }
    }
}
