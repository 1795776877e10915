//! Sync Loop: consumes the event queue, coalesces bursts, invokes the reconciler,
//! and optionally pings a healthcheck endpoint on success.

use std::path::Path;
use std::time::Instant;

use tracing::{error, info};

use crate::healthcheck;
use crate::queue::{Op, QueueReceiver};
use crate::reconcile;

/// Run the sync loop until a `Stop` event is observed. Blocks on the queue between
/// passes; never runs two reconciliations concurrently.
pub fn polling_sync(
    directory: &Path,
    client: &reqwest::blocking::Client,
    live_maps_url: &str,
    delete_after: i64,
    queue: &QueueReceiver,
    healthcheck_url: Option<&str>,
) {
    let now = || {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|duration| duration.as_secs() as i64)
            .unwrap_or(0)
    };

    loop {
        let Ok(first) = queue.recv() else {
            return;
        };

        let reason = first.reason;
        let mut stop_requested = first.op == Op::Stop;
        while let Ok(drained) = queue.try_recv() {
            if drained.op == Op::Stop {
                stop_requested = true;
            }
        }

        if stop_requested {
            info!(reason, "stop requested, shutting down sync loop");
            return;
        }

        info!(reason, "starting sync pass");
        let started = Instant::now();
        match reconcile::sync_files(directory, client, live_maps_url, delete_after, now) {
            Ok(()) => {
                info!(reason, elapsed_ms = started.elapsed().as_millis() as u64, "sync pass completed");
                if let Some(url) = healthcheck_url {
                    healthcheck::send_healthcheck(client, url);
                }
            }
            Err(err) => {
                error!(reason, error = %err, "sync pass failed");
            }
        }
    }
}
