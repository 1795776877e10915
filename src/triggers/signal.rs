//! Signal trigger source: installs SIGINT/SIGTERM handlers. The first signal pushes
//! a graceful stop; a second signal, received before shutdown completes, terminates
//! the process immediately, bypassing cleanup.

use std::process;
use std::thread::{self, JoinHandle};

use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use tracing::{info, warn};

use crate::queue::{QueueSender, TriggerEvent};

/// Scoped signal-handling resource. Handlers are restored to default on drop.
pub struct SignalSource {
    thread: Option<JoinHandle<()>>,
    handle: signal_hook::iterator::Handle,
}

impl SignalSource {
    pub fn install(queue: QueueSender) -> std::io::Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM])?;
        let handle = signals.handle();

        let thread = thread::spawn(move || {
            let mut first_signal_seen = false;
            for _ in signals.forever() {
                if !first_signal_seen {
                    first_signal_seen = true;
                    info!("received shutdown signal, requesting graceful stop");
                    if queue.send(TriggerEvent::stop("signal")).is_err() {
                        return;
                    }
                } else {
                    warn!("received second shutdown signal, terminating immediately");
                    process::exit(130);
                }
            }
        });

        Ok(Self { thread: Some(thread), handle })
    }
}

impl Drop for SignalSource {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
