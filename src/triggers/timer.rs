//! Timer trigger source: pushes a sync event immediately, then every `interval`.

use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::queue::{QueueSender, TriggerEvent};

/// Scoped timer resource. Dropping it joins the background thread.
pub struct TimerSource {
    thread: Option<JoinHandle<()>>,
    shutdown: Arc<(Mutex<bool>, Condvar)>,
}

impl TimerSource {
    /// Spawn the timer thread. Pushes `(Sync, "timer")` immediately, then again
    /// every `interval` of wall time until stopped.
    pub fn start(interval: Duration, queue: QueueSender) -> Self {
        let shutdown = Arc::new((Mutex::new(false), Condvar::new()));
        let shutdown_clone = shutdown.clone();

        let thread = thread::spawn(move || {
            if queue.send(TriggerEvent::sync("timer")).is_err() {
                return;
            }
            let (lock, condvar) = &*shutdown_clone;
            let mut stopped = lock.lock().expect("timer shutdown mutex poisoned");
            loop {
                let (guard, timed_out) = condvar
                    .wait_timeout(stopped, interval)
                    .expect("timer shutdown mutex poisoned");
                stopped = guard;
                if *stopped {
                    return;
                }
                if timed_out.timed_out() && queue.send(TriggerEvent::sync("timer")).is_err() {
                    return;
                }
            }
        });

        Self { thread: Some(thread), shutdown }
    }

    /// Signal the timer to stop and join its thread.
    pub fn stop(mut self) {
        let (lock, condvar) = &*self.shutdown;
        *lock.lock().expect("timer shutdown mutex poisoned") = true;
        condvar.notify_one();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for TimerSource {
    fn drop(&mut self) {
        let (lock, condvar) = &*self.shutdown;
        *lock.lock().expect("timer shutdown mutex poisoned") = true;
        condvar.notify_one();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn fires_immediately_on_start() {
        let (tx, rx) = mpsc::channel();
        let timer = TimerSource::start(Duration::from_secs(60), tx);
        let event = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(event.reason, "timer");
        timer.stop();
    }

    #[test]
    fn fires_again_after_interval() {
        let (tx, rx) = mpsc::channel();
        let timer = TimerSource::start(Duration::from_millis(20), tx);
        let _first = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        let _second = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        timer.stop();
    }
}
