//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT)
//! - Record delivery in a [`TerminationSignal`] flag
//! - Let the main control flow observe the flag and do the real shutdown work
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe); the listener task does
//!   nothing but set the flag
//! - Repeated deliveries are idempotent
//! - The waiter both polls on a fixed interval and is woken by `Notify`,
//!   so shutdown latency is bounded by the poll interval at worst

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Process-wide termination flag.
///
/// Transitions false → true at most once and never reverts.
#[derive(Debug, Default)]
pub struct TerminationSignal {
    flag: AtomicBool,
    notify: Notify,
}

impl TerminationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a termination request has been received.
    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Record a termination request. Safe to call any number of times.
    pub fn set(&self) {
        if !self.flag.swap(true, Ordering::SeqCst) {
            // Stores a permit if nobody is waiting yet
            self.notify.notify_one();
        }
    }

    /// Block until the flag is set, checking at least every `poll_interval`.
    pub async fn wait(&self, poll_interval: Duration) {
        let mut ticker = tokio::time::interval(poll_interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        while !self.is_set() {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = self.notify.notified() => {}
            }
        }
    }
}

/// Install SIGINT and SIGTERM handlers that set `signal`.
///
/// Registration happens before this returns, so a signal delivered at any
/// later point is observed. Must be called from within a Tokio runtime.
#[cfg(unix)]
pub fn install_signal_handlers(
    signal: Arc<TerminationSignal>,
) -> std::io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{signal as unix_signal, SignalKind};

    let mut sigint = unix_signal(SignalKind::interrupt())?;
    let mut sigterm = unix_signal(SignalKind::terminate())?;

    Ok(tokio::spawn(async move {
        loop {
            let name = tokio::select! {
                received = sigint.recv() => match received {
                    Some(()) => "SIGINT",
                    None => break,
                },
                received = sigterm.recv() => match received {
                    Some(()) => "SIGTERM",
                    None => break,
                },
            };
            tracing::info!(signal = name, "Termination signal received");
            signal.set();
        }
    }))
}

#[cfg(not(unix))]
pub fn install_signal_handlers(
    signal: Arc<TerminationSignal>,
) -> std::io::Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!(signal = "ctrl-c", "Termination signal received");
            signal.set();
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_is_idempotent_and_monotonic() {
        let signal = TerminationSignal::new();
        assert!(!signal.is_set());

        for _ in 0..5 {
            signal.set();
            assert!(signal.is_set());
        }
    }

    #[test]
    fn concurrent_sets_and_reads() {
        let signal = Arc::new(TerminationSignal::new());

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let signal = signal.clone();
                std::thread::spawn(move || {
                    let mut seen = false;
                    for _ in 0..10_000 {
                        let now = signal.is_set();
                        // Once observed, never reverts
                        assert!(!(seen && !now));
                        seen = now;
                    }
                })
            })
            .collect();
        let writers: Vec<_> = (0..4)
            .map(|_| {
                let signal = signal.clone();
                std::thread::spawn(move || signal.set())
            })
            .collect();

        for handle in writers.into_iter().chain(readers) {
            handle.join().unwrap();
        }
        assert!(signal.is_set());
    }

    #[tokio::test]
    async fn wait_returns_immediately_when_already_set() {
        let signal = TerminationSignal::new();
        signal.set();
        tokio::time::timeout(Duration::from_millis(100), signal.wait(Duration::from_secs(60)))
            .await
            .expect("wait should not block once set");
    }

    #[tokio::test]
    async fn wait_wakes_on_set() {
        let signal = Arc::new(TerminationSignal::new());
        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.wait(Duration::from_secs(60)).await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());
        signal.set();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake well before the poll interval")
            .unwrap();
    }
}
