//! Dedicated thread for the native network loop.
//!
//! `fdb_run_network` blocks for the lifetime of the network, so it gets its
//! own OS thread. The thread signals right before entering the native loop;
//! [`NetworkRunner::wait_ready`] waits for that signal with a bound. The
//! runner keeps the join handle whether or not the signal arrived in time,
//! so a slow thread can still be stopped and joined.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use nif_types::FdbError;

use crate::api::FdbApi;
use crate::client::ClientError;

/// Default name of the network thread.
pub const DEFAULT_THREAD_NAME: &str = "fdb-network";

/// Default bound on the readiness rendezvous.
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(5);

/// Whole milliseconds in `d`, saturating at `u64::MAX`.
pub fn duration_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// How the network thread is spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkThreadConfig {
    /// OS thread name.
    pub thread_name: String,
    /// How long setup waits for the thread to report readiness.
    pub ready_timeout: Duration,
}

impl Default for NetworkThreadConfig {
    fn default() -> Self {
        Self {
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            ready_timeout: DEFAULT_READY_TIMEOUT,
        }
    }
}

/// Sent by the network thread right before it enters the native loop.
#[derive(Debug)]
pub struct ReadySignal(SyncSender<()>);

impl ReadySignal {
    /// Report readiness. A no-op if nobody is waiting anymore.
    pub fn notify(self) {
        let _ = self.0.send(());
    }
}

/// A spawned network thread.
#[derive(Debug)]
pub struct NetworkRunner {
    handle: JoinHandle<Result<(), FdbError>>,
    ready_rx: Receiver<()>,
    signaled: bool,
}

impl NetworkRunner {
    /// Spawn the thread that runs `api.run_network()`.
    ///
    /// Does not wait; call [`wait_ready`](Self::wait_ready).
    pub fn spawn<A: FdbApi>(api: Arc<A>, config: &NetworkThreadConfig) -> Result<Self, ClientError> {
        Self::spawn_with(config, move |ready| {
            ready.notify();
            tracing::debug!("Entering native network loop");
            let result = api.run_network();
            match &result {
                Ok(()) => tracing::debug!("Native network loop exited"),
                Err(e) => tracing::warn!("Native network loop failed: {}", e),
            }
            result
        })
    }

    /// Spawn a named thread running `body`, which must notify readiness
    /// before blocking.
    pub fn spawn_with<F>(config: &NetworkThreadConfig, body: F) -> Result<Self, ClientError>
    where
        F: FnOnce(ReadySignal) -> Result<(), FdbError> + Send + 'static,
    {
        let (ready_tx, ready_rx) = mpsc::sync_channel::<()>(1);
        let handle = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || body(ReadySignal(ready_tx)))
            .map_err(ClientError::ThreadSpawn)?;

        Ok(Self {
            handle,
            ready_rx,
            signaled: false,
        })
    }

    /// Wait up to `timeout` for the readiness signal.
    ///
    /// # Errors
    ///
    /// - [`ClientError::NotReady`] if no signal arrives in time. The thread
    ///   keeps running and the runner still owns it.
    /// - [`ClientError::ThreadPanicked`] if the thread ended without signaling
    pub fn wait_ready(&mut self, timeout: Duration) -> Result<(), ClientError> {
        if self.signaled {
            return Ok(());
        }
        match self.ready_rx.recv_timeout(timeout) {
            Ok(()) => {
                self.signaled = true;
                Ok(())
            }
            Err(RecvTimeoutError::Timeout) => Err(ClientError::NotReady {
                timeout_ms: duration_millis(timeout),
            }),
            Err(RecvTimeoutError::Disconnected) => Err(ClientError::ThreadPanicked),
        }
    }

    /// Whether the readiness signal has arrived, without blocking.
    pub fn is_ready(&mut self) -> bool {
        if !self.signaled {
            self.signaled = self.ready_rx.try_recv().is_ok();
        }
        self.signaled
    }

    /// Whether the thread has returned.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the thread and return the native loop's result.
    pub fn join(self) -> Result<(), ClientError> {
        match self.handle.join() {
            Ok(result) => result.map_err(ClientError::Native),
            Err(_) => Err(ClientError::ThreadPanicked),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockFdb;

    fn ready_mock() -> MockFdb {
        let fdb = MockFdb::new();
        fdb.select_api_version(710, 710).unwrap();
        fdb.setup_network().unwrap();
        fdb
    }

    #[test]
    fn default_config() {
        let config = NetworkThreadConfig::default();
        assert_eq!(config.thread_name, "fdb-network");
        assert_eq!(config.ready_timeout, Duration::from_secs(5));
    }

    #[test]
    fn duration_millis_saturates() {
        assert_eq!(duration_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(duration_millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn spawn_then_stop_and_join() {
        let fdb = ready_mock();
        let mut runner =
            NetworkRunner::spawn(Arc::new(fdb.clone()), &NetworkThreadConfig::default()).unwrap();
        runner.wait_ready(DEFAULT_READY_TIMEOUT).unwrap();
        assert!(runner.is_ready());

        fdb.stop_network().unwrap();
        runner.join().unwrap();
        assert!(!fdb.is_running());
    }

    #[test]
    fn loop_error_surfaces_on_join() {
        let fdb = ready_mock();
        fdb.fail_run_network(4100);
        let mut runner =
            NetworkRunner::spawn(Arc::new(fdb), &NetworkThreadConfig::default()).unwrap();
        runner.wait_ready(DEFAULT_READY_TIMEOUT).unwrap();

        let err = runner.join().unwrap_err();
        assert!(matches!(err, ClientError::Native(e) if e.code() == 4100));
    }

    #[test]
    fn zero_timeout_reports_not_ready_and_keeps_thread() {
        let (go_tx, go_rx) = mpsc::channel::<()>();
        let mut runner = NetworkRunner::spawn_with(&NetworkThreadConfig::default(), move |ready| {
            let _ = go_rx.recv();
            ready.notify();
            Ok(())
        })
        .unwrap();

        let err = runner.wait_ready(Duration::ZERO).unwrap_err();
        assert!(matches!(err, ClientError::NotReady { timeout_ms: 0 }));
        assert!(!runner.is_ready());

        // The late signal is still observed and the thread still joinable.
        go_tx.send(()).unwrap();
        runner.wait_ready(DEFAULT_READY_TIMEOUT).unwrap();
        assert!(runner.is_ready());
        runner.join().unwrap();
    }

    #[test]
    fn panic_before_signal_reports_thread_panicked() {
        let mut runner = NetworkRunner::spawn_with(&NetworkThreadConfig::default(), |_ready| {
            panic!("network thread setup failed");
        })
        .unwrap();

        let err = runner.wait_ready(DEFAULT_READY_TIMEOUT).unwrap_err();
        assert!(matches!(err, ClientError::ThreadPanicked));
        assert!(matches!(runner.join(), Err(ClientError::ThreadPanicked)));
    }

    #[test]
    fn thread_carries_configured_name() {
        let config = NetworkThreadConfig {
            thread_name: "fdb-net-test".to_string(),
            ..NetworkThreadConfig::default()
        };
        let (name_tx, name_rx) = mpsc::channel();
        let mut runner = NetworkRunner::spawn_with(&config, move |ready| {
            let _ = name_tx.send(thread::current().name().map(str::to_string));
            ready.notify();
            Ok(())
        })
        .unwrap();

        runner.wait_ready(DEFAULT_READY_TIMEOUT).unwrap();
        runner.join().unwrap();
        assert_eq!(name_rx.recv().unwrap().as_deref(), Some("fdb-net-test"));
    }
}
