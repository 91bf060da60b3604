//! Lifecycle driver over an [`FdbApi`].
//!
//! [`FdbClient`] performs native calls, feeds their outcomes into the pure
//! [`NetworkState`] machine, and executes the actions it returns (spawning or
//! joining the network thread).

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use nif_core::{NetworkAction, NetworkEvent, NetworkState};
use nif_types::{FdbError, NetworkOption, OptionValue, HEADER_API_VERSION};
use thiserror::Error;

use crate::api::FdbApi;
use crate::network::{NetworkRunner, NetworkThreadConfig};

/// Errors from client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The native library returned a nonzero code.
    #[error(transparent)]
    Native(#[from] FdbError),

    /// The network thread could not be spawned.
    #[error("failed to spawn network thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),

    /// The network thread did not report readiness in time.
    #[error("network thread not ready after {timeout_ms}ms")]
    NotReady {
        /// The configured bound.
        timeout_ms: u64,
    },

    /// The network thread panicked.
    #[error("network thread panicked")]
    ThreadPanicked,
}

/// Drives the native client through its lifecycle.
pub struct FdbClient<A: FdbApi> {
    api: Arc<A>,
    header_version: i32,
    thread_config: NetworkThreadConfig,
    inner: Mutex<ClientInner>,
}

#[derive(Debug, Default)]
struct ClientInner {
    state: NetworkState,
    runner: Option<NetworkRunner>,
}

impl<A: FdbApi> FdbClient<A> {
    /// Create a client over the given native API.
    pub fn new(api: A) -> Self {
        Self::from_arc(Arc::new(api))
    }

    /// Create a client over a shared native API.
    pub fn from_arc(api: Arc<A>) -> Self {
        Self {
            api,
            header_version: HEADER_API_VERSION,
            thread_config: NetworkThreadConfig::default(),
            inner: Mutex::new(ClientInner::default()),
        }
    }

    /// Use a custom network thread configuration.
    pub fn with_thread_config(mut self, config: NetworkThreadConfig) -> Self {
        self.thread_config = config;
        self
    }

    /// Override the header version passed on version selection.
    pub fn with_header_version(mut self, header_version: i32) -> Self {
        self.header_version = header_version;
        self
    }

    /// The native API this client drives.
    pub fn api(&self) -> &A {
        &self.api
    }

    fn lock(&self) -> MutexGuard<'_, ClientInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The native library's maximum supported API version.
    pub fn max_api_version(&self) -> i32 {
        self.api.max_api_version()
    }

    /// Select the runtime API version.
    pub fn select_api_version(&self, version: i32) -> Result<(), ClientError> {
        let mut inner = self.lock();
        self.api.select_api_version(version, self.header_version)?;
        tracing::info!("Selected FoundationDB API version {}", version);
        apply(&mut inner, NetworkEvent::VersionSelected { version });
        Ok(())
    }

    /// Set a network option. The value must already be encoded for the option.
    pub fn set_network_option(
        &self,
        option: NetworkOption,
        value: Option<OptionValue>,
    ) -> Result<(), ClientError> {
        let _inner = self.lock();
        self.api.network_set_option(option, value.as_ref())?;
        tracing::debug!("Applied network option {} ({})", option.name(), option.code());
        Ok(())
    }

    /// Set up the native network and start the network thread.
    ///
    /// Returns only after the thread reports it is entering the native loop.
    /// Native errors (including those from a repeated call) are returned
    /// unaltered. If the thread misses the ready timeout the client keeps
    /// it, the state stays `SetUp`, and `stop_network` or drop stops and
    /// joins it.
    pub fn setup_network(&self) -> Result<(), ClientError> {
        let mut inner = self.lock();
        self.api.setup_network()?;
        tracing::debug!("Native network set up");

        for action in apply(&mut inner, NetworkEvent::SetupSucceeded) {
            if action == NetworkAction::SpawnNetworkThread {
                self.start_runner(&mut inner)?;
            }
        }
        Ok(())
    }

    fn start_runner(&self, inner: &mut ClientInner) -> Result<(), ClientError> {
        let mut runner = NetworkRunner::spawn(Arc::clone(&self.api), &self.thread_config)?;
        match runner.wait_ready(self.thread_config.ready_timeout) {
            Ok(()) => {
                inner.runner = Some(runner);
                apply(inner, NetworkEvent::ThreadStarted);
                tracing::info!("Network thread '{}' running", self.thread_config.thread_name);
                Ok(())
            }
            Err(e @ ClientError::NotReady { .. }) => {
                tracing::warn!(
                    "Network thread '{}' not ready: {}",
                    self.thread_config.thread_name,
                    e
                );
                inner.runner = Some(runner);
                Err(e)
            }
            Err(e) => {
                let _ = runner.join();
                inner.state = NetworkState::Failed { code: None };
                Err(e)
            }
        }
    }

    /// Stop the native network and join the network thread.
    pub fn stop_network(&self) -> Result<(), ClientError> {
        let mut inner = self.lock();
        self.api.stop_network()?;
        tracing::info!("Native network stop requested");

        let actions = apply(&mut inner, NetworkEvent::StopSucceeded);
        if actions.contains(&NetworkAction::JoinNetworkThread) || inner.runner.is_some() {
            join_runner(&mut inner)?;
        }
        Ok(())
    }

    /// The native library's description of an error code.
    pub fn error_message(&self, code: i32) -> String {
        self.api.error_message(code)
    }

    /// Current lifecycle state.
    ///
    /// Picks up a readiness signal that arrived after the setup timeout, and
    /// notices a network loop that returned on its own.
    pub fn network_state(&self) -> NetworkState {
        let mut inner = self.lock();
        let ready = inner.runner.as_mut().is_some_and(NetworkRunner::is_ready);
        if ready && inner.state == NetworkState::SetUp {
            tracing::info!("Network thread '{}' running", self.thread_config.thread_name);
            apply(&mut inner, NetworkEvent::ThreadStarted);
        }

        let finished = inner.runner.as_ref().is_some_and(NetworkRunner::is_finished);
        if finished && inner.state.needs_stop() {
            if let Err(e) = join_runner(&mut inner) {
                tracing::warn!("Network thread exited unexpectedly: {}", e);
            }
        }
        inner.state.clone()
    }
}

impl<A: FdbApi> Drop for FdbClient<A> {
    fn drop(&mut self) {
        let inner = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        let runner = inner.runner.take();
        if runner.is_none() && !inner.state.needs_stop() {
            return;
        }
        if let Err(e) = self.api.stop_network() {
            tracing::warn!("Failed to stop native network on drop: {}", e);
            return;
        }
        if let Some(runner) = runner {
            if let Err(e) = runner.join() {
                tracing::warn!("Network thread failed on drop: {}", e);
            }
        }
    }
}

impl<A: FdbApi + std::fmt::Debug> std::fmt::Debug for FdbClient<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FdbClient")
            .field("api", &self.api)
            .field("header_version", &self.header_version)
            .field("state", &self.lock().state)
            .finish()
    }
}

fn apply(inner: &mut ClientInner, event: NetworkEvent) -> Vec<NetworkAction> {
    let state = std::mem::take(&mut inner.state);
    let (state, actions) = state.on_event(event);
    inner.state = state;
    actions
}

/// Join the runner (if any) and record how the loop exited.
fn join_runner(inner: &mut ClientInner) -> Result<(), ClientError> {
    let Some(runner) = inner.runner.take() else {
        return Ok(());
    };
    match runner.join() {
        Ok(()) => {
            apply(inner, NetworkEvent::ThreadExited { code: None });
            Ok(())
        }
        Err(ClientError::Native(e)) => {
            apply(inner, NetworkEvent::ThreadExited { code: Some(e.code()) });
            Err(ClientError::Native(e))
        }
        Err(e) => {
            inner.state = NetworkState::Failed { code: None };
            Err(e)
        }
    }
}
