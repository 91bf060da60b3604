//! Network lifecycle state machine.
//!
//! Pure transitions only: the client performs the native call, then feeds the
//! outcome in as a [`NetworkEvent`] and executes the returned actions.
//!
//! The state is observational. It never decides whether a native call is
//! made, so the native library's own error codes always reach the caller.
//! Success events are accepted from any state the native library could have
//! accepted them in.

/// Lifecycle of the native network - NO native calls, just transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkState {
    /// No API version selected through this client yet.
    Unconfigured,
    /// An API version was selected; options may be set.
    VersionSelected {
        /// The selected runtime API version.
        version: i32,
    },
    /// `fdb_setup_network` succeeded; the run loop is not yet running.
    SetUp,
    /// The network thread signaled it is entering the native run loop.
    Running,
    /// The run loop exited cleanly after a stop request.
    Stopped,
    /// The run loop exited with a native error, or the thread died.
    Failed {
        /// Native code, if the loop returned one.
        code: Option<i32>,
    },
}

/// Outcomes of native calls fed into the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkEvent {
    /// `fdb_select_api_version_impl` returned success.
    VersionSelected {
        /// The runtime version that was selected.
        version: i32,
    },
    /// `fdb_setup_network` returned success.
    SetupSucceeded,
    /// The network thread is about to enter `fdb_run_network`.
    ThreadStarted,
    /// `fdb_stop_network` returned success.
    StopSucceeded,
    /// The network thread finished.
    ThreadExited {
        /// Nonzero native code returned by the run loop, if any.
        code: Option<i32>,
    },
}

/// Work the client must do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkAction {
    /// Spawn the dedicated thread running the native loop.
    SpawnNetworkThread,
    /// Join the network thread.
    JoinNetworkThread,
}

impl NetworkState {
    /// Start in the Unconfigured state.
    pub fn new() -> Self {
        Self::Unconfigured
    }

    /// Process an event and return the new state plus actions to execute.
    pub fn on_event(self, event: NetworkEvent) -> (Self, Vec<NetworkAction>) {
        match (self, event) {
            // Before setup
            (
                Self::Unconfigured | Self::VersionSelected { .. },
                NetworkEvent::VersionSelected { version },
            ) => (Self::VersionSelected { version }, vec![]),
            (Self::Unconfigured | Self::VersionSelected { .. }, NetworkEvent::SetupSucceeded) => {
                (Self::SetUp, vec![NetworkAction::SpawnNetworkThread])
            }

            // From SetUp
            (Self::SetUp, NetworkEvent::ThreadStarted) => (Self::Running, vec![]),

            // Stop requested
            (Self::SetUp | Self::Running, NetworkEvent::StopSucceeded) => {
                (Self::Stopped, vec![NetworkAction::JoinNetworkThread])
            }

            // The loop returned without being asked to stop
            (Self::SetUp | Self::Running, NetworkEvent::ThreadExited { code }) => {
                (Self::Failed { code }, vec![NetworkAction::JoinNetworkThread])
            }

            // The loop returned an error after the stop request
            (Self::Stopped, NetworkEvent::ThreadExited { code: Some(code) }) => {
                (Self::Failed { code: Some(code) }, vec![])
            }

            // Invalid transitions - stay in current state
            (state, _) => (state, vec![]),
        }
    }

    /// Whether the network thread is in the native loop.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Whether the native network was set up at some point.
    pub fn is_set_up(&self) -> bool {
        matches!(
            self,
            Self::SetUp | Self::Running | Self::Stopped | Self::Failed { .. }
        )
    }

    /// Whether the native network is set up and has not been stopped.
    ///
    /// True while the thread may still be inside (or about to enter) the
    /// native loop, so shutdown must issue a native stop.
    pub fn needs_stop(&self) -> bool {
        matches!(self, Self::SetUp | Self::Running)
    }

    /// Short lowercase label for logs and hosts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unconfigured => "unconfigured",
            Self::VersionSelected { .. } => "version_selected",
            Self::SetUp => "set_up",
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Failed { .. } => "failed",
        }
    }
}

impl Default for NetworkState {
    fn default() -> Self {
        Self::new()
    }
}
