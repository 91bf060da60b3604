//! Host-side initialization sequence.
//!
//! Hosts call [`Bridge::boot`] from their load hook. The first boot in the
//! process selects the API version, applies configured network options and
//! starts the network; later boots do nothing.

use nif_client::FdbApi;
use nif_types::HEADER_API_VERSION;

use crate::config::BridgeConfig;
use crate::dispatch::Bridge;
use crate::error::CallError;

/// Result of [`Bridge::boot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootOutcome {
    /// This boot initialized the native client.
    Started {
        /// The API version that was selected.
        api_version: i32,
    },
    /// Another boot in this process already initialized it.
    AlreadyInitialized,
}

impl<A: FdbApi> Bridge<A> {
    /// Initialize the native client once per process.
    ///
    /// Uses `config.api.version` if set, otherwise the highest version both
    /// the library and these bindings support. Thread settings come from the
    /// bridge (see [`Bridge::with_config`]).
    ///
    /// # Errors
    ///
    /// The first failing step's error. The guard stays claimed, so a failed
    /// boot is not retried by a later one.
    pub fn boot(&self, config: &BridgeConfig) -> Result<BootOutcome, CallError> {
        if !self.can_initialize() {
            tracing::debug!("FoundationDB client already initialized");
            return Ok(BootOutcome::AlreadyInitialized);
        }

        let api_version = match config.api.version {
            Some(version) => version,
            None => self.get_max_api_version().min(HEADER_API_VERSION),
        };
        self.select_api_version(api_version)?;

        for setting in &config.network.options {
            let value = setting.encode()?;
            self.network_set_option(setting.name, value)?;
        }

        self.setup_network()?;
        tracing::info!(
            "FoundationDB client started (API version {}, {} network options)",
            api_version,
            config.network.options.len()
        );
        Ok(BootOutcome::Started { api_version })
    }
}
