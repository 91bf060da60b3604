//! Seam over the native client library.
//!
//! This module abstracts the `fdb_c` entry points the bridge needs so the
//! rest of the crate can run against the real library or an in-process
//! emulation.
//!
//! # Design
//!
//! The trait is synchronous and mirrors the C functions one-to-one:
//! - `max_api_version()` / `select_api_version()` negotiate the API version
//! - `network_set_option()` / `setup_network()` prepare the network
//! - `run_network()` blocks until `stop_network()` is called from another thread
//!
//! Return codes are translated with [`FdbError::check`]; no code is altered.

mod mock;
#[cfg(feature = "native")]
mod native;

pub use mock::{MockCall, MockFdb};
#[cfg(feature = "native")]
pub use native::NativeFdb;

use nif_types::{FdbError, NetworkOption, OptionValue};

/// The native client functions used by the bridge.
///
/// Implementations must be shareable across threads: `run_network` is called
/// on the network thread while the others are called from host threads.
pub trait FdbApi: Send + Sync + 'static {
    /// `fdb_get_max_api_version`
    fn max_api_version(&self) -> i32;

    /// `fdb_select_api_version_impl`
    fn select_api_version(&self, runtime_version: i32, header_version: i32)
        -> Result<(), FdbError>;

    /// `fdb_network_set_option`
    fn network_set_option(
        &self,
        option: NetworkOption,
        value: Option<&OptionValue>,
    ) -> Result<(), FdbError>;

    /// `fdb_setup_network`
    fn setup_network(&self) -> Result<(), FdbError>;

    /// `fdb_run_network`. Blocks until the network is stopped.
    fn run_network(&self) -> Result<(), FdbError>;

    /// `fdb_stop_network`
    fn stop_network(&self) -> Result<(), FdbError>;

    /// `fdb_get_error`
    fn error_message(&self, code: i32) -> String;
}
