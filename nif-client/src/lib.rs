//! # nif-client
//!
//! Calls into the native FoundationDB client library.
//!
//! ## Features
//!
//! - **Native Seam**: [`FdbApi`] abstracts the handful of `fdb_c` functions
//!   the bridge uses; [`NativeFdb`] (feature `native`) links the real
//!   library and [`MockFdb`] emulates it in-process
//! - **Network Thread**: [`NetworkRunner`] runs the blocking native loop on a
//!   dedicated thread and waits for it to report readiness
//! - **Lifecycle**: [`FdbClient`] drives the pure state machine from
//!   `nif-core` with the outcomes of native calls
//!
//! ## Example
//!
//! ```ignore
//! use nif_client::{FdbClient, MockFdb};
//!
//! let client = FdbClient::new(MockFdb::new());
//! client.select_api_version(client.max_api_version())?;
//! client.setup_network()?;
//! // ... the network thread is now inside the native loop
//! client.stop_network()?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod client;
pub mod network;

pub use api::{FdbApi, MockCall, MockFdb};
#[cfg(feature = "native")]
pub use api::NativeFdb;
pub use client::{ClientError, FdbClient};
pub use network::{NetworkRunner, NetworkThreadConfig, ReadySignal};
