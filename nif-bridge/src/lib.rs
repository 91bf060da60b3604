//! # nif-bridge
//!
//! Host-agnostic entry points for the fdbnif FoundationDB bindings.
//!
//! This crate turns [`FdbClient`](nif_client::FdbClient) into a table of
//! named entry points that take and return [`Term`]s, so host bindings
//! (nif-python, or any other runtime) only convert values.
//!
//! ## Design
//!
//! - Every entry point checks its arity before decoding any argument
//! - Native error codes are carried unaltered in [`CallError::Native`]
//! - Malformed calls of any kind collapse to [`CallError::BadArg`]
//! - Thin wrappers; all lifecycle logic lives in nif-client and nif-core

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod boot;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;

pub use boot::BootOutcome;
pub use config::{BridgeConfig, ConfigError, OptionSetting, SettingValue};
pub use dispatch::Bridge;
pub use error::CallError;

pub use nif_client::MockFdb;
#[cfg(feature = "native")]
pub use nif_client::NativeFdb;
pub use nif_core::{check_arity, EntryPoint, NetworkState};
pub use nif_types::{atoms, FdbError, NetworkOption, OptionValue, Term, HEADER_API_VERSION};
