//! # nif-core
//!
//! Pure logic for fdbnif (no native calls, instant tests).
//!
//! ## Design Philosophy
//!
//! Nothing in this crate calls into the native client. It holds the pieces
//! every layer needs to agree on:
//! - [`InitGuard`] - the process-wide "initialize once" flag
//! - [`NetworkState`] - the network lifecycle as a side-effect-free state machine
//! - [`EntryPoint`] - the table of entry points and their arities
//!
//! The actual native calls are performed by `nif-client`, which feeds the
//! outcomes of those calls into the state machine.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod arity;
pub mod guard;
pub mod state;

pub use arity::{check_arity, ArityError, EntryPoint};
pub use guard::InitGuard;
pub use state::{NetworkAction, NetworkEvent, NetworkState};
