//! # nif-types
//!
//! Shared vocabulary for the fdbnif FoundationDB bridge.
//!
//! This crate provides the types every other fdbnif crate speaks:
//! - [`Term`] - host-agnostic value passed to and returned from entry points
//! - [`FdbError`] - a nonzero error code returned by the native client
//! - [`NetworkOption`], [`OptionValue`] - network options and their encoding
//! - [`MIN_API_VERSION`], [`HEADER_API_VERSION`] - API version bounds

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod option;
mod term;
mod version;

pub use error::{FdbError, TermError};
pub use option::{NetworkOption, OptionKind, OptionValue};
pub use term::{atoms, Term};
pub use version::{HEADER_API_VERSION, MIN_API_VERSION};
