//! API version bounds.

/// Oldest API version the native client accepts.
pub const MIN_API_VERSION: i32 = 13;

/// API version of the C header these bindings are written against.
///
/// Passed as the `header_version` argument of `fdb_select_api_version_impl`.
/// Selecting a runtime version above this is rejected by the native client.
pub const HEADER_API_VERSION: i32 = 710;
