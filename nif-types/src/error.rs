//! Error types for fdbnif.

use thiserror::Error;

/// A nonzero error code returned by the native client library.
///
/// The code is carried unaltered so callers can interpret it themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("fdb error {code}: {}", self.name())]
pub struct FdbError {
    code: i32,
}

/// Well-known client error codes and their symbolic names.
const KNOWN_CODES: &[(i32, &str)] = &[
    (1000, "operation_failed"),
    (1004, "timed_out"),
    (1007, "transaction_too_old"),
    (1009, "future_version"),
    (1020, "not_committed"),
    (1021, "commit_unknown_result"),
    (1025, "transaction_cancelled"),
    (1031, "transaction_timed_out"),
    (1101, "operation_cancelled"),
    (1102, "future_released"),
    (2000, "client_invalid_operation"),
    (2004, "key_outside_legal_range"),
    (2006, "invalid_option"),
    (2007, "invalid_option_value"),
    (2008, "network_not_setup"),
    (2009, "network_already_setup"),
    (2017, "used_during_commit"),
    (2025, "network_cannot_be_restarted"),
    (2101, "transaction_too_large"),
    (2102, "key_too_large"),
    (2103, "value_too_large"),
    (2200, "api_version_unset"),
    (2201, "api_version_already_set"),
    (2202, "api_version_invalid"),
    (2203, "api_version_not_supported"),
    (4000, "unknown_error"),
    (4100, "internal_error"),
];

impl FdbError {
    /// `api_version_unset`
    pub const API_VERSION_UNSET: i32 = 2200;
    /// `api_version_already_set`
    pub const API_VERSION_ALREADY_SET: i32 = 2201;
    /// `api_version_invalid`
    pub const API_VERSION_INVALID: i32 = 2202;
    /// `api_version_not_supported`
    pub const API_VERSION_NOT_SUPPORTED: i32 = 2203;
    /// `invalid_option`
    pub const INVALID_OPTION: i32 = 2006;
    /// `invalid_option_value`
    pub const INVALID_OPTION_VALUE: i32 = 2007;
    /// `network_not_setup`
    pub const NETWORK_NOT_SETUP: i32 = 2008;
    /// `network_already_setup`
    pub const NETWORK_ALREADY_SETUP: i32 = 2009;
    /// `network_cannot_be_restarted`
    pub const NETWORK_CANNOT_BE_RESTARTED: i32 = 2025;

    /// Wrap a raw code. Callers must only wrap nonzero codes; use
    /// [`FdbError::check`] to translate a native return value.
    pub const fn from_code(code: i32) -> Self {
        Self { code }
    }

    /// Translate a native return value: zero is success.
    pub fn check(code: i32) -> Result<(), FdbError> {
        if code == 0 {
            Ok(())
        } else {
            Err(Self { code })
        }
    }

    /// The raw native code.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Symbolic name of the code, `unknown_error` if not in the table.
    pub fn name(&self) -> &'static str {
        name_of(self.code).unwrap_or("unknown_error")
    }

    /// Codes produced by API version negotiation (22xx).
    pub fn is_api_version_error(&self) -> bool {
        (2200..2300).contains(&self.code)
    }

    /// Codes produced by network option handling and network lifecycle.
    pub fn is_network_error(&self) -> bool {
        matches!(
            self.code,
            Self::INVALID_OPTION
                | Self::INVALID_OPTION_VALUE
                | Self::NETWORK_NOT_SETUP
                | Self::NETWORK_ALREADY_SETUP
                | Self::NETWORK_CANNOT_BE_RESTARTED
        )
    }
}

/// Look up the symbolic name of a well-known code.
pub(crate) fn name_of(code: i32) -> Option<&'static str> {
    KNOWN_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| *name)
}

/// A term did not have the shape an entry point expected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TermError {
    /// Wrong kind of term.
    #[error("expected {expected}, found {found}")]
    Expected {
        /// What the decoder wanted.
        expected: &'static str,
        /// What it got.
        found: &'static str,
    },

    /// Integer does not fit the native type.
    #[error("integer out of range: {0}")]
    OutOfRange(i64),

    /// Option name or code is not in the registry.
    #[error("unknown network option: {0}")]
    UnknownOption(String),

    /// Value does not match the option's kind.
    #[error("option {option} takes {expected}")]
    OptionValue {
        /// Option name.
        option: &'static str,
        /// Expected value kind.
        expected: &'static str,
    },
}
