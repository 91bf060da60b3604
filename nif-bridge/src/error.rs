//! Error types for nif-bridge.
//!
//! Lower-layer errors collapse into the three outcomes a host can observe:
//! a malformed call, a native error code, or a network thread failure.

use nif_client::ClientError;
use nif_core::ArityError;
use nif_types::{atoms, FdbError, Term, TermError};
use thiserror::Error;

/// Errors returned by entry points.
#[derive(Debug, Error)]
pub enum CallError {
    /// Wrong argument count, wrong argument type, unknown option or entry
    /// point. No native call was made.
    #[error("bad arguments")]
    BadArg,

    /// Nonzero code from the native library, unaltered.
    #[error(transparent)]
    Native(FdbError),

    /// The network thread could not be started or did not report readiness.
    #[error("network thread error: {0}")]
    Network(String),
}

impl CallError {
    /// The native code, for native errors.
    pub fn code(&self) -> Option<i32> {
        match self {
            CallError::Native(e) => Some(e.code()),
            _ => None,
        }
    }

    /// Render as a term: `badarg`, `{fdb_error, Code}` or
    /// `{error, network_thread}`.
    pub fn to_term(&self) -> Term {
        match self {
            CallError::BadArg => Term::atom(atoms::BADARG),
            CallError::Native(e) => {
                Term::Tuple(vec![Term::atom(atoms::FDB_ERROR), Term::from(e.code())])
            }
            CallError::Network(_) => Term::Tuple(vec![
                Term::atom(atoms::ERROR),
                Term::atom(atoms::NETWORK_THREAD),
            ]),
        }
    }
}

impl From<ClientError> for CallError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Native(e) => CallError::Native(e),
            other => CallError::Network(other.to_string()),
        }
    }
}

impl From<FdbError> for CallError {
    fn from(err: FdbError) -> Self {
        CallError::Native(err)
    }
}

impl From<TermError> for CallError {
    fn from(err: TermError) -> Self {
        tracing::debug!("Rejected argument: {}", err);
        CallError::BadArg
    }
}

impl From<ArityError> for CallError {
    fn from(err: ArityError) -> Self {
        tracing::debug!("Rejected call: {}", err);
        CallError::BadArg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_native_error_keeps_code() {
        let err: CallError = ClientError::Native(FdbError::from_code(2203)).into();
        assert!(matches!(err, CallError::Native(_)));
        assert_eq!(err.code(), Some(2203));
    }

    #[test]
    fn client_thread_errors_map_to_network() {
        let err: CallError = ClientError::NotReady { timeout_ms: 50 }.into();
        assert!(matches!(err, CallError::Network(_)));
        assert!(err.to_string().contains("50ms"));

        let err: CallError = ClientError::ThreadPanicked.into();
        assert!(matches!(err, CallError::Network(_)));
        assert_eq!(err.code(), None);
    }

    #[test]
    fn term_and_arity_errors_collapse_to_badarg() {
        let err: CallError = TermError::OutOfRange(1 << 40).into();
        assert!(matches!(err, CallError::BadArg));

        let err: CallError = ArityError::Unknown("open".to_string()).into();
        assert!(matches!(err, CallError::BadArg));
    }

    #[test]
    fn to_term_shapes() {
        assert_eq!(CallError::BadArg.to_term(), Term::atom("badarg"));
        assert_eq!(
            CallError::Native(FdbError::from_code(2009)).to_term(),
            Term::Tuple(vec![Term::atom("fdb_error"), Term::Int(2009)])
        );
        assert_eq!(
            CallError::Network("x".to_string()).to_term(),
            Term::Tuple(vec![Term::atom("error"), Term::atom("network_thread")])
        );
    }

    #[test]
    fn display_is_human_readable() {
        assert_eq!(CallError::BadArg.to_string(), "bad arguments");
        assert_eq!(
            CallError::Native(FdbError::from_code(2202)).to_string(),
            "fdb error 2202: api_version_invalid"
        );
    }
}
