//! Entry-point table and arity checks.
//!
//! Every entry point declares its exact argument count here. Hosts check the
//! count before decoding any argument.

use thiserror::Error;

/// Entry points exposed to host runtimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryPoint {
    /// `can_initialize/0`
    CanInitialize,
    /// `get_max_api_version/0`
    GetMaxApiVersion,
    /// `select_api_version/1`
    SelectApiVersion,
    /// `network_set_option/2`
    NetworkSetOption,
    /// `setup_network/0`
    SetupNetwork,
    /// `stop_network/0`
    StopNetwork,
    /// `get_error/1`
    GetError,
}

impl EntryPoint {
    /// Every entry point, in registration order.
    pub const ALL: [EntryPoint; 7] = [
        EntryPoint::CanInitialize,
        EntryPoint::GetMaxApiVersion,
        EntryPoint::SelectApiVersion,
        EntryPoint::NetworkSetOption,
        EntryPoint::SetupNetwork,
        EntryPoint::StopNetwork,
        EntryPoint::GetError,
    ];

    /// Name hosts call the entry point by.
    pub fn name(self) -> &'static str {
        match self {
            Self::CanInitialize => "can_initialize",
            Self::GetMaxApiVersion => "get_max_api_version",
            Self::SelectApiVersion => "select_api_version",
            Self::NetworkSetOption => "network_set_option",
            Self::SetupNetwork => "setup_network",
            Self::StopNetwork => "stop_network",
            Self::GetError => "get_error",
        }
    }

    /// Exact number of arguments.
    pub fn arity(self) -> usize {
        match self {
            Self::CanInitialize
            | Self::GetMaxApiVersion
            | Self::SetupNetwork
            | Self::StopNetwork => 0,
            Self::SelectApiVersion | Self::GetError => 1,
            Self::NetworkSetOption => 2,
        }
    }

    /// Look up an entry point by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|ep| ep.name() == name)
    }
}

/// A call did not match the entry-point table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArityError {
    /// No entry point with this name.
    #[error("unknown entry point: {0}")]
    Unknown(String),

    /// Wrong argument count.
    #[error("{name}/{expected} called with {got} arguments")]
    Mismatch {
        /// Entry point name.
        name: &'static str,
        /// Declared arity.
        expected: usize,
        /// Arguments received.
        got: usize,
    },
}

/// Check an argument count against the entry point's declared arity.
pub fn check_arity(entry: EntryPoint, argc: usize) -> Result<(), ArityError> {
    if argc == entry.arity() {
        Ok(())
    } else {
        Err(ArityError::Mismatch {
            name: entry.name(),
            expected: entry.arity(),
            got: argc,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arities_match_the_table() {
        assert_eq!(EntryPoint::CanInitialize.arity(), 0);
        assert_eq!(EntryPoint::GetMaxApiVersion.arity(), 0);
        assert_eq!(EntryPoint::SelectApiVersion.arity(), 1);
        assert_eq!(EntryPoint::NetworkSetOption.arity(), 2);
        assert_eq!(EntryPoint::SetupNetwork.arity(), 0);
        assert_eq!(EntryPoint::StopNetwork.arity(), 0);
        assert_eq!(EntryPoint::GetError.arity(), 1);
    }

    #[test]
    fn names_round_trip() {
        for ep in EntryPoint::ALL {
            assert_eq!(EntryPoint::from_name(ep.name()), Some(ep));
        }
        assert_eq!(EntryPoint::from_name("open_database"), None);
    }

    #[test]
    fn exact_count_passes() {
        for ep in EntryPoint::ALL {
            assert!(check_arity(ep, ep.arity()).is_ok());
        }
    }

    #[test]
    fn any_other_count_fails() {
        for ep in EntryPoint::ALL {
            for argc in 0..4 {
                if argc != ep.arity() {
                    assert!(check_arity(ep, argc).is_err(), "{} accepted {argc}", ep.name());
                }
            }
        }
    }

    #[test]
    fn mismatch_message_names_the_entry_point() {
        let err = check_arity(EntryPoint::SelectApiVersion, 3).unwrap_err();
        assert_eq!(err.to_string(), "select_api_version/1 called with 3 arguments");
    }
}
