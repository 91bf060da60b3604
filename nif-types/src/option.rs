//! Network options understood by the native client.
//!
//! Each option has a stable integer code (passed to `fdb_network_set_option`),
//! a snake_case name (used by hosts and config files) and a value kind that
//! determines how the value is encoded.

use serde::de::{self, Deserialize, Deserializer};

use crate::error::TermError;
use crate::term::Term;

/// How an option's value is passed to the native call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// No value; a null pointer is passed.
    None,
    /// 64-bit signed integer, little-endian.
    Int,
    /// UTF-8 text.
    String,
    /// Opaque bytes.
    Bytes,
}

impl OptionKind {
    fn describe(self) -> &'static str {
        match self {
            Self::None => "no value",
            Self::Int => "an integer",
            Self::String => "a string",
            Self::Bytes => "bytes",
        }
    }
}

/// An encoded option value, ready for the native call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// Integer parameter.
    Int(i64),
    /// String or bytes parameter.
    Bytes(Vec<u8>),
}

impl OptionValue {
    /// The bytes handed to the native library.
    pub fn to_native_bytes(&self) -> Vec<u8> {
        match self {
            Self::Int(value) => value.to_le_bytes().to_vec(),
            Self::Bytes(bytes) => bytes.clone(),
        }
    }
}

macro_rules! network_options {
    ($( $(#[$doc:meta])* $variant:ident = ($code:expr, $name:expr, $kind:ident), )*) => {
        /// A network option of the native client.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum NetworkOption {
            $( $(#[$doc])* $variant, )*
        }

        impl NetworkOption {
            /// Every option in the registry.
            pub const ALL: &'static [NetworkOption] = &[$( NetworkOption::$variant, )*];

            /// Native integer code.
            pub fn code(self) -> i32 {
                match self {
                    $( Self::$variant => $code, )*
                }
            }

            /// snake_case name.
            pub fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $name, )*
                }
            }

            /// Value kind.
            pub fn kind(self) -> OptionKind {
                match self {
                    $( Self::$variant => OptionKind::$kind, )*
                }
            }
        }
    };
}

network_options! {
    /// Enable client trace files, optionally in the given directory.
    TraceEnable = (30, "trace_enable", String),
    /// Size in bytes at which trace files roll over.
    TraceRollSize = (31, "trace_roll_size", Int),
    /// Maximum total size of trace files.
    TraceMaxLogsSize = (32, "trace_max_logs_size", Int),
    /// LogGroup attribute of trace events.
    TraceLogGroup = (33, "trace_log_group", String),
    /// Trace file format (`xml` or `json`).
    TraceFormat = (34, "trace_format", String),
    /// Clock source for trace timestamps.
    TraceClockSource = (35, "trace_clock_source", String),
    /// Identifier embedded in trace file names.
    TraceFileIdentifier = (36, "trace_file_identifier", String),
    /// Suffix for partially written trace files.
    TracePartialFileSuffix = (39, "trace_partial_file_suffix", String),
    /// Set a client knob (`name=value`).
    Knob = (40, "knob", String),
    /// TLS certificate chain.
    TlsCertBytes = (42, "tls_cert_bytes", Bytes),
    /// Path to the TLS certificate chain.
    TlsCertPath = (43, "tls_cert_path", String),
    /// TLS private key.
    TlsKeyBytes = (45, "tls_key_bytes", Bytes),
    /// Path to the TLS private key.
    TlsKeyPath = (46, "tls_key_path", String),
    /// Peer verification constraints.
    TlsVerifyPeers = (47, "tls_verify_peers", Bytes),
    /// Enable simulated failure injection.
    BuggifyEnable = (48, "buggify_enable", None),
    /// Disable simulated failure injection.
    BuggifyDisable = (49, "buggify_disable", None),
    /// Probability (0-100) that a buggify section is activated.
    BuggifySectionActivatedProbability = (50, "buggify_section_activated_probability", Int),
    /// Probability (0-100) that an activated section fires.
    BuggifySectionFiredProbability = (51, "buggify_section_fired_probability", Int),
    /// TLS certificate authority bundle.
    TlsCaBytes = (52, "tls_ca_bytes", Bytes),
    /// Path to the TLS certificate authority bundle.
    TlsCaPath = (53, "tls_ca_path", String),
    /// Password for an encrypted TLS key.
    TlsPassword = (54, "tls_password", String),
    /// Load only the local client.
    DisableMultiVersionClientApi = (60, "disable_multi_version_client_api", None),
    /// Run callbacks on external client threads.
    CallbacksOnExternalThreads = (61, "callbacks_on_external_threads", None),
    /// Add an external client library.
    ExternalClientLibrary = (62, "external_client_library", String),
    /// Search a directory for external client libraries.
    ExternalClientDirectory = (63, "external_client_directory", String),
    /// Do not use the bundled local client.
    DisableLocalClient = (64, "disable_local_client", None),
    /// Threads spawned per external client version.
    ClientThreadsPerVersion = (65, "client_threads_per_version", Int),
    /// Disable client statistics logging.
    DisableClientStatisticsLogging = (70, "disable_client_statistics_logging", None),
    /// Enable run loop profiling.
    EnableRunLoopProfiling = (71, "enable_run_loop_profiling", None),
    /// Enable client-side failure injection.
    ClientBuggifyEnable = (80, "client_buggify_enable", None),
    /// Disable client-side failure injection.
    ClientBuggifyDisable = (81, "client_buggify_disable", None),
    /// Probability that a client buggify section is activated.
    ClientBuggifySectionActivatedProbability = (82, "client_buggify_section_activated_probability", Int),
    /// Probability that an activated client section fires.
    ClientBuggifySectionFiredProbability = (83, "client_buggify_section_fired_probability", Int),
    /// Distributed tracer type.
    DistributedClientTracer = (90, "distributed_client_tracer", String),
}

impl NetworkOption {
    /// Look up an option by snake_case name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|opt| opt.name() == name)
    }

    /// Look up an option by native code.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|opt| opt.code() == code)
    }

    /// Decode an option from a term: an atom or binary name, or an integer code.
    pub fn from_term(term: &Term) -> Result<Self, TermError> {
        match term {
            Term::Atom(name) => {
                Self::from_name(name).ok_or_else(|| TermError::UnknownOption(name.clone()))
            }
            Term::Binary(bytes) => {
                let name = String::from_utf8_lossy(bytes);
                Self::from_name(&name).ok_or_else(|| TermError::UnknownOption(name.into_owned()))
            }
            Term::Int(code) => i32::try_from(*code)
                .ok()
                .and_then(Self::from_code)
                .ok_or_else(|| TermError::UnknownOption(code.to_string())),
            other => Err(TermError::Expected {
                expected: "option name or code",
                found: other.kind(),
            }),
        }
    }

    /// Validate a value against this option's kind.
    ///
    /// `None` means "no value". String and bytes options accept `None` too;
    /// the native client treats a null parameter as "use the default".
    pub fn encode(self, value: Option<OptionValue>) -> Result<Option<OptionValue>, TermError> {
        let mismatch = || TermError::OptionValue {
            option: self.name(),
            expected: self.kind().describe(),
        };
        match (self.kind(), value) {
            (OptionKind::None, None) => Ok(None),
            (OptionKind::None, Some(_)) => Err(mismatch()),
            (OptionKind::Int, Some(OptionValue::Int(v))) => Ok(Some(OptionValue::Int(v))),
            (OptionKind::Int, _) => Err(mismatch()),
            (OptionKind::String, Some(OptionValue::Bytes(bytes))) => {
                if std::str::from_utf8(&bytes).is_err() {
                    return Err(mismatch());
                }
                Ok(Some(OptionValue::Bytes(bytes)))
            }
            (OptionKind::Bytes, Some(OptionValue::Bytes(bytes))) => {
                Ok(Some(OptionValue::Bytes(bytes)))
            }
            (OptionKind::String | OptionKind::Bytes, None) => Ok(None),
            (OptionKind::String | OptionKind::Bytes, Some(OptionValue::Int(_))) => Err(mismatch()),
        }
    }

    /// Decode and validate a value term for this option.
    ///
    /// `undefined` means no value, integers map to [`OptionValue::Int`] and
    /// binaries to [`OptionValue::Bytes`].
    pub fn value_from_term(self, term: &Term) -> Result<Option<OptionValue>, TermError> {
        let value = match term {
            t if t.is_undefined() => None,
            Term::Int(v) => Some(OptionValue::Int(*v)),
            Term::Binary(bytes) => Some(OptionValue::Bytes(bytes.clone())),
            other => {
                return Err(TermError::Expected {
                    expected: "integer, binary or undefined",
                    found: other.kind(),
                })
            }
        };
        self.encode(value)
    }
}

impl<'de> Deserialize<'de> for NetworkOption {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::from_name(&name)
            .ok_or_else(|| de::Error::custom(format!("unknown network option: {name}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_and_names_are_unique() {
        let codes: HashSet<_> = NetworkOption::ALL.iter().map(|o| o.code()).collect();
        let names: HashSet<_> = NetworkOption::ALL.iter().map(|o| o.name()).collect();
        assert_eq!(codes.len(), NetworkOption::ALL.len());
        assert_eq!(names.len(), NetworkOption::ALL.len());
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(NetworkOption::TraceEnable.code(), 30);
        assert_eq!(NetworkOption::Knob.code(), 40);
        assert_eq!(NetworkOption::BuggifyEnable.code(), 48);
        assert_eq!(NetworkOption::DisableMultiVersionClientApi.code(), 60);
        assert_eq!(NetworkOption::ClientThreadsPerVersion.code(), 65);
    }

    #[test]
    fn lookup_by_name_and_code_agree() {
        for opt in NetworkOption::ALL {
            assert_eq!(NetworkOption::from_name(opt.name()), Some(*opt));
            assert_eq!(NetworkOption::from_code(opt.code()), Some(*opt));
        }
        assert_eq!(NetworkOption::from_name("no_such_option"), None);
        assert_eq!(NetworkOption::from_code(9999), None);
    }

    #[test]
    fn from_term_accepts_atom_binary_and_code() {
        let by_atom = NetworkOption::from_term(&Term::atom("trace_enable")).unwrap();
        let by_binary = NetworkOption::from_term(&Term::string("trace_enable")).unwrap();
        let by_code = NetworkOption::from_term(&Term::Int(30)).unwrap();
        assert_eq!(by_atom, NetworkOption::TraceEnable);
        assert_eq!(by_binary, NetworkOption::TraceEnable);
        assert_eq!(by_code, NetworkOption::TraceEnable);
    }

    #[test]
    fn from_term_rejects_unknown_and_wrong_kind() {
        assert!(matches!(
            NetworkOption::from_term(&Term::atom("bogus")),
            Err(TermError::UnknownOption(_))
        ));
        assert!(matches!(
            NetworkOption::from_term(&Term::Tuple(vec![])),
            Err(TermError::Expected { .. })
        ));
    }

    #[test]
    fn int_values_encode_little_endian() {
        let value = NetworkOption::TraceRollSize
            .value_from_term(&Term::Int(1_048_576))
            .unwrap()
            .unwrap();
        assert_eq!(value.to_native_bytes(), 1_048_576i64.to_le_bytes().to_vec());
    }

    #[test]
    fn none_kind_rejects_values() {
        assert_eq!(
            NetworkOption::BuggifyEnable
                .value_from_term(&Term::undefined())
                .unwrap(),
            None
        );
        let err = NetworkOption::BuggifyEnable
            .value_from_term(&Term::Int(1))
            .unwrap_err();
        assert_eq!(err.to_string(), "option buggify_enable takes no value");
    }

    #[test]
    fn string_kind_requires_utf8() {
        let ok = NetworkOption::TraceEnable.value_from_term(&Term::string("/var/log/fdb"));
        assert!(ok.is_ok());
        let err = NetworkOption::TraceEnable.value_from_term(&Term::Binary(vec![0xff, 0xfe]));
        assert!(matches!(err, Err(TermError::OptionValue { .. })));
    }

    #[test]
    fn int_kind_rejects_binary() {
        let err = NetworkOption::TraceRollSize.value_from_term(&Term::string("10"));
        assert!(matches!(err, Err(TermError::OptionValue { .. })));
    }

    #[test]
    fn string_kind_allows_missing_value() {
        assert_eq!(
            NetworkOption::TraceEnable
                .value_from_term(&Term::undefined())
                .unwrap(),
            None
        );
    }
}
