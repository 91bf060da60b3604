//! Host-agnostic term model.
//!
//! Every entry point takes a slice of [`Term`]s and returns a [`Term`].
//! Host bindings convert their native values to and from this model, so the
//! bridge never depends on a particular runtime.

use std::fmt;

use crate::error::TermError;

/// Well-known atom names.
pub mod atoms {
    /// Success marker.
    pub const OK: &str = "ok";
    /// Failure marker.
    pub const ERROR: &str = "error";
    /// Boolean true.
    pub const TRUE: &str = "true";
    /// Boolean false.
    pub const FALSE: &str = "false";
    /// Absent value.
    pub const UNDEFINED: &str = "undefined";
    /// Malformed call.
    pub const BADARG: &str = "badarg";
    /// Tag of a native error tuple.
    pub const FDB_ERROR: &str = "fdb_error";
    /// Tag of a network thread failure.
    pub const NETWORK_THREAD: &str = "network_thread";
}

/// A value crossing the host boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// Symbolic constant (`ok`, `true`, option names, ...).
    Atom(String),
    /// Signed integer.
    Int(i64),
    /// Raw bytes; strings cross as UTF-8 binaries.
    Binary(Vec<u8>),
    /// Fixed-size tuple.
    Tuple(Vec<Term>),
    /// Variable-length list.
    List(Vec<Term>),
}

impl Term {
    /// Build an atom.
    pub fn atom(name: &str) -> Self {
        Self::Atom(name.to_string())
    }

    /// The `ok` atom.
    pub fn ok() -> Self {
        Self::atom(atoms::OK)
    }

    /// `{ok, Value}`.
    pub fn ok_with(value: Term) -> Self {
        Self::Tuple(vec![Self::ok(), value])
    }

    /// The `undefined` atom.
    pub fn undefined() -> Self {
        Self::atom(atoms::UNDEFINED)
    }

    /// `true` or `false`.
    pub fn boolean(value: bool) -> Self {
        if value {
            Self::atom(atoms::TRUE)
        } else {
            Self::atom(atoms::FALSE)
        }
    }

    /// Build a binary from a string.
    pub fn string(value: &str) -> Self {
        Self::Binary(value.as_bytes().to_vec())
    }

    /// Atom name, if this is an atom.
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Self::Atom(name) => Some(name),
            _ => None,
        }
    }

    /// Byte contents, if this is a binary.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Integer value, if this is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Decode an integer that must fit in a C `int`.
    pub fn to_i32(&self) -> Result<i32, TermError> {
        let value = self.as_i64().ok_or(TermError::Expected {
            expected: "integer",
            found: self.kind(),
        })?;
        i32::try_from(value).map_err(|_| TermError::OutOfRange(value))
    }

    /// Decode a boolean atom.
    pub fn to_bool(&self) -> Result<bool, TermError> {
        match self.as_atom() {
            Some(atoms::TRUE) => Ok(true),
            Some(atoms::FALSE) => Ok(false),
            _ => Err(TermError::Expected {
                expected: "boolean",
                found: self.kind(),
            }),
        }
    }

    /// Check for the `undefined` atom.
    pub fn is_undefined(&self) -> bool {
        self.as_atom() == Some(atoms::UNDEFINED)
    }

    /// Check for the `ok` atom.
    pub fn is_ok(&self) -> bool {
        self.as_atom() == Some(atoms::OK)
    }

    /// Name of this term's kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Atom(_) => "atom",
            Self::Int(_) => "integer",
            Self::Binary(_) => "binary",
            Self::Tuple(_) => "tuple",
            Self::List(_) => "list",
        }
    }
}

impl From<i64> for Term {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Term {
    fn from(value: i32) -> Self {
        Self::Int(value as i64)
    }
}

impl From<bool> for Term {
    fn from(value: bool) -> Self {
        Self::boolean(value)
    }
}

impl From<Vec<u8>> for Term {
    fn from(value: Vec<u8>) -> Self {
        Self::Binary(value)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atom(name) => write!(f, "{name}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Binary(bytes) => write!(f, "<<\"{}\">>", String::from_utf8_lossy(bytes)),
            Self::Tuple(items) => {
                write!(f, "{{")?;
                write_items(f, items)?;
                write!(f, "}}")
            }
            Self::List(items) => {
                write!(f, "[")?;
                write_items(f, items)?;
                write!(f, "]")
            }
        }
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Term]) -> fmt::Result {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}
