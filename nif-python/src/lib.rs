//! # nif-python
//!
//! Python bindings for the fdbnif FoundationDB bridge via PyO3.
//!
//! Exposes the entry points of [`nif_bridge::Bridge`] as module-level
//! functions of `_fdbnif`. Every entry point takes `*args` so the bridge's
//! arity check is the one that fires.
//!
//! Errors raise:
//! - `TypeError("bad arguments")` for malformed calls
//! - `_fdbnif.FdbError(code, message)` for native error codes
//! - `RuntimeError` for network thread and config failures
//!
//! Built without the `native` feature the module runs over the in-process
//! emulation. `_fdbnif.BACKEND` names the backend, and `boot()` refuses to
//! start on the emulation unless called with `allow_emulation=True`.

#![warn(clippy::all)]

use std::path::PathBuf;
use std::sync::OnceLock;

use pyo3::create_exception;
use pyo3::exceptions::{PyException, PyRuntimeError, PyTypeError};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyBytes, PyInt, PyList, PyString, PyTuple};

use nif_bridge::{
    atoms, check_arity, logging, BootOutcome, Bridge, BridgeConfig, CallError, ConfigError,
    EntryPoint, Term,
};

#[cfg(feature = "native")]
type Backend = nif_bridge::NativeFdb;
#[cfg(not(feature = "native"))]
type Backend = nif_bridge::MockFdb;

/// Name of the compiled-in backend, exported as `_fdbnif.BACKEND`.
#[cfg(feature = "native")]
const BACKEND: &str = "native";
#[cfg(not(feature = "native"))]
const BACKEND: &str = "mock";

static BRIDGE: OnceLock<Bridge<Backend>> = OnceLock::new();

fn bridge() -> &'static Bridge<Backend> {
    BRIDGE.get_or_init(|| Bridge::new(Backend::default()))
}

create_exception!(_fdbnif, FdbError, PyException, "Nonzero error code from the native client.");

// ============================================================
// Error conversion
// ============================================================

fn to_py_err(err: CallError) -> PyErr {
    match err {
        CallError::BadArg => PyTypeError::new_err(CallError::BadArg.to_string()),
        CallError::Native(e) => {
            let message = bridge().get_error(e.code());
            FdbError::new_err((e.code(), message))
        }
        CallError::Network(reason) => PyRuntimeError::new_err(reason),
    }
}

fn config_err(err: ConfigError) -> PyErr {
    PyRuntimeError::new_err(err.to_string())
}

fn check_backend(backend: &str, allow_emulation: bool) -> Result<(), String> {
    if backend == "native" || allow_emulation {
        Ok(())
    } else {
        Err(format!(
            "_fdbnif was built without the `native` feature (backend: {backend}); \
             rebuild with `--features native` or pass allow_emulation=True"
        ))
    }
}

// ============================================================
// Term conversion
// ============================================================

fn py_to_term(obj: &Bound<'_, PyAny>) -> Result<Term, CallError> {
    if obj.is_none() {
        return Ok(Term::undefined());
    }
    // bool is a subclass of int, so it goes first.
    if obj.is_instance_of::<PyBool>() {
        return Ok(Term::boolean(obj.extract::<bool>().map_err(|_| CallError::BadArg)?));
    }
    if obj.is_instance_of::<PyInt>() {
        return obj.extract::<i64>().map(Term::Int).map_err(|_| CallError::BadArg);
    }
    if obj.is_instance_of::<PyString>() {
        let s = obj.extract::<String>().map_err(|_| CallError::BadArg)?;
        return Ok(Term::string(&s));
    }
    if obj.is_instance_of::<PyBytes>() {
        return obj
            .extract::<Vec<u8>>()
            .map(Term::Binary)
            .map_err(|_| CallError::BadArg);
    }
    Err(CallError::BadArg)
}

/// Python shape of a reply term.
#[derive(Debug, Clone, PartialEq)]
enum Reply {
    None,
    Bool(bool),
    Int(i64),
    Str(String),
    Bytes(Vec<u8>),
    Tuple(Vec<Reply>),
    List(Vec<Reply>),
}

impl Reply {
    /// `ok` -> None, `{ok, V}` -> V, `true`/`false` -> bool, other atoms -> str.
    fn from_term(term: &Term) -> Self {
        match term {
            Term::Atom(name) => match name.as_str() {
                atoms::OK => Reply::None,
                atoms::TRUE => Reply::Bool(true),
                atoms::FALSE => Reply::Bool(false),
                other => Reply::Str(other.to_string()),
            },
            Term::Int(v) => Reply::Int(*v),
            Term::Binary(bytes) => match std::str::from_utf8(bytes) {
                Ok(s) => Reply::Str(s.to_string()),
                Err(_) => Reply::Bytes(bytes.clone()),
            },
            Term::Tuple(items) if items.len() == 2 && items[0].is_ok() => {
                Reply::from_term(&items[1])
            }
            Term::Tuple(items) => Reply::Tuple(items.iter().map(Reply::from_term).collect()),
            Term::List(items) => Reply::List(items.iter().map(Reply::from_term).collect()),
        }
    }

    fn into_py(self, py: Python<'_>) -> PyResult<Py<PyAny>> {
        Ok(match self {
            Reply::None => py.None(),
            Reply::Bool(b) => PyBool::new(py, b).to_owned().into_any().unbind(),
            Reply::Int(v) => v.into_pyobject(py)?.into_any().unbind(),
            Reply::Str(s) => PyString::new(py, &s).into_any().unbind(),
            Reply::Bytes(b) => PyBytes::new(py, &b).into_any().unbind(),
            Reply::Tuple(items) => {
                let items = items
                    .into_iter()
                    .map(|item| item.into_py(py))
                    .collect::<PyResult<Vec<_>>>()?;
                PyTuple::new(py, items)?.into_any().unbind()
            }
            Reply::List(items) => {
                let items = items
                    .into_iter()
                    .map(|item| item.into_py(py))
                    .collect::<PyResult<Vec<_>>>()?;
                PyList::new(py, items)?.into_any().unbind()
            }
        })
    }
}

/// Check the argument count, then convert each argument.
///
/// Nothing is converted for a call with the wrong count.
fn decode_args<T>(
    entry: EntryPoint,
    args: Vec<T>,
    convert: impl Fn(T) -> Result<Term, CallError>,
) -> Result<Vec<Term>, CallError> {
    check_arity(entry, args.len())?;
    args.into_iter().map(convert).collect()
}

/// Convert arguments, run the entry point without the GIL, convert the reply.
fn invoke(entry: EntryPoint, args: &Bound<'_, PyTuple>) -> PyResult<Py<PyAny>> {
    let py = args.py();
    let terms = decode_args(entry, args.iter().collect(), |arg| py_to_term(&arg))
        .map_err(to_py_err)?;

    let reply = py
        .detach(|| bridge().invoke(entry, &terms))
        .map_err(to_py_err)?;
    Reply::from_term(&reply).into_py(py)
}

// ============================================================
// Entry points
// ============================================================

/// `True` on the first call in this process, `False` afterwards.
#[pyfunction]
#[pyo3(signature = (*args))]
fn can_initialize(args: &Bound<'_, PyTuple>) -> PyResult<Py<PyAny>> {
    invoke(EntryPoint::CanInitialize, args)
}

/// Highest API version the native client supports.
#[pyfunction]
#[pyo3(signature = (*args))]
fn get_max_api_version(args: &Bound<'_, PyTuple>) -> PyResult<Py<PyAny>> {
    invoke(EntryPoint::GetMaxApiVersion, args)
}

/// `select_api_version(version)`
#[pyfunction]
#[pyo3(signature = (*args))]
fn select_api_version(args: &Bound<'_, PyTuple>) -> PyResult<Py<PyAny>> {
    invoke(EntryPoint::SelectApiVersion, args)
}

/// `network_set_option(option, value)`
///
/// `option` is a name (`"trace_enable"`) or native code; `value` is None,
/// an int, a str or bytes depending on the option.
#[pyfunction]
#[pyo3(signature = (*args))]
fn network_set_option(args: &Bound<'_, PyTuple>) -> PyResult<Py<PyAny>> {
    invoke(EntryPoint::NetworkSetOption, args)
}

/// Set up the network and start the network thread.
#[pyfunction]
#[pyo3(signature = (*args))]
fn setup_network(args: &Bound<'_, PyTuple>) -> PyResult<Py<PyAny>> {
    invoke(EntryPoint::SetupNetwork, args)
}

/// Stop the network and join the network thread.
#[pyfunction]
#[pyo3(signature = (*args))]
fn stop_network(args: &Bound<'_, PyTuple>) -> PyResult<Py<PyAny>> {
    invoke(EntryPoint::StopNetwork, args)
}

/// `get_error(code)`: the native description of an error code.
#[pyfunction]
#[pyo3(signature = (*args))]
fn get_error(args: &Bound<'_, PyTuple>) -> PyResult<Py<PyAny>> {
    invoke(EntryPoint::GetError, args)
}

/// Coroutine variant of `setup_network`, run on tokio's blocking pool.
#[pyfunction]
fn setup_network_async(py: Python<'_>) -> PyResult<Bound<'_, PyAny>> {
    pyo3_async_runtimes::tokio::future_into_py(py, async move {
        tokio::task::spawn_blocking(|| bridge().setup_network())
            .await
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))?
            .map_err(to_py_err)?;
        Ok(())
    })
}

// ============================================================
// Host-side helpers
// ============================================================

/// Current network lifecycle state, e.g. `"running"`.
#[pyfunction]
fn network_state() -> &'static str {
    bridge().network_state().label()
}

/// Initialize the client once per process from an optional TOML config.
///
/// Returns the selected API version, or None if this process was already
/// initialized (including by an earlier `can_initialize()` call). Raises
/// `RuntimeError` on the emulated backend unless `allow_emulation` is set.
#[pyfunction]
#[pyo3(signature = (config_path=None, allow_emulation=false))]
fn boot(
    py: Python<'_>,
    config_path: Option<PathBuf>,
    allow_emulation: bool,
) -> PyResult<Option<i32>> {
    check_backend(BACKEND, allow_emulation).map_err(PyRuntimeError::new_err)?;
    let config = match config_path {
        Some(path) => BridgeConfig::from_file(&path).map_err(config_err)?,
        None => BridgeConfig::default(),
    };
    logging::init(&config.logging.filter);

    // Thread settings only apply if this is the first use of the bridge.
    let bridge = BRIDGE.get_or_init(|| Bridge::with_config(Backend::default(), &config));
    let outcome = py.detach(|| bridge.boot(&config)).map_err(to_py_err)?;
    Ok(match outcome {
        BootOutcome::Started { api_version } => Some(api_version),
        BootOutcome::AlreadyInitialized => None,
    })
}

/// Install a `tracing` subscriber; `RUST_LOG` wins over `filter`.
#[pyfunction]
#[pyo3(signature = (filter="info"))]
fn init_logging(filter: &str) -> bool {
    logging::init(filter)
}

// ============================================================
// Module definition
// ============================================================

#[pymodule]
fn _fdbnif(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("FdbError", m.py().get_type::<FdbError>())?;
    m.add_function(wrap_pyfunction!(can_initialize, m)?)?;
    m.add_function(wrap_pyfunction!(get_max_api_version, m)?)?;
    m.add_function(wrap_pyfunction!(select_api_version, m)?)?;
    m.add_function(wrap_pyfunction!(network_set_option, m)?)?;
    m.add_function(wrap_pyfunction!(setup_network, m)?)?;
    m.add_function(wrap_pyfunction!(stop_network, m)?)?;
    m.add_function(wrap_pyfunction!(get_error, m)?)?;
    m.add_function(wrap_pyfunction!(setup_network_async, m)?)?;
    m.add_function(wrap_pyfunction!(network_state, m)?)?;
    m.add_function(wrap_pyfunction!(boot, m)?)?;
    m.add_function(wrap_pyfunction!(init_logging, m)?)?;
    m.add("HEADER_API_VERSION", nif_bridge::HEADER_API_VERSION)?;
    m.add("BACKEND", BACKEND)?;
    Ok(())
}

// ============================================================
// Tests: bridge-level only (no Python interpreter in tests)
// ============================================================
