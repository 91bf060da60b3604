//! The real `libfdb_c`.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int};

use nif_types::{FdbError, NetworkOption, OptionValue};

use super::FdbApi;

#[link(name = "fdb_c")]
extern "C" {
    fn fdb_get_max_api_version() -> c_int;
    fn fdb_select_api_version_impl(runtime_version: c_int, header_version: c_int) -> c_int;
    fn fdb_get_error(code: c_int) -> *const c_char;
    fn fdb_network_set_option(option: c_int, value: *const u8, value_length: c_int) -> c_int;
    fn fdb_setup_network() -> c_int;
    fn fdb_run_network() -> c_int;
    fn fdb_stop_network() -> c_int;
}

/// Handle to the process-global native client.
///
/// Zero-sized: the native library keeps its own global state, so every
/// `NativeFdb` talks to the same client.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeFdb;

impl NativeFdb {
    /// Create a handle.
    pub fn new() -> Self {
        Self
    }
}

impl FdbApi for NativeFdb {
    fn max_api_version(&self) -> i32 {
        // SAFETY: no arguments, no preconditions.
        unsafe { fdb_get_max_api_version() }
    }

    fn select_api_version(
        &self,
        runtime_version: i32,
        header_version: i32,
    ) -> Result<(), FdbError> {
        // SAFETY: plain integers; the library validates both.
        FdbError::check(unsafe { fdb_select_api_version_impl(runtime_version, header_version) })
    }

    fn network_set_option(
        &self,
        option: NetworkOption,
        value: Option<&OptionValue>,
    ) -> Result<(), FdbError> {
        let bytes = value.map(OptionValue::to_native_bytes);
        let (ptr, len) = match &bytes {
            Some(bytes) => {
                let len = c_int::try_from(bytes.len())
                    .map_err(|_| FdbError::from_code(FdbError::INVALID_OPTION_VALUE))?;
                (bytes.as_ptr(), len)
            }
            None => (std::ptr::null(), 0),
        };
        // SAFETY: `ptr` is null or points to `len` bytes that outlive the call;
        // the library copies the value before returning.
        FdbError::check(unsafe { fdb_network_set_option(option.code(), ptr, len) })
    }

    fn setup_network(&self) -> Result<(), FdbError> {
        // SAFETY: no arguments; repeated calls are reported as error codes.
        FdbError::check(unsafe { fdb_setup_network() })
    }

    fn run_network(&self) -> Result<(), FdbError> {
        // SAFETY: must only be called from the dedicated network thread,
        // which NetworkRunner guarantees.
        FdbError::check(unsafe { fdb_run_network() })
    }

    fn stop_network(&self) -> Result<(), FdbError> {
        // SAFETY: thread-safe per the C API; may be called from any thread.
        FdbError::check(unsafe { fdb_stop_network() })
    }

    fn error_message(&self, code: i32) -> String {
        // SAFETY: returns a pointer to a static, NUL-terminated string.
        let ptr = unsafe { fdb_get_error(code) };
        if ptr.is_null() {
            return String::new();
        }
        // SAFETY: checked non-null above; the string is static.
        unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
    }
}
