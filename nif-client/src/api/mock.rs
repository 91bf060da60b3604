//! In-process emulation of the native client.
//!
//! Follows the native library's rules for version selection, option setting
//! and network lifecycle, records every call, and allows injecting failures.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use nif_types::{FdbError, NetworkOption, OptionValue, HEADER_API_VERSION, MIN_API_VERSION};

use super::FdbApi;

/// A call received by [`MockFdb`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    /// `max_api_version()`
    MaxApiVersion,
    /// `select_api_version(runtime, header)`
    SelectApiVersion(i32, i32),
    /// `network_set_option(option, value)`
    SetOption(NetworkOption, Option<OptionValue>),
    /// `setup_network()`
    SetupNetwork,
    /// `run_network()`
    RunNetwork,
    /// `stop_network()`
    StopNetwork,
    /// `error_message(code)`
    ErrorMessage(i32),
}

/// Mock native client for testing.
///
/// Clones share state, so a test can keep a clone to inspect calls made
/// through a client that owns another.
#[derive(Debug, Clone)]
pub struct MockFdb {
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    inner: Mutex<MockFdbInner>,
    stopped: Condvar,
}

#[derive(Debug, Default)]
struct MockFdbInner {
    max_api_version: i32,
    selected_version: Option<i32>,
    options: Vec<(NetworkOption, Option<OptionValue>)>,
    network_setup: bool,
    running: bool,
    stop_requested: bool,
    calls: Vec<MockCall>,
    fail_next_setup: Option<i32>,
    fail_next_option: Option<i32>,
    fail_next_stop: Option<i32>,
    fail_run_network: Option<i32>,
}

impl MockFdb {
    /// Create a mock whose maximum API version equals the header version.
    pub fn new() -> Self {
        Self::with_max_api_version(HEADER_API_VERSION)
    }

    /// Create a mock reporting the given maximum API version.
    pub fn with_max_api_version(max_api_version: i32) -> Self {
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(MockFdbInner {
                    max_api_version,
                    ..MockFdbInner::default()
                }),
                stopped: Condvar::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockFdbInner> {
        self.shared
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    /// The API version selected so far.
    pub fn selected_version(&self) -> Option<i32> {
        self.lock().selected_version
    }

    /// Options applied so far, in order.
    pub fn options(&self) -> Vec<(NetworkOption, Option<OptionValue>)> {
        self.lock().options.clone()
    }

    /// Whether `run_network` is currently blocked in the loop.
    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    /// Cause the next `setup_network()` to fail with the given code.
    pub fn fail_next_setup(&self, code: i32) {
        self.lock().fail_next_setup = Some(code);
    }

    /// Cause the next `network_set_option()` to fail with the given code.
    pub fn fail_next_option(&self, code: i32) {
        self.lock().fail_next_option = Some(code);
    }

    /// Cause the next `stop_network()` to fail with the given code.
    pub fn fail_next_stop(&self, code: i32) {
        self.lock().fail_next_stop = Some(code);
    }

    /// Cause `run_network()` to return the given code immediately.
    pub fn fail_run_network(&self, code: i32) {
        self.lock().fail_run_network = Some(code);
    }
}

impl Default for MockFdb {
    fn default() -> Self {
        Self::new()
    }
}

impl FdbApi for MockFdb {
    fn max_api_version(&self) -> i32 {
        let mut inner = self.lock();
        inner.calls.push(MockCall::MaxApiVersion);
        inner.max_api_version
    }

    fn select_api_version(
        &self,
        runtime_version: i32,
        header_version: i32,
    ) -> Result<(), FdbError> {
        let mut inner = self.lock();
        inner
            .calls
            .push(MockCall::SelectApiVersion(runtime_version, header_version));

        if runtime_version > header_version {
            return Err(FdbError::from_code(FdbError::API_VERSION_INVALID));
        }
        if runtime_version < MIN_API_VERSION || runtime_version > inner.max_api_version {
            return Err(FdbError::from_code(FdbError::API_VERSION_NOT_SUPPORTED));
        }
        match inner.selected_version {
            Some(selected) if selected != runtime_version => {
                Err(FdbError::from_code(FdbError::API_VERSION_ALREADY_SET))
            }
            _ => {
                inner.selected_version = Some(runtime_version);
                Ok(())
            }
        }
    }

    fn network_set_option(
        &self,
        option: NetworkOption,
        value: Option<&OptionValue>,
    ) -> Result<(), FdbError> {
        let mut inner = self.lock();
        inner.calls.push(MockCall::SetOption(option, value.cloned()));

        if inner.selected_version.is_none() {
            return Err(FdbError::from_code(FdbError::API_VERSION_UNSET));
        }
        if let Some(code) = inner.fail_next_option.take() {
            return Err(FdbError::from_code(code));
        }
        inner.options.push((option, value.cloned()));
        Ok(())
    }

    fn setup_network(&self) -> Result<(), FdbError> {
        let mut inner = self.lock();
        inner.calls.push(MockCall::SetupNetwork);

        if inner.selected_version.is_none() {
            return Err(FdbError::from_code(FdbError::API_VERSION_UNSET));
        }
        if let Some(code) = inner.fail_next_setup.take() {
            return Err(FdbError::from_code(code));
        }
        if inner.network_setup {
            return Err(FdbError::from_code(FdbError::NETWORK_ALREADY_SETUP));
        }
        inner.network_setup = true;
        Ok(())
    }

    fn run_network(&self) -> Result<(), FdbError> {
        let mut inner = self.lock();
        inner.calls.push(MockCall::RunNetwork);

        if !inner.network_setup {
            return Err(FdbError::from_code(FdbError::NETWORK_NOT_SETUP));
        }
        if inner.running {
            return Err(FdbError::from_code(FdbError::NETWORK_ALREADY_SETUP));
        }
        if let Some(code) = inner.fail_run_network.take() {
            return Err(FdbError::from_code(code));
        }

        inner.running = true;
        while !inner.stop_requested {
            inner = self
                .shared
                .stopped
                .wait(inner)
                .unwrap_or_else(PoisonError::into_inner);
        }
        inner.running = false;
        Ok(())
    }

    fn stop_network(&self) -> Result<(), FdbError> {
        let mut inner = self.lock();
        inner.calls.push(MockCall::StopNetwork);

        if !inner.network_setup {
            return Err(FdbError::from_code(FdbError::NETWORK_NOT_SETUP));
        }
        if let Some(code) = inner.fail_next_stop.take() {
            return Err(FdbError::from_code(code));
        }
        inner.stop_requested = true;
        self.shared.stopped.notify_all();
        Ok(())
    }

    fn error_message(&self, code: i32) -> String {
        self.lock().calls.push(MockCall::ErrorMessage(code));
        if code == 0 {
            return "Success".to_string();
        }
        FdbError::from_code(code).name().replace('_', " ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn select_rejects_runtime_above_header() {
        let fdb = MockFdb::new();
        let err = fdb.select_api_version(720, 710).unwrap_err();
        assert_eq!(err.code(), FdbError::API_VERSION_INVALID);
    }

    #[test]
    fn select_rejects_unsupported_versions() {
        let fdb = MockFdb::with_max_api_version(630);
        assert_eq!(
            fdb.select_api_version(12, 710).unwrap_err().code(),
            FdbError::API_VERSION_NOT_SUPPORTED
        );
        assert_eq!(
            fdb.select_api_version(700, 710).unwrap_err().code(),
            FdbError::API_VERSION_NOT_SUPPORTED
        );
        assert!(fdb.select_api_version(630, 710).is_ok());
    }

    #[test]
    fn select_twice_same_version_is_ok_different_is_not() {
        let fdb = MockFdb::new();
        fdb.select_api_version(620, 710).unwrap();
        fdb.select_api_version(620, 710).unwrap();
        let err = fdb.select_api_version(630, 710).unwrap_err();
        assert_eq!(err.code(), FdbError::API_VERSION_ALREADY_SET);
        assert_eq!(fdb.selected_version(), Some(620));
    }

    #[test]
    fn options_require_version() {
        let fdb = MockFdb::new();
        let err = fdb
            .network_set_option(NetworkOption::BuggifyEnable, None)
            .unwrap_err();
        assert_eq!(err.code(), FdbError::API_VERSION_UNSET);

        fdb.select_api_version(710, 710).unwrap();
        fdb.network_set_option(NetworkOption::BuggifyEnable, None)
            .unwrap();
        assert_eq!(fdb.options(), vec![(NetworkOption::BuggifyEnable, None)]);
    }

    #[test]
    fn setup_twice_reports_already_setup() {
        let fdb = MockFdb::new();
        assert_eq!(
            fdb.setup_network().unwrap_err().code(),
            FdbError::API_VERSION_UNSET
        );
        fdb.select_api_version(710, 710).unwrap();
        fdb.setup_network().unwrap();
        assert_eq!(
            fdb.setup_network().unwrap_err().code(),
            FdbError::NETWORK_ALREADY_SETUP
        );
    }

    #[test]
    fn run_blocks_until_stopped() {
        let fdb = MockFdb::new();
        fdb.select_api_version(710, 710).unwrap();
        fdb.setup_network().unwrap();

        let runner = fdb.clone();
        let handle = thread::spawn(move || runner.run_network());

        while !fdb.is_running() {
            thread::sleep(Duration::from_millis(1));
        }
        fdb.stop_network().unwrap();
        assert!(handle.join().unwrap().is_ok());
        assert!(!fdb.is_running());
    }

    #[test]
    fn run_without_setup_fails() {
        let fdb = MockFdb::new();
        assert_eq!(
            fdb.run_network().unwrap_err().code(),
            FdbError::NETWORK_NOT_SETUP
        );
    }

    #[test]
    fn injected_failures_fire_once() {
        let fdb = MockFdb::new();
        fdb.select_api_version(710, 710).unwrap();
        fdb.fail_next_setup(4100);
        assert_eq!(fdb.setup_network().unwrap_err().code(), 4100);
        assert!(fdb.setup_network().is_ok());
    }

    #[test]
    fn calls_are_recorded_in_order() {
        let fdb = MockFdb::new();
        let _ = fdb.max_api_version();
        let _ = fdb.select_api_version(710, 710);
        let _ = fdb.error_message(2009);
        assert_eq!(
            fdb.calls(),
            vec![
                MockCall::MaxApiVersion,
                MockCall::SelectApiVersion(710, 710),
                MockCall::ErrorMessage(2009),
            ]
        );
    }

    #[test]
    fn error_message_describes_code() {
        let fdb = MockFdb::new();
        assert_eq!(fdb.error_message(0), "Success");
        assert_eq!(fdb.error_message(2009), "network already setup");
    }
}
