//! Entry-point dispatch.
//!
//! [`Bridge`] owns the client and the initialization guard and exposes each
//! entry point twice: as a typed method, and through [`Bridge::call`] /
//! [`Bridge::invoke`], which take raw [`Term`] arguments. The term path
//! checks arity before decoding anything, so a malformed call never reaches
//! the native library.

use nif_client::{FdbApi, FdbClient};
use nif_core::{check_arity, ArityError, EntryPoint, InitGuard, NetworkState};
use nif_types::{NetworkOption, OptionValue, Term};

use crate::config::BridgeConfig;
use crate::error::CallError;

/// Entry points over a native API.
pub struct Bridge<A: FdbApi> {
    client: FdbClient<A>,
    guard: &'static InitGuard,
}

impl<A: FdbApi> Bridge<A> {
    /// Create a bridge with default thread settings and the process guard.
    pub fn new(api: A) -> Self {
        Self {
            client: FdbClient::new(api),
            guard: InitGuard::process(),
        }
    }

    /// Create a bridge using the thread settings from `config`.
    pub fn with_config(api: A, config: &BridgeConfig) -> Self {
        Self {
            client: FdbClient::new(api).with_thread_config(config.network.thread_config()),
            guard: InitGuard::process(),
        }
    }

    /// Use a different initialization guard (tests).
    pub fn with_guard(mut self, guard: &'static InitGuard) -> Self {
        self.guard = guard;
        self
    }

    /// The underlying client.
    pub fn client(&self) -> &FdbClient<A> {
        &self.client
    }

    /// Call an entry point by name.
    pub fn call(&self, name: &str, args: &[Term]) -> Result<Term, CallError> {
        let entry =
            EntryPoint::from_name(name).ok_or_else(|| ArityError::Unknown(name.to_string()))?;
        self.invoke(entry, args)
    }

    /// Call an entry point with term arguments and return its reply term.
    pub fn invoke(&self, entry: EntryPoint, args: &[Term]) -> Result<Term, CallError> {
        check_arity(entry, args.len())?;
        tracing::trace!("{}/{}", entry.name(), args.len());

        match entry {
            EntryPoint::CanInitialize => Ok(Term::boolean(self.can_initialize())),
            EntryPoint::GetMaxApiVersion => {
                Ok(Term::ok_with(Term::from(self.get_max_api_version())))
            }
            EntryPoint::SelectApiVersion => {
                let version = args[0].to_i32()?;
                self.select_api_version(version)?;
                Ok(Term::ok())
            }
            EntryPoint::NetworkSetOption => {
                let option = NetworkOption::from_term(&args[0])?;
                let value = option.value_from_term(&args[1])?;
                self.network_set_option(option, value)?;
                Ok(Term::ok())
            }
            EntryPoint::SetupNetwork => {
                self.setup_network()?;
                Ok(Term::ok())
            }
            EntryPoint::StopNetwork => {
                self.stop_network()?;
                Ok(Term::ok())
            }
            EntryPoint::GetError => {
                let code = args[0].to_i32()?;
                Ok(Term::ok_with(Term::string(&self.get_error(code))))
            }
        }
    }

    /// `true` for the first caller in the process, `false` for every later one.
    pub fn can_initialize(&self) -> bool {
        self.guard.try_claim()
    }

    /// Highest API version the native library supports.
    pub fn get_max_api_version(&self) -> i32 {
        self.client.max_api_version()
    }

    /// Select the runtime API version.
    pub fn select_api_version(&self, version: i32) -> Result<(), CallError> {
        self.client.select_api_version(version).map_err(|e| {
            tracing::debug!("select_api_version({}) failed: {}", version, e);
            CallError::from(e)
        })
    }

    /// Set a network option; `value` must already match the option's kind.
    pub fn network_set_option(
        &self,
        option: NetworkOption,
        value: Option<OptionValue>,
    ) -> Result<(), CallError> {
        let value = option.encode(value)?;
        self.client.set_network_option(option, value).map_err(|e| {
            tracing::debug!("network_set_option({}) failed: {}", option.name(), e);
            CallError::from(e)
        })
    }

    /// Set up the network and start the network thread.
    pub fn setup_network(&self) -> Result<(), CallError> {
        self.client.setup_network().map_err(|e| {
            tracing::warn!("setup_network failed: {}", e);
            CallError::from(e)
        })
    }

    /// Stop the network and join the network thread.
    pub fn stop_network(&self) -> Result<(), CallError> {
        self.client.stop_network().map_err(|e| {
            tracing::warn!("stop_network failed: {}", e);
            CallError::from(e)
        })
    }

    /// Native description of an error code.
    pub fn get_error(&self, code: i32) -> String {
        self.client.error_message(code)
    }

    /// Observed network lifecycle state.
    pub fn network_state(&self) -> NetworkState {
        self.client.network_state()
    }
}

impl<A: FdbApi + std::fmt::Debug> std::fmt::Debug for Bridge<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("client", &self.client)
            .field("initialized", &self.guard.is_claimed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nif_client::{MockCall, MockFdb};
    use nif_types::FdbError;

    fn bridge() -> (Bridge<MockFdb>, MockFdb) {
        let fdb = MockFdb::new();
        let guard: &'static InitGuard = Box::leak(Box::new(InitGuard::new()));
        (Bridge::new(fdb.clone()).with_guard(guard), fdb)
    }

    #[test]
    fn can_initialize_flips_once() {
        let (bridge, fdb) = bridge();
        assert_eq!(bridge.call("can_initialize", &[]).unwrap(), Term::boolean(true));
        assert_eq!(bridge.call("can_initialize", &[]).unwrap(), Term::boolean(false));
        assert!(fdb.calls().is_empty());
    }

    #[test]
    fn max_api_version_reply() {
        let (bridge, _) = bridge();
        let reply = bridge.call("get_max_api_version", &[]).unwrap();
        assert_eq!(reply, Term::ok_with(Term::Int(710)));
    }

    #[test]
    fn wrong_arity_never_reaches_native() {
        let (bridge, fdb) = bridge();
        let one = [Term::Int(710)];
        let two = [Term::Int(1), Term::Int(2)];

        assert!(matches!(bridge.call("get_max_api_version", &one), Err(CallError::BadArg)));
        assert!(matches!(bridge.call("can_initialize", &one), Err(CallError::BadArg)));
        assert!(matches!(bridge.call("select_api_version", &[]), Err(CallError::BadArg)));
        assert!(matches!(bridge.call("select_api_version", &two), Err(CallError::BadArg)));
        assert!(matches!(bridge.call("network_set_option", &one), Err(CallError::BadArg)));
        assert!(matches!(bridge.call("setup_network", &one), Err(CallError::BadArg)));
        assert!(matches!(bridge.call("stop_network", &two), Err(CallError::BadArg)));
        assert!(matches!(bridge.call("get_error", &[]), Err(CallError::BadArg)));

        assert!(fdb.calls().is_empty());
        // The guard was not consumed by the rejected call.
        assert!(bridge.can_initialize());
    }

    #[test]
    fn unknown_entry_point_is_badarg() {
        let (bridge, fdb) = bridge();
        assert!(matches!(bridge.call("open_database", &[]), Err(CallError::BadArg)));
        assert!(fdb.calls().is_empty());
    }

    #[test]
    fn select_decodes_integer() {
        let (bridge, fdb) = bridge();
        assert_eq!(bridge.call("select_api_version", &[Term::Int(700)]).unwrap(), Term::ok());
        assert_eq!(fdb.selected_version(), Some(700));

        assert!(matches!(
            bridge.call("select_api_version", &[Term::atom("latest")]),
            Err(CallError::BadArg)
        ));
        assert!(matches!(
            bridge.call("select_api_version", &[Term::Int(1 << 40)]),
            Err(CallError::BadArg)
        ));
    }

    #[test]
    fn select_unsupported_carries_code() {
        let (bridge, _) = bridge();
        let err = bridge.call("select_api_version", &[Term::Int(5)]).unwrap_err();
        assert_eq!(err.code(), Some(FdbError::API_VERSION_NOT_SUPPORTED));
    }

    #[test]
    fn set_option_by_name_and_code() {
        let (bridge, fdb) = bridge();
        bridge.select_api_version(710).unwrap();

        let reply = bridge
            .call(
                "network_set_option",
                &[Term::atom("trace_enable"), Term::string("/tmp/trace")],
            )
            .unwrap();
        assert_eq!(reply, Term::ok());
        bridge
            .call("network_set_option", &[Term::Int(31), Term::Int(1 << 20)])
            .unwrap();
        bridge
            .call(
                "network_set_option",
                &[Term::atom("buggify_enable"), Term::undefined()],
            )
            .unwrap();

        assert_eq!(
            fdb.options(),
            vec![
                (
                    NetworkOption::TraceEnable,
                    Some(OptionValue::Bytes(b"/tmp/trace".to_vec()))
                ),
                (NetworkOption::TraceRollSize, Some(OptionValue::Int(1 << 20))),
                (NetworkOption::BuggifyEnable, None),
            ]
        );
    }

    #[test]
    fn set_option_malformed_is_badarg() {
        let (bridge, fdb) = bridge();
        bridge.select_api_version(710).unwrap();
        let before = fdb.calls().len();

        let cases = [
            [Term::atom("no_such_option"), Term::undefined()],
            [Term::atom("trace_roll_size"), Term::string("big")],
            [Term::atom("buggify_enable"), Term::Int(1)],
            [Term::Int(9999), Term::undefined()],
            [Term::List(vec![]), Term::undefined()],
        ];
        for args in &cases {
            assert!(matches!(
                bridge.call("network_set_option", args),
                Err(CallError::BadArg)
            ));
        }
        assert_eq!(fdb.calls().len(), before);
    }

    #[test]
    fn set_option_native_failure_is_unaltered() {
        let (bridge, fdb) = bridge();
        bridge.select_api_version(710).unwrap();
        fdb.fail_next_option(FdbError::INVALID_OPTION_VALUE);

        let err = bridge
            .network_set_option(NetworkOption::Knob, Some(OptionValue::Bytes(b"x=1".to_vec())))
            .unwrap_err();
        assert_eq!(err.code(), Some(FdbError::INVALID_OPTION_VALUE));
    }

    #[test]
    fn setup_twice_returns_native_code() {
        let (bridge, _) = bridge();
        bridge.select_api_version(710).unwrap();
        assert_eq!(bridge.call("setup_network", &[]).unwrap(), Term::ok());
        assert_eq!(bridge.network_state(), NetworkState::Running);

        let err = bridge.call("setup_network", &[]).unwrap_err();
        assert_eq!(err.code(), Some(FdbError::NETWORK_ALREADY_SETUP));
        assert_eq!(
            err.to_term(),
            Term::Tuple(vec![Term::atom("fdb_error"), Term::Int(2009)])
        );

        assert_eq!(bridge.call("stop_network", &[]).unwrap(), Term::ok());
        assert_eq!(bridge.network_state(), NetworkState::Stopped);
    }

    #[test]
    fn stop_before_setup_carries_code() {
        let (bridge, _) = bridge();
        let err = bridge.call("stop_network", &[]).unwrap_err();
        assert_eq!(err.code(), Some(FdbError::NETWORK_NOT_SETUP));
    }

    #[test]
    fn get_error_describes_code() {
        let (bridge, fdb) = bridge();
        let reply = bridge.call("get_error", &[Term::Int(2009)]).unwrap();
        assert_eq!(reply, Term::ok_with(Term::string("network already setup")));
        assert_eq!(fdb.calls(), vec![MockCall::ErrorMessage(2009)]);
    }

    #[test]
    fn with_config_runs_network() {
        let mut config = BridgeConfig::default();
        config.network.thread_name = "fdb-bridge-test".to_string();
        let fdb = MockFdb::new();
        let bridge = Bridge::with_config(fdb, &config);
        bridge.select_api_version(710).unwrap();
        bridge.setup_network().unwrap();
        bridge.stop_network().unwrap();
        assert_eq!(bridge.network_state(), NetworkState::Stopped);
    }
}
