//! Process-wide `tracing` subscriber setup.

use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber.
///
/// `RUST_LOG` takes precedence over `filter`. Returns `false` if a global
/// subscriber was already installed (by us or by the host).
pub fn init(filter: &str) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_thread_names(true)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!("Logging initialized (filter: {})", filter);
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_refused() {
        // Another test may have won the first install; either way the
        // subscriber is in place afterwards and a repeat is refused.
        let _ = init("debug");
        assert!(!init("info"));
    }
}
