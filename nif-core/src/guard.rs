//! Process-wide initialization guard.
//!
//! The native client can only be initialized once per OS process. The guard
//! lets a host ask "am I the first?" without touching the native library.

use std::sync::atomic::{AtomicBool, Ordering};

static PROCESS_GUARD: InitGuard = InitGuard::new();

/// A one-shot flag: the first [`InitGuard::try_claim`] wins, every later
/// call loses. Never reset.
#[derive(Debug)]
pub struct InitGuard {
    claimed: AtomicBool,
}

impl InitGuard {
    /// Create an unclaimed guard.
    pub const fn new() -> Self {
        Self {
            claimed: AtomicBool::new(false),
        }
    }

    /// The guard shared by the whole process.
    pub fn process() -> &'static InitGuard {
        &PROCESS_GUARD
    }

    /// Claim the guard. Returns `true` for exactly one caller.
    pub fn try_claim(&self) -> bool {
        self.claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Whether some caller already claimed the guard.
    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }
}

impl Default for InitGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn first_claim_wins() {
        let guard = InitGuard::new();
        assert!(!guard.is_claimed());
        assert!(guard.try_claim());
        assert!(guard.is_claimed());
        assert!(!guard.try_claim());
        assert!(!guard.try_claim());
    }

    #[test]
    fn exactly_one_concurrent_claimer() {
        const THREADS: usize = 16;
        let guard = Arc::new(InitGuard::new());
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let guard = Arc::clone(&guard);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    guard.try_claim()
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn process_guard_is_a_single_instance() {
        assert!(std::ptr::eq(InitGuard::process(), InitGuard::process()));
    }
}
