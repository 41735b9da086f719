//! Wall-clock access for certificate validity and reconnect pacing.
//!
//! TLS cannot validate certificate lifetimes against a bogus clock, so the
//! supervisor checks plausibility before every connect and can demand a
//! blocking resync. Reconnect backoff funnels through the same trait, which
//! keeps the supervisor testable without real delays.

use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Epoch floor below which the wall clock cannot be real (2020-01-01 UTC).
pub const MIN_VALID_EPOCH: u64 = 1_577_836_800;

const SYNC_WAIT_STEP: Duration = Duration::from_secs(1);
const SYNC_WAIT_ROUNDS: u32 = 30;

/// Time source with a blocking resync fallback.
pub trait Clock {
    /// Seconds since the Unix epoch.
    fn epoch_secs(&self) -> u64;

    /// Block until time synchronization has had a chance to land, then
    /// report whether the clock is plausible.
    fn force_sync(&mut self) -> bool;

    /// Pause the calling thread.
    fn sleep(&self, d: Duration);
}

/// Host clock. The host's own time service owns correction; `force_sync`
/// gives it a bounded window to land.
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    fn force_sync(&mut self) -> bool {
        for _ in 0..SYNC_WAIT_ROUNDS {
            if self.epoch_secs() >= MIN_VALID_EPOCH {
                return true;
            }
            self.sleep(SYNC_WAIT_STEP);
        }
        self.epoch_secs() >= MIN_VALID_EPOCH
    }

    fn sleep(&self, d: Duration) {
        thread::sleep(d);
    }
}

/// Mock clock for tests. Not part of the public API surface.
#[doc(hidden)]
pub mod mock {
    use super::{Clock, MIN_VALID_EPOCH};
    use std::cell::RefCell;
    use std::time::Duration;

    /// Fully scripted clock: settable epoch, recorded sleeps, optional
    /// resync target.
    pub struct ManualClock {
        /// Current epoch reported by `epoch_secs`.
        pub epoch: u64,
        /// Every sleep requested, in call order.
        pub sleeps: RefCell<Vec<Duration>>,
        /// Epoch `force_sync` jumps to; `None` leaves the clock untouched.
        pub sync_target: Option<u64>,
        /// Number of `force_sync` calls observed.
        pub force_sync_calls: u32,
    }

    impl ManualClock {
        pub fn new(epoch: u64) -> Self {
            ManualClock {
                epoch,
                sleeps: RefCell::new(Vec::new()),
                sync_target: None,
                force_sync_calls: 0,
            }
        }

        /// A clock that is already plausible.
        pub fn synced() -> Self {
            Self::new(MIN_VALID_EPOCH + 1)
        }

        pub fn sleep_count(&self) -> usize {
            self.sleeps.borrow().len()
        }

        /// Sum of all requested sleeps.
        pub fn total_slept(&self) -> Duration {
            self.sleeps.borrow().iter().sum()
        }
    }

    impl Clock for ManualClock {
        fn epoch_secs(&self) -> u64 {
            self.epoch
        }

        fn force_sync(&mut self) -> bool {
            self.force_sync_calls += 1;
            if let Some(target) = self.sync_target {
                self.epoch = target;
            }
            self.epoch >= MIN_VALID_EPOCH
        }

        fn sleep(&self, d: Duration) {
            self.sleeps.borrow_mut().push(d);
        }
    }
}
