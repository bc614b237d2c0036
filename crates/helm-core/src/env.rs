//! Environment abstraction for deterministic testing.
//!
//! Decouples the state machines from system time. Production code uses
//! [`SystemEnv`]; tests drive the same code on [`testing::SimClock`]'s
//! virtual instants.

use std::{ops::Sub, time::Duration};

/// Abstract environment providing time.
///
/// # Invariants
///
/// - `now()` never goes backwards within a single execution context.
pub trait Environment: Clone + Send + Sync + 'static {
    /// The instant type used by this environment.
    ///
    /// Production environments use `std::time::Instant`; simulation
    /// environments use virtual time.
    type Instant: Copy + Ord + Send + Sync + Sub<Output = Duration>;

    /// Current time (monotonic).
    fn now(&self) -> Self::Instant;

    /// Sleeps for the specified duration.
    ///
    /// Only driver code awaits this; the state machines never block.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;
}

/// Production environment backed by the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    type Instant = std::time::Instant;

    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

/// Virtual-time support for tests.
pub mod testing {
    use std::{ops::Sub, time::Duration};

    /// A virtual instant measured in milliseconds from an arbitrary origin.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    pub struct SimInstant(u64);

    impl SimInstant {
        /// Instant at `millis` milliseconds from the origin.
        #[must_use]
        pub fn from_millis(millis: u64) -> Self {
            Self(millis)
        }
    }

    impl Sub for SimInstant {
        type Output = Duration;

        fn sub(self, rhs: Self) -> Duration {
            Duration::from_millis(self.0.saturating_sub(rhs.0))
        }
    }

    /// A manually advanced clock producing [`SimInstant`]s.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SimClock {
        now: u64,
    }

    impl SimClock {
        /// Clock at the origin.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Current virtual instant.
        #[must_use]
        pub fn now(&self) -> SimInstant {
            SimInstant(self.now)
        }

        /// Advance the clock and return the new instant.
        pub fn advance(&mut self, duration: Duration) -> SimInstant {
            self.now = self.now.saturating_add(duration.as_millis() as u64);
            SimInstant(self.now)
        }
    }
}
