//! Time abstraction for report timestamping.
//!
//! The reporting context stores a `&'static dyn TimeSource` and stamps
//! every report with it, so the trait is kept object-safe: no `Clone`
//! bound, no generic methods.

use core::cell::Cell;

/// Monotonic clock used to stamp reports on entry to and exit from the
/// delivery queue.
///
/// Implementations:
/// - an Embassy-instant clock on embedded targets
/// - `HostClock` (in the SITL crate) for host runs
/// - [`MockTime`] for deterministic tests
pub trait TimeSource: Send + Sync {
    /// Returns current time in milliseconds since system start.
    fn now_ms(&self) -> u64;

    /// Returns current time in microseconds since system start.
    fn now_us(&self) -> u64;

    /// Returns elapsed time in microseconds since a reference point.
    ///
    /// Uses saturating subtraction to handle potential overflow.
    fn elapsed_since(&self, reference_us: u64) -> u64 {
        self.now_us().saturating_sub(reference_us)
    }
}

/// Mock time source for testing with controllable time advancement.
///
/// Starts at zero; tests advance it explicitly, which makes report
/// `time_in`/`time_out` relationships deterministic.
#[derive(Default)]
pub struct MockTime {
    current_us: Cell<u64>,
}

// Safety: MockTime is only used in single-threaded test contexts where
// Cell is safe. The Send+Sync bounds on TimeSource are required for
// embedded contexts, but MockTime is not used there.
unsafe impl Send for MockTime {}
unsafe impl Sync for MockTime {}

impl MockTime {
    /// Creates a new `MockTime` starting at time 0.
    pub const fn new() -> Self {
        Self {
            current_us: Cell::new(0),
        }
    }

    /// Creates a new `MockTime` starting at the specified time.
    pub const fn with_initial(us: u64) -> Self {
        Self {
            current_us: Cell::new(us),
        }
    }

    /// Sets the current time to an absolute value.
    pub fn set(&self, us: u64) {
        self.current_us.set(us);
    }

    /// Advances the current time by the specified amount.
    pub fn advance(&self, us: u64) {
        self.current_us.set(self.current_us.get() + us);
    }
}

impl TimeSource for MockTime {
    fn now_ms(&self) -> u64 {
        self.current_us.get() / 1000
    }

    fn now_us(&self) -> u64 {
        self.current_us.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_time_starts_at_zero() {
        let time = MockTime::new();
        assert_eq!(time.now_us(), 0);
        assert_eq!(time.now_ms(), 0);
    }

    #[test]
    fn mock_time_set_and_advance() {
        let time = MockTime::with_initial(5_000);
        time.advance(1_000);
        assert_eq!(time.now_us(), 6_000);

        time.set(2_000_000);
        assert_eq!(time.now_ms(), 2_000);
    }

    #[test]
    fn elapsed_since_saturates() {
        let time = MockTime::new();
        time.set(1_000);
        assert_eq!(time.elapsed_since(3_000), 0);
        assert_eq!(time.elapsed_since(400), 600);
    }
}
