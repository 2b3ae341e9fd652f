//! Host monotonic clock.

use std::sync::OnceLock;
use std::time::Instant;

use railcab_core::traits::TimeSource;

/// `TimeSource` over `std::time::Instant`, measuring microseconds since
/// first use.
///
/// `new` is `const` so the clock can live in a `static` next to the
/// reporting context.
pub struct HostClock {
    start: OnceLock<Instant>,
}

impl HostClock {
    pub const fn new() -> Self {
        Self {
            start: OnceLock::new(),
        }
    }

    fn start(&self) -> Instant {
        *self.start.get_or_init(Instant::now)
    }
}

impl Default for HostClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for HostClock {
    fn now_ms(&self) -> u64 {
        self.start().elapsed().as_millis() as u64
    }

    fn now_us(&self) -> u64 {
        self.start().elapsed().as_micros() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_is_monotonic() {
        let clock = HostClock::new();
        let a = clock.now_us();
        let b = clock.now_us();
        assert!(b >= a);
    }
}
