//! Time management for the station
//!
//! The station needs exactly two things from a clock:
//! - a monotonic millisecond counter (timestamps, uptime, connect timeouts)
//! - a way to suspend the whole task (the inter-cycle sleep)
//!
//! Both live on one trait so a simulated clock can advance time when the
//! station "sleeps", which keeps cycle tests instant and deterministic.

use crate::constants::time::MS_PER_SECOND;

/// Timestamp in milliseconds since the clock's origin
///
/// The origin is device boot for an MCU timer and the Unix epoch for
/// [`SystemClock::unix`]; record timestamps inherit whichever the station
/// clock uses.
pub type Timestamp = u64;

/// Monotonic time source plus the node's only blocking primitive
pub trait Clock {
    /// Milliseconds since the origin; never goes backwards
    fn now_ms(&self) -> Timestamp;

    /// Suspend the task for `ms` milliseconds
    fn sleep_ms(&mut self, ms: u64);
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn now_ms(&self) -> Timestamp {
        (**self).now_ms()
    }

    fn sleep_ms(&mut self, ms: u64) {
        (**self).sleep_ms(ms)
    }
}

/// Clock backed by `std::time::Instant` and `std::thread::sleep`
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: std::time::Instant,
    /// Value of `now_ms` at `origin`
    base_ms: Timestamp,
}

#[cfg(feature = "std")]
impl SystemClock {
    /// Start counting from zero now
    pub fn new() -> Self {
        Self { origin: std::time::Instant::now(), base_ms: 0 }
    }

    /// Count from the Unix epoch, read once from the system wall clock
    ///
    /// Later wall-clock adjustments do not move it; it stays monotonic.
    pub fn unix() -> Self {
        let base_ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as Timestamp)
            .unwrap_or(0);
        Self { origin: std::time::Instant::now(), base_ms }
    }
}

#[cfg(feature = "std")]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for SystemClock {
    fn now_ms(&self) -> Timestamp {
        self.base_ms + self.origin.elapsed().as_millis() as Timestamp
    }

    fn sleep_ms(&mut self, ms: u64) {
        std::thread::sleep(std::time::Duration::from_millis(ms));
    }
}

/// Milliseconds between two timestamps, zero if they are out of order
pub fn elapsed_ms(earlier: Timestamp, later: Timestamp) -> u64 {
    later.saturating_sub(earlier)
}

/// Whole seconds contained in a millisecond timestamp
pub fn whole_seconds(ms: Timestamp) -> u64 {
    ms / MS_PER_SECOND
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_saturates() {
        assert_eq!(elapsed_ms(1000, 1500), 500);
        assert_eq!(elapsed_ms(1500, 1000), 0);
    }

    #[cfg(feature = "std")]
    #[test]
    fn unix_clock_starts_at_epoch_time() {
        let clock = SystemClock::unix();
        // 2020-01-01 in ms; anything earlier means the base was not applied
        assert!(clock.now_ms() > 1_577_836_800_000);
        assert!(SystemClock::new().now_ms() < 60_000);
    }

    #[test]
    fn seconds_truncate() {
        assert_eq!(whole_seconds(1999), 1);
        assert_eq!(whole_seconds(300_000), 300);
    }

    #[cfg(feature = "std")]
    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
