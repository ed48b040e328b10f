//! Buffer Sizes and Failure Thresholds
//!
//! Capacities for the two bounded sequences the station keeps in RAM.

/// Number of readings held while the uplink is unavailable.
///
/// 50 readings at the default 5 minute interval covers a little over four
/// hours offline. Each entry is a ~64 byte record, ~3.2 KB in total.
pub const DEFAULT_BUFFER_CAPACITY: usize = 50;

/// Number of voltage samples in the battery smoothing window.
pub const DEFAULT_VOLTAGE_WINDOW: usize = 10;

/// Consecutive failed sensor reads before a soft reset is attempted.
pub const MAX_SENSOR_READ_FAILURES: u32 = 5;
