//! Time-Related Constants
//!
//! Unit conversions, cycle intervals and link timeouts.

// ===== TIME UNIT CONVERSIONS =====

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

// ===== CYCLE INTERVALS =====

/// Default interval between sensor readings (seconds).
///
/// Five minutes is plenty for weather data and keeps the radio off most of
/// the time.
pub const DEFAULT_READ_INTERVAL_S: u32 = 300;

// ===== LINK TIMEOUTS =====

/// How long a connect attempt may take before giving up (seconds).
pub const LINK_CONNECT_TIMEOUT_S: u32 = 30;

/// Interval between link status polls while connecting (milliseconds).
pub const LINK_POLL_INTERVAL_MS: u64 = 500;

/// Request timeout for HTTP uploads (seconds).
pub const UPLOAD_TIMEOUT_S: u64 = 30;
