//! Battery and Power Constants
//!
//! Defaults for a single Li-ion cell measured through a 1:2 resistor divider
//! on a 16-bit ADC with a 3.3 V reference.

// ===== CELL THRESHOLDS =====

/// Fully charged Li-ion cell voltage (V).
///
/// Source: standard 4.2 V CC/CV charge termination
pub const BATTERY_FULL_VOLTAGE_V: f32 = 4.2;

/// Voltage at which the station starts conserving power (V).
pub const BATTERY_LOW_VOLTAGE_V: f32 = 3.3;

/// Voltage at which the station treats the cell as nearly exhausted (V).
///
/// Also the 0% reference of the percentage estimate.
pub const BATTERY_CRITICAL_VOLTAGE_V: f32 = 3.0;

/// Fraction of full voltage at or above which the cell counts as FULL.
pub const FULL_STATE_FRACTION: f32 = 0.95;

// ===== ADC TRANSFER =====

/// ADC reference voltage (V).
pub const ADC_REFERENCE_VOLTAGE_V: f32 = 3.3;

/// Full-scale raw value of a 16-bit ADC reading.
pub const ADC_FULL_SCALE: f32 = 65535.0;

/// Divider ratio between the cell and the ADC pin (cell V / pin V).
pub const VOLTAGE_DIVIDER_RATIO: f32 = 2.0;

/// Default multimeter calibration factor (no correction).
pub const DEFAULT_CALIBRATION_FACTOR: f32 = 1.0;

// ===== SLEEP POLICY =====

/// Sleep multiplier while the battery is CRITICAL.
pub const CRITICAL_SLEEP_MULTIPLIER: u32 = 4;

/// Sleep multiplier while the battery is LOW.
pub const LOW_SLEEP_MULTIPLIER: u32 = 2;

/// Extra multiplier applied for one cycle after a failed sensor reset.
pub const FAILED_RESET_SLEEP_MULTIPLIER: u32 = 2;
