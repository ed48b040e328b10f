//! Constants for the Station Core
//!
//! Every number the station firmware depends on lives here with its unit in
//! the name and a note on where it comes from. Defaults for the configuration
//! structs are built from these values, so a deployment only overrides what
//! differs from the bench setup.
//!
//! ## Organization
//!
//! - **Sensor**: BME280 register map, identity, oversampling and mode codes
//! - **Power**: battery thresholds, divider and ADC transfer parameters
//! - **Physics**: barometric and dew-point formula constants
//! - **Time**: unit conversions, intervals and link timeouts
//! - **Buffers**: capacities of the offline buffer and smoothing window

/// BME280 register map and configuration codes.
pub mod sensor;

/// Battery monitoring thresholds and ADC transfer parameters.
pub mod power;

/// Barometric and psychrometric formula constants.
pub mod physics;

/// Time conversions, cycle intervals and link timeouts.
pub mod time;

/// Capacities of the offline buffer and smoothing window.
pub mod buffers;

// Re-export commonly used constants for convenience
pub use physics::SEA_LEVEL_PRESSURE_HPA;

pub use power::{
    BATTERY_CRITICAL_VOLTAGE_V, BATTERY_LOW_VOLTAGE_V, BATTERY_FULL_VOLTAGE_V,
};

pub use time::{MS_PER_SECOND, DEFAULT_READ_INTERVAL_S};

pub use buffers::{DEFAULT_BUFFER_CAPACITY, DEFAULT_VOLTAGE_WINDOW, MAX_SENSOR_READ_FAILURES};
