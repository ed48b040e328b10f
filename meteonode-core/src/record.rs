//! Outbound records
//!
//! A [`StationRecord`] is the flat snapshot published per cycle; it already
//! carries every derived value so a buffered copy can be sent later without
//! recomputation. Serialized field names are the wire names.

use crate::battery::{BatteryState, BatteryStatus};
use crate::compensation::CompensatedReading;
use crate::time::Timestamp;

/// One published reading
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationRecord {
    /// °C, 2 decimals
    pub temperature: f64,
    /// %RH, 1 decimal
    pub humidity: f64,
    /// hPa at the station, 2 decimals
    pub pressure: f64,
    /// °C, 2 decimals
    pub dew_point: f64,
    /// hPa reduced to sea level, 2 decimals
    pub sea_level_pressure: f64,
    /// Volts, 2 decimals
    pub battery_voltage: f32,
    /// Percent, 1 decimal
    pub battery_percent: f32,
    /// Battery classification
    pub battery_state: BatteryState,
    /// Successful reads before this one
    pub reading_count: u32,
    /// Failed reads since the station started
    pub error_count: u32,
    /// Seconds since the station started
    #[cfg_attr(feature = "serde", serde(rename = "uptime"))]
    pub uptime_s: u64,
}

/// Inputs for [`StationRecord::new`] besides the reading and battery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordCounters {
    /// Successful reads so far
    pub reading_count: u32,
    /// Failed reads so far
    pub error_count: u32,
    /// Seconds since start
    pub uptime_s: u64,
}

impl StationRecord {
    /// Assemble a record, rounding each value to its published precision
    pub fn new(
        reading: &CompensatedReading,
        dew_point: f64,
        sea_level_pressure: f64,
        battery: &BatteryStatus,
        counters: RecordCounters,
    ) -> Self {
        Self {
            temperature: round_to(reading.temperature, 2),
            humidity: round_to(reading.humidity, 1),
            pressure: round_to(reading.pressure, 2),
            dew_point: round_to(dew_point, 2),
            sea_level_pressure: round_to(sea_level_pressure, 2),
            battery_voltage: round_to(battery.voltage as f64, 2) as f32,
            battery_percent: round_to(battery.percentage as f64, 1) as f32,
            battery_state: battery.state,
            reading_count: counters.reading_count,
            error_count: counters.error_count,
            uptime_s: counters.uptime_s,
        }
    }
}

/// A record waiting in the transmission buffer
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BufferedEntry {
    /// Capture time, milliseconds on the station clock
    pub timestamp: Timestamp,
    /// The snapshot itself
    pub record: StationRecord,
}

impl BufferedEntry {
    /// Pair a record with its capture time
    pub fn new(timestamp: Timestamp, record: StationRecord) -> Self {
        Self { timestamp, record }
    }
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = libm::pow(10.0, decimals as f64);
    libm::round(value * scale) / scale
}
