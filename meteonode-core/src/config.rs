//! Node configuration
//!
//! Every tunable has a named default in [`crate::constants`]. A deployment
//! either builds the structs in code:
//!
//! ```rust
//! use meteonode_core::config::{NodeConfig, StationInfo};
//!
//! let config = NodeConfig::default()
//!     .station(StationInfo::new("Garden", "Tampere").elevation_m(110.0))
//!     .read_interval_s(600);
//! assert!(config.validate().is_ok());
//! ```
//!
//! or loads a JSON document with [`NodeConfig::from_json`]; omitted fields
//! fall back to their defaults.

use alloc::string::String;

use thiserror_no_std::Error;

use crate::constants::power::*;
use crate::constants::time::{LINK_CONNECT_TIMEOUT_S, LINK_POLL_INTERVAL_MS};
use crate::constants::{DEFAULT_READ_INTERVAL_S, MAX_SENSOR_READ_FAILURES};
use crate::ports::Credentials;

/// Configuration problems found by [`NodeConfig::validate`] or the JSON loader
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Battery thresholds are not ordered critical < low < full
    #[error("battery thresholds must satisfy critical < low < full")]
    ThresholdOrder,

    /// A scale factor that must be positive is not
    #[error("{field} must be positive")]
    NonPositive {
        /// Offending field
        field: &'static str,
    },

    /// Zero where at least one is required
    #[error("{field} must be at least 1")]
    Zero {
        /// Offending field
        field: &'static str,
    },

    /// JSON document did not parse
    #[error("invalid configuration document at line {line}, column {column}")]
    Parse {
        /// Line of the first error
        line: usize,
        /// Column of the first error
        column: usize,
    },
}

/// Station identity, published with every JSON upload
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StationInfo {
    /// Human-readable station name
    pub name: String,
    /// Free-form location label
    pub location: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Elevation above sea level, used for sea-level pressure
    pub elevation_m: f64,
}

impl Default for StationInfo {
    fn default() -> Self {
        Self {
            name: String::from("meteonode"),
            location: String::new(),
            latitude: 0.0,
            longitude: 0.0,
            elevation_m: 0.0,
        }
    }
}

impl StationInfo {
    /// Named station at sea level
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self { name: name.into(), location: location.into(), ..Self::default() }
    }

    /// Set the elevation
    pub fn elevation_m(mut self, elevation_m: f64) -> Self {
        self.elevation_m = elevation_m;
        self
    }

    /// Set the coordinates
    pub fn coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = latitude;
        self.longitude = longitude;
        self
    }
}

/// Read cadence and failure escalation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SamplingConfig {
    /// Base interval between cycles, before battery scaling
    pub read_interval_s: u32,
    /// Consecutive read failures that trigger a sensor soft reset
    pub max_read_failures: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            read_interval_s: DEFAULT_READ_INTERVAL_S,
            max_read_failures: MAX_SENSOR_READ_FAILURES,
        }
    }
}

/// ADC transfer function and battery thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BatteryConfig {
    /// Battery-to-ADC divider ratio
    pub divider_ratio: f32,
    /// ADC reference voltage
    pub vref: f32,
    /// Low-battery threshold (inclusive)
    pub low_voltage: f32,
    /// Critical threshold (inclusive); also the 0 % point
    pub critical_voltage: f32,
    /// Fully charged voltage; the 100 % point
    pub full_voltage: f32,
    /// Multiplicative correction from a multimeter calibration
    pub calibration_factor: f32,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            divider_ratio: VOLTAGE_DIVIDER_RATIO,
            vref: ADC_REFERENCE_VOLTAGE_V,
            low_voltage: BATTERY_LOW_VOLTAGE_V,
            critical_voltage: BATTERY_CRITICAL_VOLTAGE_V,
            full_voltage: BATTERY_FULL_VOLTAGE_V,
            calibration_factor: DEFAULT_CALIBRATION_FACTOR,
        }
    }
}

impl BatteryConfig {
    /// Override the three thresholds
    pub fn thresholds(mut self, critical: f32, low: f32, full: f32) -> Self {
        self.critical_voltage = critical;
        self.low_voltage = low;
        self.full_voltage = full;
        self
    }

    /// Override the transfer function
    pub fn transfer(mut self, vref: f32, divider_ratio: f32) -> Self {
        self.vref = vref;
        self.divider_ratio = divider_ratio;
        self
    }
}

/// Additive corrections applied after compensation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SensorOffsets {
    /// °C
    pub temperature: f64,
    /// %RH
    pub humidity: f64,
    /// hPa
    pub pressure: f64,
}

/// Wireless association settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinkConfig {
    /// Network credentials
    pub credentials: Credentials,
    /// Give up on association after this long
    pub connect_timeout_s: u32,
    /// Status poll period during association
    pub poll_interval_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            connect_timeout_s: LINK_CONNECT_TIMEOUT_S,
            poll_interval_ms: LINK_POLL_INTERVAL_MS,
        }
    }
}

impl LinkConfig {
    /// Link settings for the given network with default timing
    pub fn new(ssid: impl Into<String>, password: impl Into<String>) -> Self {
        Self { credentials: Credentials::new(ssid, password), ..Self::default() }
    }

    /// Set the association timeout
    pub fn connect_timeout_s(mut self, secs: u32) -> Self {
        self.connect_timeout_s = secs;
        self
    }
}

/// Complete node configuration
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NodeConfig {
    /// Station identity
    pub station: StationInfo,
    /// Read cadence
    pub sampling: SamplingConfig,
    /// Battery monitor settings
    pub battery: BatteryConfig,
    /// Post-compensation offsets
    pub offsets: SensorOffsets,
    /// Wireless link
    pub link: LinkConfig,
}

impl NodeConfig {
    /// Replace the station identity
    pub fn station(mut self, station: StationInfo) -> Self {
        self.station = station;
        self
    }

    /// Replace the battery settings
    pub fn battery(mut self, battery: BatteryConfig) -> Self {
        self.battery = battery;
        self
    }

    /// Replace the offsets
    pub fn offsets(mut self, offsets: SensorOffsets) -> Self {
        self.offsets = offsets;
        self
    }

    /// Replace the link settings
    pub fn link(mut self, link: LinkConfig) -> Self {
        self.link = link;
        self
    }

    /// Set the base read interval
    pub fn read_interval_s(mut self, secs: u32) -> Self {
        self.sampling.read_interval_s = secs;
        self
    }

    /// Set the reset threshold
    pub fn max_read_failures(mut self, failures: u32) -> Self {
        self.sampling.max_read_failures = failures;
        self
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.battery;
        if !(b.critical_voltage < b.low_voltage && b.low_voltage < b.full_voltage) {
            return Err(ConfigError::ThresholdOrder);
        }
        if b.divider_ratio <= 0.0 {
            return Err(ConfigError::NonPositive { field: "battery.divider_ratio" });
        }
        if b.vref <= 0.0 {
            return Err(ConfigError::NonPositive { field: "battery.vref" });
        }
        if b.calibration_factor <= 0.0 {
            return Err(ConfigError::NonPositive { field: "battery.calibration_factor" });
        }
        if self.sampling.read_interval_s == 0 {
            return Err(ConfigError::Zero { field: "sampling.read_interval_s" });
        }
        if self.sampling.max_read_failures == 0 {
            return Err(ConfigError::Zero { field: "sampling.max_read_failures" });
        }
        if self.link.poll_interval_ms == 0 {
            return Err(ConfigError::Zero { field: "link.poll_interval_ms" });
        }
        Ok(())
    }

    /// Parse and validate a JSON document
    #[cfg(feature = "std")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ConfigError::Parse { line: e.line(), column: e.column() })?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = NodeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sampling.read_interval_s, 300);
        assert_eq!(config.sampling.max_read_failures, 5);
        assert_eq!(config.battery.full_voltage, 4.2);
        assert_eq!(config.link.connect_timeout_s, 30);
    }

    #[test]
    fn rejects_unordered_thresholds() {
        let config = NodeConfig::default()
            .battery(BatteryConfig::default().thresholds(3.5, 3.3, 4.2));
        assert_eq!(config.validate(), Err(ConfigError::ThresholdOrder));
    }

    #[test]
    fn rejects_zero_interval() {
        let config = NodeConfig::default().read_interval_s(0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::Zero { field: "sampling.read_interval_s" })
        );
    }

    #[cfg(feature = "std")]
    #[test]
    fn loads_partial_json() {
        let config = NodeConfig::from_json(
            r#"{
                "station": { "name": "Roof", "elevation_m": 190.0 },
                "sampling": { "read_interval_s": 120 },
                "link": { "credentials": { "ssid": "lab", "password": "secret" } }
            }"#,
        )
        .unwrap();

        assert_eq!(config.station.name, "Roof");
        assert_eq!(config.station.elevation_m, 190.0);
        assert_eq!(config.sampling.read_interval_s, 120);
        assert_eq!(config.sampling.max_read_failures, 5);
        assert_eq!(config.link.credentials.ssid, "lab");
        assert_eq!(config.link.poll_interval_ms, 500);
    }

    #[cfg(feature = "std")]
    #[test]
    fn reports_parse_position() {
        let err = NodeConfig::from_json("{\n  \"sampling\": [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 2, .. }));
    }

    #[cfg(feature = "std")]
    #[test]
    fn json_is_validated() {
        let err = NodeConfig::from_json(r#"{ "sampling": { "max_read_failures": 0 } }"#).unwrap_err();
        assert_eq!(err, ConfigError::Zero { field: "sampling.max_read_failures" });
    }
}
