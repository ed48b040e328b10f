//! Core of the meteonode battery-powered weather station
//!
//! Reads a BME280 over an abstract register bus, turns raw counts into
//! physical units, watches the battery to stretch its sleep, and pushes
//! readings over an intermittent link with a bounded offline buffer.
//!
//! Key constraints:
//! - Runs on a Pico-class MCU (`no_std` + `alloc`)
//! - No heap allocation in the read/compensate path
//! - Single task: one cycle completes before the next begins
//!
//! ```no_run
//! use meteonode_core::{NeverShutdown, NodeConfig, Station, SystemClock};
//! use meteonode_core::sim::{SimAdc, SimBus, SimSender};
//!
//! let mut station: Station<_, _, _, _> = Station::new(
//!     SimBus::default(),
//!     SimAdc::at_voltage(3.9),
//!     SimSender::online(),
//!     SystemClock::new(),
//!     NodeConfig::default(),
//! )?;
//! station.init().ok();
//! station.run(&NeverShutdown);
//! # Ok::<(), meteonode_core::config::ConfigError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

#[macro_use]
mod macros;

pub mod battery;
pub mod calibration;
pub mod compensation;
pub mod config;
pub mod constants;
pub mod derived;
pub mod errors;
pub mod link;
pub mod plausibility;
pub mod ports;
pub mod record;
pub mod sensor;
pub mod station;
pub mod time;
pub mod transmit;
pub mod window;

#[cfg(feature = "sim")]
pub mod sim;

// Public API
pub use battery::{BatteryMonitor, BatteryState, BatteryStatus};
pub use calibration::CalibrationCoefficients;
pub use compensation::{compensate, CompensatedReading, FineTemperature, RawSample};
pub use config::{NodeConfig, StationInfo};
pub use errors::{BusError, ErrorKind, NodeError, NodeResult};
pub use ports::{AnalogSampler, Credentials, HttpResponse, Network, NeverShutdown, RegisterBus, Sender, ShutdownSignal};
pub use record::{BufferedEntry, StationRecord};
pub use sensor::Bme280;
pub use station::{CycleOutcome, CyclePhase, Station, StationSession};
pub use time::{Clock, Timestamp};
pub use transmit::{SendOutcome, TransmissionBuffer};

#[cfg(feature = "std")]
pub use time::SystemClock;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
