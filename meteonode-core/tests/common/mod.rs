//! Shared fixtures for the integration tests
//!
//! - Station builders wired to the simulated hardware
//! - Shutdown signals that fire after a fixed number of checks
//! - Float assertion helpers

#![allow(dead_code)]

use core::cell::Cell;

use meteonode_core::config::{BatteryConfig, NodeConfig, StationInfo};
use meteonode_core::sim::{SimAdc, SimBus, SimClock, SimSender};
use meteonode_core::{ShutdownSignal, Station};

/// Station over sim doubles with an 8-entry buffer
pub type SimStation = Station<SimBus, SimAdc, SimSender, SimClock, 8>;

/// Configuration used by most scenarios: 190 m elevation, default battery
pub fn bench_config() -> NodeConfig {
    NodeConfig::default()
        .station(StationInfo::new("Bench", "Lab").elevation_m(190.0))
        .battery(BatteryConfig::default())
}

/// Initialized station with a healthy sensor and an online uplink
pub fn bench_station(volts: f32) -> SimStation {
    let mut station = Station::new(
        SimBus::default(),
        SimAdc::at_voltage(volts),
        SimSender::online(),
        SimClock::new(),
        bench_config(),
    )
    .expect("bench config is valid");
    station.init().expect("sim sensor initializes");
    station
}

/// Shutdown signal that answers "no" a fixed number of times
pub struct StopAfter {
    remaining: Cell<u32>,
}

impl StopAfter {
    pub fn checks(n: u32) -> Self {
        Self { remaining: Cell::new(n) }
    }
}

impl ShutdownSignal for StopAfter {
    fn requested(&self) -> bool {
        match self.remaining.get() {
            0 => true,
            n => {
                self.remaining.set(n - 1);
                false
            }
        }
    }
}

pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} ± {tolerance}, got {actual}"
    );
}
