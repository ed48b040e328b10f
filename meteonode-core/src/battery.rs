//! Battery Monitor and Adaptive Sleep
//!
//! ## Signal Path
//!
//! ```text
//!   ADC u16 ──► volts = raw / 65535 × vref × divider × calibration
//!                  │
//!                  ▼
//!          SampleWindow<N> (oldest evicted) ──► mean
//!                  │
//!                  ├──► classify()   ──► BatteryState
//!                  └──► percentage() ──► 0..=100 %
//! ```
//!
//! ## Classification
//!
//! Thresholds are checked in order, first match wins:
//!
//! | Condition                  | State    |
//! |----------------------------|----------|
//! | `v <= critical`            | Critical |
//! | `v <= low`                 | Low      |
//! | `v >= 0.95 × full`         | Full     |
//! | otherwise                  | Normal   |
//!
//! The state is recomputed from the latest averaged voltage every time; the
//! rolling mean is the only debounce.
//!
//! ## Percentage Floor
//!
//! The 0 % point is the *critical* threshold, not a true empty-cell voltage.
//! A cell at 3.0 V still has usable charge, but the station treats it as
//! empty because it has already quadrupled its sleep interval there.

use core::fmt;

use crate::config::BatteryConfig;
use crate::constants::power::{
    ADC_FULL_SCALE, CRITICAL_SLEEP_MULTIPLIER, FULL_STATE_FRACTION, LOW_SLEEP_MULTIPLIER,
};
use crate::constants::DEFAULT_VOLTAGE_WINDOW;
use crate::errors::{NodeError, NodeResult};
use crate::ports::AnalogSampler;
use crate::window::SampleWindow;

/// Coarse battery classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum BatteryState {
    /// At or below the critical threshold
    Critical,
    /// At or below the low threshold
    Low,
    /// Between low and nearly full
    Normal,
    /// Within 5 % of the full voltage
    Full,
}

impl BatteryState {
    /// Upper-case label used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::Low => "LOW",
            Self::Normal => "NORMAL",
            Self::Full => "FULL",
        }
    }

    /// Multiplier applied to the base read interval
    pub fn sleep_multiplier(&self) -> u32 {
        match self {
            Self::Critical => CRITICAL_SLEEP_MULTIPLIER,
            Self::Low => LOW_SLEEP_MULTIPLIER,
            Self::Normal | Self::Full => 1,
        }
    }
}

impl fmt::Display for BatteryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for BatteryState {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=str}", self.as_str())
    }
}

/// Snapshot of the battery at one point in the cycle
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BatteryStatus {
    /// Averaged voltage in volts
    pub voltage: f32,
    /// Charge estimate, 0..=100
    pub percentage: f32,
    /// Classification of `voltage`
    pub state: BatteryState,
}

impl BatteryStatus {
    /// Low or worse
    pub fn is_low(&self) -> bool {
        matches!(self.state, BatteryState::Low | BatteryState::Critical)
    }

    /// Critical
    pub fn is_critical(&self) -> bool {
        self.state == BatteryState::Critical
    }
}

/// Battery monitor over one ADC channel
///
/// `N` is the smoothing window length.
pub struct BatteryMonitor<A: AnalogSampler, const N: usize = DEFAULT_VOLTAGE_WINDOW> {
    adc: A,
    config: BatteryConfig,
    window: SampleWindow<N>,
    last_state: BatteryState,
}

impl<A: AnalogSampler, const N: usize> BatteryMonitor<A, N> {
    /// Create a monitor; no ADC access until the first sample
    pub fn new(adc: A, config: BatteryConfig) -> Self {
        Self {
            adc,
            config,
            window: SampleWindow::new(),
            last_state: BatteryState::Normal,
        }
    }

    /// One unaveraged conversion in volts
    pub fn sample(&mut self) -> NodeResult<f32> {
        let raw = self.adc.read_u16().map_err(|_| NodeError::Adc)?;
        Ok(self.to_voltage(raw))
    }

    /// Take a sample, push it into the window and return the window mean
    pub fn averaged_voltage(&mut self) -> NodeResult<f32> {
        let voltage = self.sample()?;
        self.window.push(voltage);
        Ok(self.window.mean().unwrap_or(voltage))
    }

    /// Linear ADC transfer function
    pub fn to_voltage(&self, raw: u16) -> f32 {
        (raw as f32 / ADC_FULL_SCALE)
            * self.config.vref
            * self.config.divider_ratio
            * self.config.calibration_factor
    }

    /// Classify a voltage against the configured thresholds
    pub fn classify(&self, voltage: f32) -> BatteryState {
        let c = &self.config;
        if voltage <= c.critical_voltage {
            BatteryState::Critical
        } else if voltage <= c.low_voltage {
            BatteryState::Low
        } else if voltage >= c.full_voltage * FULL_STATE_FRACTION {
            BatteryState::Full
        } else {
            BatteryState::Normal
        }
    }

    /// Charge estimate, interpolated between critical (0 %) and full (100 %)
    pub fn percentage(&self, voltage: f32) -> f32 {
        let c = &self.config;
        if voltage >= c.full_voltage {
            100.0
        } else if voltage <= c.critical_voltage {
            0.0
        } else {
            (voltage - c.critical_voltage) / (c.full_voltage - c.critical_voltage) * 100.0
        }
    }

    /// Sample, classify and remember the state
    pub fn status(&mut self) -> NodeResult<BatteryStatus> {
        let voltage = self.averaged_voltage()?;
        let state = self.classify(voltage);

        if state != self.last_state {
            match state {
                BatteryState::Critical | BatteryState::Low => {
                    node_warn!("Battery {} at {} V", state, voltage);
                }
                _ => {
                    node_info!("Battery {} at {} V", state, voltage);
                }
            }
        }
        self.last_state = state;

        Ok(BatteryStatus { voltage, percentage: self.percentage(voltage), state })
    }

    /// Base interval scaled by the current battery state
    ///
    /// Takes a fresh sample; if the ADC fails the last known state is used.
    pub fn suggested_sleep_seconds(&mut self, base_interval_s: u32) -> u32 {
        let state = match self.status() {
            Ok(status) => status.state,
            Err(_e) => {
                node_warn!("Battery read failed ({}), keeping {}", _e, self.last_state);
                self.last_state
            }
        };
        base_interval_s.saturating_mul(state.sleep_multiplier())
    }

    /// Averaged voltage is above the critical threshold
    pub fn is_battery_ok(&mut self) -> NodeResult<bool> {
        Ok(self.averaged_voltage()? > self.config.critical_voltage)
    }

    /// Set the calibration factor from a multimeter reading
    ///
    /// Uses one unaveraged sample. Returns the new factor, or `None` when the
    /// ADC reads zero volts and no ratio can be formed.
    pub fn calibrate(&mut self, actual_voltage: f32) -> NodeResult<Option<f32>> {
        let measured = self.sample()?;
        if measured > 0.0 {
            self.config.calibration_factor = actual_voltage / measured;
            node_info!("Battery calibration factor set to {}", self.config.calibration_factor);
            Ok(Some(self.config.calibration_factor))
        } else {
            node_warn!("Battery calibration skipped: measured voltage is 0");
            Ok(None)
        }
    }

    /// Last classified state (`Normal` before the first sample)
    pub fn last_state(&self) -> BatteryState {
        self.last_state
    }

    /// Active settings
    pub fn config(&self) -> &BatteryConfig {
        &self.config
    }

    /// Drop the smoothing history
    pub fn reset_window(&mut self) {
        self.window.clear();
    }

    /// Samples currently in the window
    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// Borrow the ADC
    pub fn adc_mut(&mut self) -> &mut A {
        &mut self.adc
    }
}
