//! BME280 Register-Level Driver
//!
//! ## Lifecycle
//!
//! ```text
//!   new(bus) ──► init(clock) ──► read() ... read()
//!                    ▲                 │ repeated failures
//!                    └── soft_reset ◄──┘
//! ```
//!
//! `new` never touches the bus. `init` checks the chip identity, loads the
//! factory calibration and programs oversampling and standby. Reads before a
//! successful `init` fail with [`NodeError::NotInitialized`].
//!
//! ## Register Write Order
//!
//! `ctrl_hum` (0xF2) only takes effect after a subsequent write to
//! `ctrl_meas` (0xF4), so humidity oversampling is always written first.

use crate::calibration::CalibrationCoefficients;
use crate::compensation::{compensate, CompensatedReading, RawSample};
use crate::constants::sensor::*;
use crate::errors::{NodeError, NodeResult};
use crate::ports::RegisterBus;
use crate::time::Clock;

/// Per-channel oversampling setting (register encoding in the discriminant)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Oversampling {
    /// Channel disabled
    Skip = 0,
    /// ×1
    X1 = 1,
    /// ×2
    X2 = 2,
    /// ×4
    X4 = 3,
    /// ×8
    X8 = 4,
    /// ×16
    X16 = 5,
}

/// Power mode written into `ctrl_meas[1:0]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Mode {
    /// No conversions
    Sleep = 0,
    /// One conversion, then back to sleep
    Forced = 1,
    /// Continuous conversions separated by the standby time
    Normal = 3,
}

/// Measurement settings applied during `init`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorSettings {
    /// Temperature oversampling
    pub temperature: Oversampling,
    /// Pressure oversampling
    pub pressure: Oversampling,
    /// Humidity oversampling
    pub humidity: Oversampling,
    /// Power mode
    pub mode: Mode,
    /// Raw `config` register value (standby time and IIR filter)
    pub config: u8,
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            temperature: Oversampling::X2,
            pressure: Oversampling::X16,
            humidity: Oversampling::X1,
            mode: Mode::Normal,
            config: CONFIG_STANDBY_1000MS_FILTER_OFF,
        }
    }
}

impl SensorSettings {
    /// `ctrl_meas` byte: `osrs_t[7:5] | osrs_p[4:2] | mode[1:0]`
    pub fn ctrl_meas(&self) -> u8 {
        ((self.temperature as u8) << 5) | ((self.pressure as u8) << 2) | self.mode as u8
    }

    /// `ctrl_hum` byte
    pub fn ctrl_hum(&self) -> u8 {
        self.humidity as u8
    }
}

/// BME280 on a register bus
pub struct Bme280<B: RegisterBus> {
    bus: B,
    settings: SensorSettings,
    calibration: Option<CalibrationCoefficients>,
}

impl<B: RegisterBus> Bme280<B> {
    /// Wrap a bus with default settings; does not touch the device
    pub fn new(bus: B) -> Self {
        Self::with_settings(bus, SensorSettings::default())
    }

    /// Wrap a bus with explicit settings
    pub fn with_settings(bus: B, settings: SensorSettings) -> Self {
        Self { bus, settings, calibration: None }
    }

    /// Check the chip id, load calibration and configure the device
    pub fn init<C: Clock>(&mut self, clock: &mut C) -> NodeResult<()> {
        self.calibration = None;

        let mut id = [0u8; 1];
        self.read_registers(REG_CHIP_ID, &mut id)?;
        if id[0] != BME280_CHIP_ID {
            return Err(NodeError::ChipIdMismatch { found: id[0], expected: BME280_CHIP_ID });
        }

        let calibration = self.load_calibration()?;
        if calibration.is_blank() {
            node_warn!("BME280 calibration block is all zeros");
        }

        self.write_register(REG_CTRL_HUM, self.settings.ctrl_hum())?;
        self.write_register(REG_CTRL_MEAS, self.settings.ctrl_meas())?;
        self.write_register(REG_CONFIG, self.settings.config)?;
        clock.sleep_ms(CONFIGURE_SETTLE_MS);

        self.calibration = Some(calibration);
        node_info!("BME280 initialized");
        Ok(())
    }

    /// Burst-read the data block without compensating it
    pub fn read_raw(&mut self) -> NodeResult<RawSample> {
        if self.calibration.is_none() {
            return Err(NodeError::NotInitialized);
        }

        let mut data = [0u8; DATA_BURST_LEN];
        self.read_registers(REG_DATA, &mut data)?;
        Ok(RawSample::from_burst(&data))
    }

    /// Read and compensate one sample
    pub fn read(&mut self) -> NodeResult<CompensatedReading> {
        let raw = self.read_raw()?;
        let calibration = self.calibration.as_ref().ok_or(NodeError::NotInitialized)?;
        Ok(compensate(raw, calibration))
    }

    /// Soft reset followed by a full re-initialization
    pub fn soft_reset<C: Clock>(&mut self, clock: &mut C) -> NodeResult<()> {
        node_warn!("Soft-resetting BME280");
        self.calibration = None;
        self.write_register(REG_SOFT_RESET, SOFT_RESET_COMMAND)?;
        clock.sleep_ms(SOFT_RESET_SETTLE_MS);
        self.init(clock)
    }

    /// Whether calibration is loaded
    pub fn is_initialized(&self) -> bool {
        self.calibration.is_some()
    }

    /// Loaded calibration, if any
    pub fn calibration(&self) -> Option<&CalibrationCoefficients> {
        self.calibration.as_ref()
    }

    /// Active measurement settings
    pub fn settings(&self) -> &SensorSettings {
        &self.settings
    }

    /// Borrow the underlying bus
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Mutably borrow the underlying bus
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Give the bus back
    pub fn release(self) -> B {
        self.bus
    }

    fn load_calibration(&mut self) -> NodeResult<CalibrationCoefficients> {
        let mut tp = [0u8; CALIB_TP_LEN];
        self.read_registers(REG_CALIB_TP, &mut tp)?;

        let mut h1 = [0u8; 1];
        self.read_registers(REG_CALIB_H1, &mut h1)?;

        let mut h = [0u8; CALIB_H_LEN];
        self.read_registers(REG_CALIB_H2, &mut h)?;

        Ok(CalibrationCoefficients::from_registers(&tp, h1[0], &h))
    }

    fn read_registers(&mut self, register: u8, buf: &mut [u8]) -> NodeResult<()> {
        self.bus.read(register, buf).map_err(|e| NodeError::bus(register, e))
    }

    fn write_register(&mut self, register: u8, value: u8) -> NodeResult<()> {
        self.bus.write(register, value).map_err(|e| NodeError::bus(register, e))
    }
}
