//! BME280 Register Map and Configuration Codes
//!
//! Addresses and bit layouts from the Bosch BME280 datasheet (BST-BME280-DS002),
//! section 5.3 "Memory map".

// ===== BUS ADDRESSES =====

/// Primary I2C address (SDO tied to GND).
pub const I2C_ADDRESS_PRIMARY: u8 = 0x76;

/// Secondary I2C address (SDO tied to VDDIO).
pub const I2C_ADDRESS_SECONDARY: u8 = 0x77;

// ===== IDENTITY =====

/// Chip identity register.
pub const REG_CHIP_ID: u8 = 0xD0;

/// Value of [`REG_CHIP_ID`] on a BME280. A BMP280 reports 0x58 and has no
/// humidity channel.
pub const BME280_CHIP_ID: u8 = 0x60;

// ===== CALIBRATION =====

/// First temperature/pressure calibration register (dig_T1 LSB).
pub const REG_CALIB_TP: u8 = 0x88;

/// Length of the temperature/pressure calibration block (dig_T1..dig_P9).
pub const CALIB_TP_LEN: usize = 24;

/// dig_H1 register (single unsigned byte).
pub const REG_CALIB_H1: u8 = 0xA1;

/// First register of the humidity calibration block (dig_H2 LSB).
pub const REG_CALIB_H2: u8 = 0xE1;

/// Length of the humidity block at 0xE1..0xE7 (dig_H2..dig_H6).
pub const CALIB_H_LEN: usize = 7;

// ===== CONTROL =====

/// Soft reset register.
pub const REG_SOFT_RESET: u8 = 0xE0;

/// Magic value that triggers a power-on-reset sequence.
pub const SOFT_RESET_COMMAND: u8 = 0xB6;

/// Humidity oversampling register. Only takes effect after a write to
/// [`REG_CTRL_MEAS`], so it must be written first.
pub const REG_CTRL_HUM: u8 = 0xF2;

/// Temperature/pressure oversampling and mode register.
pub const REG_CTRL_MEAS: u8 = 0xF4;

/// Standby time, IIR filter and SPI 3-wire register.
pub const REG_CONFIG: u8 = 0xF5;

/// Config value used by the station: 1000 ms standby (t_sb = 101), filter off.
pub const CONFIG_STANDBY_1000MS_FILTER_OFF: u8 = 0xA0;

// ===== DATA =====

/// First data register (press_msb). The burst read starts here.
pub const REG_DATA: u8 = 0xF7;

/// Length of the pressure/temperature/humidity burst read.
pub const DATA_BURST_LEN: usize = 8;

// ===== TIMING =====

/// Settling time after writing the measurement configuration (ms).
pub const CONFIGURE_SETTLE_MS: u64 = 10;

/// Start-up time after a soft reset before NVM is readable (ms).
///
/// Datasheet gives 2 ms; the station waits longer to cover slow supplies.
pub const SOFT_RESET_SETTLE_MS: u64 = 100;
