//! Raw-to-Physical Compensation for the BME280
//!
//! ## Pipeline
//!
//! The sensor reports three uncompensated ADC values. Converting them into
//! °C, hPa and %RH follows the floating-point formulas of the Bosch
//! datasheet (section 8.1), evaluated in `f64` and in the same operation
//! order so results match the vendor reference bit for bit:
//!
//! ```text
//!   raw.temperature ──► compensate_temperature ──► °C
//!                              │
//!                              └─► FineTemperature ─┬─► compensate_pressure ──► hPa
//!   raw.pressure ──────────────────────────────────┘│
//!   raw.humidity ───────────────────────────────────┴─► compensate_humidity ──► %RH
//! ```
//!
//! ## The Fine Temperature Dependency
//!
//! Pressure and humidity compensation both need `t_fine`, an integer
//! intermediate of the temperature polynomial. Instead of stashing it in a
//! mutable field that a later call reads back (and that goes stale if calls
//! are reordered), it is returned as a [`FineTemperature`] value and passed
//! explicitly. The only way to obtain one is to compensate a temperature, so
//! the ordering constraint is enforced by the type signatures.
//!
//! ## Sentinel Values
//!
//! If the first pressure term evaluates to exactly zero (e.g. `dig_P1 == 0`)
//! the division is undefined and pressure is reported as `0.0`. Callers must
//! treat a zero pressure as suspect, not as vacuum.

use crate::calibration::CalibrationCoefficients;
use crate::constants::sensor::DATA_BURST_LEN;

/// Uncompensated register values from one burst read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    /// 20-bit pressure ADC value
    pub pressure: u32,
    /// 20-bit temperature ADC value
    pub temperature: u32,
    /// 16-bit humidity ADC value
    pub humidity: u32,
}

impl RawSample {
    /// Assemble the three fields from the 0xF7..0xFE burst
    ///
    /// ```text
    /// byte: 0        1        2        3        4        5        6        7
    ///       press_msb press_lsb press_xlsb temp_msb temp_lsb temp_xlsb hum_msb hum_lsb
    /// ```
    pub fn from_burst(data: &[u8; DATA_BURST_LEN]) -> Self {
        let twenty_bit = |msb: u8, lsb: u8, xlsb: u8| {
            ((msb as u32) << 12) | ((lsb as u32) << 4) | ((xlsb as u32) >> 4)
        };

        Self {
            pressure: twenty_bit(data[0], data[1], data[2]),
            temperature: twenty_bit(data[3], data[4], data[5]),
            humidity: ((data[6] as u32) << 8) | data[7] as u32,
        }
    }

    /// Inverse of [`RawSample::from_burst`]; the low nibble of each xlsb is zero
    pub fn to_burst(&self) -> [u8; DATA_BURST_LEN] {
        [
            (self.pressure >> 12) as u8,
            (self.pressure >> 4) as u8,
            ((self.pressure << 4) & 0xF0) as u8,
            (self.temperature >> 12) as u8,
            (self.temperature >> 4) as u8,
            ((self.temperature << 4) & 0xF0) as u8,
            (self.humidity >> 8) as u8,
            self.humidity as u8,
        ]
    }
}

/// Integer intermediate of the temperature polynomial
///
/// Produced only by [`compensate_temperature`]; consumed by the pressure
/// and humidity paths of the same cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FineTemperature(i32);

impl FineTemperature {
    /// Raw `t_fine` value
    pub fn value(self) -> i32 {
        self.0
    }
}

/// Compensated output of one read cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompensatedReading {
    /// Temperature in °C
    pub temperature: f64,
    /// Pressure in hPa (`0.0` is the undefined-pressure sentinel)
    pub pressure: f64,
    /// Relative humidity in %, clamped to `[0, 100]`
    pub humidity: f64,
    fine: FineTemperature,
}

impl CompensatedReading {
    /// The `t_fine` this reading was computed with
    pub fn fine_temperature(&self) -> FineTemperature {
        self.fine
    }

    /// Whether pressure hit the division-by-zero guard
    pub fn pressure_is_undefined(&self) -> bool {
        self.pressure == 0.0
    }
}

/// Temperature in °C plus the fine temperature for the other two channels
pub fn compensate_temperature(raw_temperature: u32, calib: &CalibrationCoefficients) -> (f64, FineTemperature) {
    let adc_t = raw_temperature as f64;
    let t1 = calib.dig_t1 as f64;

    let var1 = (adc_t / 16384.0 - t1 / 1024.0) * calib.dig_t2 as f64;
    let delta = adc_t / 131072.0 - t1 / 8192.0;
    let var2 = delta * delta * calib.dig_t3 as f64;

    // truncation toward zero, as the reference int() does
    let t_fine = (var1 + var2) as i32;
    (t_fine as f64 / 5120.0, FineTemperature(t_fine))
}

/// Pressure in hPa, or `0.0` when the first term is zero
pub fn compensate_pressure(raw_pressure: u32, fine: FineTemperature, calib: &CalibrationCoefficients) -> f64 {
    let p1 = calib.dig_p1 as f64;
    let p2 = calib.dig_p2 as f64;
    let p3 = calib.dig_p3 as f64;
    let p4 = calib.dig_p4 as f64;
    let p5 = calib.dig_p5 as f64;
    let p6 = calib.dig_p6 as f64;
    let p7 = calib.dig_p7 as f64;
    let p8 = calib.dig_p8 as f64;
    let p9 = calib.dig_p9 as f64;

    let mut var1 = fine.0 as f64 / 2.0 - 64000.0;
    let mut var2 = var1 * var1 * p6 / 32768.0;
    var2 += var1 * p5 * 2.0;
    var2 = var2 / 4.0 + p4 * 65536.0;
    var1 = (p3 * var1 * var1 / 524288.0 + p2 * var1) / 524288.0;
    var1 = (1.0 + var1 / 32768.0) * p1;

    if var1 == 0.0 {
        return 0.0;
    }

    let mut pressure = 1048576.0 - raw_pressure as f64;
    pressure = ((pressure - var2 / 4096.0) * 6250.0) / var1;
    let var1 = p9 * pressure * pressure / 2147483648.0;
    let var2 = pressure * p8 / 32768.0;
    pressure += (var1 + var2 + p7) / 16.0;

    pressure / 100.0
}

/// Relative humidity in %, clamped to `[0, 100]`
pub fn compensate_humidity(raw_humidity: u32, fine: FineTemperature, calib: &CalibrationCoefficients) -> f64 {
    let h1 = calib.dig_h1 as f64;
    let h2 = calib.dig_h2 as f64;
    let h3 = calib.dig_h3 as f64;
    let h4 = calib.dig_h4 as f64;
    let h5 = calib.dig_h5 as f64;
    let h6 = calib.dig_h6 as f64;

    let x = fine.0 as f64 - 76800.0;
    let offset = h4 * 64.0 + h5 / 16384.0 * x;
    let scale = h2 / 65536.0 * (1.0 + h6 / 67108864.0 * x * (1.0 + h3 / 67108864.0 * x));
    let h = (raw_humidity as f64 - offset) * scale;
    let h = h * (1.0 - h1 * h / 524288.0);

    if h > 100.0 {
        100.0
    } else if h < 0.0 {
        0.0
    } else {
        h
    }
}

/// Full compensation of one raw sample
///
/// Pure and deterministic: the fine temperature is computed here and dropped
/// with the returned reading, never carried into the next cycle.
pub fn compensate(raw: RawSample, calib: &CalibrationCoefficients) -> CompensatedReading {
    let (temperature, fine) = compensate_temperature(raw.temperature, calib);
    let pressure = compensate_pressure(raw.pressure, fine, calib);
    let humidity = compensate_humidity(raw.humidity, fine, calib);

    CompensatedReading { temperature, pressure, humidity, fine }
}
