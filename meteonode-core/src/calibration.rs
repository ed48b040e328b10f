//! Factory Calibration Coefficients
//!
//! ## Register Layout
//!
//! Every BME280 leaves the factory with its own trimming parameters burned
//! into NVM. They are read once after power-up (or soft reset) and never
//! change afterwards:
//!
//! ```text
//! 0x88..0x9F  dig_T1 u16, dig_T2 i16, dig_T3 i16,
//!             dig_P1 u16, dig_P2..dig_P9 i16        (little endian)
//! 0xA1        dig_H1 u8
//! 0xE1..0xE2  dig_H2 i16
//! 0xE3        dig_H3 u8
//! 0xE4..0xE6  dig_H4 / dig_H5, two signed 12-bit values sharing 0xE5:
//!               H4 = E4[7:0] << 4 | E5[3:0]
//!               H5 = E6[7:0] << 4 | E5[7:4]
//! 0xE7        dig_H6 i8
//! ```
//!
//! The 12-bit values are sign-extended on bit 11.

use crate::constants::sensor::{CALIB_H_LEN, CALIB_TP_LEN};

/// Per-device compensation coefficients
///
/// Loaded exactly once per sensor session and read-only afterwards; the
/// sensor driver replaces the whole struct after a soft reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalibrationCoefficients {
    /// Temperature reference point, unsigned (0x88)
    pub dig_t1: u16,
    /// Temperature linear term (0x8A)
    pub dig_t2: i16,
    /// Temperature quadratic term (0x8C)
    pub dig_t3: i16,

    /// Pressure scale, unsigned; zero yields the 0 hPa sentinel (0x8E)
    pub dig_p1: u16,
    /// Pressure offset, `t_fine` squared (0x90)
    pub dig_p2: i16,
    /// Pressure offset, linear (0x92)
    pub dig_p3: i16,
    /// Pressure offset, constant (0x94)
    pub dig_p4: i16,
    /// Pressure sensitivity, `t_fine` squared (0x96)
    pub dig_p5: i16,
    /// Pressure sensitivity, linear (0x98)
    pub dig_p6: i16,
    /// Pressure final offset (0x9A)
    pub dig_p7: i16,
    /// Pressure second-order term (0x9C)
    pub dig_p8: i16,
    /// Pressure second-order term, squared (0x9E)
    pub dig_p9: i16,

    /// Humidity offset, unsigned (0xA1)
    pub dig_h1: u8,
    /// Humidity scale (0xE1)
    pub dig_h2: i16,
    /// Humidity temperature term, unsigned (0xE3)
    pub dig_h3: u8,
    /// Humidity offset, 12-bit signed stored widened (0xE4/0xE5)
    pub dig_h4: i16,
    /// Humidity scale, 12-bit signed stored widened (0xE5/0xE6)
    pub dig_h5: i16,
    /// Humidity second-order term (0xE7)
    pub dig_h6: i8,
}

impl CalibrationCoefficients {
    /// Decode the three calibration blocks exactly as read from the device
    pub fn from_registers(tp: &[u8; CALIB_TP_LEN], h1: u8, h: &[u8; CALIB_H_LEN]) -> Self {
        let u16_at = |i: usize| u16::from_le_bytes([tp[i], tp[i + 1]]);
        let i16_at = |i: usize| i16::from_le_bytes([tp[i], tp[i + 1]]);

        let e4 = h[3] as u16;
        let e5 = h[4] as u16;
        let e6 = h[5] as u16;

        Self {
            dig_t1: u16_at(0),
            dig_t2: i16_at(2),
            dig_t3: i16_at(4),

            dig_p1: u16_at(6),
            dig_p2: i16_at(8),
            dig_p3: i16_at(10),
            dig_p4: i16_at(12),
            dig_p5: i16_at(14),
            dig_p6: i16_at(16),
            dig_p7: i16_at(18),
            dig_p8: i16_at(20),
            dig_p9: i16_at(22),

            dig_h1: h1,
            dig_h2: i16::from_le_bytes([h[0], h[1]]),
            dig_h3: h[2],
            dig_h4: sign_extend_12((e4 << 4) | (e5 & 0x0F)),
            dig_h5: sign_extend_12(((e5 >> 4) & 0x0F) | (e6 << 4)),
            dig_h6: h[6] as i8,
        }
    }

    /// All-zero coefficients are what an absent or erased device yields
    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }
}

/// Two's-complement sign extension of a 12-bit field
fn sign_extend_12(raw: u16) -> i16 {
    let raw = (raw & 0x0FFF) as i16;
    if raw & 0x800 != 0 {
        raw - 4096
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tp_block() -> [u8; CALIB_TP_LEN] {
        let words: [u16; 12] = [
            27504,
            26435,
            (-1000i16) as u16,
            36477,
            (-10685i16) as u16,
            3024,
            2855,
            140,
            (-7i16) as u16,
            15500,
            (-14600i16) as u16,
            6000,
        ];
        let mut out = [0u8; CALIB_TP_LEN];
        for (i, w) in words.iter().enumerate() {
            out[2 * i..2 * i + 2].copy_from_slice(&w.to_le_bytes());
        }
        out
    }

    #[test]
    fn decodes_temperature_and_pressure_words() {
        let c = CalibrationCoefficients::from_registers(&tp_block(), 75, &[0; CALIB_H_LEN]);
        assert_eq!(c.dig_t1, 27504);
        assert_eq!(c.dig_t2, 26435);
        assert_eq!(c.dig_t3, -1000);
        assert_eq!(c.dig_p1, 36477);
        assert_eq!(c.dig_p2, -10685);
        assert_eq!(c.dig_p6, -7);
        assert_eq!(c.dig_p8, -14600);
        assert_eq!(c.dig_p9, 6000);
        assert_eq!(c.dig_h1, 75);
    }

    #[test]
    fn packs_shared_nibble_humidity_values() {
        // H2 = 362, H3 = 0, H4 = 313 (0x139), H5 = 50 (0x032), H6 = 30
        let h = [0x6A, 0x01, 0x00, 0x13, 0x29, 0x03, 0x1E];
        let c = CalibrationCoefficients::from_registers(&tp_block(), 75, &h);
        assert_eq!(c.dig_h2, 362);
        assert_eq!(c.dig_h3, 0);
        assert_eq!(c.dig_h4, 313);
        assert_eq!(c.dig_h5, 50);
        assert_eq!(c.dig_h6, 30);
    }

    #[test]
    fn sign_extends_on_bit_eleven() {
        // H4 = 0xFFF -> -1, H5 = 0x800 -> -2048, H6 = 0xF6 -> -10
        let h = [0x00, 0x00, 0x00, 0xFF, 0x0F, 0x80, 0xF6];
        let c = CalibrationCoefficients::from_registers(&tp_block(), 0, &h);
        assert_eq!(c.dig_h4, -1);
        assert_eq!(c.dig_h5, -2048);
        assert_eq!(c.dig_h6, -10);
    }

    #[test]
    fn blank_detection() {
        let c = CalibrationCoefficients::from_registers(&[0; CALIB_TP_LEN], 0, &[0; CALIB_H_LEN]);
        assert!(c.is_blank());
    }
}
