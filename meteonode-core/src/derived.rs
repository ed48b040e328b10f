//! Derived Atmospheric Quantities
//!
//! Standard approximations layered on top of a compensated reading. All of
//! them go through `libm` so the same code runs on `no_std` targets without
//! an FPU runtime.
//!
//! | Quantity           | Model                                   |
//! |--------------------|-----------------------------------------|
//! | Altitude           | International barometric formula        |
//! | Sea-level pressure | Inverse barometric formula              |
//! | Dew point          | Magnus-Tetens, a = 17.27, b = 237.7 °C  |

use crate::constants::physics::{
    BAROMETRIC_EXPONENT, BAROMETRIC_EXPONENT_INVERSE, BAROMETRIC_SCALE_M,
    DEW_POINT_MIN_HUMIDITY_PCT, MAGNUS_A, MAGNUS_B, SEA_LEVEL_PRESSURE_HPA,
};

/// Altitude in metres for a station pressure and a sea-level reference
///
/// `44330 * (1 - (p / p0)^0.1903)`
pub fn altitude(pressure_hpa: f64, sea_level_hpa: f64) -> f64 {
    BAROMETRIC_SCALE_M * (1.0 - libm::pow(pressure_hpa / sea_level_hpa, BAROMETRIC_EXPONENT))
}

/// Altitude against the standard atmosphere (1013.25 hPa)
pub fn altitude_standard(pressure_hpa: f64) -> f64 {
    altitude(pressure_hpa, SEA_LEVEL_PRESSURE_HPA)
}

/// Station pressure reduced to sea level for a known elevation
///
/// `p / (1 - h / 44330)^5.255`
pub fn sea_level_pressure(pressure_hpa: f64, elevation_m: f64) -> f64 {
    pressure_hpa / libm::pow(1.0 - elevation_m / BAROMETRIC_SCALE_M, BAROMETRIC_EXPONENT_INVERSE)
}

/// Dew point in °C
///
/// Humidity is floored at [`DEW_POINT_MIN_HUMIDITY_PCT`] so a bone-dry
/// reading still yields a finite (very low) dew point.
pub fn dew_point(temperature_c: f64, humidity_pct: f64) -> f64 {
    let humidity = humidity_pct.max(DEW_POINT_MIN_HUMIDITY_PCT);
    let gamma = MAGNUS_A * temperature_c / (MAGNUS_B + temperature_c) + libm::log(humidity / 100.0);
    MAGNUS_B * gamma / (MAGNUS_A - gamma)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dew_point_at_room_conditions() {
        let dp = dew_point(25.0, 60.0);
        assert!((dp - 16.7).abs() < 0.2, "got {dp}");
    }

    #[test]
    fn dew_point_equals_temperature_when_saturated() {
        assert!((dew_point(12.5, 100.0) - 12.5).abs() < 1e-9);
    }

    #[test]
    fn dew_point_is_finite_for_dry_air() {
        let dry = dew_point(25.0, 0.0);
        assert!(dry.is_finite());
        assert!(dry < -50.0, "got {dry}");
        assert_eq!(dry, dew_point(25.0, DEW_POINT_MIN_HUMIDITY_PCT));
    }

    #[test]
    fn altitude_at_reference_is_zero() {
        assert!(altitude_standard(SEA_LEVEL_PRESSURE_HPA).abs() < 1e-9);
    }

    #[test]
    fn altitude_for_typical_pressures() {
        assert!((altitude_standard(1006.53) - 56.1).abs() < 0.5);
        assert!((altitude_standard(900.0) - 988.7).abs() < 1.0);
    }

    #[test]
    fn sea_level_reduction() {
        assert!((sea_level_pressure(1006.53, 190.0) - 1029.5).abs() < 0.5);
        assert!((sea_level_pressure(900.0, 1000.0) - 1014.6).abs() < 0.5);
        assert_eq!(sea_level_pressure(1000.0, 0.0), 1000.0);
    }

    #[test]
    fn sea_level_and_altitude_roughly_invert() {
        let station = 950.0;
        let elevation = altitude_standard(station);
        let reduced = sea_level_pressure(station, elevation);
        assert!((reduced - SEA_LEVEL_PRESSURE_HPA).abs() < 1.0);
    }
}
