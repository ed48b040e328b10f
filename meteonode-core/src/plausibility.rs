//! Plausibility checks on compensated readings
//!
//! Compensation never fails; it happily turns a blank calibration or a
//! glitched burst into 0 hPa or -140 °C. The station runs every reading
//! through [`check_reading`] and treats a rejection like a bus failure.

use crate::compensation::CompensatedReading;
use crate::constants::physics::{
    SENSOR_PRESSURE_MAX_HPA, SENSOR_PRESSURE_MIN_HPA, SENSOR_TEMP_MAX_C, SENSOR_TEMP_MIN_C,
};
use crate::errors::{NodeError, NodeResult};

/// Check if a value is within the specified range (inclusive)
pub fn check_range(value: f64, min: f64, max: f64, reason: &'static str) -> NodeResult<()> {
    if value < min || value > max || value.is_nan() {
        Err(NodeError::Implausible { reason })
    } else {
        Ok(())
    }
}

/// Reject sentinel and out-of-envelope readings
pub fn check_reading(reading: &CompensatedReading) -> NodeResult<()> {
    if reading.pressure_is_undefined() {
        return Err(NodeError::Implausible { reason: "pressure undefined (zero)" });
    }

    check_range(
        reading.temperature,
        SENSOR_TEMP_MIN_C,
        SENSOR_TEMP_MAX_C,
        "temperature outside -40..85 °C",
    )?;
    check_range(
        reading.pressure,
        SENSOR_PRESSURE_MIN_HPA,
        SENSOR_PRESSURE_MAX_HPA,
        "pressure outside 300..1100 hPa",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::CalibrationCoefficients;
    use crate::compensation::{compensate, RawSample};

    fn datasheet() -> CalibrationCoefficients {
        CalibrationCoefficients {
            dig_t1: 27504,
            dig_t2: 26435,
            dig_t3: -1000,
            dig_p1: 36477,
            dig_p2: -10685,
            dig_p3: 3024,
            dig_p4: 2855,
            dig_p5: 140,
            dig_p6: -7,
            dig_p7: 15500,
            dig_p8: -14600,
            dig_p9: 6000,
            ..Default::default()
        }
    }

    const RAW: RawSample = RawSample { pressure: 415148, temperature: 519888, humidity: 30000 };

    #[test]
    fn range_is_inclusive() {
        assert!(check_range(300.0, 300.0, 1100.0, "p").is_ok());
        assert!(check_range(1100.0, 300.0, 1100.0, "p").is_ok());
        assert_eq!(
            check_range(1100.1, 300.0, 1100.0, "p"),
            Err(NodeError::Implausible { reason: "p" })
        );
        assert!(check_range(f64::NAN, 0.0, 1.0, "nan").is_err());
    }

    #[test]
    fn accepts_datasheet_reading() {
        assert!(check_reading(&compensate(RAW, &datasheet())).is_ok());
    }

    #[test]
    fn rejects_zero_pressure_sentinel() {
        let calib = CalibrationCoefficients { dig_p1: 0, ..datasheet() };
        let err = check_reading(&compensate(RAW, &calib)).unwrap_err();
        assert!(matches!(err, NodeError::Implausible { .. }));
    }

    #[test]
    fn rejects_blank_calibration() {
        assert!(check_reading(&compensate(RAW, &CalibrationCoefficients::default())).is_err());
    }
}
