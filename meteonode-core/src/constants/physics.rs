//! Physical Constants for Derived Weather Values
//!
//! Values used by the altitude, sea-level pressure and dew point helpers.

// ===== BAROMETRY =====

/// Standard atmospheric pressure at sea level (hPa/mbar).
///
/// Source: International Standard Atmosphere (ISA)
pub const SEA_LEVEL_PRESSURE_HPA: f64 = 1013.25;

/// Scale height term of the hypsometric approximation (m).
///
/// 44330 ≈ T₀ / L with T₀ = 288.15 K and L = 0.0065 K/m.
pub const BAROMETRIC_SCALE_M: f64 = 44330.0;

/// Exponent used when converting pressure to altitude.
///
/// 0.1903 ≈ R·L / (g·M), the inverse of [`BAROMETRIC_EXPONENT_INVERSE`].
pub const BAROMETRIC_EXPONENT: f64 = 0.1903;

/// Exponent used when reducing station pressure to sea level.
pub const BAROMETRIC_EXPONENT_INVERSE: f64 = 5.255;

// ===== PSYCHROMETRY =====

/// Magnus coefficient `a` (dimensionless).
///
/// Source: Magnus-Tetens approximation, valid 0..60 °C within ±0.4 °C
pub const MAGNUS_A: f64 = 17.27;

/// Magnus coefficient `b` (°C).
pub const MAGNUS_B: f64 = 237.7;

/// Lowest relative humidity (%) fed to the Magnus logarithm.
///
/// The sensor reports 0 % when clamped; `ln(0)` has no finite value.
pub const DEW_POINT_MIN_HUMIDITY_PCT: f64 = 0.1;

// ===== SENSOR ENVELOPE =====

/// Lowest temperature the BME280 is specified for (°C).
pub const SENSOR_TEMP_MIN_C: f64 = -40.0;

/// Highest temperature the BME280 is specified for (°C).
pub const SENSOR_TEMP_MAX_C: f64 = 85.0;

/// Lowest pressure the BME280 is specified for (hPa).
pub const SENSOR_PRESSURE_MIN_HPA: f64 = 300.0;

/// Highest pressure the BME280 is specified for (hPa).
pub const SENSOR_PRESSURE_MAX_HPA: f64 = 1100.0;
