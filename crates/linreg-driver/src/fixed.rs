//! Fixed-point conversions for the Q16.16 engines.
//!
//! The dot and scalar engines compute in Q16.16 (see
//! [`linreg_chip::fixedfmt`]); the wide engine works on raw words that
//! callers scale by a decimal factor. Conversions match the C driver the
//! gateware was brought up with: `as` casts truncate toward zero, the same
//! behavior as the original `(int32_t)(value * (1 << 16))`.

use linreg_chip::fixedfmt;

/// Convert a float to Q16.16.
///
/// Values outside the Q16.16 range saturate (Rust float-to-int casts
/// saturate rather than wrap).
#[must_use]
pub fn to_fixed(value: f64) -> i32 {
    // Truncation intended: Q16.16 drops sub-2^-16 precision
    #[allow(clippy::cast_possible_truncation)]
    {
        (value * fixedfmt::SCALE) as i32
    }
}

/// Convert a Q16.16 value back to a float.
#[must_use]
pub fn from_fixed(value: i32) -> f64 {
    f64::from(value) / fixedfmt::SCALE
}

/// Convert a wide Q16.16 accumulator (sum of many Q16.16 terms) to a float.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn from_fixed_wide(value: i64) -> f64 {
    value as f64 / fixedfmt::SCALE
}

/// Scale a float by a decimal factor for the raw-integer wide engine.
///
/// E.g. `factor = 1000` keeps three decimal places. The dot of two scaled
/// vectors carries `factor²`; see [`from_scaled_product`].
///
/// The engine has no sign handling, so operands must be non-negative;
/// negative values saturate to 0 (Rust float-to-int casts saturate).
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn to_scaled(value: f32, factor: u32) -> u32 {
    (value * factor as f32) as u32
}

/// Undo a single decimal scaling.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn from_scaled(value: u32, factor: u32) -> f32 {
    value as f32 / factor as f32
}

/// Undo the `factor²` scaling a product of two scaled operands carries.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn from_scaled_product(value: i64, factor: u32) -> f64 {
    value as f64 / (f64::from(factor) * f64::from(factor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_converts_exactly() {
        assert_eq!(to_fixed(1.0), 65_536);
        assert!((from_fixed(65_536) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn negative_values_round_trip() {
        let x = -3.25;
        assert_eq!(to_fixed(x), -212_992); // -3.25 * 65536
        assert!((from_fixed(to_fixed(x)) - x).abs() < 1e-4);
    }

    #[test]
    fn truncates_toward_zero() {
        // 0.500001 is below Q16.16 resolution past .5
        assert_eq!(to_fixed(0.500_001), 32_768);
        assert_eq!(to_fixed(-0.500_001), -32_768);
    }

    #[test]
    fn wide_accumulator_exceeds_i32() {
        // 100k terms of 1.0 overflow i32 Q16.16 but not i64
        let total: i64 = 100_000 * i64::from(to_fixed(1.0));
        assert!((from_fixed_wide(total) - 100_000.0).abs() < 1e-6);
    }

    #[test]
    fn decimal_scaling_matches_c_driver() {
        // float_to_fixed(1.5, 1000) == 1500 in the original
        assert_eq!(to_scaled(1.5, 1000), 1500);
        assert!((from_scaled(1500, 1000) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn negative_operands_saturate_to_zero() {
        // The raw engine is unsigned; a negative operand clamps instead
        // of wrapping to a huge word
        assert_eq!(to_scaled(-1.5, 1000), 0);
        assert_eq!(to_scaled(-0.001, 1000), 0);
    }

    #[test]
    fn product_unscaling() {
        // (2.0 * 1000) * (3.0 * 1000) = 6_000_000 → 6.0
        let prod = i64::from(to_scaled(2.0, 1000)) * i64::from(to_scaled(3.0, 1000));
        assert!((from_scaled_product(prod, 1000) - 6.0).abs() < 1e-9);
    }
}
