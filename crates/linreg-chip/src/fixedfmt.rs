//! Fixed-point format of the dot and scalar engines.
//!
//! Both engines compute in Q16.16: 16 integer bits, 16 fractional bits,
//! two's complement. The dot engine truncates each lane product back to
//! Q16.16 (`(a·b) >> 16`) before summing.
//!
//! The wide engine is *not* fixed-point aware — it multiplies raw 32-bit
//! words. Callers that feed it real-valued data scale by a decimal factor
//! and divide the result by the factor squared.

/// Fractional bits in the Q16.16 format.
pub const FRAC_BITS: u32 = 16;

/// Value of 1.0 in Q16.16.
pub const ONE: i32 = 1 << FRAC_BITS;

/// Q16.16 scale as a float, for conversions.
pub const SCALE: f64 = ONE as f64;

/// Largest representable Q16.16 value.
pub const MAX: f64 = i32::MAX as f64 / SCALE;

/// Smallest representable Q16.16 value.
pub const MIN: f64 = i32::MIN as f64 / SCALE;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_is_2_pow_16() {
        assert_eq!(ONE, 65_536);
        assert!((SCALE - 65_536.0).abs() < f64::EPSILON);
    }

    #[test]
    fn range_is_symmetric_enough() {
        assert!(MAX > 32_767.0);
        assert!(MIN < -32_768.0 + 1.0);
    }
}
