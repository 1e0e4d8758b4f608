//! 26.6 fixed point numbers.
//!
//! Hinting operates in device space where coordinates are measured in
//! 64ths of a pixel. The backing store is 64 bits wide so intermediate
//! results of scaled font data never wrap.

use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Signed fixed point number with 6 bits of fraction.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct F26Dot6(i64);

impl F26Dot6 {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// One whole pixel.
    pub const ONE: Self = Self(64);

    /// Half a pixel.
    pub const HALF: Self = Self(32);

    const FRACT_BITS: u32 = 6;
    const INT_MASK: i64 = !63;

    /// Creates a value from raw 26.6 bits.
    pub const fn from_bits(bits: i64) -> Self {
        Self(bits)
    }

    /// Returns the raw 26.6 bits.
    pub const fn to_bits(self) -> i64 {
        self.0
    }

    /// Creates a value from a whole number of pixels.
    pub const fn from_i32(pixels: i32) -> Self {
        Self((pixels as i64) << Self::FRACT_BITS)
    }

    /// Returns the raw bits narrowed to 32 bits, saturating at the bounds.
    ///
    /// This is the representation used when a value is pushed onto the
    /// interpreter stack.
    pub fn to_i32_bits(self) -> i32 {
        self.0.clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }

    /// Returns the nearest representable value to the given number of
    /// pixels.
    pub fn from_f64(pixels: f64) -> Self {
        Self((pixels * 64.0).round() as i64)
    }

    /// Returns the value as a floating point number of pixels.
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 64.0
    }

    /// Returns the absolute value.
    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Returns the largest whole pixel value less than or equal to the
    /// number.
    pub fn floor(self) -> Self {
        Self(self.0 & Self::INT_MASK)
    }

    /// Returns the smallest whole pixel value greater than or equal to
    /// the number.
    pub fn ceil(self) -> Self {
        Self((self.0 + 63) & Self::INT_MASK)
    }

    /// Returns the nearest whole pixel value, rounding halves up.
    pub fn round(self) -> Self {
        Self((self.0 + 32) & Self::INT_MASK)
    }

    /// Divides while preserving scale: `self * 64 / other`.
    ///
    /// Truncates toward zero. A zero divisor saturates toward the sign of
    /// `self`, and zero divided by zero is zero. Use
    /// [`checked_div`](Self::checked_div) to detect a zero divisor.
    #[allow(clippy::should_implement_trait)]
    pub fn div(self, other: Self) -> Self {
        if other.0 == 0 {
            return match self.0.signum() {
                1 => Self(i64::MAX),
                -1 => Self(i64::MIN),
                _ => Self::ZERO,
            };
        }
        let quotient = ((self.0 as i128) << Self::FRACT_BITS) / other.0 as i128;
        Self(quotient.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }

    /// Divides while preserving scale, returning `None` when `other` is
    /// zero.
    pub fn checked_div(self, other: Self) -> Option<Self> {
        if other.0 == 0 {
            None
        } else {
            Some(self.div(other))
        }
    }

    /// Multiplies while preserving scale: `self * other / 64`, rounded to
    /// nearest.
    #[allow(clippy::should_implement_trait)]
    pub fn mul(self, other: Self) -> Self {
        let product = self.0 as i128 * other.0 as i128;
        let half = if product < 0 { -32 } else { 32 };
        Self(((product + half) / 64) as i64)
    }

    /// Computes `self * mul / div` with a wide intermediate, rounding
    /// halves away from zero. Returns `None` when `div` is zero.
    pub fn checked_mul_div(self, mul: Self, div: Self) -> Option<Self> {
        if div.0 == 0 {
            return None;
        }
        let (num, den) = (self.0 as i128 * mul.0 as i128, div.0 as i128);
        let quotient = (num.abs() + den.abs() / 2) / den.abs();
        let sign = if (num < 0) != (den < 0) { -1 } else { 1 };
        Some(Self((quotient * sign) as i64))
    }
}

impl Add for F26Dot6 {
    type Output = Self;

    #[inline(always)]
    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for F26Dot6 {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for F26Dot6 {
    type Output = Self;

    #[inline(always)]
    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl SubAssign for F26Dot6 {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for F26Dot6 {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl From<i32> for F26Dot6 {
    /// Interprets the integer as raw 26.6 bits, as stack values are.
    fn from(bits: i32) -> Self {
        Self(bits as i64)
    }
}

impl core::fmt::Debug for F26Dot6 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.to_f64())
    }
}

impl core::fmt::Display for F26Dot6 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.to_f64())
    }
}
