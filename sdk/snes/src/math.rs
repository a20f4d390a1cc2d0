//! # Fixed-Point Math
//!
//! Signed 8.8 fixed point ([`Fixed`]) and a 256-step angle ([`u8`], where 256
//! is a full turn). The 65816 has no multiply for 16-bit operands, so
//! trigonometry is a table lookup.
//!
//! ```ignore
//! let vx = Fixed::cos(angle).mul(speed);
//! let vy = Fixed::sin(angle).mul(speed);
//! ```

use core::ops::{Add, Neg, Sub};

/// Sine in 8.8 for angles 0-255 (`256` = 1.0).
pub const SINE_TABLE: [i16; 256] = [
    0, 6, 13, 19, 25, 31, 37, 44, 50, 56, 62, 68, 74, 80, 86, 92,
    97, 103, 109, 115, 120, 126, 131, 136, 142, 147, 152, 157, 162, 167, 171, 176,
    181, 185, 189, 193, 197, 201, 205, 209, 212, 216, 219, 222, 225, 228, 231, 234,
    236, 238, 241, 243, 245, 247, 248, 250, 251, 252, 253, 254, 255, 255, 256, 256,
    256, 256, 256, 255, 255, 254, 253, 252, 251, 250, 248, 247, 245, 243, 241, 238,
    236, 234, 231, 228, 225, 222, 219, 216, 212, 209, 205, 201, 197, 193, 189, 185,
    181, 176, 171, 167, 162, 157, 152, 147, 142, 136, 131, 126, 120, 115, 109, 103,
    97, 92, 86, 80, 74, 68, 62, 56, 50, 44, 37, 31, 25, 19, 13, 6,
    0, -6, -13, -19, -25, -31, -37, -44, -50, -56, -62, -68, -74, -80, -86, -92,
    -97, -103, -109, -115, -120, -126, -131, -136, -142, -147, -152, -157, -162, -167, -171, -176,
    -181, -185, -189, -193, -197, -201, -205, -209, -212, -216, -219, -222, -225, -228, -231, -234,
    -236, -238, -241, -243, -245, -247, -248, -250, -251, -252, -253, -254, -255, -255, -256, -256,
    -256, -256, -256, -255, -255, -254, -253, -252, -251, -250, -248, -247, -245, -243, -241, -238,
    -236, -234, -231, -228, -225, -222, -219, -216, -212, -209, -205, -201, -197, -193, -189, -185,
    -181, -176, -171, -167, -162, -157, -152, -147, -142, -136, -131, -126, -120, -115, -109, -103,
    -97, -92, -86, -80, -74, -68, -62, -56, -50, -44, -37, -31, -25, -19, -13, -6,
];

/// Signed 8.8 fixed-point number.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Fixed(pub i16);

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(0x0100);
    pub const HALF: Fixed = Fixed(0x0080);

    #[inline]
    pub const fn from_int(n: i16) -> Self {
        Fixed(n << 8)
    }

    /// Integer part, rounding toward negative infinity.
    #[inline]
    pub const fn to_int(self) -> i16 {
        self.0 >> 8
    }

    #[inline]
    pub const fn frac(self) -> u8 {
        self.0 as u8
    }

    #[inline]
    pub const fn sin(angle: u8) -> Self {
        Fixed(SINE_TABLE[angle as usize])
    }

    #[inline]
    pub const fn cos(angle: u8) -> Self {
        Fixed(SINE_TABLE[angle.wrapping_add(64) as usize])
    }

    #[inline]
    pub const fn mul(self, rhs: Fixed) -> Self {
        Fixed(((self.0 as i32 * rhs.0 as i32) >> 8) as i16)
    }

    /// Division by zero yields zero.
    #[inline]
    pub const fn div(self, rhs: Fixed) -> Self {
        if rhs.0 == 0 {
            return Fixed::ZERO;
        }
        Fixed((((self.0 as i32) << 8) / rhs.0 as i32) as i16)
    }

    #[inline]
    pub const fn abs(self) -> Self {
        Fixed(self.0.wrapping_abs())
    }

    #[inline]
    pub fn clamp(self, min: Fixed, max: Fixed) -> Self {
        if self < min {
            min
        } else if self > max {
            max
        } else {
            self
        }
    }

    /// `self + (to - self) * t / 256`
    #[inline]
    pub const fn lerp(self, to: Fixed, t: u8) -> Self {
        let diff = to.0.wrapping_sub(self.0) as i32;
        Fixed(self.0.wrapping_add(((diff * t as i32) >> 8) as i16))
    }
}

impl Add for Fixed {
    type Output = Fixed;
    fn add(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.wrapping_add(rhs.0))
    }
}

impl Sub for Fixed {
    type Output = Fixed;
    fn sub(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.wrapping_sub(rhs.0))
    }
}

impl Neg for Fixed {
    type Output = Fixed;
    fn neg(self) -> Fixed {
        Fixed(self.0.wrapping_neg())
    }
}

/// 16-bit multiply, truncated to 16 bits.
#[inline]
pub const fn mul16(a: u16, b: u16) -> u16 {
    a.wrapping_mul(b)
}

/// Quotient, or 0 for a zero divisor.
#[inline]
pub const fn div16(a: u16, b: u16) -> u16 {
    match b {
        0 => 0,
        _ => a / b,
    }
}

/// Remainder, or 0 for a zero divisor.
#[inline]
pub const fn mod16(a: u16, b: u16) -> u16 {
    match b {
        0 => 0,
        _ => a % b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_quadrants() {
        assert_eq!(Fixed::sin(0), Fixed(0));
        assert_eq!(Fixed::sin(64), Fixed::ONE);
        assert_eq!(Fixed::sin(128), Fixed(0));
        assert_eq!(Fixed::sin(192), Fixed(-256));
        assert_eq!(Fixed::cos(0), Fixed::ONE);
        assert_eq!(Fixed::cos(128), Fixed(-256));
    }

    #[test]
    fn sine_table_is_symmetric() {
        for i in 1..64 {
            assert_eq!(SINE_TABLE[64 + i], SINE_TABLE[64 - i], "mirror at {i}");
        }
        for i in 0..128 {
            assert_eq!(SINE_TABLE[128 + i], -SINE_TABLE[i], "negation at {i}");
        }
    }

    #[test]
    fn multiply_and_divide() {
        assert_eq!(Fixed::from_int(3).mul(Fixed::HALF), Fixed(0x0180));
        assert_eq!(Fixed::from_int(-2).mul(Fixed::from_int(3)), Fixed::from_int(-6));
        assert_eq!(Fixed::from_int(3).div(Fixed::from_int(2)), Fixed(0x0180));
        assert_eq!(Fixed::ONE.div(Fixed::ZERO), Fixed::ZERO);
    }

    #[test]
    fn lerp_and_clamp() {
        let a = Fixed::from_int(0);
        let b = Fixed::from_int(10);
        assert_eq!(a.lerp(b, 0), a);
        assert_eq!(a.lerp(b, 128), Fixed::from_int(5));
        assert_eq!(b.lerp(a, 128), Fixed::from_int(5));
        assert_eq!(Fixed::from_int(20).clamp(a, b), b);
        assert_eq!(Fixed::from_int(-1).clamp(a, b), a);
        assert_eq!(Fixed::from_int(-7).abs(), Fixed::from_int(7));
    }

    #[test]
    fn integer_helpers_are_zero_safe() {
        assert_eq!(div16(100, 7), 14);
        assert_eq!(mod16(100, 7), 2);
        assert_eq!(div16(100, 0), 0);
        assert_eq!(mod16(100, 0), 0);
        assert_eq!(mul16(300, 300), 300u16.wrapping_mul(300));
    }

    #[test]
    fn to_int_floors() {
        assert_eq!(Fixed(0x0180).to_int(), 1);
        assert_eq!(Fixed(-0x0080).to_int(), -1);
        assert_eq!(Fixed(0x0180).frac(), 0x80);
    }
}
