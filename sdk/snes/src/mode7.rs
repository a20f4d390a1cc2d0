//! # Mode 7
//!
//! BG mode 7 draws one 1024×1024 layer through a 2×2 matrix, which gives
//! rotation and scaling. The matrix, center and scroll registers are all
//! write-twice.
//!
//! ```text
//! A =  cos * scale_x    B = sin * scale_x
//! C = -sin * scale_y    D = cos * scale_y
//! ```
//!
//! [`Mode7::init`] doesn't switch the BG mode; do that with
//! [`Backgrounds::set_mode`](crate::background::Backgrounds::set_mode).

use crate::{math::Fixed, regs, RegisterFile};

/// `M7SEL` screen-over behavior and flips.
pub const WRAP: u8 = 0x00;
pub const FLIP_H: u8 = 0x01;
pub const FLIP_V: u8 = 0x02;
pub const TRANSPARENT: u8 = 0x80;
pub const TILE0: u8 = 0xC0;

#[derive(Debug, Clone)]
pub struct Mode7 {
    scale_x: Fixed,
    scale_y: Fixed,
    angle: u8,
    matrix: [i16; 4],
}

impl Default for Mode7 {
    fn default() -> Self {
        Self::new()
    }
}

impl Mode7 {
    pub const fn new() -> Self {
        Self {
            scale_x: Fixed::ONE,
            scale_y: Fixed::ONE,
            angle: 0,
            matrix: [0x0100, 0, 0, 0x0100],
        }
    }

    /// Identity matrix, center (128, 128), scroll (0, 0).
    pub fn init<R: RegisterFile>(&mut self, bus: &mut R) {
        *self = Self::new();
        bus.write_byte(regs::M7SEL, WRAP);
        self.write_matrix(bus);
        self.set_center(bus, 128, 128);
        self.set_scroll(bus, 0, 0);
    }

    /// 8.8 scale factors (`0x0100` = 1.0, `0x0200` = zoomed out ×2).
    /// Takes effect on the next [`set_angle`](Self::set_angle).
    pub fn set_scale(&mut self, scale_x: Fixed, scale_y: Fixed) {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
    }

    /// Rotate to `angle` (256 = full turn) and write the matrix.
    pub fn set_angle<R: RegisterFile>(&mut self, bus: &mut R, angle: u8) {
        self.angle = angle;
        let sin = Fixed::sin(angle);
        let cos = Fixed::cos(angle);
        self.matrix = [
            cos.mul(self.scale_x).0,
            sin.mul(self.scale_x).0,
            (-sin).mul(self.scale_y).0,
            cos.mul(self.scale_y).0,
        ];
        self.write_matrix(bus);
    }

    /// Rotation in degrees (0-359).
    pub fn rotate_degrees<R: RegisterFile>(&mut self, bus: &mut R, degrees: u16) {
        let angle = ((degrees % 360) as u32 * 256 / 360) as u8;
        self.set_angle(bus, angle);
    }

    /// Scale and rotate in one call.
    pub fn transform<R: RegisterFile>(&mut self, bus: &mut R, angle: u8, scale: Fixed) {
        self.set_scale(scale, scale);
        self.set_angle(bus, angle);
    }

    /// Rotation center, 13-bit signed.
    pub fn set_center<R: RegisterFile>(&mut self, bus: &mut R, x: i16, y: i16) {
        bus.write_twice(regs::M7X, x as u16 & 0x1FFF);
        bus.write_twice(regs::M7Y, y as u16 & 0x1FFF);
    }

    /// Plane scroll, 13-bit signed. Shares registers with BG1 scroll.
    pub fn set_scroll<R: RegisterFile>(&mut self, bus: &mut R, x: i16, y: i16) {
        bus.write_twice(regs::BG1HOFS, x as u16 & 0x1FFF);
        bus.write_twice(regs::BG1VOFS, y as u16 & 0x1FFF);
    }

    pub fn angle(&self) -> u8 {
        self.angle
    }

    /// `[A, B, C, D]` as last written.
    pub fn matrix(&self) -> [i16; 4] {
        self.matrix
    }

    fn write_matrix<R: RegisterFile>(&self, bus: &mut R) {
        for (i, value) in self.matrix.iter().enumerate() {
            bus.write_twice(regs::M7A + i as u32, *value as u16);
        }
    }
}
