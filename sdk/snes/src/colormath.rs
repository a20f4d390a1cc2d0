//! # Color Math
//!
//! Blends the main screen with either the sub screen or a fixed color.
//!
//! ## CGWSEL (`$2130`)
//!
//! | Bits | Meaning                                            |
//! |------|----------------------------------------------------|
//! | 5-4  | When math applies (see [`MathCondition`])          |
//! | 1    | Source: 0 = sub screen, 1 = fixed color            |
//!
//! ## CGADSUB (`$2131`)
//!
//! | Bits | Meaning                                            |
//! |------|----------------------------------------------------|
//! | 7    | 0 = add, 1 = subtract                              |
//! | 6    | Halve the result                                   |
//! | 5-0  | Layers affected ([`Layers`], backdrop included)    |
//!
//! `COLDATA` (`$2132`) sets the fixed color one channel at a time: the top
//! three bits pick red/green/blue and the low five are the intensity.

use crate::{regs, scr::Layers, RegisterFile};

pub const COLDATA_RED: u8 = 0x20;
pub const COLDATA_GREEN: u8 = 0x40;
pub const COLDATA_BLUE: u8 = 0x80;
pub const COLDATA_ALL: u8 = COLDATA_RED | COLDATA_GREEN | COLDATA_BLUE;

const CGADSUB_SUB: u8 = 0x80;
const CGADSUB_HALF: u8 = 0x40;
const CGADSUB_LAYERS: u8 = 0x3F;
const CGWSEL_FIXED: u8 = 0x02;
const CGWSEL_CONDITION: u8 = 0x30;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MathOp {
    Add,
    Sub,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MathSource {
    SubScreen,
    Fixed,
}

/// Where on screen the math is allowed, relative to the color window.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum MathCondition {
    Always = 0,
    InsideWindow = 1,
    OutsideWindow = 2,
    Never = 3,
}

#[derive(Debug, Default, Clone)]
pub struct ColorMath {
    cgwsel: u8,
    cgadsub: u8,
}

impl ColorMath {
    pub const fn new() -> Self {
        Self { cgwsel: 0, cgadsub: 0 }
    }

    /// Everything off, fixed color black.
    pub fn init<R: RegisterFile>(&mut self, bus: &mut R) {
        self.cgwsel = 0;
        self.cgadsub = 0;
        bus.write_byte(regs::CGWSEL, 0);
        bus.write_byte(regs::CGADSUB, 0);
        bus.write_byte(regs::COLDATA, 0);
    }

    /// Apply math to `layers`. The op and half bits are kept.
    pub fn enable<R: RegisterFile>(&mut self, bus: &mut R, layers: Layers) {
        self.cgadsub = (self.cgadsub & !CGADSUB_LAYERS) | (layers.bits() & CGADSUB_LAYERS);
        bus.write_byte(regs::CGADSUB, self.cgadsub);
    }

    pub fn disable<R: RegisterFile>(&mut self, bus: &mut R) {
        self.cgadsub &= !CGADSUB_LAYERS;
        bus.write_byte(regs::CGADSUB, self.cgadsub);
    }

    pub fn set_op<R: RegisterFile>(&mut self, bus: &mut R, op: MathOp) {
        if op == MathOp::Sub {
            self.cgadsub |= CGADSUB_SUB;
        } else {
            self.cgadsub &= !CGADSUB_SUB;
        }
        bus.write_byte(regs::CGADSUB, self.cgadsub);
    }

    pub fn set_half<R: RegisterFile>(&mut self, bus: &mut R, half: bool) {
        if half {
            self.cgadsub |= CGADSUB_HALF;
        } else {
            self.cgadsub &= !CGADSUB_HALF;
        }
        bus.write_byte(regs::CGADSUB, self.cgadsub);
    }

    pub fn set_source<R: RegisterFile>(&mut self, bus: &mut R, source: MathSource) {
        if source == MathSource::Fixed {
            self.cgwsel |= CGWSEL_FIXED;
        } else {
            self.cgwsel &= !CGWSEL_FIXED;
        }
        bus.write_byte(regs::CGWSEL, self.cgwsel);
    }

    pub fn set_condition<R: RegisterFile>(&mut self, bus: &mut R, condition: MathCondition) {
        self.cgwsel = (self.cgwsel & !CGWSEL_CONDITION) | (condition as u8) << 4;
        bus.write_byte(regs::CGWSEL, self.cgwsel);
    }

    /// Fixed color, 5 bits per channel.
    pub fn set_fixed_color<R: RegisterFile>(&mut self, bus: &mut R, r: u8, g: u8, b: u8) {
        self.set_channel(bus, COLDATA_RED, r);
        self.set_channel(bus, COLDATA_GREEN, g);
        self.set_channel(bus, COLDATA_BLUE, b);
    }

    /// Set the channels selected by `channels` (any of the `COLDATA_*` bits).
    pub fn set_channel<R: RegisterFile>(&mut self, bus: &mut R, channels: u8, intensity: u8) {
        bus.write_byte(regs::COLDATA, (channels & COLDATA_ALL) | (intensity & 0x1F));
    }

    /// 50% blend of `layers` with the sub screen.
    pub fn transparency50<R: RegisterFile>(&mut self, bus: &mut R, layers: Layers) {
        self.enable(bus, layers);
        self.set_op(bus, MathOp::Add);
        self.set_half(bus, true);
        self.set_source(bus, MathSource::SubScreen);
    }

    /// Darken `layers` by subtracting a fixed gray.
    pub fn shadow<R: RegisterFile>(&mut self, bus: &mut R, layers: Layers, intensity: u8) {
        self.enable(bus, layers);
        self.set_op(bus, MathOp::Sub);
        self.set_half(bus, false);
        self.set_source(bus, MathSource::Fixed);
        self.set_fixed_color(bus, intensity, intensity, intensity);
    }

    /// Add a fixed color to `layers`.
    pub fn tint<R: RegisterFile>(&mut self, bus: &mut R, layers: Layers, r: u8, g: u8, b: u8) {
        self.enable(bus, layers);
        self.set_op(bus, MathOp::Add);
        self.set_half(bus, false);
        self.set_source(bus, MathSource::Fixed);
        self.set_fixed_color(bus, r, g, b);
    }

    /// Uniform gray fixed color; pair with an add or subtract setup to fade.
    pub fn brightness<R: RegisterFile>(&mut self, bus: &mut R, level: u8) {
        self.set_fixed_color(bus, level, level, level);
    }

    pub fn cgwsel(&self) -> u8 {
        self.cgwsel
    }

    pub fn cgadsub(&self) -> u8 {
        self.cgadsub
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryBus;
    use pretty_assertions::assert_eq;

    #[test]
    fn enable_keeps_mode_bits() {
        let mut bus = MemoryBus::new();
        let mut cm = ColorMath::new();
        cm.set_op(&mut bus, MathOp::Sub);
        cm.set_half(&mut bus, true);
        cm.enable(&mut bus, Layers::BG1 | Layers::BACKDROP);
        assert_eq!(bus.last_write(regs::CGADSUB), Some(0xC0 | 0x21));

        cm.disable(&mut bus);
        assert_eq!(bus.last_write(regs::CGADSUB), Some(0xC0));
        cm.set_op(&mut bus, MathOp::Add);
        assert_eq!(cm.cgadsub(), 0x40);
    }

    #[test]
    fn source_and_condition_share_cgwsel() {
        let mut bus = MemoryBus::new();
        let mut cm = ColorMath::new();
        cm.set_source(&mut bus, MathSource::Fixed);
        cm.set_condition(&mut bus, MathCondition::OutsideWindow);
        assert_eq!(bus.last_write(regs::CGWSEL), Some(0x22));
        cm.set_condition(&mut bus, MathCondition::InsideWindow);
        cm.set_source(&mut bus, MathSource::SubScreen);
        assert_eq!(bus.last_write(regs::CGWSEL), Some(0x10));
    }

    #[test]
    fn fixed_color_is_three_writes() {
        let mut bus = MemoryBus::new();
        let mut cm = ColorMath::new();
        cm.set_fixed_color(&mut bus, 31, 0x25, 4);
        assert_eq!(bus.writes_to(regs::COLDATA), vec![0x3F, 0x45, 0x84]);
    }

    #[test]
    fn presets() {
        let mut bus = MemoryBus::new();
        let mut cm = ColorMath::new();

        cm.transparency50(&mut bus, Layers::BG2);
        assert_eq!((cm.cgadsub(), cm.cgwsel()), (0x42, 0x00));

        cm.shadow(&mut bus, Layers::BG1 | Layers::OBJ, 8);
        assert_eq!((cm.cgadsub(), cm.cgwsel()), (0x91, 0x02));

        bus.clear_log();
        cm.tint(&mut bus, Layers::BACKDROP, 1, 2, 3);
        assert_eq!((cm.cgadsub(), cm.cgwsel()), (0x20, 0x02));
        assert_eq!(bus.writes_to(regs::COLDATA), vec![0x21, 0x42, 0x83]);

        bus.clear_log();
        cm.brightness(&mut bus, 10);
        assert_eq!(bus.writes_to(regs::COLDATA), vec![0x2A, 0x4A, 0x8A]);
    }
}
