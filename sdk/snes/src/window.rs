//! # Windows
//!
//! Two horizontal windows, each a `[left, right]` span of pixels, mask
//! layers on the main and sub screens. A window can also gate color math.
//!
//! ## Selection registers
//!
//! `W12SEL`, `W34SEL` and `WOBJSEL` hold two targets each, one per nibble.
//! In each nibble:
//!
//! | Bit | Meaning              |
//! |-----|----------------------|
//! | 0   | Window 1 invert      |
//! | 1   | Window 1 enable      |
//! | 2   | Window 2 invert      |
//! | 3   | Window 2 enable      |
//!
//! | Register  | Low nibble | High nibble |
//! |-----------|------------|-------------|
//! | `W12SEL`  | BG1        | BG2         |
//! | `W34SEL`  | BG3        | BG4         |
//! | `WOBJSEL` | OBJ        | color math  |

use crate::{regs, scr::Layers, RegisterFile};

bitflags::bitflags! {
    /// Things a window can mask.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct WindowTargets: u8 {
        const BG1  = 0b0000_0001;
        const BG2  = 0b0000_0010;
        const BG3  = 0b0000_0100;
        const BG4  = 0b0000_1000;
        const OBJ  = 0b0001_0000;
        /// The color math window.
        const MATH = 0b0010_0000;

        const ALL_BG = Self::BG1.bits() | Self::BG2.bits() | Self::BG3.bits() | Self::BG4.bits();
        const ALL = Self::ALL_BG.bits() | Self::OBJ.bits();
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WindowId {
    One,
    Two,
}

impl WindowId {
    const fn shift(self) -> u8 {
        match self {
            WindowId::One => 0,
            WindowId::Two => 2,
        }
    }
}

/// How the two windows combine when both are enabled on a target.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum WindowLogic {
    Or = 0,
    And = 1,
    Xor = 2,
    Xnor = 3,
}

/// Register + nibble for each target, in flag order.
const SELECT: [(u32, u8); 6] = [
    (regs::W12SEL, 0),
    (regs::W12SEL, 4),
    (regs::W34SEL, 0),
    (regs::W34SEL, 4),
    (regs::WOBJSEL, 0),
    (regs::WOBJSEL, 4),
];

#[derive(Debug, Default, Clone)]
pub struct Window {
    w12sel: u8,
    w34sel: u8,
    wobjsel: u8,
    wbglog: u8,
    wobjlog: u8,
    tmw: u8,
    tsw: u8,
}

impl Window {
    pub const fn new() -> Self {
        Self {
            w12sel: 0,
            w34sel: 0,
            wobjsel: 0,
            wbglog: 0,
            wobjlog: 0,
            tmw: 0,
            tsw: 0,
        }
    }

    /// Clear every window register.
    pub fn init<R: RegisterFile>(&mut self, bus: &mut R) {
        *self = Self::new();
        for reg in [
            regs::W12SEL,
            regs::W34SEL,
            regs::WOBJSEL,
            regs::WH0,
            regs::WH1,
            regs::WH2,
            regs::WH3,
            regs::WBGLOG,
            regs::WOBJLOG,
            regs::TMW,
            regs::TSW,
        ] {
            bus.write_byte(reg, 0);
        }
    }

    /// Span is inclusive; `left > right` makes the window empty.
    pub fn set_pos<R: RegisterFile>(&mut self, bus: &mut R, window: WindowId, left: u8, right: u8) {
        let (l, r) = match window {
            WindowId::One => (regs::WH0, regs::WH1),
            WindowId::Two => (regs::WH2, regs::WH3),
        };
        bus.write_byte(l, left);
        bus.write_byte(r, right);
    }

    pub fn enable<R: RegisterFile>(&mut self, bus: &mut R, window: WindowId, targets: WindowTargets) {
        let bit: u8 = 0x02 << window.shift();
        self.update_select(targets, |sel, nibble| *sel |= bit << nibble);
        self.write_select(bus);
    }

    /// Clears both the enable and invert bits.
    pub fn disable<R: RegisterFile>(&mut self, bus: &mut R, window: WindowId, targets: WindowTargets) {
        let bits: u8 = 0x03 << window.shift();
        self.update_select(targets, |sel, nibble| *sel &= !(bits << nibble));
        self.write_select(bus);
    }

    /// Mask outside the span instead of inside.
    pub fn invert<R: RegisterFile>(&mut self, bus: &mut R, window: WindowId, targets: WindowTargets, invert: bool) {
        let bit: u8 = 0x01 << window.shift();
        self.update_select(targets, |sel, nibble| {
            *sel &= !(bit << nibble);
            if invert {
                *sel |= bit << nibble;
            }
        });
        self.write_select(bus);
    }

    /// Logic for each of `targets`.
    pub fn set_logic<R: RegisterFile>(&mut self, bus: &mut R, targets: WindowTargets, logic: WindowLogic) {
        let logic = logic as u8;
        for i in 0..SELECT.len() {
            if targets.bits() & (1 << i) == 0 {
                continue;
            }
            let (reg, shift) = if i < 4 {
                (&mut self.wbglog, i * 2)
            } else {
                (&mut self.wobjlog, (i - 4) * 2)
            };
            *reg = (*reg & !(0x03 << shift)) | logic << shift;
        }
        bus.write_byte(regs::WBGLOG, self.wbglog);
        bus.write_byte(regs::WOBJLOG, self.wobjlog);
    }

    /// Main screen layers that the windows cut out.
    pub fn set_main_mask<R: RegisterFile>(&mut self, bus: &mut R, layers: Layers) {
        self.tmw = layers.bits() & 0x1F;
        bus.write_byte(regs::TMW, self.tmw);
    }

    pub fn set_sub_mask<R: RegisterFile>(&mut self, bus: &mut R, layers: Layers) {
        self.tsw = layers.bits() & 0x1F;
        bus.write_byte(regs::TSW, self.tsw);
    }

    /// Drop every window assignment and mask. Positions and logic stay.
    pub fn disable_all<R: RegisterFile>(&mut self, bus: &mut R) {
        self.w12sel = 0;
        self.w34sel = 0;
        self.wobjsel = 0;
        self.tmw = 0;
        self.tsw = 0;
        self.write_select(bus);
        bus.write_byte(regs::TMW, 0);
        bus.write_byte(regs::TSW, 0);
    }

    /// A `width` pixel span centered on x = 128.
    pub fn centered<R: RegisterFile>(&mut self, bus: &mut R, window: WindowId, width: u8) {
        let half = width >> 1;
        let left = 128 - half;
        let right = (128 + half as u16 - 1) as u8;
        self.set_pos(bus, window, left, right);
    }

    /// Window 1 covers `0..split`, window 2 `split..=255`.
    pub fn split<R: RegisterFile>(&mut self, bus: &mut R, split: u8) {
        self.set_pos(bus, WindowId::One, 0, split.saturating_sub(1));
        self.set_pos(bus, WindowId::Two, split, 255);
    }

    /// `(W12SEL, W34SEL, WOBJSEL)` shadows.
    pub fn selects(&self) -> (u8, u8, u8) {
        (self.w12sel, self.w34sel, self.wobjsel)
    }

    /// `(WBGLOG, WOBJLOG)` shadows.
    pub fn logic(&self) -> (u8, u8) {
        (self.wbglog, self.wobjlog)
    }

    pub fn masks(&self) -> (u8, u8) {
        (self.tmw, self.tsw)
    }

    fn update_select(&mut self, targets: WindowTargets, mut f: impl FnMut(&mut u8, u8)) {
        for (i, &(reg, nibble)) in SELECT.iter().enumerate() {
            if targets.bits() & (1 << i) == 0 {
                continue;
            }
            let sel = match reg {
                regs::W12SEL => &mut self.w12sel,
                regs::W34SEL => &mut self.w34sel,
                _ => &mut self.wobjsel,
            };
            f(sel, nibble);
        }
    }

    fn write_select<R: RegisterFile>(&self, bus: &mut R) {
        bus.write_byte(regs::W12SEL, self.w12sel);
        bus.write_byte(regs::W34SEL, self.w34sel);
        bus.write_byte(regs::WOBJSEL, self.wobjsel);
    }
}
