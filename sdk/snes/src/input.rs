//! # Input
//!
//! Auto-joypad reading for the four controller ports. The CPU latches every
//! pad during vblank when [`NmiTimen::AUTO_JOYPAD`](crate::scr::NmiTimen) is
//! set; [`Pads::update`] waits for that read to finish and then copies the
//! results.
//!
//! A port with nothing plugged in reads as `$FFFF`. That value is reported
//! by [`Pads::raw`] but treated as "no buttons" everywhere else.

use crate::{regs, scr::HvbJoy, RegisterFile};

pub const MAX_PADS: u8 = 4;

const DISCONNECTED: u16 = 0xFFFF;

bitflags::bitflags! {
    /// Button bits in `JOYnH:JOYnL`.
    ///
    /// | Bit | Button |
    /// |-----|--------|
    /// | 15  | B      |
    /// | 14  | Y      |
    /// | 13  | Select |
    /// | 12  | Start  |
    /// | 11  | Up     |
    /// | 10  | Down   |
    /// | 9   | Left   |
    /// | 8   | Right  |
    /// | 7   | A      |
    /// | 6   | X      |
    /// | 5   | L      |
    /// | 4   | R      |
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct Keys: u16 {
        const B      = 1 << 15;
        const Y      = 1 << 14;
        const SELECT = 1 << 13;
        const START  = 1 << 12;
        const UP     = 1 << 11;
        const DOWN   = 1 << 10;
        const LEFT   = 1 << 9;
        const RIGHT  = 1 << 8;
        const A      = 1 << 7;
        const X      = 1 << 6;
        const L      = 1 << 5;
        const R      = 1 << 4;

        const DPAD = Self::UP.bits() | Self::DOWN.bits() | Self::LEFT.bits() | Self::RIGHT.bits();
    }
}

/// Current and previous frame state of every port.
#[derive(Debug, Default, Clone)]
pub struct Pads {
    current: [u16; MAX_PADS as usize],
    previous: [u16; MAX_PADS as usize],
}

impl Pads {
    pub const fn new() -> Self {
        Self {
            current: [0; MAX_PADS as usize],
            previous: [0; MAX_PADS as usize],
        }
    }

    /// Latch this frame's state. Call once per frame, after vblank starts.
    pub fn update<R: RegisterFile>(&mut self, bus: &mut R) {
        while HvbJoy::from_bits_truncate(bus.read_byte(regs::HVBJOY)).contains(HvbJoy::JOYPAD_BUSY) {}

        self.previous = self.current;
        for pad in 0..MAX_PADS {
            let lo = bus.read_byte(regs::joy_l(pad));
            let hi = bus.read_byte(regs::joy_l(pad) + 1);
            self.current[pad as usize] = u16::from_le_bytes([lo, hi]);
        }
    }

    /// Buttons down this frame but not the last.
    pub fn pressed(&self, pad: u8) -> Keys {
        match self.states(pad) {
            Some((DISCONNECTED, _)) | None => Keys::empty(),
            Some((cur, prev)) => Keys::from_bits_truncate(cur & !prev),
        }
    }

    /// Buttons down last frame but not this one.
    pub fn released(&self, pad: u8) -> Keys {
        match self.states(pad) {
            Some((_, DISCONNECTED)) | None => Keys::empty(),
            Some((cur, prev)) => Keys::from_bits_truncate(prev & !cur),
        }
    }

    pub fn held(&self, pad: u8) -> Keys {
        match self.states(pad) {
            Some((DISCONNECTED, _)) | None => Keys::empty(),
            Some((cur, _)) => Keys::from_bits_truncate(cur),
        }
    }

    /// Unfiltered register value, `$FFFF` included. 0 for `pad >= 4`.
    pub fn raw(&self, pad: u8) -> u16 {
        self.current.get(pad as usize).copied().unwrap_or(0)
    }

    /// Heuristic: an absent pad reads `$FFFF` or `$0000` depending on the
    /// pull-ups, so a connected pad with nothing held also reads as absent.
    pub fn is_connected(&self, pad: u8) -> bool {
        matches!(self.current.get(pad as usize), Some(&s) if s != DISCONNECTED && s != 0)
    }

    #[inline]
    pub fn is_held(&self, pad: u8, keys: Keys) -> bool {
        self.held(pad).intersects(keys)
    }

    #[inline]
    pub fn just_pressed(&self, pad: u8, keys: Keys) -> bool {
        self.pressed(pad).intersects(keys)
    }

    #[inline]
    pub fn just_released(&self, pad: u8, keys: Keys) -> bool {
        self.released(pad).intersects(keys)
    }

    fn states(&self, pad: u8) -> Option<(u16, u16)> {
        let i = pad as usize;
        Some((*self.current.get(i)?, *self.previous.get(i)?))
    }
}
