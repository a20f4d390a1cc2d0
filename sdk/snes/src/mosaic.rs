//! # Mosaic
//!
//! Pixelates BG layers in square blocks. `MOSAIC` (`$2106`) holds the block
//! size minus one in the high nibble and the BG1-BG4 enables in the low one.
//!
//! The fades step the size by one and hand control back between steps
//! through a callback, usually a wait for vblank:
//!
//! ```ignore
//! mosaic.enable(&mut bus, Layers::BG1 | Layers::BG2);
//! mosaic.fade_out(&mut bus, 2, |bus| console.wait_for_vblank(bus));
//! ```

use crate::{regs, scr::Layers, RegisterFile};

/// Largest size value: 16×16 blocks.
pub const MOSAIC_MAX: u8 = 15;

#[derive(Debug, Default, Clone)]
pub struct Mosaic {
    size: u8,
    mask: u8,
}

impl Mosaic {
    pub const fn new() -> Self {
        Self { size: 0, mask: 0 }
    }

    pub fn init<R: RegisterFile>(&mut self, bus: &mut R) {
        *self = Self::new();
        bus.write_byte(regs::MOSAIC, 0);
    }

    /// Mosaic on `layers`; only BG1-BG4 apply.
    pub fn enable<R: RegisterFile>(&mut self, bus: &mut R, layers: Layers) {
        self.mask = layers.bits() & 0x0F;
        self.write(bus);
    }

    /// Turn every layer off. The size is remembered.
    pub fn disable<R: RegisterFile>(&mut self, bus: &mut R) {
        self.mask = 0;
        self.write(bus);
    }

    /// Block size minus one, clamped to [`MOSAIC_MAX`].
    pub fn set_size<R: RegisterFile>(&mut self, bus: &mut R, size: u8) {
        self.size = size.min(MOSAIC_MAX);
        self.write(bus);
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    /// Shrink the blocks back to single pixels, calling `wait` `frames`
    /// times after each step.
    pub fn fade_in<R, F>(&mut self, bus: &mut R, frames: u8, mut wait: F)
    where
        R: RegisterFile,
        F: FnMut(&mut R),
    {
        while self.size > 0 {
            self.size -= 1;
            self.write(bus);
            for _ in 0..frames {
                wait(bus);
            }
        }
    }

    /// Grow the blocks to the largest size, calling `wait` `frames` times
    /// after each step.
    pub fn fade_out<R, F>(&mut self, bus: &mut R, frames: u8, mut wait: F)
    where
        R: RegisterFile,
        F: FnMut(&mut R),
    {
        while self.size < MOSAIC_MAX {
            self.size += 1;
            self.write(bus);
            for _ in 0..frames {
                wait(bus);
            }
        }
    }

    fn write<R: RegisterFile>(&self, bus: &mut R) {
        bus.write_byte(regs::MOSAIC, self.size << 4 | self.mask);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryBus;
    use pretty_assertions::assert_eq;

    #[test]
    fn register_layout() {
        let mut bus = MemoryBus::new();
        let mut mosaic = Mosaic::new();
        mosaic.enable(&mut bus, Layers::BG1 | Layers::BG3 | Layers::OBJ);
        mosaic.set_size(&mut bus, 40);
        assert_eq!(mosaic.size(), 15);
        assert_eq!(bus.last_write(regs::MOSAIC), Some(0xF5));

        mosaic.disable(&mut bus);
        assert_eq!(bus.last_write(regs::MOSAIC), Some(0xF0));
    }

    #[test]
    fn fades_step_by_one() {
        let mut bus = MemoryBus::new();
        let mut mosaic = Mosaic::new();
        mosaic.enable(&mut bus, Layers::BG1);
        mosaic.set_size(&mut bus, 3);
        bus.clear_log();

        let mut waits = 0;
        mosaic.fade_in(&mut bus, 2, |_| waits += 1);
        assert_eq!(bus.writes_to(regs::MOSAIC), vec![0x21, 0x11, 0x01]);
        assert_eq!(waits, 6);
        assert_eq!(mosaic.size(), 0);

        bus.clear_log();
        mosaic.fade_out(&mut bus, 0, |_| unreachable!());
        assert_eq!(bus.writes_to(regs::MOSAIC).len(), 15);
        assert_eq!(bus.last_write(regs::MOSAIC), Some(0xF1));
    }
}
