//! # Save RAM
//!
//! Battery-backed cartridge RAM at bank `$70` (LoROM, up to 32 KB). The ROM
//! header must declare SRAM for any of this to persist.
//!
//! There is no format on top of the raw bytes. A common convention is a
//! magic byte plus an XOR [`checksum`] computed with the checksum field
//! zeroed:
//!
//! ```ignore
//! save[CHECKSUM] = 0;
//! save[CHECKSUM] = sram::checksum(&save);
//! Sram::new().save(&mut bus, &save);
//! ```

use crate::{regs, RegisterFile};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Sram {
    base: u32,
    size: u32,
}

impl Default for Sram {
    fn default() -> Self {
        Self::new()
    }
}

impl Sram {
    /// Full 32 KB at `$70:0000`.
    pub const fn new() -> Self {
        Self {
            base: regs::SRAM,
            size: regs::SRAM_SIZE,
        }
    }

    /// A cartridge with less SRAM; accesses past `size` are dropped.
    pub const fn with_size(size: u32) -> Self {
        let size = if size > regs::SRAM_SIZE { regs::SRAM_SIZE } else { size };
        Self { base: regs::SRAM, size }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn save<R: RegisterFile>(&self, bus: &mut R, data: &[u8]) {
        self.save_at(bus, 0, data);
    }

    pub fn load<R: RegisterFile>(&self, bus: &mut R, data: &mut [u8]) {
        self.load_at(bus, 0, data);
    }

    /// Write `data` starting `offset` bytes in, for multiple save slots.
    pub fn save_at<R: RegisterFile>(&self, bus: &mut R, offset: u16, data: &[u8]) {
        let len = self.span(offset, data.len());
        bus.write_bytes(self.base + offset as u32, &data[..len]);
    }

    /// Fill `data` from `offset`. Bytes past the end of SRAM are left
    /// untouched.
    pub fn load_at<R: RegisterFile>(&self, bus: &mut R, offset: u16, data: &mut [u8]) {
        let len = self.span(offset, data.len());
        for (i, byte) in data[..len].iter_mut().enumerate() {
            *byte = bus.read_byte(self.base + offset as u32 + i as u32);
        }
    }

    /// Zero the first `size` bytes.
    pub fn clear<R: RegisterFile>(&self, bus: &mut R, size: u16) {
        let len = self.span(0, size as usize);
        for i in 0..len as u32 {
            bus.write_byte(self.base + i, 0);
        }
    }

    fn span(&self, offset: u16, len: usize) -> usize {
        let room = self.size.saturating_sub(offset as u32) as usize;
        len.min(room)
    }
}

/// XOR of every byte.
pub fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0, |acc, b| acc ^ b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryBus;
    use pretty_assertions::assert_eq;

    #[test]
    fn save_then_load_slot() {
        let mut bus = MemoryBus::new();
        let sram = Sram::new();
        sram.save_at(&mut bus, 0x200, &[0x53, 1, 2, 3]);
        assert_eq!(bus.peek_range(0x70_0200, 4), vec![0x53, 1, 2, 3]);

        let mut out = [0u8; 4];
        sram.load_at(&mut bus, 0x200, &mut out);
        assert_eq!(out, [0x53, 1, 2, 3]);
    }

    #[test]
    fn accesses_clip_at_the_end() {
        let mut bus = MemoryBus::new();
        let sram = Sram::with_size(0x800);
        sram.save_at(&mut bus, 0x7FE, &[9, 9, 9, 9]);
        assert_eq!(bus.writes().len(), 2);

        let mut out = [0xAAu8; 4];
        sram.load_at(&mut bus, 0x7FF, &mut out);
        assert_eq!(out, [9, 0xAA, 0xAA, 0xAA]);
        assert_eq!(Sram::with_size(0x10_0000).size(), 0x8000);
    }

    #[test]
    fn clear_zeroes_prefix() {
        let mut bus = MemoryBus::new();
        let sram = Sram::new();
        sram.save(&mut bus, &[7; 8]);
        sram.clear(&mut bus, 5);
        assert_eq!(bus.peek_range(regs::SRAM, 8), vec![0, 0, 0, 0, 0, 7, 7, 7]);
    }

    #[test]
    fn checksum_round_trips_through_zeroed_field() {
        let mut save = [0xA5, 0x10, 0x20, 0x00, 0x42];
        assert_eq!(checksum(&[]), 0);
        save[3] = checksum(&save);
        assert_eq!(save[3], 0xA5 ^ 0x10 ^ 0x20 ^ 0x42);
        assert_eq!(checksum(&save), 0);
    }
}
