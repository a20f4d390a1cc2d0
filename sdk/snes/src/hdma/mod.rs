//! # HDMA
//!
//! HDMA moves a few bytes into PPU registers at the start of every
//! scanline, driven by a table in memory. It is how gradients, per-line
//! scrolling (parallax, waves) and shaped windows are done.
//!
//! ## Table Format
//!
//! A table is a sequence of entries, terminated by a `0` byte:
//!
//! | Byte       | Meaning                                                   |
//! |------------|-----------------------------------------------------------|
//! | `count`    | bits 0-6: scanlines; bit 7: repeat (write every line)     |
//! | `data...`  | 1, 2 or 4 bytes depending on the transfer mode            |
//!
//! ```ignore
//! const GRADIENT: [u8; 9] = [32, 0x20, 32, 0x40, 32, 0x60, 32, 0x80, 0];
//!
//! let table = dma::stage(&mut bus, GRADIENT_ADDR, &GRADIENT);
//! hdma.gradient(&mut bus, 6, table);
//! hdma.enable(&mut bus, 1 << 6);
//! ```
//!
//! `HDMAEN` is write-only, so [`Hdma`] keeps the enabled mask in a shadow.

mod wave;

pub use wave::{WaveEffect, DEFAULT_SPEED, MAX_AMPLITUDE, VISIBLE_LINES, WAVE_TABLE_ADDR, WAVE_TABLE_LEN};

use log::debug;

use crate::{regs, scr::DmaControl, BgLayer, RegisterFile};

pub const MODE_1REG: u8 = 0x00;
pub const MODE_2REG: u8 = 0x01;
pub const MODE_1REG_2X: u8 = 0x02;
pub const MODE_2REG_2X: u8 = 0x03;
pub const MODE_4REG: u8 = 0x04;
pub const INDIRECT: u8 = 0x40;

pub const DEST_CGADD: u8 = 0x21;
pub const DEST_CGDATA: u8 = 0x22;
pub const DEST_BG1HOFS: u8 = 0x0D;
pub const DEST_BG1VOFS: u8 = 0x0E;
pub const DEST_BG2HOFS: u8 = 0x0F;
pub const DEST_BG2VOFS: u8 = 0x10;
pub const DEST_BG3HOFS: u8 = 0x11;
pub const DEST_BG3VOFS: u8 = 0x12;
pub const DEST_WH0: u8 = 0x26;
pub const DEST_WH1: u8 = 0x27;
pub const DEST_COLDATA: u8 = 0x32;
pub const DEST_M7A: u8 = 0x1B;

/// Horizontal scroll destination for the layers HDMA scrolling supports.
pub(crate) fn hofs_dest(layer: BgLayer) -> Option<u8> {
    match layer {
        BgLayer::Bg1 => Some(DEST_BG1HOFS),
        BgLayer::Bg2 => Some(DEST_BG2HOFS),
        BgLayer::Bg3 => Some(DEST_BG3HOFS),
        BgLayer::Bg4 => None,
    }
}

/// Shadow of the HDMA enable register.
#[derive(Debug, Default)]
pub struct Hdma {
    enabled: u8,
}

impl Hdma {
    pub const fn new() -> Self {
        Self { enabled: 0 }
    }

    /// Point `channel` at `table` and set its mode and destination.
    /// Does not enable the channel. Channels above 7 are ignored.
    pub fn setup<R: RegisterFile>(&mut self, bus: &mut R, channel: u8, mode: u8, dest: u8, table: u32) {
        if channel > 7 {
            return;
        }
        debug!("hdma ch{} mode {:#04x} -> $21{:02X} table ${:06X}", channel, mode, dest, table);

        bus.write_byte(regs::dmap(channel), mode);
        bus.write_byte(regs::bbad(channel), dest);
        self.set_table(bus, channel, table);
    }

    /// Swap the table of an already configured channel.
    pub fn set_table<R: RegisterFile>(&mut self, bus: &mut R, channel: u8, table: u32) {
        if channel > 7 {
            return;
        }
        bus.write_byte(regs::a1tl(channel), table as u8);
        bus.write_byte(regs::a1th(channel), (table >> 8) as u8);
        bus.write_byte(regs::a1b(channel), (table >> 16) as u8);
    }

    pub fn enable<R: RegisterFile>(&mut self, bus: &mut R, mask: u8) {
        self.enabled |= mask;
        bus.write_byte(regs::HDMAEN, self.enabled);
    }

    pub fn disable<R: RegisterFile>(&mut self, bus: &mut R, mask: u8) {
        self.enabled &= !mask;
        bus.write_byte(regs::HDMAEN, self.enabled);
    }

    pub fn disable_all<R: RegisterFile>(&mut self, bus: &mut R) {
        self.enabled = 0;
        bus.write_byte(regs::HDMAEN, 0);
    }

    /// Mask of channels currently enabled.
    pub fn enabled(&self) -> u8 {
        self.enabled
    }

    /// Per-line horizontal scroll for `layer`. The table carries 2-byte
    /// scroll values. BG4 has no HDMA scroll helper and is ignored.
    pub fn parallax<R: RegisterFile>(&mut self, bus: &mut R, channel: u8, layer: BgLayer, table: u32) {
        if let Some(dest) = hofs_dest(layer) {
            self.setup(bus, channel, MODE_1REG_2X, dest, table);
        }
    }

    /// Per-line fixed color; the table carries one `COLDATA` byte per entry.
    pub fn gradient<R: RegisterFile>(&mut self, bus: &mut R, channel: u8, table: u32) {
        self.setup(bus, channel, MODE_1REG, DEST_COLDATA, table);
    }

    /// Per-line window 1 edges; the table carries `left, right` pairs.
    pub fn window_shape<R: RegisterFile>(&mut self, bus: &mut R, channel: u8, table: u32) {
        self.setup(bus, channel, MODE_2REG, DEST_WH0, table);
    }
}

// keep the numeric constants in sync with the DMAP flag type
const _: () = assert!(MODE_2REG == DmaControl::MODE_2REG.bits());
const _: () = assert!(MODE_1REG_2X == DmaControl::MODE_1REG_2X.bits());
const _: () = assert!(INDIRECT == DmaControl::INDIRECT.bits());
