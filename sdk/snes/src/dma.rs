//! # DMA
//!
//! General-purpose DMA copies a block from the A bus (WRAM/ROM, 24-bit
//! address) to a B-bus PPU register (`$21xx`, given as its low byte). The CPU
//! halts until the transfer is done, so these calls are synchronous.
//!
//! Only use them during vblank or forced blank; VRAM, CGRAM and OAM ignore
//! writes while the screen is drawing.
//!
//! ```ignore
//! console.wait_for_vblank(&mut bus);
//! dma::copy_to_vram(&mut bus, TILES_ADDR, 0x0000, TILES_LEN);
//! dma::copy_to_cgram(&mut bus, PALETTE_ADDR, 0, 16);
//! ```
//!
//! Data that lives in a Rust buffer first has to be placed on the bus with
//! [`stage`].

use log::debug;

use crate::{regs, scr::DmaControl, RegisterFile};

/// Channel used by the convenience copies.
pub const DEFAULT_CHANNEL: u8 = 0;

/// Scratch word used as the fixed source of [`fill_vram`].
pub const FILL_SCRATCH: u32 = regs::WRAM + 0x0520;

/// B-bus targets (low byte of the `$21xx` register).
pub const B_OAMDATA: u8 = 0x04;
pub const B_VMDATAL: u8 = 0x18;
pub const B_VMDATAH: u8 = 0x19;
pub const B_CGDATA: u8 = 0x22;

/// Copy `data` to `address` on the bus so a DMA channel can read it.
#[inline]
pub fn stage<R: RegisterFile>(bus: &mut R, address: u32, data: &[u8]) -> u32 {
    bus.write_bytes(address, data);
    address
}

/// Program `channel` and start it. Channels above 7 are ignored.
pub fn transfer<R: RegisterFile>(
    bus: &mut R,
    channel: u8,
    control: DmaControl,
    b_register: u8,
    source: u32,
    size: u16,
) {
    if channel > 7 {
        return;
    }

    debug!(
        "dma ch{} ${:06X} -> $21{:02X} ({} bytes)",
        channel, source, b_register, size
    );

    bus.write_byte(regs::dmap(channel), control.bits());
    bus.write_byte(regs::bbad(channel), b_register);
    bus.write_byte(regs::a1tl(channel), source as u8);
    bus.write_byte(regs::a1th(channel), (source >> 8) as u8);
    bus.write_byte(regs::a1b(channel), (source >> 16) as u8);
    bus.write_byte(regs::dasl(channel), size as u8);
    bus.write_byte(regs::dash(channel), (size >> 8) as u8);
    bus.write_byte(regs::MDMAEN, 1 << channel);
}

fn set_vram_address<R: RegisterFile>(bus: &mut R, word_address: u16) {
    bus.write_byte(regs::VMADDL, word_address as u8);
    bus.write_byte(regs::VMADDH, (word_address >> 8) as u8);
    // increment after the high byte, by one word
    bus.write_byte(regs::VMAIN, 0x80);
}

/// Copy `size` bytes to VRAM starting at `word_address`.
pub fn copy_to_vram<R: RegisterFile>(bus: &mut R, source: u32, word_address: u16, size: u16) {
    set_vram_address(bus, word_address);
    transfer(bus, DEFAULT_CHANNEL, DmaControl::MODE_2REG, B_VMDATAL, source, size);
}

/// Load Mode 7 data at VRAM word 0: the tilemap goes to the low bytes
/// and the 8bpp tile pixels to the high bytes of the same words.
pub fn copy_to_vram_mode7<R: RegisterFile>(bus: &mut R, tilemap: u32, tilemap_len: u16, tiles: u32, tiles_len: u16) {
    bus.write_byte(regs::VMADDL, 0);
    bus.write_byte(regs::VMADDH, 0);
    // increment after the low byte
    bus.write_byte(regs::VMAIN, 0x00);
    transfer(bus, DEFAULT_CHANNEL, DmaControl::MODE_1REG, B_VMDATAL, tilemap, tilemap_len);

    set_vram_address(bus, 0x0000);
    transfer(bus, DEFAULT_CHANNEL, DmaControl::MODE_1REG, B_VMDATAH, tiles, tiles_len);
}

/// Fill `size` bytes of VRAM with the word `value`.
pub fn fill_vram<R: RegisterFile>(bus: &mut R, value: u16, word_address: u16, size: u16) {
    bus.write_word(FILL_SCRATCH, value);
    set_vram_address(bus, word_address);
    transfer(
        bus,
        DEFAULT_CHANNEL,
        DmaControl::MODE_2REG | DmaControl::FIXED,
        B_VMDATAL,
        FILL_SCRATCH,
        size,
    );
}

/// Copy `count` BGR555 colors to CGRAM starting at color `start`.
pub fn copy_to_cgram<R: RegisterFile>(bus: &mut R, source: u32, start: u8, count: u16) {
    bus.write_byte(regs::CGADD, start);
    transfer(
        bus,
        DEFAULT_CHANNEL,
        DmaControl::MODE_1REG,
        B_CGDATA,
        source,
        count.wrapping_mul(2),
    );
}

/// Copy `size` bytes to OAM from address 0.
pub fn copy_to_oam<R: RegisterFile>(bus: &mut R, source: u32, size: u16) {
    bus.write_byte(regs::OAMADDL, 0);
    bus.write_byte(regs::OAMADDH, 0);
    transfer(bus, DEFAULT_CHANNEL, DmaControl::MODE_1REG, B_OAMDATA, source, size);
}
