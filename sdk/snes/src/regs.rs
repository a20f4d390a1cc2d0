//! # Register Map
//!
//! Bus addresses of every memory-mapped register the SDK touches. Addresses
//! are 24-bit (`$BB:AAAA`); the PPU and CPU registers are mirrored into bank
//! `$00`, which is where they are listed here.
//!
//! | Range           | Unit                                  |
//! |-----------------|---------------------------------------|
//! | `$2100-$213F`   | PPU (video)                           |
//! | `$2140-$2143`   | APU I/O ports (SPC700 mailbox)        |
//! | `$4200-$421F`   | CPU: interrupts, multiply, joypads    |
//! | `$43n0-$43nA`   | DMA/HDMA channel `n` (0-7)            |
//! | `$7E:0000`      | Work RAM (128 KB, banks `$7E-$7F`)    |
//! | `$70:0000`      | Cartridge battery-backed SRAM (LoROM) |
//!
//! Several PPU registers are *write-twice*: the low byte and the high byte
//! go to the same address in sequence. Use
//! [`RegisterFile::write_twice`](crate::RegisterFile::write_twice) for those.

// PPU
pub const INIDISP: u32 = 0x2100;
pub const OBJSEL: u32 = 0x2101;
pub const OAMADDL: u32 = 0x2102;
pub const OAMADDH: u32 = 0x2103;
pub const OAMDATA: u32 = 0x2104;
pub const BGMODE: u32 = 0x2105;
pub const MOSAIC: u32 = 0x2106;
pub const BG1SC: u32 = 0x2107;
pub const BG2SC: u32 = 0x2108;
pub const BG3SC: u32 = 0x2109;
pub const BG4SC: u32 = 0x210A;
pub const BG12NBA: u32 = 0x210B;
pub const BG34NBA: u32 = 0x210C;
pub const BG1HOFS: u32 = 0x210D;
pub const BG1VOFS: u32 = 0x210E;
pub const BG2HOFS: u32 = 0x210F;
pub const BG2VOFS: u32 = 0x2110;
pub const BG3HOFS: u32 = 0x2111;
pub const BG3VOFS: u32 = 0x2112;
pub const BG4HOFS: u32 = 0x2113;
pub const BG4VOFS: u32 = 0x2114;
pub const VMAIN: u32 = 0x2115;
pub const VMADDL: u32 = 0x2116;
pub const VMADDH: u32 = 0x2117;
pub const VMDATAL: u32 = 0x2118;
pub const VMDATAH: u32 = 0x2119;
pub const M7SEL: u32 = 0x211A;
pub const M7A: u32 = 0x211B;
pub const M7B: u32 = 0x211C;
pub const M7C: u32 = 0x211D;
pub const M7D: u32 = 0x211E;
pub const M7X: u32 = 0x211F;
pub const M7Y: u32 = 0x2120;
pub const CGADD: u32 = 0x2121;
pub const CGDATA: u32 = 0x2122;
pub const W12SEL: u32 = 0x2123;
pub const W34SEL: u32 = 0x2124;
pub const WOBJSEL: u32 = 0x2125;
pub const WH0: u32 = 0x2126;
pub const WH1: u32 = 0x2127;
pub const WH2: u32 = 0x2128;
pub const WH3: u32 = 0x2129;
pub const WBGLOG: u32 = 0x212A;
pub const WOBJLOG: u32 = 0x212B;
pub const TM: u32 = 0x212C;
pub const TS: u32 = 0x212D;
pub const TMW: u32 = 0x212E;
pub const TSW: u32 = 0x212F;
pub const CGWSEL: u32 = 0x2130;
pub const CGADSUB: u32 = 0x2131;
pub const COLDATA: u32 = 0x2132;
pub const SETINI: u32 = 0x2133;
pub const SLHV: u32 = 0x2137;
pub const OPHCT: u32 = 0x213C;
pub const OPVCT: u32 = 0x213D;
pub const STAT77: u32 = 0x213E;
pub const STAT78: u32 = 0x213F;

// APU mailbox
pub const APUIO0: u32 = 0x2140;
pub const APUIO1: u32 = 0x2141;
pub const APUIO2: u32 = 0x2142;
pub const APUIO3: u32 = 0x2143;

// CPU
pub const NMITIMEN: u32 = 0x4200;
pub const WRIO: u32 = 0x4201;
pub const MDMAEN: u32 = 0x420B;
pub const HDMAEN: u32 = 0x420C;
pub const MEMSEL: u32 = 0x420D;
pub const RDNMI: u32 = 0x4210;
pub const TIMEUP: u32 = 0x4211;
pub const HVBJOY: u32 = 0x4212;
pub const JOY1L: u32 = 0x4218;
pub const JOY1H: u32 = 0x4219;

/// Low byte of the auto-read result for `pad` (0-3); the high byte follows.
#[inline]
pub const fn joy_l(pad: u8) -> u32 {
    JOY1L + 2 * pad as u32
}

// DMA channel registers, `n` in 0..8
#[inline]
pub const fn dmap(n: u8) -> u32 {
    0x4300 + ((n as u32) << 4)
}
#[inline]
pub const fn bbad(n: u8) -> u32 {
    0x4301 + ((n as u32) << 4)
}
#[inline]
pub const fn a1tl(n: u8) -> u32 {
    0x4302 + ((n as u32) << 4)
}
#[inline]
pub const fn a1th(n: u8) -> u32 {
    0x4303 + ((n as u32) << 4)
}
#[inline]
pub const fn a1b(n: u8) -> u32 {
    0x4304 + ((n as u32) << 4)
}
#[inline]
pub const fn dasl(n: u8) -> u32 {
    0x4305 + ((n as u32) << 4)
}
#[inline]
pub const fn dash(n: u8) -> u32 {
    0x4306 + ((n as u32) << 4)
}

/// Work RAM bank.
pub const WRAM_BANK: u8 = 0x7E;
pub const WRAM: u32 = 0x7E_0000;

/// Cartridge SRAM, bank `$70` on LoROM boards.
pub const SRAM: u32 = 0x70_0000;
pub const SRAM_SIZE: u32 = 0x8000;
