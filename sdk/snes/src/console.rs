//! # Console
//!
//! Frame pacing, screen brightness, region detection and a small PRNG.
//!
//! The vblank NMI handler is expected to call [`Console::on_vblank`], which
//! raises the vblank flag, counts the frame and runs the registered callback.
//! [`Console::wait_for_vblank`] consumes that flag. Without an NMI handler it
//! falls back to polling `RDNMI`, so a bare main loop still paces correctly.
//!
//! ```ignore
//! let mut bus = unsafe { Mmio::new() };
//! let mut console = Console::init(&mut bus);
//! console.set_nmi_callback(Some(|c| { /* late VRAM work */ }));
//! console.screen_on(&mut bus);
//! loop {
//!     console.wait_for_vblank(&mut bus);
//!     // ...
//! }
//! ```

use crate::{
    regs,
    scr::{HvbJoy, NmiTimen, FORCE_BLANK, MAX_BRIGHTNESS},
    RegisterFile,
};

/// Seed used when the hardware counters or the caller give 0, which would
/// lock the LFSR.
pub const DEFAULT_SEED: u16 = 0xACE1;

const RDNMI_FLAG: u8 = 0x80;
const STAT78_PAL: u8 = 0x10;
const BGMODE_1: u8 = 0x01;
const CGRAM_WORDS: u16 = 256;

/// Run once per vblank, after the frame counter moves.
pub type NmiCallback = fn(&mut Console);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Region {
    Ntsc,
    Pal,
}

pub struct Console {
    vblank: bool,
    frame_count: u16,
    brightness: u8,
    blanked: bool,
    pal: bool,
    seed: u16,
    nmi_callback: Option<NmiCallback>,
}

impl core::fmt::Debug for Console {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Console")
            .field("vblank", &self.vblank)
            .field("frame_count", &self.frame_count)
            .field("brightness", &self.brightness)
            .field("blanked", &self.blanked)
            .field("pal", &self.pal)
            .field("has_callback", &self.nmi_callback.is_some())
            .finish()
    }
}

impl Console {
    /// Force blank, detect the region, seed the PRNG from the H/V counters,
    /// select BG mode 1, zero the scroll registers and CGRAM, then enable NMI
    /// and auto-joypad.
    pub fn init<R: RegisterFile>(bus: &mut R) -> Console {
        bus.write_byte(regs::INIDISP, FORCE_BLANK);

        let pal = bus.read_byte(regs::STAT78) & STAT78_PAL != 0;

        let _ = bus.read_byte(regs::SLHV);
        let seed = u16::from_le_bytes([bus.read_byte(regs::OPHCT), bus.read_byte(regs::OPVCT)]);

        bus.write_byte(regs::BGMODE, BGMODE_1);
        for reg in regs::BG1HOFS..=regs::BG4VOFS {
            bus.write_twice(reg, 0);
        }

        bus.write_byte(regs::CGADD, 0);
        for _ in 0..CGRAM_WORDS {
            bus.write_byte(regs::CGDATA, 0);
            bus.write_byte(regs::CGDATA, 0);
        }

        bus.write_byte(regs::NMITIMEN, (NmiTimen::NMI | NmiTimen::AUTO_JOYPAD).bits());

        let mut console = Console {
            vblank: false,
            frame_count: 0,
            brightness: MAX_BRIGHTNESS,
            blanked: true,
            pal,
            seed: DEFAULT_SEED,
            nmi_callback: None,
        };
        console.srand(seed);
        console
    }

    /// End forced blank at the current brightness.
    pub fn screen_on<R: RegisterFile>(&mut self, bus: &mut R) {
        self.blanked = false;
        bus.write_byte(regs::INIDISP, self.brightness);
    }

    pub fn screen_off<R: RegisterFile>(&mut self, bus: &mut R) {
        self.blanked = true;
        bus.write_byte(regs::INIDISP, FORCE_BLANK);
    }

    /// 0-15. While blanked the value is only remembered for `screen_on`.
    pub fn set_brightness<R: RegisterFile>(&mut self, bus: &mut R, brightness: u8) {
        self.brightness = brightness & MAX_BRIGHTNESS;
        if !self.blanked {
            bus.write_byte(regs::INIDISP, self.brightness);
        }
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn is_blanked(&self) -> bool {
        self.blanked
    }

    /// Vblank entry point for the NMI handler.
    pub fn on_vblank(&mut self) {
        self.vblank = true;
        self.frame_count = self.frame_count.wrapping_add(1);
        if let Some(callback) = self.nmi_callback {
            callback(self);
        }
    }

    /// Block until the next vblank and consume its flag.
    ///
    /// If the NMI handler hasn't flagged one yet, poll `RDNMI` (reading it
    /// acknowledges the NMI) and do the [`on_vblank`](Self::on_vblank) work
    /// here.
    pub fn wait_for_vblank<R: RegisterFile>(&mut self, bus: &mut R) {
        if !self.vblank {
            while bus.read_byte(regs::RDNMI) & RDNMI_FLAG == 0 {}
            self.on_vblank();
        }
        self.vblank = false;
    }

    /// Spin on the vblank flag, calling `idle` until something (normally a
    /// simulated NMI) raises it, then consume it.
    pub fn wait_for_vblank_with<F: FnMut(&mut Console)>(&mut self, mut idle: F) {
        while !self.vblank {
            idle(self);
        }
        self.vblank = false;
    }

    /// Whether the PPU is in vblank right now (`HVBJOY` bit 7).
    pub fn is_in_vblank<R: RegisterFile>(&self, bus: &mut R) -> bool {
        HvbJoy::from_bits_truncate(bus.read_byte(regs::HVBJOY)).contains(HvbJoy::VBLANK)
    }

    pub fn frame_count(&self) -> u16 {
        self.frame_count
    }

    pub fn reset_frame_count(&mut self) {
        self.frame_count = 0;
    }

    /// Region detected at init (50 Hz PAL or 60 Hz NTSC).
    pub fn is_pal(&self) -> bool {
        self.pal
    }

    pub fn region(&self) -> Region {
        if self.pal {
            Region::Pal
        } else {
            Region::Ntsc
        }
    }

    /// Next value of a 16-bit Fibonacci LFSR (taps 16, 14, 13, 11).
    pub fn rand(&mut self) -> u16 {
        let s = self.seed;
        let bit = (s ^ (s >> 2) ^ (s >> 3) ^ (s >> 5)) & 1;
        self.seed = (s >> 1) | (bit << 15);
        self.seed
    }

    pub fn srand(&mut self, seed: u16) {
        self.seed = if seed == 0 { DEFAULT_SEED } else { seed };
    }

    /// Install or clear the per-vblank callback. NMI is masked while the
    /// callback changes and any pending NMI is acknowledged.
    pub fn set_nmi_callback_on<R: RegisterFile>(&mut self, bus: &mut R, callback: Option<NmiCallback>) {
        bus.write_byte(regs::NMITIMEN, 0);
        self.nmi_callback = callback;
        let _ = bus.read_byte(regs::RDNMI);
        bus.write_byte(regs::NMITIMEN, (NmiTimen::NMI | NmiTimen::AUTO_JOYPAD).bits());
    }

    /// Install or clear the per-vblank callback without touching hardware.
    pub fn set_nmi_callback(&mut self, callback: Option<NmiCallback>) {
        self.nmi_callback = callback;
    }
}
