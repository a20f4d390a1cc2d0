//! # OpenSNES
//!
//! Hardware abstraction layer and runtime helpers for the Super Nintendo.
//!
//! Every piece of hardware state lives in a context struct you own
//! ([`sprite::Oam`], [`animation::Animator`], [`hdma::WaveEffect`], ...), and
//! every register access goes through a [`RegisterFile`]. On the console that
//! is [`Mmio`]; on a host it is [`MemoryBus`], which records writes so the
//! same code can be unit tested.
//!
//! ## Quick Start
//!
//! ```ignore
//! use opensnes::{Mmio, console::Console, scr::ObjFlags, sprite::Oam, input::{Pads, Keys}};
//!
//! let mut bus = unsafe { Mmio::new() };
//! let mut console = Console::init(&mut bus);
//! let mut oam = Oam::new();
//! let mut pads = Pads::new();
//!
//! console.screen_on(&mut bus);
//! loop {
//!     pads.update(&mut bus);
//!     if pads.held(0).contains(Keys::RIGHT) {
//!         x += 1;
//!     }
//!     oam.set(0, x, 100, 0, 0, 3, ObjFlags::empty());
//!     console.wait_for_vblank(&mut bus);
//!     oam.flush(&mut bus);
//! }
//! ```
//!
//! ## Frame Budget
//!
//! VRAM, CGRAM and OAM may only be written during vblank or forced blank.
//! Do the DMA work ([`sprite::Oam::flush`], [`dma`]) right after
//! [`console::Console::wait_for_vblank`], and game logic afterwards.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod animation;
pub mod audio;
pub mod background;
pub mod bus;
pub mod collision;
pub mod colormath;
pub mod console;
pub mod dma;
pub mod dynamic_sprite;
pub mod entity;
pub mod hdma;
pub mod input;
pub mod math;
pub mod mode7;
pub mod mosaic;
pub mod regs;
pub mod scoring;
pub mod scr;
pub mod sprite;
pub mod sram;
pub mod text;
pub mod window;

pub use bus::{Mmio, RegisterFile};

#[cfg(any(test, feature = "std"))]
pub use bus::MemoryBus;

/// Background layer selector shared by scrolling, HDMA and tile helpers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BgLayer {
    Bg1,
    Bg2,
    Bg3,
    Bg4,
}

impl BgLayer {
    pub const ALL: [BgLayer; 4] = [BgLayer::Bg1, BgLayer::Bg2, BgLayer::Bg3, BgLayer::Bg4];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            BgLayer::Bg1 => 0,
            BgLayer::Bg2 => 1,
            BgLayer::Bg3 => 2,
            BgLayer::Bg4 => 3,
        }
    }

    /// `BGnHOFS`; the matching `BGnVOFS` is the next register.
    #[inline]
    pub const fn hofs(self) -> u32 {
        regs::BG1HOFS + 2 * self.index() as u32
    }

    #[inline]
    pub const fn vofs(self) -> u32 {
        self.hofs() + 1
    }
}
