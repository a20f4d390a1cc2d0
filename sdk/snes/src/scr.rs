//! # Control Register Flags
//!
//! Bitflags for the write-only control registers. The hardware can't be read
//! back, so each context struct keeps a shadow of these values.
//!
//! ## Layers (`$212C`, `$212D`, `$212E`, `$212F`, `$2131`)
//!
//! The same layer bit layout is shared by the main/sub screen enables, the
//! window mask designations, mosaic, and color math:
//!
//! | Flag       | Bit | Layer                              |
//! |------------|-----|------------------------------------|
//! | `BG1`      | 0   | Background 1                       |
//! | `BG2`      | 1   | Background 2                       |
//! | `BG3`      | 2   | Background 3                       |
//! | `BG4`      | 3   | Background 4                       |
//! | `OBJ`      | 4   | Sprites                            |
//! | `BACKDROP` | 5   | Backdrop (color math only)         |
//!
//! ## NmiTimen (`$4200`)
//!
//! | Flag          | Effect                                     |
//! |---------------|--------------------------------------------|
//! | `NMI`         | Fire NMI at the start of vblank            |
//! | `V_IRQ`       | IRQ at the scanline in `VTIME`             |
//! | `H_IRQ`       | IRQ at the dot in `HTIME`                  |
//! | `AUTO_JOYPAD` | Read the controllers automatically         |

bitflags::bitflags! {
    /// Screen layers.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct Layers: u8 {
        const BG1      = 0b0000_0001;
        const BG2      = 0b0000_0010;
        const BG3      = 0b0000_0100;
        const BG4      = 0b0000_1000;
        const OBJ      = 0b0001_0000;
        const BACKDROP = 0b0010_0000;
    }

    /// Interrupt enable at `$4200`.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct NmiTimen: u8 {
        const AUTO_JOYPAD = 0b0000_0001;
        const H_IRQ       = 0b0001_0000;
        const V_IRQ       = 0b0010_0000;
        const NMI         = 0b1000_0000;
    }

    /// PPU status at `$4212`.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct HvbJoy: u8 {
        /// Auto-joypad read still in progress.
        const JOYPAD_BUSY = 0b0000_0001;
        const HBLANK      = 0b0100_0000;
        const VBLANK      = 0b1000_0000;
    }

    /// DMA/HDMA channel parameters (`DMAPn`, `$43n0`).
    ///
    /// Bits 0-2 select the transfer pattern; the `MODE_*` constants are the
    /// values shared by general DMA and HDMA.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct DmaControl: u8 {
        /// One register, one byte per unit.
        const MODE_1REG    = 0b0000_0000;
        /// Two consecutive registers (`B`, `B+1`).
        const MODE_2REG    = 0b0000_0001;
        /// One write-twice register.
        const MODE_1REG_2X = 0b0000_0010;
        const MODE_2REG_2X = 0b0000_0011;
        const MODE_4REG    = 0b0000_0100;
        /// Source address does not move.
        const FIXED        = 0b0000_1000;
        const DECREMENT    = 0b0001_0000;
        /// HDMA only: the table holds pointers to the data.
        const INDIRECT     = 0b0100_0000;
        /// Direction: B bus to A bus.
        const B_TO_A       = 0b1000_0000;
    }

    /// Sprite attribute flip bits, stored in OAM attribute byte bits 6-7.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct ObjFlags: u8 {
        const FLIP_X = 0b0100_0000;
        const FLIP_Y = 0b1000_0000;
    }
}

/// `INIDISP` force blank bit; the low nibble is brightness.
pub const FORCE_BLANK: u8 = 0x80;
pub const MAX_BRIGHTNESS: u8 = 0x0F;
