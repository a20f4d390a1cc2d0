//! Sine-wave horizontal scroll, the classic water reflection / heat shimmer.
//!
//! Every visible scanline gets its own `BGnHOFS` value:
//!
//! ```text
//! angle  = phase + line * frequency      (mod 256)
//! scroll = (sin(angle) * amplitude) >> 8
//! ```
//!
//! The table is rebuilt each frame and `phase` advances by `speed`, which
//! makes the wave roll.
//!
//! ```ignore
//! let mut wave = WaveEffect::new();
//! wave.start(&mut bus, &mut hdma, 6, BgLayer::Bg1, 4, 2);
//! loop {
//!     console.wait_for_vblank(&mut bus);
//!     wave.update(&mut bus);
//! }
//! ```

use crate::{math::SINE_TABLE, BgLayer, RegisterFile};

use super::{hofs_dest, Hdma, MODE_1REG_2X};

pub const VISIBLE_LINES: usize = 224;
/// 224 entries of `[count][lo][hi]` plus the terminator.
pub const WAVE_TABLE_LEN: usize = VISIBLE_LINES * 3 + 1;
pub const MAX_AMPLITUDE: u8 = 16;
pub const DEFAULT_SPEED: u8 = 2;
/// Where the table is staged in WRAM for the HDMA unit to read.
pub const WAVE_TABLE_ADDR: u32 = crate::regs::WRAM + 0x0600;

/// State of one running wave effect.
#[derive(Debug, Clone)]
pub struct WaveEffect {
    table: [u8; WAVE_TABLE_LEN],
    table_addr: u32,
    channel: u8,
    amplitude: u8,
    frequency: u8,
    phase: u8,
    speed: u8,
    active: bool,
}

impl Default for WaveEffect {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveEffect {
    pub const fn new() -> Self {
        Self {
            table: [0; WAVE_TABLE_LEN],
            table_addr: WAVE_TABLE_ADDR,
            channel: 0,
            amplitude: 0,
            frequency: 0,
            phase: 0,
            speed: DEFAULT_SPEED,
            active: false,
        }
    }

    /// Stage the table somewhere other than [`WAVE_TABLE_ADDR`].
    pub const fn with_table_addr(mut self, table_addr: u32) -> Self {
        self.table_addr = table_addr;
        self
    }

    /// Scroll offset for one scanline.
    pub fn scroll_at(phase: u8, line: usize, amplitude: u8, frequency: u8) -> i16 {
        let step = (line as u32).wrapping_mul(frequency as u32) as u8;
        let angle = phase.wrapping_add(step);
        ((SINE_TABLE[angle as usize] as i32 * amplitude as i32) >> 8) as i16
    }

    /// Rebuild the table for `phase` with the current amplitude and frequency.
    pub fn generate(&mut self, phase: u8) -> &[u8; WAVE_TABLE_LEN] {
        for line in 0..VISIBLE_LINES {
            let scroll = Self::scroll_at(phase, line, self.amplitude, self.frequency) as u16;
            let entry = &mut self.table[line * 3..line * 3 + 3];
            entry[0] = 1;
            entry[1] = scroll as u8;
            entry[2] = (scroll >> 8) as u8;
        }
        self.table[WAVE_TABLE_LEN - 1] = 0;
        &self.table
    }

    /// Start a wave on `layer`'s horizontal scroll using HDMA `channel`.
    ///
    /// `amplitude` is in pixels and is clamped to [`MAX_AMPLITUDE`];
    /// `frequency` is the angle step between scanlines. BG4 can't be waved
    /// and leaves the effect stopped.
    pub fn start<R: RegisterFile>(
        &mut self,
        bus: &mut R,
        hdma: &mut Hdma,
        channel: u8,
        layer: BgLayer,
        amplitude: u8,
        frequency: u8,
    ) {
        let Some(dest) = hofs_dest(layer) else {
            return;
        };
        if channel > 7 {
            return;
        }

        self.channel = channel;
        self.amplitude = amplitude.min(MAX_AMPLITUDE);
        self.frequency = frequency;
        self.phase = 0;
        self.active = true;

        self.generate(self.phase);
        bus.write_bytes(self.table_addr, &self.table);
        hdma.setup(bus, channel, MODE_1REG_2X, dest, self.table_addr);
        hdma.enable(bus, 1 << channel);
    }

    /// Write this frame's table and advance the phase. Call once per frame
    /// right after vblank.
    pub fn update<R: RegisterFile>(&mut self, bus: &mut R) {
        if !self.active {
            return;
        }
        self.generate(self.phase);
        bus.write_bytes(self.table_addr, &self.table);
        self.phase = self.phase.wrapping_add(self.speed);
    }

    pub fn stop<R: RegisterFile>(&mut self, bus: &mut R, hdma: &mut Hdma) {
        if self.active {
            hdma.disable(bus, 1 << self.channel);
            self.active = false;
        }
    }

    /// Phase step per frame (1 = slow, 4 = fast).
    pub fn set_speed(&mut self, speed: u8) {
        self.speed = speed;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn phase(&self) -> u8 {
        self.phase
    }

    pub fn table(&self) -> &[u8; WAVE_TABLE_LEN] {
        &self.table
    }
}
