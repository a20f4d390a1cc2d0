//! # Text
//!
//! Prints ASCII onto a BG tilemap using a 96-tile font (space through DEL).
//! Each character becomes one tilemap word:
//!
//! ```text
//! vhopppcc cccccccc
//! ││││  └┴──────────┴─ tile (font_tile + char - 32)
//! ││└┴──────────────── palette
//! │└─────────────────── priority
//! └──────────────────── flips (unused)
//! ```
//!
//! Writes go straight to VRAM, so print during vblank or forced blank.
//! [`Text::writer`] adapts the printer to [`core::fmt::Write`]:
//!
//! ```ignore
//! use core::fmt::Write;
//! let mut text = Text::new(TextConfig::default());
//! text.load_font(&mut bus, 0x0000, &FONT);
//! text.set_pos(2, 2);
//! write!(text.writer(&mut bus), "SCORE {:5}", score).ok();
//! ```

use core::fmt;

use crate::{regs, RegisterFile};

/// Characters in a font: ASCII 32..=127.
pub const FONT_CHARS: usize = 96;
/// 2bpp font size in bytes.
pub const FONT_SIZE_2BPP: usize = FONT_CHARS * 16;

const FIRST_CHAR: u8 = 32;
const LAST_CHAR: u8 = 127;
const MAP_ROWS: u8 = 32;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TextConfig {
    /// VRAM word address of the tilemap.
    pub tilemap_addr: u16,
    /// Tile number of the space character.
    pub font_tile: u16,
    pub palette: u8,
    pub priority: u8,
    /// Tilemap row length in tiles.
    pub map_width: u8,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            tilemap_addr: 0x3800,
            font_tile: 0,
            palette: 0,
            priority: 0,
            map_width: 32,
        }
    }
}

impl TextConfig {
    /// `tilemap_byte_addr` is a VRAM *byte* address, halved here.
    pub fn new(tilemap_byte_addr: u16, font_tile: u16, palette: u8) -> Self {
        Self {
            tilemap_addr: tilemap_byte_addr >> 1,
            font_tile,
            palette: palette & 0x07,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct Text {
    config: TextConfig,
    x: u8,
    y: u8,
}

impl Default for Text {
    fn default() -> Self {
        Self::new(TextConfig::default())
    }
}

impl Text {
    pub fn new(config: TextConfig) -> Self {
        Self { config, x: 0, y: 0 }
    }

    pub fn config(&self) -> &TextConfig {
        &self.config
    }

    /// Replace the configuration and home the cursor.
    pub fn configure(&mut self, config: TextConfig) {
        self.config = config;
        self.x = 0;
        self.y = 0;
    }

    pub fn set_priority(&mut self, priority: u8) {
        self.config.priority = priority & 0x01;
    }

    /// Upload `font` (2bpp tiles) to VRAM word address `vram_addr`.
    pub fn load_font<R: RegisterFile>(&self, bus: &mut R, vram_addr: u16, font: &[u8]) {
        set_vram_addr(bus, vram_addr);
        for pair in font.chunks(2) {
            bus.write_byte(regs::VMDATAL, pair[0]);
            bus.write_byte(regs::VMDATAH, pair.get(1).copied().unwrap_or(0));
        }
    }

    pub fn set_pos(&mut self, x: u8, y: u8) {
        self.x = x;
        self.y = y;
    }

    pub fn x(&self) -> u8 {
        self.x
    }

    pub fn y(&self) -> u8 {
        self.y
    }

    /// Tilemap word for `c`. Anything outside the font prints as a space.
    pub fn entry(&self, c: u8) -> u16 {
        let tile = match c {
            FIRST_CHAR..=LAST_CHAR => self.config.font_tile + (c - FIRST_CHAR) as u16,
            _ => self.config.font_tile,
        };
        tile | (self.config.palette as u16) << 10 | (self.config.priority as u16) << 13
    }

    fn map_addr(&self, x: u8, y: u8) -> u16 {
        self.config
            .tilemap_addr
            .wrapping_add(y as u16 * self.config.map_width as u16)
            .wrapping_add(x as u16)
    }

    pub fn put_char<R: RegisterFile>(&mut self, bus: &mut R, c: u8) {
        match c {
            b'\n' => {
                self.x = 0;
                self.y = self.y.wrapping_add(1);
            }
            b'\r' => self.x = 0,
            _ => {
                set_vram_addr(bus, self.map_addr(self.x, self.y));
                write_entry(bus, self.entry(c));
                self.x = self.x.wrapping_add(1);
                if self.x >= self.config.map_width {
                    self.x = 0;
                    self.y = self.y.wrapping_add(1);
                }
            }
        }
    }

    pub fn print<R: RegisterFile>(&mut self, bus: &mut R, s: &str) {
        for c in s.bytes() {
            self.put_char(bus, c);
        }
    }

    pub fn print_at<R: RegisterFile>(&mut self, bus: &mut R, x: u8, y: u8, s: &str) {
        self.set_pos(x, y);
        self.print(bus, s);
    }

    pub fn print_u16<R: RegisterFile>(&mut self, bus: &mut R, value: u16) {
        let mut digits = [0u8; 5];
        let mut start = digits.len();
        let mut v = value;
        loop {
            start -= 1;
            digits[start] = b'0' + (v % 10) as u8;
            v /= 10;
            if v == 0 {
                break;
            }
        }
        for &d in &digits[start..] {
            self.put_char(bus, d);
        }
    }

    pub fn print_i16<R: RegisterFile>(&mut self, bus: &mut R, value: i16) {
        if value < 0 {
            self.put_char(bus, b'-');
        }
        self.print_u16(bus, value.unsigned_abs());
    }

    /// Upper-case hex, zero padded to `digits` (clamped to 1-4).
    pub fn print_hex<R: RegisterFile>(&mut self, bus: &mut R, value: u16, digits: u8) {
        const HEX: &[u8; 16] = b"0123456789ABCDEF";
        let digits = digits.clamp(1, 4);
        for i in (0..digits).rev() {
            self.put_char(bus, HEX[(value >> (i * 4)) as usize & 0x0F]);
        }
    }

    /// Blank the whole map (width × 32).
    pub fn clear<R: RegisterFile>(&mut self, bus: &mut R) {
        self.clear_rect(bus, 0, 0, self.config.map_width, MAP_ROWS);
    }

    pub fn clear_rect<R: RegisterFile>(&mut self, bus: &mut R, x: u8, y: u8, w: u8, h: u8) {
        self.fill_rect(bus, x, y, w, h, b' ');
    }

    /// Fill a rectangle with `c`. The cursor doesn't move.
    pub fn fill_rect<R: RegisterFile>(&mut self, bus: &mut R, x: u8, y: u8, w: u8, h: u8, c: u8) {
        let entry = self.entry(c);
        for row in 0..h {
            set_vram_addr(bus, self.map_addr(x, y.wrapping_add(row)));
            for _ in 0..w {
                write_entry(bus, entry);
            }
        }
    }

    /// ASCII frame: `+` corners, `-` horizontal and `|` vertical edges.
    /// Boxes smaller than 2×2 or reaching past the map are not drawn.
    pub fn draw_box<R: RegisterFile>(&mut self, bus: &mut R, x: u8, y: u8, w: u8, h: u8) {
        if w < 2 || h < 2 {
            return;
        }
        if x as u16 + w as u16 > self.config.map_width as u16 || y as u16 + h as u16 > MAP_ROWS as u16 {
            return;
        }
        let right = x + w - 1;
        let bottom = y + h - 1;

        for row in [y, bottom] {
            self.set_pos(x, row);
            self.put_char(bus, b'+');
            for _ in 0..w - 2 {
                self.put_char(bus, b'-');
            }
            self.put_char(bus, b'+');
        }
        for row in y + 1..bottom {
            self.set_pos(x, row);
            self.put_char(bus, b'|');
            self.set_pos(right, row);
            self.put_char(bus, b'|');
        }
    }

    /// Borrow the printer as a [`fmt::Write`] sink.
    pub fn writer<'a, R: RegisterFile>(&'a mut self, bus: &'a mut R) -> TextWriter<'a, R> {
        TextWriter { text: self, bus }
    }
}

pub struct TextWriter<'a, R> {
    text: &'a mut Text,
    bus: &'a mut R,
}

impl<R: RegisterFile> fmt::Write for TextWriter<'_, R> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.text.print(self.bus, s);
        Ok(())
    }
}

fn set_vram_addr<R: RegisterFile>(bus: &mut R, addr: u16) {
    bus.write_byte(regs::VMAIN, 0x80);
    bus.write_byte(regs::VMADDL, addr as u8);
    bus.write_byte(regs::VMADDH, (addr >> 8) as u8);
}

fn write_entry<R: RegisterFile>(bus: &mut R, entry: u16) {
    bus.write_byte(regs::VMDATAL, entry as u8);
    bus.write_byte(regs::VMDATAH, (entry >> 8) as u8);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryBus;
    use pretty_assertions::assert_eq;

    /// Tilemap words written, paired with the address they landed at.
    fn cells(bus: &MemoryBus) -> Vec<(u16, u16)> {
        let mut out = Vec::new();
        let mut addr = 0u16;
        let mut lo = 0u8;
        for &(reg, value) in bus.writes() {
            match reg {
                regs::VMADDL => addr = (addr & 0xFF00) | value as u16,
                regs::VMADDH => addr = (addr & 0x00FF) | (value as u16) << 8,
                regs::VMDATAL => lo = value,
                regs::VMDATAH => {
                    out.push((addr, u16::from_le_bytes([lo, value])));
                    addr = addr.wrapping_add(1);
                }
                _ => {}
            }
        }
        out
    }

    #[test]
    fn entries_pack_tile_palette_priority() {
        let mut text = Text::new(TextConfig { font_tile: 0x100, palette: 3, ..TextConfig::default() });
        text.set_priority(1);
        assert_eq!(text.entry(b'A'), (0x100 + 33) | 3 << 10 | 1 << 13);
        assert_eq!(text.entry(0x7F), 0x100 + 95 | 3 << 10 | 1 << 13);
        assert_eq!(text.entry(0x07), 0x100 | 3 << 10 | 1 << 13);
        assert_eq!(text.entry(0xC3), 0x100 | 3 << 10 | 1 << 13);
    }

    #[test]
    fn byte_address_config_is_halved() {
        let config = TextConfig::new(0x7000, 16, 9);
        assert_eq!(config.tilemap_addr, 0x3800);
        assert_eq!(config.palette, 1);
        assert_eq!(config.map_width, 32);
    }

    #[test]
    fn print_at_writes_consecutive_cells() {
        let mut bus = MemoryBus::new();
        let mut text = Text::default();
        text.print_at(&mut bus, 2, 1, "Hi");
        assert_eq!(bus.writes_to(regs::VMAIN), vec![0x80, 0x80]);
        assert_eq!(cells(&bus), vec![(0x3822, 40), (0x3823, 73)]);
        assert_eq!((text.x(), text.y()), (4, 1));
    }

    #[test]
    fn control_characters_and_wrapping() {
        let mut bus = MemoryBus::new();
        let mut text = Text::default();
        text.print_at(&mut bus, 5, 0, "ab\ncd\re");
        assert_eq!((text.x(), text.y()), (1, 1));
        let addrs: Vec<u16> = cells(&bus).iter().map(|c| c.0).collect();
        assert_eq!(addrs, vec![0x3805, 0x3806, 0x3820, 0x3821, 0x3820]);

        text.set_pos(31, 3);
        text.put_char(&mut bus, b'x');
        assert_eq!((text.x(), text.y()), (0, 4));
    }

    #[test]
    fn numbers() {
        let mut bus = MemoryBus::new();
        let mut text = Text::default();
        text.print_u16(&mut bus, 0);
        text.print_u16(&mut bus, 65535);
        text.print_i16(&mut bus, -32768);
        text.print_hex(&mut bus, 0xBEEF, 3);
        text.print_hex(&mut bus, 0x1234, 9);

        let printed: Vec<u8> = cells(&bus).iter().map(|c| c.1 as u8 + 32).collect();
        assert_eq!(printed, b"065535-32768EEF1234".to_vec());
    }

    #[test]
    fn fmt_writer() {
        use core::fmt::Write;
        let mut bus = MemoryBus::new();
        let mut text = Text::default();
        write!(text.writer(&mut bus), "{:03}", 7).unwrap();
        let printed: Vec<u8> = cells(&bus).iter().map(|c| c.1 as u8 + 32).collect();
        assert_eq!(printed, b"007".to_vec());
    }

    #[test]
    fn fill_rect_sets_address_per_row() {
        let mut bus = MemoryBus::new();
        let mut text = Text::default();
        text.set_pos(9, 9);
        text.fill_rect(&mut bus, 1, 2, 3, 2, b'#');
        let got = cells(&bus);
        assert_eq!(got.len(), 6);
        assert_eq!(got[0], (0x3841, 3));
        assert_eq!(got[3], (0x3861, 3));
        assert_eq!((text.x(), text.y()), (9, 9));
    }

    #[test]
    fn clear_covers_whole_map() {
        let mut bus = MemoryBus::new();
        let mut text = Text::default();
        text.clear(&mut bus);
        let got = cells(&bus);
        assert_eq!(got.len(), 32 * 32);
        assert!(got.iter().all(|c| c.1 == 0));
        assert_eq!(got.last().map(|c| c.0), Some(0x3800 + 32 * 32 - 1));
    }

    #[test]
    fn box_outline() {
        let mut bus = MemoryBus::new();
        let mut text = Text::default();
        text.draw_box(&mut bus, 0, 0, 3, 3);
        let mut got = cells(&bus);
        got.sort();
        let glyphs: Vec<(u16, u8)> = got.iter().map(|&(a, e)| (a - 0x3800, e as u8 + 32)).collect();
        assert_eq!(
            glyphs,
            vec![
                (0, b'+'), (1, b'-'), (2, b'+'),
                (32, b'|'), (34, b'|'),
                (64, b'+'), (65, b'-'), (66, b'+'),
            ]
        );

        bus.clear_log();
        text.draw_box(&mut bus, 0, 0, 1, 5);
        assert!(bus.writes().is_empty());
    }

    #[test]
    fn box_must_fit_the_map() {
        let mut bus = MemoryBus::new();
        let mut text = Text::default();
        text.draw_box(&mut bus, 0, 255, 4, 4);
        text.draw_box(&mut bus, 255, 0, 4, 4);
        text.draw_box(&mut bus, 29, 0, 4, 4);
        text.draw_box(&mut bus, 0, 0, 255, 255);
        assert!(bus.writes().is_empty());

        text.draw_box(&mut bus, 30, 30, 2, 2);
        let mut got: Vec<u16> = cells(&bus).iter().map(|&(a, _)| a - 0x3800).collect();
        got.sort();
        assert_eq!(got, vec![30 * 32 + 30, 30 * 32 + 31, 31 * 32 + 30, 31 * 32 + 31]);
    }

    #[test]
    fn font_upload_is_word_stream() {
        let mut bus = MemoryBus::new();
        let text = Text::default();
        text.load_font(&mut bus, 0x1000, &[1, 2, 3, 4, 5]);
        assert_eq!(bus.writes_to(regs::VMDATAL), vec![1, 3, 5]);
        assert_eq!(bus.writes_to(regs::VMDATAH), vec![2, 4, 0]);
        assert_eq!(bus.last_write(regs::VMADDH), Some(0x10));
    }
}
