//! RGB colors and the SNES BGR555 encoding.
//!
//! CGRAM words are `0BBBBBGG GGGRRRRR`: red in the low bits, blue high, five
//! bits per channel. Converting drops the low three bits of each channel.

/// Squared RGB distance under which two colors count as the same entry.
pub const MATCH_DISTANCE: u32 = 16;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(level: u8) -> Self {
        Self::new(level, level, level)
    }

    /// Squared euclidean distance.
    pub fn distance(self, other: Rgb) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }

    pub fn matches(self, other: Rgb) -> bool {
        self.distance(other) < MATCH_DISTANCE
    }

    pub fn to_bgr555(self) -> u16 {
        rgb_to_bgr555(self.r, self.g, self.b)
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

pub fn rgb_to_bgr555(r: u8, g: u8, b: u8) -> u16 {
    (r >> 3) as u16 | ((g >> 3) as u16) << 5 | ((b >> 3) as u16) << 10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bgr555_channel_order() {
        assert_eq!(rgb_to_bgr555(0xFF, 0, 0), 0x001F);
        assert_eq!(rgb_to_bgr555(0, 0xFF, 0), 0x03E0);
        assert_eq!(rgb_to_bgr555(0, 0, 0xFF), 0x7C00);
        assert_eq!(Rgb::gray(0xFF).to_bgr555(), 0x7FFF);
        // low three bits are dropped
        assert_eq!(rgb_to_bgr555(7, 7, 7), 0);
        assert_eq!(rgb_to_bgr555(8, 16, 24), 0x0C41);
    }

    #[test]
    fn near_colors_match() {
        let base = Rgb::new(100, 100, 100);
        assert!(base.matches(Rgb::new(102, 102, 102)));
        assert_eq!(base.distance(Rgb::new(104, 100, 100)), 16);
        assert!(!base.matches(Rgb::new(104, 100, 100)));
        assert!(!base.matches(Rgb::new(0, 0, 0)));
    }
}
