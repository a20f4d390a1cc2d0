//! # Scores
//!
//! Decimal-friendly score counter: the low word stays below 10000 and
//! carries into the high word, so printing is two [`print_u16`] calls with
//! the low half zero padded.
//!
//! [`print_u16`]: crate::text::Text::print_u16

use core::cmp::Ordering;

const CARRY: u16 = 10_000;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Score {
    /// Units, 0-9999.
    pub lo: u16,
    /// Ten-thousands.
    pub hi: u16,
}

impl Score {
    pub const fn new() -> Self {
        Self { lo: 0, hi: 0 }
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn add(&mut self, points: u16) {
        let total = self.lo as u32 + points as u32;
        self.lo = (total % CARRY as u32) as u16;
        self.hi = self.hi.wrapping_add((total / CARRY as u32) as u16);
    }

    /// Set from a plain number.
    pub fn set(&mut self, value: u32) {
        self.lo = (value % CARRY as u32) as u16;
        self.hi = (value / CARRY as u32) as u16;
    }

    pub fn value(&self) -> u32 {
        self.hi as u32 * CARRY as u32 + self.lo as u32
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.hi.cmp(&other.hi).then(self.lo.cmp(&other.lo))
    }
}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
