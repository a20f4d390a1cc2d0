//! # Register File
//!
//! All hardware access in the SDK goes through [`RegisterFile`]. On the
//! console [`Mmio`] turns each call into a single volatile load or store; on a
//! host [`MemoryBus`] keeps a sparse memory image and an ordered log of every
//! write, which is what the unit tests assert against.
//!
//! ```ignore
//! let mut bus = MemoryBus::new();
//! bus.write_twice(regs::BG1HOFS, 0x0123);
//! assert_eq!(bus.writes_to(regs::BG1HOFS), vec![0x23, 0x01]);
//! ```

/// Byte-wide access to the 24-bit SNES bus.
pub trait RegisterFile {
    fn read_byte(&mut self, address: u32) -> u8;
    fn write_byte(&mut self, address: u32, data: u8);

    /// Little-endian word at two consecutive addresses.
    #[inline]
    fn write_word(&mut self, address: u32, data: u16) {
        self.write_byte(address, data as u8);
        self.write_byte(address + 1, (data >> 8) as u8);
    }

    /// Low then high byte to the same write-twice register.
    #[inline]
    fn write_twice(&mut self, address: u32, data: u16) {
        self.write_byte(address, data as u8);
        self.write_byte(address, (data >> 8) as u8);
    }

    fn write_bytes(&mut self, address: u32, data: &[u8]) {
        for (i, byte) in data.iter().enumerate() {
            self.write_byte(address + i as u32, *byte);
        }
    }
}

/// Memory-mapped I/O on real hardware (or a cycle-accurate emulator).
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// # Safety
    /// Only one `Mmio` should exist, and only when running on the console,
    /// where every address handed to it is a valid bus address.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl RegisterFile for Mmio {
    #[inline(always)]
    fn read_byte(&mut self, address: u32) -> u8 {
        unsafe { core::ptr::read_volatile(address as usize as *const u8) }
    }

    #[inline(always)]
    fn write_byte(&mut self, address: u32, data: u8) {
        unsafe { core::ptr::write_volatile(address as usize as *mut u8, data) }
    }
}

#[cfg(any(test, feature = "std"))]
pub use host::MemoryBus;

#[cfg(any(test, feature = "std"))]
mod host {
    use std::collections::{BTreeMap, VecDeque};

    use super::RegisterFile;

    /// Host-side bus: sparse memory plus an ordered write log.
    ///
    /// Reads return, in priority order, a value queued with
    /// [`MemoryBus::queue_reads`], the last byte written to that address, or
    /// the value given to [`MemoryBus::preset`]. Unknown addresses read as 0.
    #[derive(Debug, Default)]
    pub struct MemoryBus {
        memory: BTreeMap<u32, u8>,
        queued: BTreeMap<u32, VecDeque<u8>>,
        log: Vec<(u32, u8)>,
    }

    impl MemoryBus {
        pub fn new() -> Self {
            Self::default()
        }

        /// Set the value read back from `address` without logging a write.
        pub fn preset(&mut self, address: u32, data: u8) {
            self.memory.insert(address, data);
        }

        /// Values returned (once each) by the next reads of `address`.
        pub fn queue_reads(&mut self, address: u32, data: &[u8]) {
            self.queued.entry(address).or_default().extend(data.iter().copied());
        }

        pub fn peek(&self, address: u32) -> u8 {
            self.memory.get(&address).copied().unwrap_or(0)
        }

        pub fn peek_range(&self, address: u32, len: usize) -> Vec<u8> {
            (0..len as u32).map(|i| self.peek(address + i)).collect()
        }

        pub fn writes(&self) -> &[(u32, u8)] {
            &self.log
        }

        /// Every byte written to `address`, oldest first.
        pub fn writes_to(&self, address: u32) -> Vec<u8> {
            self.log
                .iter()
                .filter(|(a, _)| *a == address)
                .map(|(_, d)| *d)
                .collect()
        }

        pub fn last_write(&self, address: u32) -> Option<u8> {
            self.log.iter().rev().find(|(a, _)| *a == address).map(|(_, d)| *d)
        }

        pub fn clear_log(&mut self) {
            self.log.clear();
        }
    }

    impl RegisterFile for MemoryBus {
        fn read_byte(&mut self, address: u32) -> u8 {
            if let Some(queue) = self.queued.get_mut(&address) {
                if let Some(data) = queue.pop_front() {
                    return data;
                }
            }
            self.peek(address)
        }

        fn write_byte(&mut self, address: u32, data: u8) {
            self.memory.insert(address, data);
            self.log.push((address, data));
        }
    }
}
