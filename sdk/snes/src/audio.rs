//! # Audio
//!
//! The S-CPU talks to the SPC700 sound CPU only through four mailbox ports,
//! `APUIO0-3`. After reset the SPC700 runs its boot ROM (the IPL), which
//! accepts uploads with a fixed handshake:
//!
//! 1. IPL signals ready with `$AA` on port 0 and `$BB` on port 1.
//! 2. Write the destination to ports 2/3, a non-zero value to port 1 and
//!    `$CC` to port 0, then wait for `$CC` to come back on port 0.
//! 3. For every byte: data on port 1, a counter starting at 0 on port 0,
//!    then wait for the counter to echo.
//! 4. Another block starts like step 2 with a kick of `counter + 2`. To
//!    finish, write the entry point to ports 2/3, 0 to port 1, and the kick
//!    to port 0; the IPL jumps there.
//!
//! Once the driver runs it speaks the same way: parameters on ports 1-3, a
//! command byte on port 0, and the driver echoes that byte when done. Bit 7
//! of the command byte alternates so two identical commands in a row are
//! still seen as new.
//!
//! Every wait gives up after [`WAIT_LIMIT`] polls with
//! [`AudioError::Timeout`].
//!
//! ## SPC RAM layout
//!
//! | Range           | Use                                 |
//! |-----------------|-------------------------------------|
//! | `$0200-$1FFF`   | Driver code ([`DRIVER_ADDR`])       |
//! | `$2000-$20FF`   | Sample directory, 64 × 4 bytes      |
//! | `$2100-$CFFF`   | BRR sample data, bump allocated     |
//! | `$D000-$FFFF`   | Echo buffer                         |
//!
//! The echo buffer takes 2 KB per step of delay, so it holds at most
//! [`ECHO_DELAY_MAX`] steps (16 ms each).

use core::fmt;

use log::warn;

use crate::{regs, RegisterFile};

pub const MAX_SAMPLES: usize = 64;
pub const MAX_VOICES: usize = 8;
/// Voice argument that lets [`Audio::play_sample_ex`] pick a voice.
pub const VOICE_AUTO: u8 = 0xFF;
pub const VOLUME_MAX: u8 = 127;
pub const PAN_LEFT: u8 = 0;
pub const PAN_CENTER: u8 = 8;
pub const PAN_RIGHT: u8 = 15;
/// Plays a sample at the rate it was recorded.
pub const PITCH_DEFAULT: u16 = 0x1000;
pub const PITCH_C3: u16 = 0x085F;
pub const PITCH_C4: u16 = 0x10BE;
pub const PITCH_C5: u16 = 0x217C;

pub const ATTACK_INSTANT: u8 = 15;
pub const ATTACK_FAST: u8 = 12;
pub const ATTACK_MEDIUM: u8 = 8;
pub const ATTACK_SLOW: u8 = 4;
pub const DECAY_NONE: u8 = 0;
pub const DECAY_SLOW: u8 = 1;
pub const DECAY_MEDIUM: u8 = 4;
pub const DECAY_FAST: u8 = 7;
pub const SUSTAIN_QUARTER: u8 = 1;
pub const SUSTAIN_HALF: u8 = 3;
pub const SUSTAIN_FULL: u8 = 7;
pub const RELEASE_SLOW: u8 = 8;
pub const RELEASE_MEDIUM: u8 = 16;
pub const RELEASE_FAST: u8 = 24;
pub const RELEASE_INSTANT: u8 = 31;

pub const ECHO_DELAY_MIN: u8 = 1;
pub const ECHO_DELAY_MAX: u8 = ((0x1_0000 - SAMPLE_RAM_END as u32) / ECHO_BYTES_PER_STEP) as u8;
const ECHO_BYTES_PER_STEP: u32 = 2048;

/// Polls per handshake step before giving up.
pub const WAIT_LIMIT: u32 = 65_536;

pub const DRIVER_ADDR: u16 = 0x0200;
pub const SAMPLE_RAM_START: u16 = 0x2100;
pub const SAMPLE_RAM_END: u16 = 0xD000;

const IPL_READY0: u8 = 0xAA;
const IPL_READY1: u8 = 0xBB;
const IPL_START: u8 = 0xCC;

// Driver commands (port 0, bit 7 reserved for the toggle)
pub const CMD_PLAY: u8 = 0x01;
pub const CMD_STOP: u8 = 0x02;
pub const CMD_STOP_ALL: u8 = 0x03;
pub const CMD_MASTER_VOLUME: u8 = 0x04;
pub const CMD_PITCH: u8 = 0x05;
pub const CMD_PAN: u8 = 0x06;
pub const CMD_VOICE_VOLUME: u8 = 0x07;
pub const CMD_ECHO: u8 = 0x08;
pub const CMD_ECHO_VOLUME: u8 = 0x09;
pub const CMD_ECHO_FIR: u8 = 0x0A;
pub const CMD_ECHO_ENABLE: u8 = 0x0B;
pub const CMD_ADSR: u8 = 0x0C;
pub const CMD_GAIN: u8 = 0x0D;
pub const CMD_STATUS: u8 = 0x0E;
pub const CMD_LOAD_ADDR: u8 = 0x10;
pub const CMD_LOAD_DATA: u8 = 0x11;
pub const CMD_SAMPLE_DIR: u8 = 0x12;

const TOGGLE: u8 = 0x80;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// Not enough free SPC RAM for the sample.
    NoMemory,
    /// Sample id ≥ 64 or voice ≥ 8.
    InvalidId,
    /// Nothing loaded in that sample slot.
    NotLoaded,
    /// The SPC700 stopped answering.
    Timeout,
}

impl AudioError {
    /// Numeric code, 1-4.
    pub const fn code(self) -> u8 {
        match self {
            AudioError::NoMemory => 1,
            AudioError::InvalidId => 2,
            AudioError::NotLoaded => 3,
            AudioError::Timeout => 4,
        }
    }
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::NoMemory => write!(f, "SPC RAM exhausted"),
            AudioError::InvalidId => write!(f, "invalid sample or voice id"),
            AudioError::NotLoaded => write!(f, "sample not loaded"),
            AudioError::Timeout => write!(f, "SPC700 did not answer"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SampleInfo {
    /// Start in SPC RAM.
    pub spc_address: u16,
    pub size: u16,
    /// Loop start, relative to `spc_address`.
    pub loop_point: u16,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct VoiceState {
    pub active: bool,
    pub sample_id: u8,
    pub volume: u8,
    pub pan: u8,
    pub pitch: u16,
}

fn wait_port<R: RegisterFile>(bus: &mut R, port: u32, value: u8) -> Result<(), AudioError> {
    for _ in 0..WAIT_LIMIT {
        if bus.read_byte(port) == value {
            return Ok(());
        }
    }
    warn!("spc700 timeout waiting for {:#04x} on ${:04X}", value, port);
    Err(AudioError::Timeout)
}

/// Next non-zero kick value after `last` was written to port 0.
fn next_kick(last: u8) -> u8 {
    match last.wrapping_add(2) {
        0 => 1,
        kick => kick,
    }
}

/// Upload `blocks` (SPC address, bytes) through the boot ROM and jump to
/// `entry`.
pub fn ipl_upload<R: RegisterFile>(bus: &mut R, blocks: &[(u16, &[u8])], entry: u16) -> Result<(), AudioError> {
    wait_port(bus, regs::APUIO0, IPL_READY0)?;
    wait_port(bus, regs::APUIO1, IPL_READY1)?;

    let mut kick = IPL_START;
    for &(addr, data) in blocks {
        let [lo, hi] = addr.to_le_bytes();
        bus.write_byte(regs::APUIO2, lo);
        bus.write_byte(regs::APUIO3, hi);
        bus.write_byte(regs::APUIO1, 1);
        bus.write_byte(regs::APUIO0, kick);
        wait_port(bus, regs::APUIO0, kick)?;

        let mut last = kick;
        for (i, &byte) in data.iter().enumerate() {
            let counter = i as u8;
            bus.write_byte(regs::APUIO1, byte);
            bus.write_byte(regs::APUIO0, counter);
            wait_port(bus, regs::APUIO0, counter)?;
            last = counter;
        }
        kick = next_kick(last);
    }

    let [lo, hi] = entry.to_le_bytes();
    bus.write_byte(regs::APUIO2, lo);
    bus.write_byte(regs::APUIO3, hi);
    bus.write_byte(regs::APUIO1, 0);
    bus.write_byte(regs::APUIO0, kick);
    wait_port(bus, regs::APUIO0, kick)
}

/// Driver state mirrored on the CPU side: sample table, voices, volume.
#[derive(Debug, Clone)]
pub struct Audio {
    ready: bool,
    toggle: bool,
    samples: [Option<SampleInfo>; MAX_SAMPLES],
    next_addr: u16,
    volume: u8,
    voices: [VoiceState; MAX_VOICES],
    next_voice: u8,
    echo_voices: u8,
}

impl Default for Audio {
    fn default() -> Self {
        Self::new()
    }
}

impl Audio {
    pub const fn new() -> Self {
        Self {
            ready: false,
            toggle: false,
            samples: [None; MAX_SAMPLES],
            next_addr: SAMPLE_RAM_START,
            volume: VOLUME_MAX,
            voices: [VoiceState {
                active: false,
                sample_id: 0,
                volume: 0,
                pan: PAN_CENTER,
                pitch: PITCH_DEFAULT,
            }; MAX_VOICES],
            next_voice: 0,
            echo_voices: 0,
        }
    }

    /// Boot `driver` at [`DRIVER_ADDR`] and forget every loaded sample.
    pub fn init<R: RegisterFile>(&mut self, bus: &mut R, driver: &[u8]) -> Result<(), AudioError> {
        *self = Self::new();
        ipl_upload(bus, &[(DRIVER_ADDR, driver)], DRIVER_ADDR)?;
        self.ready = true;
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Send one driver command and wait for the echo.
    pub fn command<R: RegisterFile>(&mut self, bus: &mut R, cmd: u8, params: [u8; 3]) -> Result<(), AudioError> {
        bus.write_byte(regs::APUIO1, params[0]);
        bus.write_byte(regs::APUIO2, params[1]);
        bus.write_byte(regs::APUIO3, params[2]);
        let byte = if self.toggle { cmd | TOGGLE } else { cmd & !TOGGLE };
        self.toggle = !self.toggle;
        bus.write_byte(regs::APUIO0, byte);
        wait_port(bus, regs::APUIO0, byte)
    }

    /// Copy BRR data into SPC RAM as sample `id`.
    ///
    /// Reloading an id keeps the old sample until the new one is in place.
    /// When the old sample is the most recent allocation its RAM is reused,
    /// so a transfer that fails after `CMD_LOAD_ADDR` drops it.
    pub fn load_sample<R: RegisterFile>(
        &mut self,
        bus: &mut R,
        id: u8,
        brr: &[u8],
        loop_point: u16,
    ) -> Result<(), AudioError> {
        if id as usize >= MAX_SAMPLES {
            return Err(AudioError::InvalidId);
        }
        let size = u16::try_from(brr.len()).map_err(|_| AudioError::NoMemory)?;
        let reuse = self.samples[id as usize].filter(|info| self.is_top(info));
        let addr = reuse.map_or(self.next_addr, |info| info.spc_address);
        if size > SAMPLE_RAM_END - addr {
            return Err(AudioError::NoMemory);
        }

        let [lo, hi] = addr.to_le_bytes();
        self.command(bus, CMD_LOAD_ADDR, [lo, hi, 0])?;
        if let Err(e) = self.upload_sample(bus, id, brr, loop_point) {
            if reuse.is_some() {
                self.samples[id as usize] = None;
                self.next_addr = addr;
            }
            return Err(e);
        }

        if reuse.is_none() {
            self.release(id);
        }
        self.samples[id as usize] = Some(SampleInfo {
            spc_address: addr,
            size,
            loop_point,
        });
        self.next_addr = addr + size;
        Ok(())
    }

    fn upload_sample<R: RegisterFile>(
        &mut self,
        bus: &mut R,
        id: u8,
        brr: &[u8],
        loop_point: u16,
    ) -> Result<(), AudioError> {
        for chunk in brr.chunks(2) {
            let second = chunk.get(1).copied().unwrap_or(0);
            self.command(bus, CMD_LOAD_DATA, [chunk[0], second, chunk.len() as u8])?;
        }
        let [lo, hi] = loop_point.to_le_bytes();
        self.command(bus, CMD_SAMPLE_DIR, [id, lo, hi])
    }

    fn is_top(&self, info: &SampleInfo) -> bool {
        info.spc_address + info.size == self.next_addr
    }

    fn release(&mut self, id: u8) {
        if let Some(info) = self.samples[id as usize].take() {
            if self.is_top(&info) {
                self.next_addr = info.spc_address;
            }
        }
    }

    /// Stop every voice playing `id`, then free the slot. Its RAM is
    /// reclaimed only when it was the most recent allocation;
    /// [`clear_samples`](Self::clear_samples) reclaims all of it.
    pub fn unload_sample<R: RegisterFile>(&mut self, bus: &mut R, id: u8) -> Result<(), AudioError> {
        if id as usize >= MAX_SAMPLES {
            return Err(AudioError::InvalidId);
        }
        if self.samples[id as usize].is_none() {
            return Ok(());
        }
        for voice in 0..MAX_VOICES as u8 {
            let state = self.voices[voice as usize];
            if state.active && state.sample_id == id {
                self.stop_voice(bus, voice)?;
            }
        }
        self.release(id);
        Ok(())
    }

    /// Stop all voices and forget every sample.
    pub fn clear_samples<R: RegisterFile>(&mut self, bus: &mut R) -> Result<(), AudioError> {
        if self.voices.iter().any(|v| v.active) {
            self.stop_all(bus)?;
        }
        self.samples = [None; MAX_SAMPLES];
        self.next_addr = SAMPLE_RAM_START;
        Ok(())
    }

    pub fn sample_info(&self, id: u8) -> Option<SampleInfo> {
        self.samples.get(id as usize).copied().flatten()
    }

    /// Bytes left for samples.
    pub fn free_memory(&self) -> u16 {
        SAMPLE_RAM_END - self.next_addr
    }

    /// Play `id` on a free voice at full volume, centered, native pitch.
    pub fn play_sample<R: RegisterFile>(&mut self, bus: &mut R, id: u8) -> Result<u8, AudioError> {
        self.play_sample_ex(bus, id, VOICE_AUTO, VOLUME_MAX, PAN_CENTER, PITCH_DEFAULT)
    }

    /// Play `id` on `voice` ([`VOICE_AUTO`] picks the first idle voice, or
    /// cycles through them when all are busy). Returns the voice used.
    pub fn play_sample_ex<R: RegisterFile>(
        &mut self,
        bus: &mut R,
        id: u8,
        voice: u8,
        volume: u8,
        pan: u8,
        pitch: u16,
    ) -> Result<u8, AudioError> {
        if id as usize >= MAX_SAMPLES {
            return Err(AudioError::InvalidId);
        }
        if self.samples[id as usize].is_none() {
            return Err(AudioError::NotLoaded);
        }
        let voice = match voice {
            VOICE_AUTO => self.pick_voice(),
            v if (v as usize) < MAX_VOICES => v,
            _ => return Err(AudioError::InvalidId),
        };
        let volume = volume.min(VOLUME_MAX);
        let pan = pan.min(PAN_RIGHT);

        let [lo, hi] = pitch.to_le_bytes();
        self.command(bus, CMD_PITCH, [voice, lo, hi])?;
        self.command(bus, CMD_PAN, [voice, pan, 0])?;
        self.command(bus, CMD_PLAY, [voice, id, volume])?;

        self.voices[voice as usize] = VoiceState {
            active: true,
            sample_id: id,
            volume,
            pan,
            pitch,
        };
        Ok(voice)
    }

    fn pick_voice(&mut self) -> u8 {
        if let Some(free) = self.voices.iter().position(|v| !v.active) {
            return free as u8;
        }
        let voice = self.next_voice;
        self.next_voice = (self.next_voice + 1) % MAX_VOICES as u8;
        voice
    }

    pub fn stop_voice<R: RegisterFile>(&mut self, bus: &mut R, voice: u8) -> Result<(), AudioError> {
        if voice as usize >= MAX_VOICES {
            return Err(AudioError::InvalidId);
        }
        self.command(bus, CMD_STOP, [voice, 0, 0])?;
        self.voices[voice as usize].active = false;
        Ok(())
    }

    pub fn stop_all<R: RegisterFile>(&mut self, bus: &mut R) -> Result<(), AudioError> {
        self.command(bus, CMD_STOP_ALL, [0; 3])?;
        for v in self.voices.iter_mut() {
            v.active = false;
        }
        Ok(())
    }

    /// Master volume, clamped to [`VOLUME_MAX`].
    pub fn set_volume<R: RegisterFile>(&mut self, bus: &mut R, volume: u8) -> Result<(), AudioError> {
        let volume = volume.min(VOLUME_MAX);
        self.command(bus, CMD_MASTER_VOLUME, [volume, 0, 0])?;
        self.volume = volume;
        Ok(())
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn set_voice_volume<R: RegisterFile>(
        &mut self,
        bus: &mut R,
        voice: u8,
        left: u8,
        right: u8,
    ) -> Result<(), AudioError> {
        if voice as usize >= MAX_VOICES {
            return Err(AudioError::InvalidId);
        }
        self.command(bus, CMD_VOICE_VOLUME, [voice, left.min(VOLUME_MAX), right.min(VOLUME_MAX)])
    }

    pub fn set_voice_pitch<R: RegisterFile>(&mut self, bus: &mut R, voice: u8, pitch: u16) -> Result<(), AudioError> {
        if voice as usize >= MAX_VOICES {
            return Err(AudioError::InvalidId);
        }
        let [lo, hi] = pitch.to_le_bytes();
        self.command(bus, CMD_PITCH, [voice, lo, hi])?;
        self.voices[voice as usize].pitch = pitch;
        Ok(())
    }

    pub fn voice_state(&self, voice: u8) -> Option<VoiceState> {
        self.voices.get(voice as usize).copied()
    }

    /// Envelope for `voice`: attack 0-15, decay 0-7, sustain level 0-7,
    /// release 0-31, each masked to its field. Sent as the DSP `ADSR1`/`ADSR2`
    /// pair with ADSR mode enabled.
    pub fn set_adsr<R: RegisterFile>(
        &mut self,
        bus: &mut R,
        voice: u8,
        attack: u8,
        decay: u8,
        sustain: u8,
        release: u8,
    ) -> Result<(), AudioError> {
        if voice as usize >= MAX_VOICES {
            return Err(AudioError::InvalidId);
        }
        let adsr1 = 0x80 | (decay & 0x07) << 4 | (attack & 0x0F);
        let adsr2 = (sustain & 0x07) << 5 | (release & 0x1F);
        self.command(bus, CMD_ADSR, [voice, adsr1, adsr2])
    }

    /// Raw DSP `GAIN` byte for `voice`; the driver turns ADSR off for it.
    pub fn set_gain<R: RegisterFile>(&mut self, bus: &mut R, voice: u8, gain: u8) -> Result<(), AudioError> {
        if voice as usize >= MAX_VOICES {
            return Err(AudioError::InvalidId);
        }
        self.command(bus, CMD_GAIN, [voice, gain, 0])
    }

    /// Echo delay in 16 ms steps (clamped to
    /// [`ECHO_DELAY_MIN`]..=[`ECHO_DELAY_MAX`]), feedback and the echo
    /// volume per side.
    pub fn set_echo<R: RegisterFile>(
        &mut self,
        bus: &mut R,
        delay: u8,
        feedback: i8,
        volume_left: i8,
        volume_right: i8,
    ) -> Result<(), AudioError> {
        let delay = delay.clamp(ECHO_DELAY_MIN, ECHO_DELAY_MAX);
        self.command(bus, CMD_ECHO, [delay, feedback as u8, 0])?;
        self.command(bus, CMD_ECHO_VOLUME, [volume_left as u8, volume_right as u8, 0])
    }

    /// The 8 FIR taps, sent two per command: `[first tap, c0, c1]`.
    pub fn set_echo_filter<R: RegisterFile>(&mut self, bus: &mut R, fir: &[i8; 8]) -> Result<(), AudioError> {
        for (pair, taps) in fir.chunks_exact(2).enumerate() {
            self.command(bus, CMD_ECHO_FIR, [pair as u8 * 2, taps[0] as u8, taps[1] as u8])?;
        }
        Ok(())
    }

    /// Echo on for the voices in `mask` (bit n = voice n), off for the rest.
    pub fn enable_echo<R: RegisterFile>(&mut self, bus: &mut R, mask: u8) -> Result<(), AudioError> {
        self.command(bus, CMD_ECHO_ENABLE, [mask, 0, 0])?;
        self.echo_voices = mask;
        Ok(())
    }

    pub fn disable_echo<R: RegisterFile>(&mut self, bus: &mut R) -> Result<(), AudioError> {
        self.enable_echo(bus, 0)
    }

    pub fn echo_voices(&self) -> u8 {
        self.echo_voices
    }

    /// Once per frame: ask the driver which voices are still sounding and
    /// mark the others idle so [`play_sample`](Self::play_sample) reuses
    /// them. Returns the sounding mask. Does nothing before
    /// [`init`](Self::init).
    pub fn update<R: RegisterFile>(&mut self, bus: &mut R) -> Result<u8, AudioError> {
        if !self.ready {
            return Ok(0);
        }
        self.command(bus, CMD_STATUS, [0; 3])?;
        let sounding = bus.read_byte(regs::APUIO1);
        for (n, voice) in self.voices.iter_mut().enumerate() {
            if sounding & (1 << n) == 0 {
                voice.active = false;
            }
        }
        Ok(sounding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryBus;
    use pretty_assertions::assert_eq;

    /// A bus whose ports echo writes, with the IPL ready signature present.
    fn booted() -> (MemoryBus, Audio) {
        let mut bus = MemoryBus::new();
        bus.preset(regs::APUIO0, IPL_READY0);
        bus.preset(regs::APUIO1, IPL_READY1);
        let mut audio = Audio::new();
        audio.init(&mut bus, &[0xEA]).unwrap();
        bus.clear_log();
        (bus, audio)
    }

    #[test]
    fn silent_spc_times_out() {
        let mut bus = MemoryBus::new();
        let mut audio = Audio::new();
        assert_eq!(audio.init(&mut bus, &[1, 2, 3]), Err(AudioError::Timeout));
        assert!(bus.writes_to(regs::APUIO0).is_empty());
        assert!(!audio.is_ready());
    }

    #[test]
    fn ipl_handshake_sequence() {
        let mut bus = MemoryBus::new();
        bus.preset(regs::APUIO0, IPL_READY0);
        bus.preset(regs::APUIO1, IPL_READY1);
        let mut audio = Audio::new();
        audio.init(&mut bus, &[0x11, 0x22, 0x33]).unwrap();

        assert!(audio.is_ready());
        assert_eq!(bus.writes_to(regs::APUIO0), vec![0xCC, 0, 1, 2, 4]);
        assert_eq!(bus.writes_to(regs::APUIO1), vec![1, 0x11, 0x22, 0x33, 0]);
        assert_eq!(bus.writes_to(regs::APUIO2), vec![0x00, 0x00]);
        assert_eq!(bus.writes_to(regs::APUIO3), vec![0x02, 0x02]);
    }

    #[test]
    fn multi_block_kicks() {
        let mut bus = MemoryBus::new();
        bus.preset(regs::APUIO0, IPL_READY0);
        bus.preset(regs::APUIO1, IPL_READY1);
        let big = [0u8; 255];
        ipl_upload(&mut bus, &[(0x0300, &big[..]), (0x0400, &[7u8][..])], 0x0300).unwrap();

        let port0 = bus.writes_to(regs::APUIO0);
        // 255 bytes end on counter 254, so the next kick wraps past 0 to 1
        assert_eq!(port0[256], 1);
        assert_eq!(&port0[257..], &[0, 2]);
    }

    #[test]
    fn stalled_transfer_times_out() {
        let mut bus = MemoryBus::new();
        bus.preset(regs::APUIO1, IPL_READY1);
        bus.queue_reads(regs::APUIO0, &[IPL_READY0, IPL_START]);
        bus.queue_reads(regs::APUIO0, &vec![0x55; WAIT_LIMIT as usize]);
        let result = ipl_upload(&mut bus, &[(0x0200, &[9u8, 9][..])], 0x0200);
        assert_eq!(result, Err(AudioError::Timeout));
        assert_eq!(bus.writes_to(regs::APUIO0), vec![0xCC, 0]);
    }

    #[test]
    fn commands_toggle_bit7() {
        let (mut bus, mut audio) = booted();
        audio.stop_all(&mut bus).unwrap();
        audio.stop_all(&mut bus).unwrap();
        audio.set_volume(&mut bus, 200).unwrap();
        assert_eq!(bus.writes_to(regs::APUIO0), vec![0x03, 0x83, 0x04]);
        assert_eq!(bus.last_write(regs::APUIO1), Some(VOLUME_MAX));
        assert_eq!(audio.volume(), VOLUME_MAX);
    }

    #[test]
    fn sample_allocation() {
        let (mut bus, mut audio) = booted();
        let total = audio.free_memory();
        audio.load_sample(&mut bus, 0, &[1; 9], 0).unwrap();
        audio.load_sample(&mut bus, 5, &[2; 18], 9).unwrap();

        assert_eq!(
            audio.sample_info(5),
            Some(SampleInfo { spc_address: SAMPLE_RAM_START + 9, size: 18, loop_point: 9 })
        );
        assert_eq!(audio.free_memory(), total - 27);

        // only the top allocation gives memory back
        audio.unload_sample(&mut bus, 0).unwrap();
        assert_eq!(audio.free_memory(), total - 27);
        audio.unload_sample(&mut bus, 5).unwrap();
        assert_eq!(audio.free_memory(), total - 9);
        assert_eq!(audio.unload_sample(&mut bus, 64), Err(AudioError::InvalidId));

        audio.clear_samples(&mut bus).unwrap();
        assert_eq!(audio.free_memory(), total);
        assert_eq!(audio.sample_info(0), None);
    }

    #[test]
    fn failed_reload_keeps_the_old_sample() {
        let (mut bus, mut audio) = booted();
        audio.load_sample(&mut bus, 2, &[1; 9], 0).unwrap();
        let before = audio.sample_info(2);
        let free = audio.free_memory();
        bus.clear_log();

        let big = vec![0u8; 70_000];
        assert_eq!(audio.load_sample(&mut bus, 2, &big, 0), Err(AudioError::NoMemory));
        let too_big = vec![0u8; free as usize + 10];
        assert_eq!(audio.load_sample(&mut bus, 2, &too_big, 0), Err(AudioError::NoMemory));

        assert!(bus.writes_to(regs::APUIO0).is_empty());
        assert_eq!(audio.sample_info(2), before);
        assert_eq!(audio.free_memory(), free);
        assert_eq!(audio.play_sample(&mut bus, 2), Ok(0));
    }

    #[test]
    fn reload_reuses_the_top_allocation() {
        let (mut bus, mut audio) = booted();
        audio.load_sample(&mut bus, 0, &[1; 9], 0).unwrap();
        audio.load_sample(&mut bus, 1, &[1; 9], 0).unwrap();
        let free = audio.free_memory();

        // the old 9 bytes count toward the new sample
        let fits = vec![0u8; free as usize + 9];
        audio.load_sample(&mut bus, 1, &fits, 0).unwrap();
        assert_eq!(audio.sample_info(1).unwrap().spc_address, SAMPLE_RAM_START + 9);
        assert_eq!(audio.free_memory(), 0);

        // not on top: the new copy goes after it
        audio.clear_samples(&mut bus).unwrap();
        audio.load_sample(&mut bus, 0, &[1; 9], 0).unwrap();
        audio.load_sample(&mut bus, 1, &[1; 18], 0).unwrap();
        audio.load_sample(&mut bus, 0, &[2; 9], 0).unwrap();
        assert_eq!(audio.sample_info(0).unwrap().spc_address, SAMPLE_RAM_START + 27);
    }

    #[test]
    fn reload_that_times_out_drops_a_reused_slot() {
        let (mut bus, mut audio) = booted();
        audio.load_sample(&mut bus, 4, &[1; 9], 0).unwrap();
        // LOAD_ADDR is echoed, then the driver goes quiet
        let toggle = bus.last_write(regs::APUIO0).unwrap() & TOGGLE ^ TOGGLE;
        bus.queue_reads(regs::APUIO0, &[CMD_LOAD_ADDR | toggle]);
        bus.queue_reads(regs::APUIO0, &vec![0x55; WAIT_LIMIT as usize]);

        assert_eq!(audio.load_sample(&mut bus, 4, &[2; 4], 0), Err(AudioError::Timeout));
        assert_eq!(audio.sample_info(4), None);
        assert_eq!(audio.free_memory(), SAMPLE_RAM_END - SAMPLE_RAM_START);
    }

    #[test]
    fn unloading_stops_its_voices() {
        let (mut bus, mut audio) = booted();
        audio.load_sample(&mut bus, 0, &[0; 9], 0).unwrap();
        audio.load_sample(&mut bus, 1, &[0; 9], 0).unwrap();
        audio.play_sample_ex(&mut bus, 0, 2, VOLUME_MAX, PAN_CENTER, PITCH_DEFAULT).unwrap();
        audio.play_sample_ex(&mut bus, 1, 3, VOLUME_MAX, PAN_CENTER, PITCH_DEFAULT).unwrap();
        audio.play_sample_ex(&mut bus, 0, 6, VOLUME_MAX, PAN_CENTER, PITCH_DEFAULT).unwrap();
        bus.clear_log();

        audio.unload_sample(&mut bus, 0).unwrap();
        let cmds: Vec<u8> = bus.writes_to(regs::APUIO0).iter().map(|c| c & !TOGGLE).collect();
        assert_eq!(cmds, vec![CMD_STOP, CMD_STOP]);
        assert_eq!(bus.writes_to(regs::APUIO1), vec![2, 6]);
        assert!(!audio.voice_state(2).unwrap().active);
        assert!(!audio.voice_state(6).unwrap().active);
        assert!(audio.voice_state(3).unwrap().active);
        assert_eq!(audio.sample_info(0), None);

        // nothing loaded: no commands
        bus.clear_log();
        audio.unload_sample(&mut bus, 0).unwrap();
        assert!(bus.writes().is_empty());

        audio.clear_samples(&mut bus).unwrap();
        assert_eq!(bus.writes_to(regs::APUIO0).len(), 1);
        assert!(!audio.voice_state(3).unwrap().active);
    }

    #[test]
    fn sample_upload_commands() {
        let (mut bus, mut audio) = booted();
        audio.load_sample(&mut bus, 3, &[0xA1, 0xA2, 0xA3], 0).unwrap();
        let cmds: Vec<u8> = bus.writes_to(regs::APUIO0).iter().map(|c| c & !TOGGLE).collect();
        assert_eq!(cmds, vec![CMD_LOAD_ADDR, CMD_LOAD_DATA, CMD_LOAD_DATA, CMD_SAMPLE_DIR]);
        assert_eq!(bus.writes_to(regs::APUIO1), vec![0x00, 0xA1, 0xA3, 3]);
        assert_eq!(bus.writes_to(regs::APUIO2), vec![0x21, 0xA2, 0x00, 0]);
        assert_eq!(bus.writes_to(regs::APUIO3), vec![0, 2, 1, 0]);
    }

    #[test]
    fn sample_errors() {
        let (mut bus, mut audio) = booted();
        assert_eq!(audio.load_sample(&mut bus, 64, &[0], 0), Err(AudioError::InvalidId));
        let huge = vec![0u8; audio.free_memory() as usize + 1];
        assert_eq!(audio.load_sample(&mut bus, 1, &huge, 0), Err(AudioError::NoMemory));
        assert_eq!(audio.play_sample(&mut bus, 1), Err(AudioError::NotLoaded));
        assert_eq!(audio.play_sample(&mut bus, 99), Err(AudioError::InvalidId));

        audio.load_sample(&mut bus, 1, &[0; 9], 0).unwrap();
        assert_eq!(
            audio.play_sample_ex(&mut bus, 1, 8, 10, 0, PITCH_C4),
            Err(AudioError::InvalidId)
        );
        assert_eq!(audio.stop_voice(&mut bus, 8), Err(AudioError::InvalidId));
        assert_eq!(AudioError::Timeout.code(), 4);
    }

    #[test]
    fn voices_are_allocated_and_released() {
        let (mut bus, mut audio) = booted();
        audio.load_sample(&mut bus, 0, &[0; 9], 0).unwrap();

        for expected in 0..MAX_VOICES as u8 {
            assert_eq!(audio.play_sample(&mut bus, 0), Ok(expected));
        }
        // all busy: round robin
        assert_eq!(audio.play_sample(&mut bus, 0), Ok(0));
        assert_eq!(audio.play_sample(&mut bus, 0), Ok(1));

        audio.stop_voice(&mut bus, 5).unwrap();
        assert_eq!(audio.play_sample(&mut bus, 0), Ok(5));

        let state = audio.voice_state(5).unwrap();
        assert!(state.active);
        assert_eq!((state.volume, state.pan, state.pitch), (VOLUME_MAX, PAN_CENTER, PITCH_DEFAULT));

        audio.stop_all(&mut bus).unwrap();
        assert!(!audio.voice_state(0).unwrap().active);
    }

    #[test]
    fn explicit_voice_parameters() {
        let (mut bus, mut audio) = booted();
        audio.load_sample(&mut bus, 2, &[0; 9], 0).unwrap();
        bus.clear_log();

        assert_eq!(audio.play_sample_ex(&mut bus, 2, 3, 200, 40, PITCH_C5), Ok(3));
        assert_eq!(bus.writes_to(regs::APUIO1), vec![3, 3, 3]);
        assert_eq!(bus.writes_to(regs::APUIO2), vec![0x7C, PAN_RIGHT, 2]);
        assert_eq!(bus.writes_to(regs::APUIO3), vec![0x21, 0, VOLUME_MAX]);

        audio.set_voice_pitch(&mut bus, 3, PITCH_C3).unwrap();
        assert_eq!(audio.voice_state(3).unwrap().pitch, PITCH_C3);
        audio.set_voice_volume(&mut bus, 3, 10, 255).unwrap();
        assert_eq!(bus.last_write(regs::APUIO3), Some(VOLUME_MAX));
    }

    #[test]
    fn envelope_commands() {
        let (mut bus, mut audio) = booted();
        audio
            .set_adsr(&mut bus, 1, ATTACK_FAST, DECAY_MEDIUM, SUSTAIN_HALF, RELEASE_FAST)
            .unwrap();
        audio.set_adsr(&mut bus, 7, 0xFF, 0xFF, 0xFF, 0xFF).unwrap();
        audio.set_gain(&mut bus, 2, 0x7F).unwrap();

        assert_eq!(bus.writes_to(regs::APUIO0), vec![CMD_ADSR, CMD_ADSR | TOGGLE, CMD_GAIN]);
        assert_eq!(bus.writes_to(regs::APUIO1), vec![1, 7, 2]);
        assert_eq!(bus.writes_to(regs::APUIO2), vec![0xCC, 0xFF, 0x7F]);
        assert_eq!(bus.writes_to(regs::APUIO3), vec![0x78, 0xFF, 0]);

        assert_eq!(audio.set_adsr(&mut bus, 8, 0, 0, 0, 0), Err(AudioError::InvalidId));
        assert_eq!(audio.set_gain(&mut bus, 8, 0), Err(AudioError::InvalidId));
    }

    #[test]
    fn echo_commands() {
        let (mut bus, mut audio) = booted();
        audio.set_echo(&mut bus, 15, -64, 40, -40).unwrap();
        audio.set_echo(&mut bus, 0, 0, 0, 0).unwrap();
        let cmds: Vec<u8> = bus.writes_to(regs::APUIO0).iter().map(|c| c & !TOGGLE).collect();
        assert_eq!(cmds, vec![CMD_ECHO, CMD_ECHO_VOLUME, CMD_ECHO, CMD_ECHO_VOLUME]);
        assert_eq!(bus.writes_to(regs::APUIO1), vec![ECHO_DELAY_MAX, 40, ECHO_DELAY_MIN, 0]);
        assert_eq!(bus.writes_to(regs::APUIO2), vec![0xC0, 0xD8, 0, 0]);
        assert_eq!(ECHO_DELAY_MAX, 6);

        bus.clear_log();
        audio.set_echo_filter(&mut bus, &[127, 0, 0, 0, 0, 0, 0, -1]).unwrap();
        assert_eq!(bus.writes_to(regs::APUIO1), vec![0, 2, 4, 6]);
        assert_eq!(bus.writes_to(regs::APUIO2), vec![127, 0, 0, 0]);
        assert_eq!(bus.writes_to(regs::APUIO3), vec![0, 0, 0, 0xFF]);

        bus.clear_log();
        audio.enable_echo(&mut bus, 0b1000_0001).unwrap();
        assert_eq!(audio.echo_voices(), 0x81);
        audio.disable_echo(&mut bus).unwrap();
        assert_eq!(audio.echo_voices(), 0);
        let cmds: Vec<u8> = bus.writes_to(regs::APUIO0).iter().map(|c| c & !TOGGLE).collect();
        assert_eq!(cmds, vec![CMD_ECHO_ENABLE, CMD_ECHO_ENABLE]);
        assert_eq!(bus.writes_to(regs::APUIO1), vec![0x81, 0]);
    }

    #[test]
    fn update_releases_finished_voices() {
        let mut idle = Audio::new();
        let mut bus = MemoryBus::new();
        assert_eq!(idle.update(&mut bus), Ok(0));
        assert!(bus.writes().is_empty());

        let (mut bus, mut audio) = booted();
        audio.load_sample(&mut bus, 0, &[0; 9], 0).unwrap();
        for _ in 0..3 {
            audio.play_sample(&mut bus, 0).unwrap();
        }
        bus.clear_log();
        // voices 0 and 2 still sounding
        bus.queue_reads(regs::APUIO1, &[0b0000_0101]);

        assert_eq!(audio.update(&mut bus), Ok(0b0000_0101));
        assert_eq!(bus.writes_to(regs::APUIO0).iter().map(|c| c & !TOGGLE).collect::<Vec<_>>(), vec![CMD_STATUS]);
        assert!(audio.voice_state(0).unwrap().active);
        assert!(!audio.voice_state(1).unwrap().active);
        assert!(audio.voice_state(2).unwrap().active);
        assert_eq!(audio.play_sample(&mut bus, 0), Ok(1));
    }
}
