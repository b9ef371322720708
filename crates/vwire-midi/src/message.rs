//! Parsed MIDI message value type.
//!
//! A `Message` is what the USB-MIDI decoder hands to the hub: one status byte,
//! up to two data bytes and the canonical length. It is `Copy` and always moves
//! between queues by value.

use serde::{Deserialize, Serialize};

/// Status byte constants (channel voice messages carry the channel in the low nibble).
pub mod status {
    pub const NOTE_OFF: u8 = 0x80;
    pub const NOTE_ON: u8 = 0x90;
    pub const POLY_PRESSURE: u8 = 0xA0;
    pub const CONTROL_CHANGE: u8 = 0xB0;
    pub const PROGRAM_CHANGE: u8 = 0xC0;
    pub const CHANNEL_PRESSURE: u8 = 0xD0;
    pub const PITCH_BEND: u8 = 0xE0;
    pub const SYSTEM_EXCLUSIVE: u8 = 0xF0;
    pub const TIME_CODE: u8 = 0xF1;
    pub const SONG_POSITION: u8 = 0xF2;
    pub const SONG_SELECT: u8 = 0xF3;
    pub const TUNE_REQUEST: u8 = 0xF6;
    pub const END_SYSEX: u8 = 0xF7;
    pub const TIMING_CLOCK: u8 = 0xF8;
    pub const START: u8 = 0xFA;
    pub const CONTINUE: u8 = 0xFB;
    pub const STOP: u8 = 0xFC;
    pub const ACTIVE_SENSING: u8 = 0xFE;
    pub const SYSTEM_RESET: u8 = 0xFF;
}

/// Channel selector meaning "any channel" on the source side and
/// "keep the original channel" on the destination side.
pub const ANY_CHANNEL: u8 = 0xFF;

/// Highest addressable MIDI channel (0-based).
pub const MAX_CHANNEL: u8 = 15;

/// Returns true for 0-15 or [`ANY_CHANNEL`].
#[inline]
pub fn is_valid_channel_selector(channel: u8) -> bool {
    channel <= MAX_CHANNEL || channel == ANY_CHANNEL
}

/// Canonical total length (status included) for a status byte.
pub fn message_length(status: u8) -> u8 {
    match status & 0xF0 {
        status::NOTE_OFF
        | status::NOTE_ON
        | status::POLY_PRESSURE
        | status::CONTROL_CHANGE
        | status::PITCH_BEND => 3,
        status::PROGRAM_CHANGE | status::CHANNEL_PRESSURE => 2,
        0xF0 => match status {
            status::SONG_POSITION => 3,
            status::TIME_CODE | status::SONG_SELECT => 2,
            _ => 1,
        },
        _ => 1,
    }
}

/// Message category used by connection filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Note On / Note Off.
    Note,
    Control,
    Program,
    PitchBend,
    /// System Exclusive start (0xF0) or end (0xF7).
    SysEx,
    /// System real-time (status >= 0xF8).
    Realtime,
    /// Everything else: poly/channel pressure and system common messages.
    Other,
}

impl MessageKind {
    pub fn from_status(status: u8) -> Self {
        match status & 0xF0 {
            status::NOTE_OFF | status::NOTE_ON => Self::Note,
            status::CONTROL_CHANGE => Self::Control,
            status::PROGRAM_CHANGE => Self::Program,
            status::PITCH_BEND => Self::PitchBend,
            0xF0 => match status {
                status::SYSTEM_EXCLUSIVE | status::END_SYSEX => Self::SysEx,
                s if s >= status::TIMING_CLOCK => Self::Realtime,
                _ => Self::Other,
            },
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    pub status: u8,
    pub data: [u8; 2],
    /// Total length in bytes, status included.
    pub length: u8,
    /// Logical clock tick stamped by the hub on injection.
    pub timestamp: u32,
}

impl Message {
    /// Builds a message from a status byte and its data bytes.
    ///
    /// The length comes from the canonical table; surplus data bytes are ignored
    /// and missing ones are zero.
    pub fn new(status: u8, data: &[u8]) -> Self {
        let length = message_length(status);
        let mut bytes = [0u8; 2];
        let n = data.len().min(length.saturating_sub(1) as usize);
        bytes[..n].copy_from_slice(&data[..n]);
        Self {
            status,
            data: bytes,
            length,
            timestamp: 0,
        }
    }

    #[inline]
    fn channel_voice(kind: u8, channel: u8, data: &[u8]) -> Self {
        Self::new(kind | (channel & 0x0F), data)
    }

    #[inline]
    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        Self::channel_voice(status::NOTE_ON, channel, &[note & 0x7F, velocity & 0x7F])
    }

    #[inline]
    pub fn note_off(channel: u8, note: u8, velocity: u8) -> Self {
        Self::channel_voice(status::NOTE_OFF, channel, &[note & 0x7F, velocity & 0x7F])
    }

    #[inline]
    pub fn poly_pressure(channel: u8, note: u8, pressure: u8) -> Self {
        Self::channel_voice(
            status::POLY_PRESSURE,
            channel,
            &[note & 0x7F, pressure & 0x7F],
        )
    }

    #[inline]
    pub fn control_change(channel: u8, controller: u8, value: u8) -> Self {
        Self::channel_voice(
            status::CONTROL_CHANGE,
            channel,
            &[controller & 0x7F, value & 0x7F],
        )
    }

    #[inline]
    pub fn program_change(channel: u8, program: u8) -> Self {
        Self::channel_voice(status::PROGRAM_CHANGE, channel, &[program & 0x7F])
    }

    #[inline]
    pub fn channel_pressure(channel: u8, pressure: u8) -> Self {
        Self::channel_voice(status::CHANNEL_PRESSURE, channel, &[pressure & 0x7F])
    }

    /// 14-bit bend value, 0x2000 is center.
    #[inline]
    pub fn pitch_bend(channel: u8, bend: u16) -> Self {
        let bend = bend & 0x3FFF;
        Self::channel_voice(
            status::PITCH_BEND,
            channel,
            &[(bend & 0x7F) as u8, (bend >> 7) as u8],
        )
    }

    /// Single-byte system real-time message such as [`status::TIMING_CLOCK`].
    #[inline]
    pub fn realtime(status: u8) -> Self {
        Self::new(status, &[])
    }

    #[inline]
    pub fn with_timestamp(mut self, timestamp: u32) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Replaces the channel nibble. System messages are returned unchanged.
    #[inline]
    pub fn with_channel(mut self, channel: u8) -> Self {
        if !self.is_system() {
            self.status = (self.status & 0xF0) | (channel & 0x0F);
        }
        self
    }

    /// Data bytes actually carried by this message.
    #[inline]
    pub fn data_bytes(&self) -> &[u8] {
        let n = (self.length.saturating_sub(1) as usize).min(self.data.len());
        &self.data[..n]
    }

    #[inline]
    pub fn is_system(&self) -> bool {
        self.status >= status::SYSTEM_EXCLUSIVE
    }

    /// Low nibble of the status byte. Meaningless for system messages but
    /// still reported, since channel filtering looks at the raw nibble.
    #[inline]
    pub fn channel_nibble(&self) -> u8 {
        self.status & 0x0F
    }

    /// Channel of a channel voice message, `None` for system messages.
    #[inline]
    pub fn channel(&self) -> Option<u8> {
        (!self.is_system()).then(|| self.channel_nibble())
    }

    #[inline]
    pub fn kind(&self) -> MessageKind {
        MessageKind::from_status(self.status)
    }

    /// Same status, data and length; timestamps are ignored.
    #[inline]
    pub fn same_content(&self, other: &Message) -> bool {
        self.status == other.status && self.length == other.length && self.data == other.data
    }
}
