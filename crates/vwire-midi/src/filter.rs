//! Per-connection message category filter.

use crate::message::{Message, MessageKind};
use serde::{Deserialize, Serialize};
use std::ops::{BitOr, BitOrAssign};

/// Bitmask of message categories a connection blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterMask(u8);

impl FilterMask {
    pub const NONE: Self = Self(0x00);
    pub const NOTE: Self = Self(0x01);
    pub const CONTROL: Self = Self(0x02);
    pub const PROGRAM: Self = Self(0x04);
    pub const PITCH_BEND: Self = Self(0x08);
    pub const SYSEX: Self = Self(0x10);
    pub const REALTIME: Self = Self(0x20);
    pub const ALL: Self = Self(0xFF);

    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether messages of `kind` are blocked. `Other` is never blocked.
    #[inline]
    pub fn blocks_kind(self, kind: MessageKind) -> bool {
        let bit = match kind {
            MessageKind::Note => Self::NOTE,
            MessageKind::Control => Self::CONTROL,
            MessageKind::Program => Self::PROGRAM,
            MessageKind::PitchBend => Self::PITCH_BEND,
            MessageKind::SysEx => Self::SYSEX,
            MessageKind::Realtime => Self::REALTIME,
            MessageKind::Other => return false,
        };
        self.0 & bit.0 != 0
    }

    #[inline]
    pub fn blocks(self, message: &Message) -> bool {
        self.blocks_kind(message.kind())
    }
}

impl BitOr for FilterMask {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for FilterMask {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
