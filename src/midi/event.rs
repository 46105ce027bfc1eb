use std::ops::{Index, IndexMut};

use crate::midi::utils::{decode_variable_length, encode_variable_length};

// Channel message types (high nibble of the status byte)
pub const NOTE_OFF: u8 = 0x80;
pub const NOTE_ON: u8 = 0x90;
pub const POLYPHONIC_PRESSURE: u8 = 0xA0;
pub const CONTROLLER_CHANGE: u8 = 0xB0;
pub const PROGRAM_CHANGE: u8 = 0xC0;
pub const CHANNEL_KEY_PRESSURE: u8 = 0xD0;
pub const PITCH_BEND: u8 = 0xE0;
pub const SYSTEM_EXCLUSIVE: u8 = 0xF0;

pub const MIDI_MESSAGE_MASK: u8 = 0xF0;
pub const MIDI_CHANNEL_MASK: u8 = 0x0F;

pub const META_EVENT: u8 = 0xFF;
pub const SYSEX_ESCAPE: u8 = 0xF7;

// Meta event types
pub const SEQUENCE_NUMBER: u8 = 0x00;
pub const TEXT_EVENT: u8 = 0x01;
pub const COPYRIGHT_NOTICE: u8 = 0x02;
pub const SEQUENCE_TRACK_NAME: u8 = 0x03;
pub const INSTRUMENT_NAME: u8 = 0x04;
pub const LYRIC: u8 = 0x05;
pub const MARKER: u8 = 0x06;
pub const CUE_POINT: u8 = 0x07;
pub const MIDI_CHANNEL_PREFIX: u8 = 0x20;
pub const END_OF_TRACK: u8 = 0x2F;
pub const SET_TEMPO: u8 = 0x51;
pub const SMPTE_OFFSET: u8 = 0x54;
pub const TIME_SIGNATURE: u8 = 0x58;
pub const KEY_SIGNATURE: u8 = 0x59;
pub const SEQUENCER_SPECIFIC: u8 = 0x7F;

/// Number of data bytes following a channel message status byte.
pub const fn channel_data_len(status: u8) -> usize {
    match status & MIDI_MESSAGE_MASK {
        PROGRAM_CHANGE | CHANNEL_KEY_PRESSURE => 1,
        _ => 2,
    }
}

/// A single MIDI event, stored as the raw bytes that follow its delta time.
///
/// Running status is always expanded, so byte 0 is the status byte.
/// Meta events are `FF <type> <length> <payload>`, system exclusive
/// events are `F0|F7 <length> <payload>`, where `<length>` is a
/// variable-length quantity (a single byte for lengths below 128).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MidiEvent {
    bytes: Vec<u8>,
}

/// Typed view over the bytes of a [`MidiEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind<'a> {
    Meta { meta_type: u8, payload: &'a [u8] },
    Channel {
        message_type: u8,
        channel: u8,
        data: &'a [u8],
    },
    SysEx { payload: &'a [u8] },
}

impl MidiEvent {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Build a channel message. Only the low nibble of `channel` is used.
    pub fn channel_message(message_type: u8, channel: u8, data: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(1 + data.len());
        bytes.push((message_type & MIDI_MESSAGE_MASK) | (channel & MIDI_CHANNEL_MASK));
        bytes.extend_from_slice(data);
        Self { bytes }
    }

    pub fn program_change(channel: u8, program: u8) -> Self {
        Self::channel_message(PROGRAM_CHANGE, channel, &[program])
    }

    /// Build a meta event whose declared length matches `payload`.
    pub fn meta(meta_type: u8, payload: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(3 + payload.len());
        bytes.push(META_EVENT);
        bytes.push(meta_type);
        encode_variable_length(payload.len() as u32, &mut bytes);
        bytes.extend_from_slice(payload);
        Self { bytes }
    }

    pub fn track_name(name: &str) -> Self {
        Self::meta(SEQUENCE_TRACK_NAME, name.as_bytes())
    }

    pub fn end_of_track() -> Self {
        Self::meta(END_OF_TRACK, &[])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn resize(&mut self, new_len: usize) {
        self.bytes.resize(new_len, 0);
    }

    pub fn get(&self, index: usize) -> Option<u8> {
        self.bytes.get(index).copied()
    }

    pub fn status(&self) -> u8 {
        self.bytes.first().copied().unwrap_or(0)
    }

    pub fn set_status(&mut self, status: u8) {
        match self.bytes.first_mut() {
            Some(first) => *first = status,
            None => self.bytes.push(status),
        }
    }

    pub fn is_meta(&self) -> bool {
        self.status() == META_EVENT
    }

    /// True for every status in the `0xF0` range, meta events included.
    pub fn is_system_exclusive(&self) -> bool {
        self.status() & MIDI_MESSAGE_MASK == SYSTEM_EXCLUSIVE
    }

    /// Only meaningful when the event is neither meta nor system exclusive.
    pub fn message_type(&self) -> u8 {
        self.status() & MIDI_MESSAGE_MASK
    }

    pub fn channel(&self) -> u8 {
        self.status() & MIDI_CHANNEL_MASK
    }

    pub fn is_message(&self, message_type: u8) -> bool {
        !self.is_system_exclusive() && self.message_type() == message_type
    }

    pub fn meta_type(&self) -> Option<u8> {
        match self.kind() {
            EventKind::Meta { meta_type, .. } => Some(meta_type),
            _ => None,
        }
    }

    pub fn kind(&self) -> EventKind<'_> {
        let status = self.status();
        if status == META_EVENT {
            let meta_type = self.get(1).unwrap_or(0);
            EventKind::Meta {
                meta_type,
                payload: self.declared_payload(2),
            }
        } else if status & MIDI_MESSAGE_MASK == SYSTEM_EXCLUSIVE {
            EventKind::SysEx {
                payload: self.declared_payload(1),
            }
        } else {
            EventKind::Channel {
                message_type: status & MIDI_MESSAGE_MASK,
                channel: status & MIDI_CHANNEL_MASK,
                data: self.bytes.get(1..).unwrap_or(&[]),
            }
        }
    }

    /// Payload span given by the length field at `length_at`, clamped to
    /// the bytes actually present.
    fn declared_payload(&self, length_at: usize) -> &[u8] {
        match decode_variable_length(&self.bytes, length_at) {
            Some((length, consumed)) => {
                let start = length_at + consumed;
                let end = (start + length as usize).min(self.bytes.len());
                &self.bytes[start..end]
            }
            None => &[],
        }
    }
}

impl Index<usize> for MidiEvent {
    type Output = u8;

    fn index(&self, index: usize) -> &u8 {
        &self.bytes[index]
    }
}

impl IndexMut<usize> for MidiEvent {
    fn index_mut(&mut self, index: usize) -> &mut u8 {
        &mut self.bytes[index]
    }
}
