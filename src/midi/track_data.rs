use crate::error::ContainerError;
use crate::midi::document::{Track, TrackEvent};
use tracing::debug;

use crate::midi::event::{
    END_OF_TRACK, META_EVENT, MidiEvent, SYSEX_ESCAPE, SYSTEM_EXCLUSIVE, channel_data_len,
};
use crate::midi::utils::decode_variable_length;

/// Cursor over the raw bytes of one `MTrk` chunk.
///
/// `base` is the file offset of the chunk data, used for error positions.
pub struct TrackData<'a> {
    data: &'a [u8],
    base: usize,
    offset: usize,
    last_status: Option<u8>,
}

impl<'a> TrackData<'a> {
    pub fn new(data: &'a [u8], base: usize) -> Self {
        TrackData {
            data,
            base,
            offset: 0,
            last_status: None,
        }
    }

    /// Decode the events of the chunk into a [`Track`].
    ///
    /// Decoding stops at the end-of-track event; anything after it is dropped.
    pub fn into_track(mut self) -> Result<Track, ContainerError> {
        // ~3 bytes per event is typical with running status
        let mut events = Vec::with_capacity(self.data.len() / 3);
        while self.offset < self.data.len() {
            let delta = self.read_variable_length("truncated delta time")?;
            let event = self.read_event()?;
            let end_of_track = event.meta_type() == Some(END_OF_TRACK);
            events.push(TrackEvent::new(delta, event));

            if end_of_track {
                let remaining = self.data.len() - self.offset;
                if remaining > 0 {
                    debug!(
                        position = self.base + self.offset,
                        remaining, "ignoring bytes after end of track"
                    );
                }
                break;
            }
        }
        Ok(Track::new(events))
    }

    fn error(&self, reason: &'static str) -> ContainerError {
        ContainerError::invalid(self.base + self.offset, reason)
    }

    fn read_variable_length(&mut self, reason: &'static str) -> Result<u32, ContainerError> {
        let (value, consumed) =
            decode_variable_length(self.data, self.offset).ok_or_else(|| self.error(reason))?;
        self.offset += consumed;
        Ok(value)
    }

    fn take(&mut self, len: usize, reason: &'static str) -> Result<&'a [u8], ContainerError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| self.error(reason))?;
        let data = self.data;
        self.offset = end;
        let slice = &data[end - len..end];
        Ok(slice)
    }

    /// Read the status byte, falling back to running status for data bytes.
    fn read_status(&mut self) -> Result<u8, ContainerError> {
        let byte = self.data[self.offset];
        if byte >= 0x80 {
            self.offset += 1;
            Ok(byte)
        } else {
            match self.last_status {
                Some(status) => Ok(status),
                None => Err(self.error("data byte without running status")),
            }
        }
    }

    fn read_event(&mut self) -> Result<MidiEvent, ContainerError> {
        if self.offset >= self.data.len() {
            return Err(self.error("missing event after delta time"));
        }
        let event_start = self.offset;
        let status = self.read_status()?;

        match status {
            0x80..=0xEF => {
                self.last_status = Some(status);
                let data = self.take(channel_data_len(status), "truncated channel message")?;
                let mut bytes = Vec::with_capacity(1 + data.len());
                bytes.push(status);
                bytes.extend_from_slice(data);
                Ok(MidiEvent::from_bytes(bytes))
            }
            META_EVENT | SYSTEM_EXCLUSIVE | SYSEX_ESCAPE => {
                // Meta and sysex events cancel running status
                self.last_status = None;
                if status == META_EVENT {
                    self.take(1, "truncated meta event")?;
                }
                let len = self.read_variable_length("truncated event length")?;
                self.take(len as usize, "truncated event payload")?;
                Ok(MidiEvent::from_bytes(
                    self.data[event_start..self.offset].to_vec(),
                ))
            }
            _ => Err(self.error("unsupported status byte")),
        }
    }
}
