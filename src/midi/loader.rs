use std::fs;
use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::ContainerError;
use crate::midi::document::{MidiDocument, Track, UnknownChunk};
use crate::midi::track_data::TrackData;

/// Load a MIDI file from disk.
pub fn load_midi_file<P: AsRef<Path>>(filename: P) -> Result<MidiDocument, ContainerError> {
    let filename = filename.as_ref();
    let bytes = fs::read(filename)?;
    debug!(path = %filename.display(), size = bytes.len(), "read MIDI file");
    MidiDocument::parse(&bytes)
}

struct Chunks<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Chunks<'a> {
    fn read_exact(&mut self, len: usize, reason: &'static str) -> Result<&'a [u8], ContainerError> {
        let bytes = self.bytes;
        match bytes.get(self.offset..self.offset.saturating_add(len)) {
            Some(slice) if slice.len() == len => {
                self.offset += len;
                Ok(slice)
            }
            _ => Err(ContainerError::invalid(self.offset, reason)),
        }
    }

    fn read_u16(&mut self, reason: &'static str) -> Result<u16, ContainerError> {
        let buf = self.read_exact(2, reason)?;
        Ok(u16::from_be_bytes([buf[0], buf[1]]))
    }

    fn read_u32(&mut self, reason: &'static str) -> Result<u32, ContainerError> {
        let buf = self.read_exact(4, reason)?;
        Ok(u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]))
    }

    fn read_id(&mut self, reason: &'static str) -> Result<[u8; 4], ContainerError> {
        let buf = self.read_exact(4, reason)?;
        Ok([buf[0], buf[1], buf[2], buf[3]])
    }

    fn is_empty(&self) -> bool {
        self.offset >= self.bytes.len()
    }
}

impl MidiDocument {
    /// Parse an SMF byte stream.
    pub fn parse(bytes: &[u8]) -> Result<Self, ContainerError> {
        let mut reader = Chunks { bytes, offset: 0 };

        // Read and verify the header
        if &reader.read_id("missing header chunk")? != b"MThd" {
            return Err(ContainerError::invalid(0, "not a MIDI file"));
        }
        let header_len = reader.read_u32("truncated header")?;
        if header_len != 6 {
            return Err(ContainerError::invalid(4, "invalid header length"));
        }
        let format = reader.read_u16("truncated header")?;
        let num_tracks = reader.read_u16("truncated header")? as usize;
        let time_div = reader.read_u16("truncated header")?;

        let mut raw_tracks = Vec::with_capacity(num_tracks);
        let mut unknown_chunks = Vec::new();

        while !reader.is_empty() {
            let id = reader.read_id("truncated chunk header")?;
            let length = reader.read_u32("truncated chunk header")? as usize;
            let base = reader.offset;
            let data = reader.read_exact(length, "truncated chunk data")?;

            if &id == b"MTrk" {
                raw_tracks.push((base, data));
            } else {
                debug!(id = %String::from_utf8_lossy(&id), length, "keeping unknown chunk");
                unknown_chunks.push(UnknownChunk {
                    id,
                    data: data.to_vec(),
                });
            }
        }

        if raw_tracks.len() != num_tracks {
            warn!(
                declared = num_tracks,
                found = raw_tracks.len(),
                "track count in header does not match track chunks"
            );
        }

        let tracks = raw_tracks
            .into_par_iter()
            .map(|(base, data)| TrackData::new(data, base).into_track())
            .collect::<Result<Vec<Track>, _>>()?;

        debug!(format, tracks = tracks.len(), time_div, "parsed MIDI file");
        Ok(MidiDocument::new(format, time_div, tracks).with_unknown_chunks(unknown_chunks))
    }
}
