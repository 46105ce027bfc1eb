use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::ContainerError;
use crate::midi::document::{MidiDocument, Track};
use crate::midi::event::END_OF_TRACK;
use crate::midi::utils::encode_variable_length;

/// Write a document to disk, replacing any existing file.
pub fn save_midi_file<P: AsRef<Path>>(
    document: &MidiDocument,
    filename: P,
) -> Result<(), ContainerError> {
    let filename = filename.as_ref();
    let bytes = document.to_bytes()?;
    let mut writer = BufWriter::new(File::create(filename)?);
    writer.write_all(&bytes)?;
    writer.flush()?;
    debug!(path = %filename.display(), size = bytes.len(), "wrote MIDI file");
    Ok(())
}

fn encode_track(index: usize, track: &Track) -> Vec<u8> {
    let mut data = Vec::with_capacity(track.event_count() * 4);
    for ev in track.events() {
        encode_variable_length(ev.delta, &mut data);
        data.extend_from_slice(ev.event.as_bytes());
    }

    let terminated = track
        .events()
        .last()
        .is_some_and(|ev| ev.event.meta_type() == Some(END_OF_TRACK));
    if !terminated {
        warn!(track = index, "track has no end-of-track event, appending one");
        data.extend_from_slice(&[0x00, 0xFF, END_OF_TRACK, 0x00]);
    }
    data
}

fn push_chunk(out: &mut Vec<u8>, id: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(id);
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(data);
}

impl MidiDocument {
    /// Serialize to SMF bytes.
    ///
    /// Chunk lengths and delta times are recomputed, running status is
    /// never emitted, and unknown chunks follow the track chunks.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ContainerError> {
        let track_count = u16::try_from(self.track_count())
            .map_err(|_| ContainerError::invalid(0, "more than 65535 tracks"))?;
        let mut out = Vec::new();

        let mut header = Vec::with_capacity(6);
        header.extend_from_slice(&self.format().to_be_bytes());
        header.extend_from_slice(&track_count.to_be_bytes());
        header.extend_from_slice(&self.time_div().to_be_bytes());
        push_chunk(&mut out, b"MThd", &header);

        for (index, track) in self.tracks().iter().enumerate() {
            push_chunk(&mut out, b"MTrk", &encode_track(index, track));
        }
        for chunk in self.unknown_chunks() {
            push_chunk(&mut out, &chunk.id, &chunk.data);
        }
        Ok(out)
    }
}
