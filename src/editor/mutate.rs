//! In-place edits on a single track.
//!
//! Every operation checks its arguments before touching the document, so a
//! rejected call leaves every track unchanged.

use tracing::{debug, warn};

use crate::error::EditError;
use crate::midi::event::{MIDI_CHANNEL_MASK, MidiEvent, NOTE_OFF, NOTE_ON, SEQUENCE_TRACK_NAME};
use crate::midi::{MidiDocument, Track, TrackEvent};

/// How [`set_channel`] writes the channel nibble.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChannelMode {
    /// Clear the low nibble, then set the new channel.
    #[default]
    Replace,
    /// OR the new channel into the existing nibble. Matches older
    /// editors bit for bit, but cannot lower a channel number.
    Merge,
}

pub fn check_track(document: &MidiDocument, track_index: usize) -> Result<(), EditError> {
    if track_index < document.track_count() {
        Ok(())
    } else {
        Err(EditError::TrackOutOfRange {
            index: track_index as i64,
            track_count: document.track_count(),
        })
    }
}

pub fn check_channel(channel_no: u8) -> Result<(), EditError> {
    if (1..=16).contains(&channel_no) {
        Ok(())
    } else {
        Err(EditError::invalid_argument("channel", channel_no, "1 to 16"))
    }
}

pub fn check_program(program_no: u8) -> Result<(), EditError> {
    if program_no <= 127 {
        Ok(())
    } else {
        Err(EditError::invalid_argument(
            "program",
            program_no,
            "0 to 127 (a data byte with the high bit set would corrupt the track)",
        ))
    }
}

pub fn check_note(note_no: u8) -> Result<(), EditError> {
    if note_no <= 127 {
        Ok(())
    } else {
        Err(EditError::invalid_argument("note", note_no, "0 to 127"))
    }
}

fn track_mut(document: &mut MidiDocument, track_index: usize) -> Result<&mut Track, EditError> {
    let track_count = document.track_count();
    document
        .track_mut(track_index)
        .ok_or(EditError::TrackOutOfRange {
            index: track_index as i64,
            track_count,
        })
}

/// Replace every track-name event of the track with one carrying `new_name`.
///
/// The replacement keeps the position and delta time of the event it
/// replaces. A track without a name event is left alone. Returns the number
/// of replaced events.
pub fn rename_track(
    document: &mut MidiDocument,
    track_index: usize,
    new_name: &str,
) -> Result<usize, EditError> {
    let track = track_mut(document, track_index)?;

    let mut replaced = 0;
    for position in 0..track.event_count() {
        let is_name = track
            .get(position)
            .is_some_and(|ev| ev.event.meta_type() == Some(SEQUENCE_TRACK_NAME));
        if !is_name {
            continue;
        }
        let old = track.remove(position);
        track.insert(
            position,
            TrackEvent::new(old.delta, MidiEvent::track_name(new_name)),
        );
        replaced += 1;
    }

    if replaced == 0 {
        warn!(track = track_index, "track has no name event, leaving it unnamed");
    } else {
        debug!(track = track_index, name = new_name, replaced, "renamed track");
    }
    Ok(replaced)
}

/// Move every channel event of the track to `channel_no` (1 to 16).
pub fn set_channel(
    document: &mut MidiDocument,
    track_index: usize,
    channel_no: u8,
    mode: ChannelMode,
) -> Result<(), EditError> {
    check_channel(channel_no)?;
    let track = track_mut(document, track_index)?;

    let channel = channel_no - 1;
    for event in track.iter_mut().filter(|e| !e.is_system_exclusive()) {
        let status = event.status();
        let status = match mode {
            ChannelMode::Replace => (status & !MIDI_CHANNEL_MASK) | channel,
            ChannelMode::Merge => status | channel,
        };
        event.set_status(status);
    }

    debug!(track = track_index, channel = channel_no, ?mode, "set channel");
    Ok(())
}

/// Insert a program change on channel 1 as the first event of the track.
pub fn insert_program_change(
    document: &mut MidiDocument,
    track_index: usize,
    program_no: u8,
) -> Result<(), EditError> {
    check_program(program_no)?;
    let track = track_mut(document, track_index)?;

    track.insert(0, TrackEvent::new(0, MidiEvent::program_change(0, program_no)));

    debug!(track = track_index, program = program_no, "inserted program change");
    Ok(())
}

/// Set the note number of every note-on and note-off event.
pub fn set_note(
    document: &mut MidiDocument,
    track_index: usize,
    note_no: u8,
) -> Result<(), EditError> {
    check_note(note_no)?;
    let track = track_mut(document, track_index)?;

    let mut changed = 0usize;
    for event in track
        .iter_mut()
        .filter(|e| e.is_message(NOTE_ON) || e.is_message(NOTE_OFF))
    {
        if event.len() > 1 {
            event[1] = note_no;
            changed += 1;
        }
    }

    debug!(track = track_index, note = note_no, changed, "set notes");
    Ok(())
}

/// Scale the velocity of every note-on event, truncating toward zero and
/// clamping to 0..=127. Note-off velocities are left as they are.
pub fn scale_volume(
    document: &mut MidiDocument,
    track_index: usize,
    multiplier: f32,
) -> Result<(), EditError> {
    let track = track_mut(document, track_index)?;

    for event in track.iter_mut().filter(|e| e.is_message(NOTE_ON)) {
        if let Some(velocity) = event.get(2) {
            // `as` saturates and maps NaN to 0
            let scaled = (f32::from(velocity) * multiplier) as i32;
            event[2] = scaled.clamp(0, 127) as u8;
        }
    }

    debug!(track = track_index, multiplier, "scaled volume");
    Ok(())
}
