use std::collections::BTreeSet;
use std::fmt;

use rayon::prelude::*;

use crate::midi::event::{EventKind, NOTE_ON, PROGRAM_CHANGE, SEQUENCE_TRACK_NAME};
use crate::midi::{MidiDocument, Track};

/// Facts gathered from a single pass over a track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackSummary {
    pub name: String,
    pub program: Option<u8>,
    /// 1-based channel numbers.
    pub channels: BTreeSet<u8>,
    /// Note numbers of every note-on event.
    pub notes: BTreeSet<u8>,
    pub event_count: usize,
}

/// Printable ASCII is kept, anything else shows as `.`.
fn printable_name(payload: &[u8]) -> String {
    payload
        .iter()
        .map(|&b| if (0x20..0x7F).contains(&b) { b as char } else { '.' })
        .collect()
}

pub fn summarize(track: &Track) -> TrackSummary {
    let mut summary = TrackSummary {
        event_count: track.event_count(),
        ..Default::default()
    };

    for event in track.iter() {
        match event.kind() {
            EventKind::Meta {
                meta_type: SEQUENCE_TRACK_NAME,
                payload,
            } => {
                summary.name = printable_name(payload);
            }
            EventKind::Meta { .. } | EventKind::SysEx { .. } => {}
            EventKind::Channel {
                message_type,
                channel,
                data,
            } => {
                summary.channels.insert(channel + 1);
                match (message_type, data) {
                    (PROGRAM_CHANGE, [program, ..]) => summary.program = Some(*program),
                    (NOTE_ON, [note, ..]) => {
                        summary.notes.insert(*note);
                    }
                    _ => {}
                }
            }
        }
    }

    summary
}

/// Summaries for every track, in track order.
pub fn summarize_document(document: &MidiDocument) -> Vec<TrackSummary> {
    document.tracks().par_iter().map(summarize).collect()
}

impl fmt::Display for TrackSummary {
    /// `name / program / channels / notes / `, with `-1` for a missing program.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / ", self.name)?;
        match self.program {
            Some(program) => write!(f, "{program} / ")?,
            None => write!(f, "-1 / ")?,
        }
        for channel in &self.channels {
            write!(f, "{channel} ")?;
        }
        write!(f, "/ ")?;
        for note in &self.notes {
            write!(f, "{note} ")?;
        }
        write!(f, "/ ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::{MidiEvent, TrackEvent};
    use pretty_assertions::assert_eq;

    fn track(events: Vec<MidiEvent>) -> Track {
        Track::new(events.into_iter().map(|e| TrackEvent::new(0, e)).collect())
    }

    #[test]
    fn gathers_name_program_channels_and_notes() {
        let t = track(vec![
            MidiEvent::track_name("Lead"),
            MidiEvent::program_change(2, 40),
            MidiEvent::from_bytes(vec![0x92, 64, 100]),
            MidiEvent::from_bytes(vec![0x92, 60, 100]),
            MidiEvent::from_bytes(vec![0x82, 64, 0]),
            MidiEvent::from_bytes(vec![0xB9, 7, 100]),
            MidiEvent::from_bytes(vec![0x92, 60, 0]),
            MidiEvent::end_of_track(),
        ]);

        let summary = summarize(&t);
        assert_eq!(summary.name, "Lead");
        assert_eq!(summary.program, Some(40));
        assert_eq!(summary.channels.iter().copied().collect::<Vec<_>>(), vec![3, 10]);
        assert_eq!(summary.notes.iter().copied().collect::<Vec<_>>(), vec![60, 64]);
        assert_eq!(summary.event_count, 8);
        assert_eq!(summary.to_string(), "Lead / 40 / 3 10 / 60 64 / ");
    }

    #[test]
    fn replaces_unprintable_bytes() {
        let t = track(vec![MidiEvent::meta(SEQUENCE_TRACK_NAME, b"Bass\x01\xE9\x7F!")]);
        assert_eq!(summarize(&t).name, "Bass...!");
    }

    #[test]
    fn last_name_and_program_win() {
        let t = track(vec![
            MidiEvent::track_name("first"),
            MidiEvent::program_change(0, 1),
            MidiEvent::track_name("second"),
            MidiEvent::program_change(0, 2),
        ]);
        let summary = summarize(&t);
        assert_eq!(summary.name, "second");
        assert_eq!(summary.program, Some(2));
    }

    #[test]
    fn sysex_and_meta_do_not_count_as_channels() {
        let t = track(vec![
            MidiEvent::from_bytes(vec![0xF0, 0x01, 0xF7]),
            MidiEvent::meta(0x01, b"text"),
        ]);
        let summary = summarize(&t);
        assert!(summary.channels.is_empty());
        assert_eq!(summary.to_string(), " / -1 / / / ");
    }

    #[test]
    fn summarizes_every_track_in_order() {
        let doc = MidiDocument::new(
            1,
            96,
            vec![
                track(vec![MidiEvent::track_name("one")]),
                track(vec![MidiEvent::track_name("two")]),
            ],
        );
        let names: Vec<String> = summarize_document(&doc)
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["one", "two"]);
    }
}
