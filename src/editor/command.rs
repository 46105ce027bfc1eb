//! Turns `<track>,<value>` option strings into validated edits and runs them.

use std::str::FromStr;

use tracing::info;

use crate::editor::mutate::{
    self, ChannelMode, check_channel, check_note, check_program, check_track,
};
use crate::error::EditError;
use crate::midi::MidiDocument;

/// One requested edit, as parsed from the command line.
///
/// Numbers are kept as written so that range errors can report the
/// original value.
#[derive(Debug, Clone, PartialEq)]
pub enum EditRequest {
    Rename { track: i64, name: String },
    SetChannel { track: i64, channel: i64 },
    ProgramChange { track: i64, program: i64 },
    SetNote { track: i64, note: i64 },
    ScaleVolume { track: i64, multiplier: f32 },
}

/// Split on commas, dropping empty fields and stray `\r` from files
/// written on Windows.
fn split_params(input: &str) -> Vec<&str> {
    input
        .split(',')
        .map(|item| item.trim_end_matches('\r'))
        .filter(|item| !item.is_empty())
        .collect()
}

fn parse_field<T: FromStr>(
    field: Option<&&str>,
    option: &'static str,
    input: &str,
) -> Result<T, EditError> {
    field
        .and_then(|f| f.trim().parse().ok())
        .ok_or_else(|| EditError::MalformedOption {
            option,
            input: input.to_string(),
        })
}

fn parse_pair<T: FromStr>(option: &'static str, input: &str) -> Result<(i64, T), EditError> {
    let params = split_params(input);
    let track = parse_field(params.first(), option, input)?;
    let value = parse_field(params.get(1), option, input)?;
    Ok((track, value))
}

impl EditRequest {
    /// `<track>,<name>`; the name is everything after the first comma.
    pub fn parse_rename(input: &str) -> Result<Self, EditError> {
        let malformed = || EditError::MalformedOption {
            option: "track-name",
            input: input.to_string(),
        };
        let (track, name) = input.split_once(',').ok_or_else(malformed)?;
        let track = track.trim().parse().map_err(|_| malformed())?;
        let name = name.trim_end_matches(['\r', '\n']);
        if name.is_empty() {
            return Err(malformed());
        }
        Ok(Self::Rename {
            track,
            name: name.to_string(),
        })
    }

    pub fn parse_channel(input: &str) -> Result<Self, EditError> {
        let (track, channel) = parse_pair("channel", input)?;
        Ok(Self::SetChannel { track, channel })
    }

    pub fn parse_program_change(input: &str) -> Result<Self, EditError> {
        let (track, program) = parse_pair("program-change", input)?;
        Ok(Self::ProgramChange { track, program })
    }

    pub fn parse_note(input: &str) -> Result<Self, EditError> {
        let (track, note) = parse_pair("note-set", input)?;
        Ok(Self::SetNote { track, note })
    }

    pub fn parse_volume(input: &str) -> Result<Self, EditError> {
        let (track, multiplier) = parse_pair("volume", input)?;
        Ok(Self::ScaleVolume { track, multiplier })
    }

    /// Position in the fixed application order.
    fn rank(&self) -> u8 {
        match self {
            Self::Rename { .. } => 0,
            Self::SetChannel { .. } => 1,
            Self::ProgramChange { .. } => 2,
            Self::SetNote { .. } => 3,
            Self::ScaleVolume { .. } => 4,
        }
    }

    fn track(&self) -> i64 {
        match self {
            Self::Rename { track, .. }
            | Self::SetChannel { track, .. }
            | Self::ProgramChange { track, .. }
            | Self::SetNote { track, .. }
            | Self::ScaleVolume { track, .. } => *track,
        }
    }

    fn validate(&self, document: &MidiDocument) -> Result<Edit, EditError> {
        let track = track_index(document, self.track())?;
        Ok(match self {
            Self::Rename { name, .. } => Edit::Rename {
                track,
                name: name.clone(),
            },
            Self::SetChannel { channel, .. } => {
                let channel = to_u8(*channel, "channel", "1 to 16")?;
                check_channel(channel)?;
                Edit::SetChannel { track, channel }
            }
            Self::ProgramChange { program, .. } => {
                let program = to_u8(
                    *program,
                    "program",
                    "0 to 127 (a data byte with the high bit set would corrupt the track)",
                )?;
                check_program(program)?;
                Edit::ProgramChange { track, program }
            }
            Self::SetNote { note, .. } => {
                let note = to_u8(*note, "note", "0 to 127")?;
                check_note(note)?;
                Edit::SetNote { track, note }
            }
            Self::ScaleVolume { multiplier, .. } => Edit::ScaleVolume {
                track,
                multiplier: *multiplier,
            },
        })
    }
}

fn track_index(document: &MidiDocument, track: i64) -> Result<usize, EditError> {
    let out_of_range = || EditError::TrackOutOfRange {
        index: track,
        track_count: document.track_count(),
    };
    let index = usize::try_from(track).map_err(|_| out_of_range())?;
    check_track(document, index).map_err(|_| out_of_range())?;
    Ok(index)
}

fn to_u8(value: i64, what: &'static str, range: &'static str) -> Result<u8, EditError> {
    u8::try_from(value).map_err(|_| EditError::invalid_argument(what, value, range))
}

/// A request that passed validation against a specific document.
#[derive(Debug)]
enum Edit {
    Rename { track: usize, name: String },
    SetChannel { track: usize, channel: u8 },
    ProgramChange { track: usize, program: u8 },
    SetNote { track: usize, note: u8 },
    ScaleVolume { track: usize, multiplier: f32 },
}

/// The edits of one invocation, applied in the order rename, set-channel,
/// program-change, set-note, scale-volume regardless of the order they
/// were added in.
#[derive(Debug, Clone, Default)]
pub struct EditPlan {
    requests: Vec<EditRequest>,
    channel_mode: ChannelMode,
}

impl EditPlan {
    pub fn new(channel_mode: ChannelMode) -> Self {
        Self {
            requests: Vec::new(),
            channel_mode,
        }
    }

    pub fn push(&mut self, request: EditRequest) {
        let rank = request.rank();
        let at = self.requests.partition_point(|r| r.rank() <= rank);
        self.requests.insert(at, request);
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn requests(&self) -> &[EditRequest] {
        &self.requests
    }

    /// Check every request against `document` without changing it.
    pub fn validate(&self, document: &MidiDocument) -> Result<(), EditError> {
        self.requests
            .iter()
            .try_for_each(|r| r.validate(document).map(|_| ()))
    }

    /// Validate the whole plan, then apply it. A plan that fails validation
    /// leaves the document untouched.
    pub fn apply(&self, document: &mut MidiDocument) -> Result<(), EditError> {
        let edits = self
            .requests
            .iter()
            .map(|r| r.validate(document))
            .collect::<Result<Vec<_>, _>>()?;

        for edit in edits {
            info!(?edit, "applying edit");
            match edit {
                Edit::Rename { track, name } => {
                    mutate::rename_track(document, track, &name)?;
                }
                Edit::SetChannel { track, channel } => {
                    mutate::set_channel(document, track, channel, self.channel_mode)?
                }
                Edit::ProgramChange { track, program } => {
                    mutate::insert_program_change(document, track, program)?
                }
                Edit::SetNote { track, note } => mutate::set_note(document, track, note)?,
                Edit::ScaleVolume { track, multiplier } => {
                    mutate::scale_volume(document, track, multiplier)?
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::{MidiEvent, Track, TrackEvent};
    use pretty_assertions::assert_eq;

    fn document() -> MidiDocument {
        let track = |name: &str| {
            Track::new(vec![
                TrackEvent::new(0, MidiEvent::track_name(name)),
                TrackEvent::new(0, MidiEvent::from_bytes(vec![0x90, 60, 100])),
                TrackEvent::new(0, MidiEvent::end_of_track()),
            ])
        };
        MidiDocument::new(1, 480, vec![track("a"), track("b")])
    }

    #[test]
    fn parses_pairs() {
        assert_eq!(
            EditRequest::parse_channel("1,10").unwrap(),
            EditRequest::SetChannel {
                track: 1,
                channel: 10
            }
        );
        assert_eq!(
            EditRequest::parse_volume("0,0.5\r").unwrap(),
            EditRequest::ScaleVolume {
                track: 0,
                multiplier: 0.5
            }
        );
        assert_eq!(
            EditRequest::parse_note("-1,60").unwrap(),
            EditRequest::SetNote { track: -1, note: 60 }
        );
        assert_eq!(
            EditRequest::parse_program_change("2,,5").unwrap(),
            EditRequest::ProgramChange {
                track: 2,
                program: 5
            }
        );
    }

    #[test]
    fn rename_keeps_commas_in_name() {
        assert_eq!(
            EditRequest::parse_rename("3,Violins, first desk\r").unwrap(),
            EditRequest::Rename {
                track: 3,
                name: "Violins, first desk".to_string()
            }
        );
    }

    #[test]
    fn malformed_options() {
        for input in ["", "1", "1,", "x,2", "1,two"] {
            assert!(
                matches!(
                    EditRequest::parse_channel(input),
                    Err(EditError::MalformedOption {
                        option: "channel",
                        ..
                    })
                ),
                "{input:?}"
            );
        }
        assert!(EditRequest::parse_rename("0").is_err());
        assert!(EditRequest::parse_rename("0,").is_err());
        assert!(EditRequest::parse_rename("zero,Name").is_err());
        assert!(EditRequest::parse_volume("0,loud").is_err());
    }

    #[test]
    fn applies_in_fixed_order() {
        let mut plan = EditPlan::default();
        plan.push(EditRequest::SetChannel {
            track: 0,
            channel: 3,
        });
        plan.push(EditRequest::ProgramChange {
            track: 0,
            program: 12,
        });
        plan.push(EditRequest::Rename {
            track: 0,
            name: "Horn".into(),
        });
        let ranks: Vec<u8> = plan.requests().iter().map(EditRequest::rank).collect();
        assert_eq!(ranks, vec![0, 1, 2]);

        let mut doc = document();
        plan.apply(&mut doc).unwrap();

        // Program change lands after the channel change, so it keeps channel 1
        let bytes: Vec<&[u8]> = doc.track(0).unwrap().iter().map(|e| e.as_bytes()).collect();
        assert_eq!(
            bytes,
            vec![
                &[0xC0, 12][..],
                &b"\xFF\x03\x04Horn"[..],
                &[0x92, 60, 100][..],
                &[0xFF, 0x2F, 0x00][..],
            ]
        );
    }

    #[test]
    fn failing_request_leaves_document_untouched() {
        let mut plan = EditPlan::default();
        plan.push(EditRequest::Rename {
            track: 0,
            name: "Horn".into(),
        });
        plan.push(EditRequest::SetNote { track: 1, note: 200 });

        let mut doc = document();
        let before = doc.clone();
        assert_eq!(
            plan.apply(&mut doc),
            Err(EditError::InvalidArgument {
                what: "note",
                value: "200".into(),
                range: "0 to 127"
            })
        );
        assert_eq!(doc, before);
    }

    #[test]
    fn rejects_out_of_range_tracks() {
        let doc = document();
        for track in [-1, 2, i64::MAX] {
            let mut plan = EditPlan::default();
            plan.push(EditRequest::ScaleVolume {
                track,
                multiplier: 1.0,
            });
            assert_eq!(
                plan.validate(&doc),
                Err(EditError::TrackOutOfRange {
                    index: track,
                    track_count: 2
                })
            );
        }
    }

    #[test]
    fn rejects_out_of_range_values() {
        let doc = document();
        let cases = [
            EditRequest::SetChannel {
                track: 0,
                channel: 0,
            },
            EditRequest::SetChannel {
                track: 0,
                channel: 17,
            },
            EditRequest::ProgramChange {
                track: 0,
                program: -1,
            },
            EditRequest::ProgramChange {
                track: 0,
                program: 256,
            },
            EditRequest::SetNote {
                track: 0,
                note: 128,
            },
        ];
        for request in cases {
            let mut plan = EditPlan::default();
            plan.push(request.clone());
            assert!(
                matches!(plan.validate(&doc), Err(EditError::InvalidArgument { .. })),
                "{request:?}"
            );
        }
    }
}
