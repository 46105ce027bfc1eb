use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use thousands::Separable;
use tracing::{info, warn};

use crate::editor::{ChannelMode, EditPlan, EditRequest, summarize_document};
use crate::error::{EditError, Result};
use crate::midi::{MidiDocument, load_midi_file, save_midi_file};

/// Edit the tracks of a Standard MIDI File in place.
///
/// Edits are applied in the order track name, channel, program change,
/// note set, volume. MIDI channels are numbered 1 to 16.
#[derive(Parser, Debug)]
#[command(name = "midieditor", version)]
pub struct Cli {
    /// Print information about the file and exit without editing
    #[arg(short, long)]
    pub info: bool,

    /// Set the track name
    #[arg(short = 't', long, value_name = "TRACK,NAME", allow_hyphen_values = true)]
    pub track_name: Option<String>,

    /// Set the MIDI channel (1-16) of every event in the track
    #[arg(short, long, value_name = "TRACK,CHANNEL", allow_hyphen_values = true)]
    pub channel: Option<String>,

    /// Add a program change message to the start of the track.
    /// PROGRAM is 0-127; larger values are not valid MIDI data bytes
    #[arg(short, long, value_name = "TRACK,PROGRAM", allow_hyphen_values = true)]
    pub program_change: Option<String>,

    /// Set all notes of the track to the given value
    #[arg(short = 'n', long, value_name = "TRACK,NOTE", allow_hyphen_values = true)]
    pub note_set: Option<String>,

    /// Multiply the note-on velocities of the track
    #[arg(short, long, value_name = "TRACK,MULTIPLIER", allow_hyphen_values = true)]
    pub volume: Option<String>,

    /// Write to this file instead of overwriting the input
    #[arg(short, long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// OR the channel into the status byte instead of replacing it
    #[arg(long)]
    pub merge_channel: bool,

    /// The MIDI file to read
    pub input: PathBuf,
}

impl Cli {
    /// Parse every edit option into a plan.
    pub fn plan(&self) -> Result<EditPlan, EditError> {
        let mode = if self.merge_channel {
            ChannelMode::Merge
        } else {
            ChannelMode::Replace
        };
        let mut plan = EditPlan::new(mode);

        let options: [(&Option<String>, fn(&str) -> Result<EditRequest, EditError>); 5] = [
            (&self.track_name, EditRequest::parse_rename),
            (&self.channel, EditRequest::parse_channel),
            (&self.program_change, EditRequest::parse_program_change),
            (&self.note_set, EditRequest::parse_note),
            (&self.volume, EditRequest::parse_volume),
        ];
        for (option, parse) in options {
            if let Some(input) = option {
                plan.push(parse(input)?);
            }
        }
        Ok(plan)
    }
}

/// Write the per-track summary table.
pub fn print_info<W: Write>(document: &MidiDocument, out: &mut W) -> std::io::Result<()> {
    let summaries = summarize_document(document);
    writeln!(out, "File info: ")?;
    writeln!(
        out,
        "Tracks: {} [name/prog change/channel(s)/note(s)]",
        document.track_count()
    )?;
    for (index, summary) in summaries.iter().enumerate() {
        writeln!(out, "{index} : {summary}")?;
    }
    let events: usize = summaries.iter().map(|s| s.event_count).sum();
    writeln!(out, "Events: {}", events.separate_with_commas())
}

/// Load the input, then either print its summary or apply the edits and
/// write the result. Nothing is written if any edit is rejected.
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    let mut document = load_midi_file(&cli.input)?;
    info!(
        path = %cli.input.display(),
        tracks = document.track_count(),
        "loaded MIDI file"
    );

    if cli.info {
        if cli.plan().is_ok_and(|plan| !plan.is_empty()) {
            warn!("edit options are ignored with --info");
        }
        print_info(&document, out)?;
        return Ok(());
    }

    let plan = cli.plan()?;
    if plan.is_empty() {
        warn!("no edits requested, rewriting file unchanged");
    }
    plan.apply(&mut document)?;

    let output = cli.output_file.as_ref().unwrap_or(&cli.input);
    save_midi_file(&document, output)?;
    info!(path = %output.display(), "saved MIDI file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_short_and_long_flags() {
        let cli = Cli::try_parse_from([
            "midieditor",
            "-t",
            "0,Lead",
            "--channel",
            "1,10",
            "-p",
            "1,5",
            "--note-set",
            "2,36",
            "-v",
            "-1,0.5",
            "-o",
            "out.mid",
            "--merge-channel",
            "in.mid",
        ])
        .unwrap();

        assert!(!cli.info);
        assert_eq!(cli.input, PathBuf::from("in.mid"));
        assert_eq!(cli.output_file, Some(PathBuf::from("out.mid")));
        assert_eq!(cli.volume.as_deref(), Some("-1,0.5"));

        let plan = cli.plan().unwrap();
        assert_eq!(plan.requests().len(), 5);
        assert_eq!(
            plan.requests()[4],
            EditRequest::ScaleVolume {
                track: -1,
                multiplier: 0.5
            }
        );
    }

    #[test]
    fn input_is_required() {
        assert!(Cli::try_parse_from(["midieditor", "-i"]).is_err());
    }

    #[test]
    fn malformed_option_fails_plan() {
        let cli = Cli::try_parse_from(["midieditor", "-c", "1", "in.mid"]).unwrap();
        assert!(matches!(
            cli.plan(),
            Err(EditError::MalformedOption {
                option: "channel",
                ..
            })
        ));
    }
}
