use std::io;

use thiserror::Error;

/// Errors raised while reading or writing the SMF container.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid MIDI data at byte {position}: {reason}")]
    InvalidData { position: usize, reason: &'static str },
}

impl ContainerError {
    pub(crate) const fn invalid(position: usize, reason: &'static str) -> Self {
        Self::InvalidData { position, reason }
    }
}

/// Errors raised by the editing operations and their option parsing.
#[derive(Debug, Error, PartialEq)]
pub enum EditError {
    #[error("Track {index} is out of range (file has {track_count} tracks)")]
    TrackOutOfRange { index: i64, track_count: usize },

    #[error("Invalid {what} {value}: expected {range}")]
    InvalidArgument {
        what: &'static str,
        value: String,
        range: &'static str,
    },

    #[error("Malformed {option} option: {input:?}")]
    MalformedOption { option: &'static str, input: String },
}

impl EditError {
    pub(crate) fn invalid_argument(
        what: &'static str,
        value: impl ToString,
        range: &'static str,
    ) -> Self {
        Self::InvalidArgument {
            what,
            value: value.to_string(),
            range,
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
