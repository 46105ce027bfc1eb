//! Command line editor for Standard MIDI Files.
//!
//! Tracks can be inspected, renamed, moved to another channel, given a
//! program change, have all their notes set to one value, or have their
//! note-on velocities scaled.

pub mod cli;
pub mod editor;
pub mod error;
pub mod midi;

pub use error::{ContainerError, EditError, Error, Result};
