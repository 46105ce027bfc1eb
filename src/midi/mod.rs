pub mod document;
pub mod event;
pub mod loader;
pub mod track_data;
pub mod utils;
pub mod writer;

pub use document::{MidiDocument, Track, TrackEvent, UnknownChunk};
pub use event::{EventKind, MidiEvent};
pub use loader::load_midi_file;
pub use writer::save_midi_file;
