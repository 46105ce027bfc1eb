use crate::midi::event::MidiEvent;

/// An event together with its delta time in ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackEvent {
    pub delta: u32,
    pub event: MidiEvent,
}

impl TrackEvent {
    pub fn new(delta: u32, event: MidiEvent) -> Self {
        Self { delta, event }
    }
}

/// An ordered list of events. Position is the only event identity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Track {
    events: Vec<TrackEvent>,
}

impl Track {
    pub fn new(events: Vec<TrackEvent>) -> Self {
        Self { events }
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn events(&self) -> &[TrackEvent] {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut [TrackEvent] {
        &mut self.events
    }

    pub fn iter(&self) -> impl Iterator<Item = &MidiEvent> {
        self.events.iter().map(|e| &e.event)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut MidiEvent> {
        self.events.iter_mut().map(|e| &mut e.event)
    }

    pub fn get(&self, position: usize) -> Option<&TrackEvent> {
        self.events.get(position)
    }

    /// Insert at `position`, shifting later events down by one.
    ///
    /// # Panics
    /// if `position > event_count()`.
    pub fn insert(&mut self, position: usize, event: TrackEvent) {
        self.events.insert(position, event);
    }

    /// # Panics
    /// if `position >= event_count()`.
    pub fn remove(&mut self, position: usize) -> TrackEvent {
        self.events.remove(position)
    }
}

/// A chunk other than `MThd`/`MTrk`, kept so it survives a rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownChunk {
    pub id: [u8; 4],
    pub data: Vec<u8>,
}

/// A loaded Standard MIDI File.
///
/// The track list is fixed once loaded; edits only touch the events
/// inside a track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiDocument {
    format: u16,
    time_div: u16,
    tracks: Vec<Track>,
    unknown_chunks: Vec<UnknownChunk>,
}

impl MidiDocument {
    pub fn new(format: u16, time_div: u16, tracks: Vec<Track>) -> Self {
        Self {
            format,
            time_div,
            tracks,
            unknown_chunks: Vec::new(),
        }
    }

    pub(crate) fn with_unknown_chunks(mut self, chunks: Vec<UnknownChunk>) -> Self {
        self.unknown_chunks = chunks;
        self
    }

    pub fn format(&self) -> u16 {
        self.format
    }

    pub fn time_div(&self) -> u16 {
        self.time_div
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn track_mut(&mut self, index: usize) -> Option<&mut Track> {
        self.tracks.get_mut(index)
    }

    pub fn unknown_chunks(&self) -> &[UnknownChunk] {
        &self.unknown_chunks
    }
}
