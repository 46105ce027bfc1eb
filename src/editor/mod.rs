pub mod command;
pub mod inspect;
pub mod mutate;

pub use command::{EditPlan, EditRequest};
pub use inspect::{TrackSummary, summarize, summarize_document};
pub use mutate::{
    ChannelMode, insert_program_change, rename_track, scale_volume, set_channel, set_note,
};
