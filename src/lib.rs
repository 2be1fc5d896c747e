pub mod config;
pub mod cue;
pub mod envelope;
pub mod error;
pub mod format;
pub mod text;
pub mod timecode;
pub mod track;

pub use config::Settings;
pub use cue::Cue;
pub use envelope::CaptionEnvelope;
pub use error::{Result, SubtrackError};
pub use format::{DetectedTrack, FormatRegistry, ParseContext, SubtitleFormat};
pub use timecode::TimeCode;
pub use track::{SortCriteria, Track};
