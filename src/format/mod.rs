//! Dialect codecs and the detection/dispatch machinery.

pub mod helpers;
pub mod microdvd;
pub mod mplayer2;
pub mod registry;
pub mod sbv;
pub mod ssa;
pub mod subrip;
pub mod tmplayer;
pub mod webvtt;

pub use registry::{DetectedTrack, FormatRegistry};

use crate::track::Track;

/// State threaded explicitly through recognition and parsing.
///
/// Every call gets its own context rather than reading a process-wide
/// frame rate, so a recognizer that touches the rate during a trial parse
/// cannot contaminate the next candidate.
#[derive(Debug, Clone)]
pub struct ParseContext {
    pub file_name: Option<String>,
    pub frame_rate: f64,
}

impl ParseContext {
    pub fn new(frame_rate: f64) -> Self {
        Self {
            file_name: None,
            frame_rate,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }
}

impl Default for ParseContext {
    fn default() -> Self {
        Self::new(23.976)
    }
}

/// One subtitle dialect: a recognition heuristic, a parser and a renderer.
///
/// `parse` never fails as a whole; malformed lines are counted and the valid
/// subset is kept. `recognize` must terminate on any input and must not leave
/// observable state behind.
pub trait SubtitleFormat {
    fn name(&self) -> &'static str;

    fn extension(&self) -> &'static str;

    /// `false` means the dialect counts frames rather than milliseconds.
    fn is_time_based(&self) -> bool {
        true
    }

    fn is_frame_based(&self) -> bool {
        !self.is_time_based()
    }

    fn friendly_name(&self) -> String {
        format!("{} ({})", self.name(), self.extension())
    }

    /// Does this input belong to this dialect?
    ///
    /// The default is the majority-valid heuristic: trial-parse into a
    /// scratch track and claim the input when more cues parsed than lines
    /// failed. The trial runs on a copy of the context, so an embedded
    /// frame-rate token read during the attempt is invisible to the caller.
    fn recognize(&self, lines: &[String], ctx: &ParseContext) -> bool {
        let mut probe = Track::new();
        let mut trial = ctx.clone();
        let error_count = self.parse(&mut probe, lines, &mut trial);
        probe.cues.len() > error_count
    }

    /// Parse `lines` into `track`, returning the per-line error count.
    fn parse(&self, track: &mut Track, lines: &[String], ctx: &mut ParseContext) -> usize;

    /// Render the track in this dialect.
    fn render(&self, track: &Track, title: &str, round_seconds: bool) -> String;
}

pub(crate) fn round_to_seconds(milliseconds: f64) -> f64 {
    (milliseconds / 1000.0).round() * 1000.0
}
