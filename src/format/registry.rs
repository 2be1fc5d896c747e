//! Ordered catalog of dialect codecs and the detection protocol.

use super::microdvd::MicroDvd;
use super::mplayer2::MPlayer2;
use super::sbv::YouTubeSbv;
use super::ssa::AdvancedSubStationAlpha;
use super::subrip::SubRip;
use super::tmplayer::TmPlayer;
use super::webvtt::WebVtt;
use super::{ParseContext, SubtitleFormat};
use crate::error::{Result, SubtrackError};
use crate::track::Track;
use tracing::{debug, info};

/// Outcome of a successful detection: the parsed track, which dialect
/// claimed it, and how many lines failed. Partial degradation is data, not
/// an error; the track holds the valid subset.
#[derive(Debug)]
pub struct DetectedTrack {
    pub track: Track,
    pub format_name: String,
    pub error_count: usize,
}

/// Fixed, explicitly ordered catalog of codecs.
///
/// Order is part of the contract: stricter recognizers come first, and the
/// first codec whose `recognize` succeeds wins. The loosest shape-based
/// recognizer (TMPlayer) is registered last. The catalog is immutable after
/// construction and safe to share read-only.
pub struct FormatRegistry {
    formats: Vec<Box<dyn SubtitleFormat + Send + Sync>>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new(vec![
            Box::new(SubRip),
            Box::new(AdvancedSubStationAlpha),
            Box::new(WebVtt),
            Box::new(MicroDvd::default()),
            Box::new(YouTubeSbv),
            Box::new(MPlayer2),
            Box::new(TmPlayer),
        ])
    }
}

impl FormatRegistry {
    /// Build a registry from a pre-ordered catalog. Hosts that load extra
    /// codecs hand the complete ordered list in here; the core never
    /// discovers codecs at runtime.
    pub fn new(formats: Vec<Box<dyn SubtitleFormat + Send + Sync>>) -> Self {
        Self { formats }
    }

    pub fn formats(&self) -> impl Iterator<Item = &(dyn SubtitleFormat + Send + Sync)> {
        self.formats.iter().map(|f| f.as_ref())
    }

    pub fn find_by_name(&self, name: &str) -> Option<&(dyn SubtitleFormat + Send + Sync)> {
        self.formats
            .iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
            .map(|f| f.as_ref())
    }

    /// Pick a dialect for the input and parse it into a fresh track.
    ///
    /// A supplied `preferred_format` that still recognizes the input is the
    /// fast path (re-detection after a known format change); otherwise the
    /// catalog is tried in registration order. Frame-based dialects get
    /// their time codes derived from frame numbers with the context rate
    /// (possibly updated by an embedded rate token during parse).
    pub fn detect_and_load(
        &self,
        lines: &[String],
        ctx: &ParseContext,
        preferred_format: Option<&str>,
    ) -> Result<DetectedTrack> {
        if let Some(name) = preferred_format {
            let format = self
                .find_by_name(name)
                .ok_or_else(|| SubtrackError::UnknownFormat(name.to_string()))?;
            if format.recognize(lines, ctx) {
                debug!(format = format.name(), "preferred format recognized input");
                return Ok(self.load_with(format, lines, ctx));
            }
        }

        for format in self.formats() {
            if format.recognize(lines, ctx) {
                return Ok(self.load_with(format, lines, ctx));
            }
            debug!(format = format.name(), "did not recognize input");
        }

        Err(SubtrackError::UnrecognizedFormat)
    }

    /// Re-parse into an existing track, trying the known format first.
    /// Returns the name of the dialect that matched.
    pub fn reload(
        &self,
        track: &mut Track,
        lines: &[String],
        ctx: &ParseContext,
        preferred_format: Option<&str>,
    ) -> Result<String> {
        track.cues.clear();
        let detected = self.detect_and_load(lines, ctx, preferred_format)?;
        let name = detected.format_name.clone();
        *track = detected.track;
        Ok(name)
    }

    fn load_with(
        &self,
        format: &(dyn SubtitleFormat + Send + Sync),
        lines: &[String],
        ctx: &ParseContext,
    ) -> DetectedTrack {
        let mut track = Track::new();
        let mut parse_ctx = ctx.clone();
        if let Some(name) = &ctx.file_name {
            track.file_name = name.clone();
        }

        let error_count = format.parse(&mut track, lines, &mut parse_ctx);
        track.set_loaded_format(format.name(), format.is_frame_based());
        if format.is_frame_based() {
            track.calculate_time_codes_from_frame_numbers(parse_ctx.frame_rate);
        }

        info!(
            format = format.name(),
            cues = track.cues.len(),
            error_count,
            "loaded subtitle track"
        );
        DetectedTrack {
            track,
            format_name: format.name().to_string(),
            error_count,
        }
    }
}
