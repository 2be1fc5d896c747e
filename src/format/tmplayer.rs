//! TMPlayer (`.txt`): `HH:MM:SS:text`, one cue per line, no end times.
//! The loosest recognizer in the catalog; it is registered last so
//! stricter dialects always get the first claim. End times are synthesized
//! from text length and clamped against the next cue's start.

use super::{ParseContext, SubtitleFormat};
use crate::config::Settings;
use crate::cue::Cue;
use crate::text::optimal_display_ms;
use crate::timecode::TimeCode;
use crate::track::Track;
use once_cell::sync::Lazy;
use regex::Regex;

static LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2}):(\d{2}):(.*)$").expect("Invalid regex"));

pub struct TmPlayer;

impl SubtitleFormat for TmPlayer {
    fn name(&self) -> &'static str {
        "TMPlayer"
    }

    fn extension(&self) -> &'static str {
        ".txt"
    }

    fn parse(&self, track: &mut Track, lines: &[String], _ctx: &mut ParseContext) -> usize {
        let mut error_count = 0;
        track.cues.clear();
        let settings = Settings::default();

        for line in lines {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match LINE.captures(trimmed) {
                Some(caps) => {
                    let field = |i: usize| {
                        caps.get(i).unwrap().as_str().parse::<i32>().unwrap_or(0)
                    };
                    let start = TimeCode::from_components(field(1), field(2), field(3), 0);
                    let text = caps.get(4).unwrap().as_str().replace('|', "\n");
                    let end = TimeCode::new(
                        start.total_milliseconds() + optimal_display_ms(&text, &settings),
                    );
                    track.cues.push(Cue::new(start, end, text));
                }
                None => error_count += 1,
            }
        }

        // synthesized end times must not run into the following cue
        for i in 0..track.cues.len().saturating_sub(1) {
            let next_start = track.cues[i + 1].start.total_milliseconds();
            if track.cues[i].end.total_milliseconds() >= next_start {
                track.cues[i].end = TimeCode::new(next_start - 1.0);
            }
        }

        track.renumber(1);
        error_count
    }

    fn render(&self, track: &Track, _title: &str, _round_seconds: bool) -> String {
        track
            .cues
            .iter()
            .map(|cue| {
                format!(
                    "{:02}:{:02}:{:02}:{}",
                    cue.start.hours(),
                    cue.start.minutes(),
                    cue.start.seconds(),
                    cue.text.replace('\n', "|")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
