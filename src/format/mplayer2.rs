//! MPlayer2 (`.mpl`): `[start][end]text` with times in deciseconds.

use super::{ParseContext, SubtitleFormat};
use crate::cue::Cue;
use crate::track::Track;
use once_cell::sync::Lazy;
use regex::Regex;

static LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(-?\d+)\]\[(-?\d+)\](.*)$").expect("Invalid regex"));

pub struct MPlayer2;

impl SubtitleFormat for MPlayer2 {
    fn name(&self) -> &'static str {
        "MPlayer2"
    }

    fn extension(&self) -> &'static str {
        ".mpl"
    }

    fn parse(&self, track: &mut Track, lines: &[String], _ctx: &mut ParseContext) -> usize {
        let mut error_count = 0;
        track.cues.clear();

        for line in lines {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match LINE.captures(trimmed) {
                Some(caps) => {
                    let start: f64 = caps.get(1).unwrap().as_str().parse().unwrap_or(0.0);
                    let end: f64 = caps.get(2).unwrap().as_str().parse().unwrap_or(0.0);
                    let text = caps.get(3).unwrap().as_str().replace('|', "\n");
                    track
                        .cues
                        .push(Cue::from_milliseconds(text, start * 100.0, end * 100.0));
                }
                None => error_count += 1,
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
                    "[{}][{}]{}",
                    (cue.start.total_milliseconds() / 100.0).round() as i64,
                    (cue.end.total_milliseconds() / 100.0).round() as i64,
                    cue.text.replace('\n', "|")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
