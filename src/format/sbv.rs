//! YouTube SBV (`.sbv`): blocks of `H:MM:SS.mmm,H:MM:SS.mmm` followed by
//! text lines, separated by blank lines.

use super::{round_to_seconds, ParseContext, SubtitleFormat};
use crate::cue::Cue;
use crate::timecode::TimeCode;
use crate::track::Track;
use once_cell::sync::Lazy;
use regex::Regex;

static TIME_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{2}):(\d{2})\.(\d{3}),(\d+):(\d{2}):(\d{2})\.(\d{3})$")
        .expect("Invalid regex")
});

pub struct YouTubeSbv;

impl SubtitleFormat for YouTubeSbv {
    fn name(&self) -> &'static str {
        "YouTube SBV"
    }

    fn extension(&self) -> &'static str {
        ".sbv"
    }

    fn parse(&self, track: &mut Track, lines: &[String], _ctx: &mut ParseContext) -> usize {
        let mut error_count = 0;
        track.cues.clear();

        let mut block: Vec<&str> = Vec::new();
        let terminator = String::new();
        for line in lines.iter().chain(std::iter::once(&terminator)) {
            if line.trim().is_empty() {
                if !block.is_empty() {
                    match parse_block(&block) {
                        Some(cue) => track.cues.push(cue),
                        None => error_count += 1,
                    }
                    block.clear();
                }
            } else {
                block.push(line);
            }
        }

        track.renumber(1);
        error_count
    }

    fn render(&self, track: &Track, _title: &str, round_seconds: bool) -> String {
        track
            .cues
            .iter()
            .map(|cue| {
                format!(
                    "{},{}\n{}\n",
                    encode_time(&cue.start, round_seconds),
                    encode_time(&cue.end, round_seconds),
                    cue.text
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn parse_block(block: &[&str]) -> Option<Cue> {
    let caps = TIME_LINE.captures(block[0].trim())?;
    let field = |i: usize| caps.get(i).unwrap().as_str().parse::<i32>().ok();
    let start = TimeCode::from_components(field(1)?, field(2)?, field(3)?, field(4)?);
    let end = TimeCode::from_components(field(5)?, field(6)?, field(7)?, field(8)?);
    Some(Cue::new(start, end, block[1..].join("\n")))
}

fn encode_time(time: &TimeCode, round_seconds: bool) -> String {
    let tc = if round_seconds {
        TimeCode::new(round_to_seconds(time.total_milliseconds()))
    } else {
        *time
    };
    format!(
        "{}:{:02}:{:02}.{:03}",
        tc.hours(),
        tc.minutes(),
        tc.seconds(),
        tc.milliseconds()
    )
}
