//! WebVTT (`.vtt`): the W3C web captioning dialect. Recognition is
//! header-based rather than shape-based; content without the `WEBVTT`
//! magic is never claimed, however cue-like it looks.

use super::{round_to_seconds, ParseContext, SubtitleFormat};
use crate::cue::Cue;
use crate::timecode::TimeCode;
use crate::track::Track;
use once_cell::sync::Lazy;
use regex::Regex;

static TIME_STAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d+):)?(\d{2}):(\d{2})\.(\d{3})$").expect("Invalid regex")
});

pub struct WebVtt;

impl SubtitleFormat for WebVtt {
    fn name(&self) -> &'static str {
        "WebVTT"
    }

    fn extension(&self) -> &'static str {
        ".vtt"
    }

    fn recognize(&self, lines: &[String], _ctx: &ParseContext) -> bool {
        lines
            .iter()
            .find(|l| !l.trim().is_empty())
            .map(|l| l.trim_start_matches('\u{feff}').trim().starts_with("WEBVTT"))
            .unwrap_or(false)
    }

    fn parse(&self, track: &mut Track, lines: &[String], _ctx: &mut ParseContext) -> usize {
        let mut error_count = 0;
        track.cues.clear();

        // header: everything up to the first blank line, ignoring blank
        // lines before the magic as the recognizer does
        let mut index = 0;
        while index < lines.len() && lines[index].trim().is_empty() {
            index += 1;
        }
        let mut header_lines = Vec::new();
        while index < lines.len() && !lines[index].trim().is_empty() {
            header_lines.push(lines[index].trim_start_matches('\u{feff}').to_string());
            index += 1;
        }
        if !header_lines.is_empty() {
            track.header = Some(header_lines.join("\n"));
        }

        let mut block: Vec<&str> = Vec::new();
        let terminator = String::new();
        for line in lines[index..].iter().chain(std::iter::once(&terminator)) {
            if line.trim().is_empty() {
                if !block.is_empty() {
                    match parse_block(&block) {
                        BlockResult::Cue(cue) => track.cues.push(cue),
                        BlockResult::Skipped => {}
                        BlockResult::Malformed => error_count += 1,
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
        let mut output = String::new();
        match &track.header {
            Some(header) if header.starts_with("WEBVTT") => {
                output.push_str(header);
                output.push_str("\n\n");
            }
            _ => output.push_str("WEBVTT\n\n"),
        }

        for cue in &track.cues {
            output.push_str(&encode_time(&cue.start, round_seconds));
            output.push_str(" --> ");
            output.push_str(&encode_time(&cue.end, round_seconds));
            if let Some(settings) = &cue.extra {
                output.push(' ');
                output.push_str(settings);
            }
            output.push('\n');
            output.push_str(&cue.text);
            output.push_str("\n\n");
        }
        output
    }
}

enum BlockResult {
    Cue(Cue),
    Skipped,
    Malformed,
}

fn parse_block(block: &[&str]) -> BlockResult {
    // comment and style blocks are legal and carry no cue
    let first = block[0].trim();
    if first.starts_with("NOTE") || first == "STYLE" || first == "REGION" {
        return BlockResult::Skipped;
    }

    let timing_index = match block.iter().position(|l| l.contains("-->")) {
        Some(i) if i <= 1 => i,
        _ => return BlockResult::Malformed,
    };

    let timing = block[timing_index];
    let (times, settings) = match timing.find("-->") {
        Some(arrow) => {
            let end_part = timing[arrow + 3..].trim();
            let mut pieces = end_part.split_whitespace();
            let end = pieces.next().unwrap_or("");
            let rest = pieces.collect::<Vec<_>>().join(" ");
            (
                (timing[..arrow].trim().to_string(), end.to_string()),
                if rest.is_empty() { None } else { Some(rest) },
            )
        }
        None => return BlockResult::Malformed,
    };

    let start = match decode_time(&times.0) {
        Some(t) => t,
        None => return BlockResult::Malformed,
    };
    let end = match decode_time(&times.1) {
        Some(t) => t,
        None => return BlockResult::Malformed,
    };

    let mut cue = Cue::new(start, end, block[timing_index + 1..].join("\n"));
    cue.extra = settings;
    BlockResult::Cue(cue)
}

/// `HH:MM:SS.mmm` with the hours field optional, as the dialect allows.
fn decode_time(token: &str) -> Option<TimeCode> {
    let caps = TIME_STAMP.captures(token)?;
    let hours = caps
        .get(1)
        .map(|m| m.as_str().parse::<i32>().ok())
        .unwrap_or(Some(0))?;
    let minutes = caps.get(2)?.as_str().parse::<i32>().ok()?;
    let seconds = caps.get(3)?.as_str().parse::<i32>().ok()?;
    let milliseconds = caps.get(4)?.as_str().parse::<i32>().ok()?;
    Some(TimeCode::from_components(hours, minutes, seconds, milliseconds))
}

fn encode_time(time: &TimeCode, round_seconds: bool) -> String {
    let tc = if round_seconds {
        TimeCode::new(round_to_seconds(time.total_milliseconds()))
    } else {
        *time
    };
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        tc.hours(),
        tc.minutes(),
        tc.seconds(),
        tc.milliseconds()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_requires_header() {
        let srt_shaped = lines("00:00:01.000 --> 00:00:03.000\nHello\n");
        assert!(!WebVtt.recognize(&srt_shaped, &ParseContext::default()));

        let vtt = lines("WEBVTT\n\n00:00:01.000 --> 00:00:03.000\nHello\n");
        assert!(WebVtt.recognize(&vtt, &ParseContext::default()));
    }

    #[test]
    fn test_parse_basic() {
        let input = lines("WEBVTT\n\n00:00:01.000 --> 00:00:03.000\nHello\nworld\n\n00:00:04.500 --> 00:00:06.000\nAgain\n");
        let mut track = Track::new();
        let errors = WebVtt.parse(&mut track, &input, &mut ParseContext::default());
        assert_eq!(errors, 0);
        assert_eq!(track.cues.len(), 2);
        assert_eq!(track.cues[0].text, "Hello\nworld");
        assert_eq!(track.cues[1].start.total_milliseconds(), 4500.0);
        assert_eq!(track.header.as_deref(), Some("WEBVTT"));
    }

    #[test]
    fn test_leading_blank_lines_before_header() {
        let input = lines("\n\nWEBVTT\n\n00:00:01.000 --> 00:00:03.000\nHello\n");
        assert!(WebVtt.recognize(&input, &ParseContext::default()));

        let mut track = Track::new();
        let errors = WebVtt.parse(&mut track, &input, &mut ParseContext::default());
        assert_eq!(errors, 0);
        assert_eq!(track.header.as_deref(), Some("WEBVTT"));
        assert_eq!(track.cues.len(), 1);
    }

    #[test]
    fn test_parse_optional_hours_and_identifier() {
        let input = lines("WEBVTT\n\nintro\n01:02.500 --> 01:04.000\nShort form\n");
        let mut track = Track::new();
        let errors = WebVtt.parse(&mut track, &input, &mut ParseContext::default());
        assert_eq!(errors, 0);
        assert_eq!(track.cues[0].start.total_milliseconds(), 62500.0);
    }

    #[test]
    fn test_cue_settings_survive_round_trip() {
        let input =
            lines("WEBVTT\n\n00:00:01.000 --> 00:00:03.000 align:start line:0\nTop left\n");
        let mut track = Track::new();
        WebVtt.parse(&mut track, &input, &mut ParseContext::default());
        assert_eq!(track.cues[0].extra.as_deref(), Some("align:start line:0"));

        let rendered = WebVtt.render(&track, "t", false);
        assert!(rendered.contains("00:00:01.000 --> 00:00:03.000 align:start line:0"));
    }

    #[test]
    fn test_note_blocks_are_skipped() {
        let input = lines("WEBVTT\n\nNOTE this is a comment\n\n00:00:01.000 --> 00:00:03.000\nHello\n");
        let mut track = Track::new();
        let errors = WebVtt.parse(&mut track, &input, &mut ParseContext::default());
        assert_eq!(errors, 0);
        assert_eq!(track.cues.len(), 1);
    }

    #[test]
    fn test_malformed_block_counts_error() {
        let input = lines("WEBVTT\n\nnot a timing line\nstill not\n\n00:00:01.000 --> 00:00:03.000\nGood\n");
        let mut track = Track::new();
        let errors = WebVtt.parse(&mut track, &input, &mut ParseContext::default());
        assert_eq!(errors, 1);
        assert_eq!(track.cues.len(), 1);
    }

    #[test]
    fn test_render_emits_header() {
        let mut track = Track::new();
        track.cues.push(Cue::from_milliseconds("Hello", 1000.0, 3000.0));
        let rendered = WebVtt.render(&track, "t", false);
        assert!(rendered.starts_with("WEBVTT\n\n"));
        assert!(rendered.contains("00:00:01.000 --> 00:00:03.000"));
    }
}
