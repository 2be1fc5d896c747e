//! MicroDVD (`.sub`): frame-based `{start}{end}text` lines with `|` as the
//! in-cue line separator. A first line of `{1}{1}23.976` (or similar) is a
//! rate declaration, not a cue; it updates the parse context's frame rate.

use super::helpers::milliseconds_to_frames;
use super::{ParseContext, SubtitleFormat};
use crate::cue::Cue;
use crate::track::Track;
use once_cell::sync::Lazy;
use regex::Regex;

static LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\{(-?\d+)\}\{(-?\d+)\}(.*)$").expect("Invalid regex"));

pub struct MicroDvd {
    /// Rate used when rendering time codes back into frame numbers.
    pub frame_rate: f64,
}

impl Default for MicroDvd {
    fn default() -> Self {
        Self { frame_rate: 23.976 }
    }
}

impl SubtitleFormat for MicroDvd {
    fn name(&self) -> &'static str {
        "MicroDVD"
    }

    fn extension(&self) -> &'static str {
        ".sub"
    }

    fn is_time_based(&self) -> bool {
        false
    }

    fn parse(&self, track: &mut Track, lines: &[String], ctx: &mut ParseContext) -> usize {
        let mut error_count = 0;
        track.cues.clear();

        for line in lines {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let caps = match LINE.captures(trimmed) {
                Some(c) => c,
                None => {
                    error_count += 1;
                    continue;
                }
            };

            let start_frame: i32 = caps.get(1).unwrap().as_str().parse().unwrap_or(0);
            let end_frame: i32 = caps.get(2).unwrap().as_str().parse().unwrap_or(0);
            let body = caps.get(3).unwrap().as_str();

            if track.cues.is_empty() && start_frame <= 1 && end_frame <= 1 {
                if let Ok(rate) = body.trim().parse::<f64>() {
                    if rate > 5.0 && rate < 100.0 {
                        ctx.frame_rate = rate;
                        continue;
                    }
                }
            }

            track
                .cues
                .push(Cue::from_frames(start_frame, end_frame, body.replace('|', "\n")));
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
                    "{{{}}}{{{}}}{}",
                    milliseconds_to_frames(cue.start.total_milliseconds(), self.frame_rate),
                    milliseconds_to_frames(cue.end.total_milliseconds(), self.frame_rate),
                    cue.text.replace('\n', "|")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_parse_frames_and_pipes() {
        let input = lines("{25}{50}Hello|world\n{75}{100}Again");
        let mut track = Track::new();
        let mut ctx = ParseContext::new(25.0);
        let errors = MicroDvd::default().parse(&mut track, &input, &mut ctx);
        assert_eq!(errors, 0);
        assert_eq!(track.cues.len(), 2);
        assert_eq!(track.cues[0].start_frame, 25);
        assert_eq!(track.cues[0].end_frame, 50);
        assert_eq!(track.cues[0].text, "Hello\nworld");
    }

    #[test]
    fn test_embedded_rate_token() {
        let input = lines("{1}{1}25.0\n{25}{50}Hello");
        let mut track = Track::new();
        let mut ctx = ParseContext::new(23.976);
        let errors = MicroDvd::default().parse(&mut track, &input, &mut ctx);
        assert_eq!(errors, 0);
        assert_eq!(ctx.frame_rate, 25.0);
        // the rate token is consumed, not kept as a cue
        assert_eq!(track.cues.len(), 1);
        assert_eq!(track.cues[0].text, "Hello");
    }

    #[test]
    fn test_non_rate_first_line_is_a_cue() {
        let input = lines("{0}{25}Opening line\n{50}{75}Second");
        let mut track = Track::new();
        let mut ctx = ParseContext::new(25.0);
        MicroDvd::default().parse(&mut track, &input, &mut ctx);
        assert_eq!(track.cues.len(), 2);
        assert_eq!(ctx.frame_rate, 25.0);
    }

    #[test]
    fn test_malformed_lines_count_errors() {
        let input = lines("{25}{50}Good\nnot microdvd at all\n{75}{100}Also good");
        let mut track = Track::new();
        let errors = MicroDvd::default().parse(&mut track, &input, &mut ParseContext::new(25.0));
        assert_eq!(errors, 1);
        assert_eq!(track.cues.len(), 2);
    }

    #[test]
    fn test_render_converts_time_to_frames() {
        let mut track = Track::new();
        track
            .cues
            .push(Cue::from_milliseconds("Hello\nworld", 1000.0, 2000.0));
        let codec = MicroDvd { frame_rate: 25.0 };
        assert_eq!(codec.render(&track, "t", false), "{25}{50}Hello|world");
    }

    #[test]
    fn test_recognize_rejects_time_based_content() {
        let srt = lines("1\n00:00:01,000 --> 00:00:03,000\nHello\n");
        assert!(!MicroDvd::default().recognize(&srt, &ParseContext::default()));
        let sub = lines("{25}{50}Hello");
        assert!(MicroDvd::default().recognize(&sub, &ParseContext::default()));
    }
}
