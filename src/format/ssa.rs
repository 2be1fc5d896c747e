//! Advanced Sub Station Alpha (`.ass`): sectioned INI-style dialect with
//! styling metadata. Everything before `[Events]` is preserved verbatim as
//! the track header so styles survive a load/save cycle untouched.

use super::{round_to_seconds, ParseContext, SubtitleFormat};
use crate::cue::Cue;
use crate::timecode::TimeCode;
use crate::track::Track;
use once_cell::sync::Lazy;
use regex::Regex;

static TIME_STAMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+):(\d{2}):(\d{2})\.(\d{2})$").expect("Invalid regex"));

const DEFAULT_COLUMNS: [&str; 10] = [
    "layer", "start", "end", "style", "name", "marginl", "marginr", "marginv", "effect", "text",
];

pub struct AdvancedSubStationAlpha;

impl SubtitleFormat for AdvancedSubStationAlpha {
    fn name(&self) -> &'static str {
        "Advanced Sub Station Alpha"
    }

    fn extension(&self) -> &'static str {
        ".ass"
    }

    fn recognize(&self, lines: &[String], _ctx: &ParseContext) -> bool {
        let mut has_events = false;
        let mut has_info = false;
        for line in lines {
            let lower = line.trim().to_ascii_lowercase();
            if lower == "[script info]" || lower == "[v4+ styles]" {
                has_info = true;
            } else if lower == "[events]" {
                has_events = true;
            }
        }
        has_info && has_events
    }

    fn parse(&self, track: &mut Track, lines: &[String], _ctx: &mut ParseContext) -> usize {
        let mut error_count = 0;
        track.cues.clear();

        let mut header_lines: Vec<String> = Vec::new();
        let mut in_events = false;
        let mut columns: Vec<String> = DEFAULT_COLUMNS.iter().map(|s| s.to_string()).collect();

        for line in lines {
            let trimmed = line.trim();
            if trimmed.eq_ignore_ascii_case("[events]") {
                in_events = true;
                continue;
            }
            if !in_events {
                header_lines.push(line.clone());
                continue;
            }

            if let Some(rest) = strip_prefix_ci(trimmed, "format:") {
                columns = rest
                    .split(',')
                    .map(|c| c.trim().to_ascii_lowercase())
                    .collect();
                continue;
            }

            let (is_comment, rest) = if let Some(rest) = strip_prefix_ci(trimmed, "dialogue:") {
                (false, rest)
            } else if let Some(rest) = strip_prefix_ci(trimmed, "comment:") {
                (true, rest)
            } else {
                if !trimmed.is_empty() {
                    error_count += 1;
                }
                continue;
            };

            match parse_event(rest, &columns, is_comment) {
                Some(cue) => track.cues.push(cue),
                None => error_count += 1,
            }
        }

        while header_lines.last().map(|l| l.trim().is_empty()).unwrap_or(false) {
            header_lines.pop();
        }
        if !header_lines.is_empty() {
            track.header = Some(header_lines.join("\n"));
        }

        track.renumber(1);
        error_count
    }

    fn render(&self, track: &Track, title: &str, round_seconds: bool) -> String {
        let mut output = String::new();
        match &track.header {
            Some(header) => {
                output.push_str(header);
                output.push('\n');
            }
            None => {
                output.push_str(&default_header(title));
            }
        }
        output.push_str("\n[Events]\n");
        output.push_str(
            "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n",
        );

        for cue in &track.cues {
            let kind = if cue.is_comment { "Comment" } else { "Dialogue" };
            output.push_str(&format!(
                "{}: {},{},{},{},{},{},{},{},{},{}\n",
                kind,
                cue.layer,
                encode_time(&cue.start, round_seconds),
                encode_time(&cue.end, round_seconds),
                cue.style.as_deref().unwrap_or("Default"),
                cue.actor.as_deref().unwrap_or(""),
                cue.margin_l.as_deref().unwrap_or("0"),
                cue.margin_r.as_deref().unwrap_or("0"),
                cue.margin_v.as_deref().unwrap_or("0"),
                cue.effect.as_deref().unwrap_or(""),
                cue.text.replace('\n', "\\N"),
            ));
        }
        output
    }
}

fn strip_prefix_ci<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    // byte-offset slicing must not assume a char boundary at prefix.len()
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(line[prefix.len()..].trim_start())
    } else {
        None
    }
}

fn parse_event(rest: &str, columns: &[String], is_comment: bool) -> Option<Cue> {
    // text is the last column and may itself contain commas
    let fields: Vec<&str> = rest.splitn(columns.len(), ',').collect();
    if fields.len() < columns.len() {
        return None;
    }

    let mut cue = Cue::new(TimeCode::default(), TimeCode::default(), String::new());
    cue.is_comment = is_comment;
    let mut start = None;
    let mut end = None;

    for (column, field) in columns.iter().zip(fields.iter()) {
        let field = field.trim();
        match column.as_str() {
            "layer" | "marked" => cue.layer = field.trim_start_matches("Marked=").parse().unwrap_or(0),
            "start" => start = decode_time(field),
            "end" => end = decode_time(field),
            "style" => cue.style = non_empty(field),
            "name" | "actor" => cue.actor = non_empty(field),
            "marginl" => cue.margin_l = non_empty(field),
            "marginr" => cue.margin_r = non_empty(field),
            "marginv" => cue.margin_v = non_empty(field),
            "effect" => cue.effect = non_empty(field),
            "text" => cue.text = field.replace("\\N", "\n").replace("\\n", "\n"),
            _ => {}
        }
    }

    cue.start = start?;
    cue.end = end?;
    Some(cue)
}

fn non_empty(field: &str) -> Option<String> {
    if field.is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}

/// `H:MM:SS.CC` with centisecond precision.
fn decode_time(token: &str) -> Option<TimeCode> {
    let caps = TIME_STAMP.captures(token)?;
    let hours = caps.get(1)?.as_str().parse::<i32>().ok()?;
    let minutes = caps.get(2)?.as_str().parse::<i32>().ok()?;
    let seconds = caps.get(3)?.as_str().parse::<i32>().ok()?;
    let centiseconds = caps.get(4)?.as_str().parse::<i32>().ok()?;
    Some(TimeCode::from_components(
        hours,
        minutes,
        seconds,
        centiseconds * 10,
    ))
}

fn encode_time(time: &TimeCode, round_seconds: bool) -> String {
    let tc = if round_seconds {
        TimeCode::new(round_to_seconds(time.total_milliseconds()))
    } else {
        *time
    };
    format!(
        "{}:{:02}:{:02}.{:02}",
        tc.hours(),
        tc.minutes(),
        tc.seconds(),
        tc.milliseconds() / 10
    )
}

fn default_header(title: &str) -> String {
    format!(
        "[Script Info]\n\
         Title: {}\n\
         ScriptType: v4.00+\n\
         Collisions: Normal\n\
         PlayDepth: 0\n\
         \n\
         [V4+ Styles]\n\
         Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n\
         Style: Default,Arial,20,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,0,0,0,0,100,100,0,0,1,2,2,2,10,10,10,1\n",
        if title.is_empty() { "Untitled" } else { title }
    )
}
