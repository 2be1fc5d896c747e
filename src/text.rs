//! Text metrics shared by timing operations and sort criteria.

use crate::config::Settings;
use crate::cue::Cue;
use crate::timecode::BASE_UNIT;

/// Strip HTML-style tags and ASSA override blocks (`{\...}`) from text.
///
/// Markup is otherwise passed through the model opaquely; stripping only
/// happens for reading-speed metrics, never for stored cue text.
pub fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_angle = false;
    let mut in_brace = false;
    for c in text.chars() {
        match c {
            '<' if !in_brace => in_angle = true,
            '>' if in_angle => in_angle = false,
            '{' if !in_angle => in_brace = true,
            '}' if in_brace => in_brace = false,
            _ if !in_angle && !in_brace => out.push(c),
            _ => {}
        }
    }
    out
}

/// Length of the longest line, tags excluded.
pub fn max_line_length(text: &str) -> usize {
    strip_tags(text)
        .lines()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0)
}

pub fn number_of_lines(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    text.lines().count()
}

pub fn count_words(text: &str) -> usize {
    strip_tags(text)
        .split(|c: char| {
            c.is_whitespace() || matches!(c, ',' | '.' | '!' | '?' | ';' | ':' | '(' | ')' | '[' | ']')
        })
        .filter(|w| !w.is_empty())
        .count()
}

pub fn is_only_control_or_whitespace(text: &str) -> bool {
    text.chars().all(|c| c.is_control() || c.is_whitespace())
}

/// Characters displayed per second for a cue, tags and line breaks excluded.
/// A non-positive duration reads as infinitely fast.
pub fn chars_per_second(cue: &Cue) -> f64 {
    let duration_ms = cue.duration().total_milliseconds();
    if duration_ms <= 0.0 {
        return f64::MAX;
    }
    let chars = strip_tags(&cue.text)
        .chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .count();
    chars as f64 / (duration_ms / BASE_UNIT)
}

/// Reading-speed derived display duration for a text, clamped to the
/// configured minimum/maximum display window.
pub fn optimal_display_ms(text: &str, settings: &Settings) -> f64 {
    let mut optimal_cps = settings.optimal_chars_per_second;
    if !(2.0..=100.0).contains(&optimal_cps) {
        optimal_cps = 14.7;
    }
    let chars = strip_tags(text)
        .chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .count();
    let duration = chars as f64 / optimal_cps * BASE_UNIT;
    duration.clamp(
        settings.subtitle_minimum_display_ms,
        settings.subtitle_maximum_display_ms,
    )
}
