use crate::text;
use crate::timecode::{TimeCode, BASE_UNIT};
use uuid::Uuid;

/// One timed text entry of a subtitle track.
///
/// Beyond the core (number, start, end, text) a cue carries the
/// side-channel attributes individual dialects read and write; the engine
/// passes them through opaquely. Each cue owns a stable id generated at
/// creation; cloning either keeps or regenerates it, and call sites must
/// pick one of the two explicit operations.
#[derive(Debug)]
pub struct Cue {
    pub number: i32,
    pub text: String,
    pub start: TimeCode,
    pub end: TimeCode,
    pub start_frame: i32,
    pub end_frame: i32,
    pub forced: bool,
    pub is_comment: bool,
    pub new_section: bool,
    pub layer: i32,
    pub extra: Option<String>,
    pub actor: Option<String>,
    pub region: Option<String>,
    pub style: Option<String>,
    pub effect: Option<String>,
    pub language: Option<String>,
    pub margin_l: Option<String>,
    pub margin_r: Option<String>,
    pub margin_v: Option<String>,
    pub bookmark: Option<String>,
    id: String,
}

impl Cue {
    pub fn new(start: TimeCode, end: TimeCode, text: impl Into<String>) -> Self {
        Self {
            number: 0,
            text: text.into(),
            start,
            end,
            start_frame: 0,
            end_frame: 0,
            forced: false,
            is_comment: false,
            new_section: false,
            layer: 0,
            extra: None,
            actor: None,
            region: None,
            style: None,
            effect: None,
            language: None,
            margin_l: None,
            margin_r: None,
            margin_v: None,
            bookmark: None,
            id: generate_id(),
        }
    }

    pub fn from_milliseconds(text: impl Into<String>, start_ms: f64, end_ms: f64) -> Self {
        Self::new(TimeCode::new(start_ms), TimeCode::new(end_ms), text)
    }

    pub fn from_frames(start_frame: i32, end_frame: i32, text: impl Into<String>) -> Self {
        let mut cue = Self::new(TimeCode::default(), TimeCode::default(), text);
        cue.start_frame = start_frame;
        cue.end_frame = end_frame;
        cue
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// End minus start. Derived, never stored.
    pub fn duration(&self) -> TimeCode {
        TimeCode::new(self.end.total_milliseconds() - self.start.total_milliseconds())
    }

    pub fn is_default(&self) -> bool {
        self.start.total_milliseconds().abs() < 0.01
            && self.end.total_milliseconds().abs() < 0.01
            && self.text.is_empty()
    }

    /// Copy for a fresh, unrelated cue.
    pub fn clone_with_new_identity(&self) -> Self {
        let mut cue = self.clone_fields();
        cue.id = generate_id();
        cue
    }

    /// Copy that stays "the same cue" across snapshot boundaries; used by
    /// undo restore and diffing.
    pub fn clone_with_same_identity(&self) -> Self {
        self.clone_fields()
    }

    /// Linear timing transform; no-op on the max-time sentinel.
    pub fn adjust(&mut self, factor: f64, seconds: f64) {
        if self.start.is_max_time() {
            return;
        }
        self.start
            .set_total_milliseconds(self.start.total_milliseconds() * factor + seconds * BASE_UNIT);
        self.end
            .set_total_milliseconds(self.end.total_milliseconds() * factor + seconds * BASE_UNIT);
    }

    pub fn calculate_frames_from_time_codes(&mut self, frame_rate: f64) {
        self.start_frame =
            (self.start.total_milliseconds() / (BASE_UNIT / frame_rate)).round() as i32;
        self.end_frame = (self.end.total_milliseconds() / (BASE_UNIT / frame_rate)).round() as i32;
    }

    pub fn calculate_time_codes_from_frame_numbers(&mut self, frame_rate: f64) {
        self.start
            .set_total_milliseconds(self.start_frame as f64 * (BASE_UNIT / frame_rate));
        self.end
            .set_total_milliseconds(self.end_frame as f64 * (BASE_UNIT / frame_rate));
    }

    pub fn number_of_lines(&self) -> usize {
        text::number_of_lines(&self.text)
    }

    pub fn words_per_minute(&self) -> f64 {
        if self.text.is_empty() {
            return 0.0;
        }
        let words = text::count_words(&self.text);
        let duration_seconds = self.duration().total_seconds();
        if duration_seconds <= 0.0 {
            return f64::MAX;
        }
        60.0 / duration_seconds * words as f64
    }

    fn clone_fields(&self) -> Self {
        Self {
            number: self.number,
            text: self.text.clone(),
            start: self.start,
            end: self.end,
            start_frame: self.start_frame,
            end_frame: self.end_frame,
            forced: self.forced,
            is_comment: self.is_comment,
            new_section: self.new_section,
            layer: self.layer,
            extra: self.extra.clone(),
            actor: self.actor.clone(),
            region: self.region.clone(),
            style: self.style.clone(),
            effect: self.effect.clone(),
            language: self.language.clone(),
            margin_l: self.margin_l.clone(),
            margin_r: self.margin_r.clone(),
            margin_v: self.margin_v.clone(),
            bookmark: self.bookmark.clone(),
            id: self.id.clone(),
        }
    }
}

impl std::fmt::Display for Cue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} --> {} {}", self.start, self.end, self.text)
    }
}

fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue(start_ms: f64, end_ms: f64, text: &str) -> Cue {
        Cue::from_milliseconds(text, start_ms, end_ms)
    }

    #[test]
    fn test_duration_is_derived() {
        let c = cue(1000.0, 3500.0, "Hello");
        assert_eq!(c.duration().total_milliseconds(), 2500.0);
    }

    #[test]
    fn test_clone_with_new_identity() {
        let c = cue(0.0, 1000.0, "Hello");
        let copy = c.clone_with_new_identity();
        assert_ne!(c.id(), copy.id());
        assert_eq!(c.text, copy.text);
    }

    #[test]
    fn test_clone_with_same_identity() {
        let c = cue(0.0, 1000.0, "Hello");
        let copy = c.clone_with_same_identity();
        assert_eq!(c.id(), copy.id());
    }

    #[test]
    fn test_adjust() {
        let mut c = cue(1000.0, 2000.0, "Hello");
        c.adjust(2.0, 1.0);
        assert_eq!(c.start.total_milliseconds(), 3000.0);
        assert_eq!(c.end.total_milliseconds(), 5000.0);
    }

    #[test]
    fn test_adjust_skips_max_time() {
        let mut c = Cue::new(TimeCode::max_time(), TimeCode::max_time(), "Hello");
        c.adjust(2.0, 1.0);
        assert!(c.start.is_max_time());
        assert!(c.end.is_max_time());
    }

    #[test]
    fn test_frame_time_round_trip() {
        let rate = 25.0;
        let mut c = cue(1000.0, 2000.0, "Hello");
        c.calculate_frames_from_time_codes(rate);
        assert_eq!(c.start_frame, 25);
        assert_eq!(c.end_frame, 50);

        c.calculate_time_codes_from_frame_numbers(rate);
        assert_eq!(c.start.total_milliseconds(), 1000.0);
        assert_eq!(c.end.total_milliseconds(), 2000.0);
    }

    #[test]
    fn test_words_per_minute() {
        let c = cue(0.0, 60_000.0, "one two three four five");
        assert_eq!(c.words_per_minute(), 5.0);
    }

    #[test]
    fn test_is_default() {
        assert!(cue(0.0, 0.0, "").is_default());
        assert!(!cue(0.0, 1.0, "").is_default());
    }
}
