pub mod history;

use crate::cue::Cue;
use crate::format::helpers::frame_rate_for_calculation;
use crate::text;
use crate::timecode::BASE_UNIT;
use history::HistoryItem;
use tracing::debug;

/// Sort criteria for [`Track::sort`]. All sorts are stable: ties keep their
/// prior relative order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortCriteria {
    Number,
    StartTime,
    EndTime,
    Duration,
    Text,
    TextMaxLineLength,
    TextTotalLength,
    TextNumberOfLines,
    TextCharsPerSecond,
    WordsPerMinute,
    Style,
}

/// An ordered sequence of cues plus the side-channel state a dialect load
/// leaves behind: header/footer text, the matched format tag and whether
/// that format counts in frames rather than milliseconds.
///
/// Cue order is the authoritative display order; operations that sort or
/// renumber never change the cue count.
#[derive(Debug)]
pub struct Track {
    pub cues: Vec<Cue>,
    pub header: Option<String>,
    pub footer: Option<String>,
    pub file_name: String,
    original_format: Option<String>,
    was_frame_based: bool,
    history: Vec<HistoryItem>,
}

impl Default for Track {
    fn default() -> Self {
        Self::new()
    }
}

impl Track {
    pub fn new() -> Self {
        Self {
            cues: Vec::new(),
            header: None,
            footer: None,
            file_name: "Untitled".to_string(),
            original_format: None,
            was_frame_based: false,
            history: Vec::new(),
        }
    }

    /// Name of the dialect this track was loaded as, if any.
    pub fn original_format(&self) -> Option<&str> {
        self.original_format.as_deref()
    }

    pub fn was_frame_based(&self) -> bool {
        self.was_frame_based
    }

    /// Recorded exactly once per load by the registry.
    pub(crate) fn set_loaded_format(&mut self, name: &str, frame_based: bool) {
        self.original_format = Some(name.to_string());
        self.was_frame_based = frame_based;
    }

    pub(crate) fn history(&self) -> &[HistoryItem] {
        &self.history
    }

    pub(crate) fn history_mut(&mut self) -> &mut Vec<HistoryItem> {
        &mut self.history
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Cue at `index`, absent rather than failing when out of range.
    pub fn get_cue(&self, index: usize) -> Option<&Cue> {
        self.cues.get(index)
    }

    pub fn get_cue_mut(&mut self, index: usize) -> Option<&mut Cue> {
        self.cues.get_mut(index)
    }

    pub fn get_cue_by_id(&self, id: &str) -> Option<&Cue> {
        self.cues.iter().find(|c| c.id() == id)
    }

    /// Resolve a cue reference back to a position.
    ///
    /// Cues get cloned with fresh ids across undo/redo boundaries, so the
    /// resolver falls back through increasingly loose matches: id, adjacent
    /// id, near-equal start+end times (0.1 ms tolerance), number plus one
    /// matching time, text plus one matching time. The priority order is
    /// load-bearing; callers depend on the existing tie-breaks.
    pub fn get_index(&self, cue: &Cue) -> Option<usize> {
        const TOLERANCE_MS: f64 = 0.1;
        let close = |a: f64, b: f64| (a - b).abs() < TOLERANCE_MS;

        for i in 0..self.cues.len() {
            let candidate = &self.cues[i];
            if cue.id() == candidate.id() {
                return Some(i);
            }
            if i + 1 < self.cues.len() && cue.id() == self.cues[i + 1].id() {
                return Some(i + 1);
            }

            let start_match = close(
                cue.start.total_milliseconds(),
                candidate.start.total_milliseconds(),
            );
            let end_match = close(
                cue.end.total_milliseconds(),
                candidate.end.total_milliseconds(),
            );
            if start_match && end_match {
                return Some(i);
            }
            if cue.number == candidate.number && (start_match || end_match) {
                return Some(i);
            }
            if cue.text == candidate.text && (start_match || end_match) {
                return Some(i);
            }
        }
        None
    }

    /// Index of the first cue covering the given second, if any.
    pub fn get_index_at_seconds(&self, seconds: f64) -> Option<usize> {
        let total_ms = seconds * BASE_UNIT;
        self.cues.iter().position(|c| {
            total_ms >= c.start.total_milliseconds() && total_ms <= c.end.total_milliseconds()
        })
    }

    pub fn get_first_alike(&self, cue: &Cue) -> Option<&Cue> {
        self.cues.iter().find(|c| {
            (cue.start.total_milliseconds() - c.start.total_milliseconds()).abs() < 0.1
                && (cue.end.total_milliseconds() - c.end.total_milliseconds()).abs() < 0.1
                && cue.text == c.text
        })
    }

    pub fn get_first_cue_at_ms(&self, milliseconds: f64) -> Option<&Cue> {
        self.cues.iter().find(|c| {
            c.start.total_milliseconds() < milliseconds && milliseconds < c.end.total_milliseconds()
        })
    }

    // ------------------------------------------------------------------
    // Copies
    // ------------------------------------------------------------------

    /// Cue-level deep copy with fresh ids (the default copy in the origin).
    pub fn clone_with_new_identity(&self) -> Self {
        self.clone_cues_with(Cue::clone_with_new_identity)
    }

    /// Cue-level deep copy keeping ids; used for history snapshots and
    /// undo restore.
    pub fn clone_with_same_identity(&self) -> Self {
        self.clone_cues_with(Cue::clone_with_same_identity)
    }

    fn clone_cues_with(&self, copy: impl Fn(&Cue) -> Cue) -> Self {
        let mut track = Track::new();
        track.cues = self.cues.iter().map(copy).collect();
        track.header = self.header.clone();
        track.footer = self.footer.clone();
        track.file_name = self.file_name.clone();
        track.was_frame_based = self.was_frame_based;
        track
    }

    // ------------------------------------------------------------------
    // Timing conversion
    // ------------------------------------------------------------------

    /// Derive time codes from frame numbers. Applies only when the track was
    /// loaded frame-based; in the other direction this is a no-op reported
    /// as `false`, not an error.
    pub fn calculate_time_codes_from_frame_numbers(&mut self, frame_rate: f64) -> bool {
        if self.original_format.is_none() || !self.was_frame_based {
            return false;
        }
        for cue in &mut self.cues {
            cue.calculate_time_codes_from_frame_numbers(frame_rate);
        }
        true
    }

    /// Derive frame numbers from time codes; inverse guard of
    /// [`Track::calculate_time_codes_from_frame_numbers`].
    pub fn calculate_frame_numbers_from_time_codes(&mut self, frame_rate: f64) -> bool {
        if self.original_format.is_none() || self.was_frame_based {
            return false;
        }
        self.calculate_frame_numbers_from_time_codes_no_check(frame_rate);
        true
    }

    pub fn calculate_frame_numbers_from_time_codes_no_check(&mut self, frame_rate: f64) {
        for cue in &mut self.cues {
            cue.calculate_frames_from_time_codes(frame_rate);
        }
        self.fix_equal_or_just_overlapping_frame_numbers();
    }

    /// An end frame equal to (or one past) the next start frame breaks
    /// frame-accurate players; pull it down to `next_start - 1`.
    fn fix_equal_or_just_overlapping_frame_numbers(&mut self) {
        for i in 0..self.cues.len().saturating_sub(1) {
            let next_start = self.cues[i + 1].start_frame;
            let cue = &mut self.cues[i];
            if cue.end_frame == next_start || cue.end_frame == next_start + 1 {
                cue.end_frame = next_start - 1;
            }
        }
    }

    /// Rescale all cue times for a frame-rate change. NTSC-drift rates are
    /// snapped to their exact rational form before dividing so the common
    /// broadcast conversions do not compound rounding error.
    pub fn change_frame_rate(&mut self, old_frame_rate: f64, new_frame_rate: f64) {
        let factor =
            frame_rate_for_calculation(old_frame_rate) / frame_rate_for_calculation(new_frame_rate);
        debug!(old_frame_rate, new_frame_rate, factor, "changing frame rate");
        for cue in &mut self.cues {
            cue.start
                .set_total_milliseconds(cue.start.total_milliseconds() * factor);
            cue.end
                .set_total_milliseconds(cue.end.total_milliseconds() * factor);
        }
    }

    pub fn add_time_to_all_cues(&mut self, milliseconds: f64) {
        for cue in &mut self.cues {
            cue.start.add_milliseconds(milliseconds);
            cue.end.add_milliseconds(milliseconds);
        }
    }

    pub fn adjust(&mut self, factor: f64, seconds: f64) {
        for cue in &mut self.cues {
            cue.adjust(factor, seconds);
        }
    }

    // ------------------------------------------------------------------
    // Display time adjustment (end-time only; selection = None means all)
    // ------------------------------------------------------------------

    pub fn adjust_display_time_using_percent(&mut self, percent: f64, selection: Option<&[usize]>) {
        for i in 0..self.cues.len() {
            if !is_selected(selection, i) {
                continue;
            }
            let next_start_ms = self.next_start_ms(i);
            let cue = &mut self.cues[i];
            let start_ms = cue.start.total_milliseconds();
            let mut new_end_ms = start_ms + (cue.end.total_milliseconds() - start_ms) * percent / 100.0;
            if new_end_ms > next_start_ms {
                new_end_ms = next_start_ms - 1.0;
            }
            cue.end.set_total_milliseconds(new_end_ms);
        }
    }

    pub fn adjust_display_time_using_seconds(&mut self, seconds: f64, selection: Option<&[usize]>) {
        for i in 0..self.cues.len() {
            if !is_selected(selection, i) {
                continue;
            }
            let next_start_ms = self.next_start_ms(i);
            let cue = &mut self.cues[i];
            let mut new_end_ms = cue.end.total_milliseconds() + seconds * BASE_UNIT;
            if new_end_ms > next_start_ms {
                new_end_ms = next_start_ms - 1.0;
            }

            if seconds < 0.0 {
                // shrinking must leave at least 100 ms of display time
                let floor = cue.start.total_milliseconds() + 100.0;
                if floor > new_end_ms {
                    new_end_ms = floor;
                }
            }
            cue.end.set_total_milliseconds(new_end_ms);
        }
    }

    pub fn adjust_display_time_using_milliseconds(
        &mut self,
        milliseconds: f64,
        selection: Option<&[usize]>,
    ) {
        for i in 0..self.cues.len() {
            if is_selected(selection, i) {
                self.adjust_one_display_time_ms(i, milliseconds);
            }
        }
    }

    fn adjust_one_display_time_ms(&mut self, index: usize, milliseconds: f64) {
        let next_start_ms = self.next_start_ms(index);
        let cue = &mut self.cues[index];
        let mut new_end_ms = cue.end.total_milliseconds() + milliseconds;

        // handle overlap with next (minimum gap is 1 ms)
        if new_end_ms > next_start_ms {
            new_end_ms = next_start_ms - 1.0;
        }

        // fix too short duration
        let min_duration_ms = 100.0;
        if cue.start.total_milliseconds() + min_duration_ms > new_end_ms {
            new_end_ms = cue.start.total_milliseconds() + min_duration_ms;
        }

        // the clamps may have flipped the sign of the adjustment
        if milliseconds > 0.0 && new_end_ms < cue.end.total_milliseconds()
            || milliseconds < 0.0 && new_end_ms > cue.end.total_milliseconds()
        {
            return;
        }

        cue.end.set_total_milliseconds(new_end_ms);
    }

    /// Set display times from reading speed: start with the optimal duration
    /// for the text, extend while the reading speed still exceeds
    /// `max_chars_per_second`, then back off from the next cue's start.
    pub fn recalculate_display_times(
        &mut self,
        max_chars_per_second: f64,
        selection: Option<&[usize]>,
        settings: &crate::config::Settings,
    ) {
        let min_gap_ms = settings.min_milliseconds_between_lines;
        for i in 0..self.cues.len() {
            if !is_selected(selection, i) {
                continue;
            }

            let start_ms = self.cues[i].start.total_milliseconds();
            let mut duration = text::optimal_display_ms(&self.cues[i].text, settings);
            self.cues[i].end.set_total_milliseconds(start_ms + duration);
            while text::chars_per_second(&self.cues[i]) > max_chars_per_second {
                duration += 1.0;
                self.cues[i].end.set_total_milliseconds(start_ms + duration);
            }

            if i + 1 < self.cues.len() {
                let next_start_ms = self.cues[i + 1].start.total_milliseconds();
                if start_ms + duration + min_gap_ms > next_start_ms {
                    self.cues[i]
                        .end
                        .set_total_milliseconds(next_start_ms - min_gap_ms);
                    if self.cues[i].duration().total_milliseconds() <= 0.0 {
                        self.cues[i].end.set_total_milliseconds(start_ms + 1.0);
                    }
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Ordering
    // ------------------------------------------------------------------

    pub fn sort(&mut self, criteria: SortCriteria) {
        match criteria {
            SortCriteria::Number => self.cues.sort_by_key(|c| c.number),
            SortCriteria::StartTime => self.cues.sort_by(|a, b| {
                a.start
                    .total_milliseconds()
                    .total_cmp(&b.start.total_milliseconds())
            }),
            SortCriteria::EndTime => self.cues.sort_by(|a, b| {
                a.end
                    .total_milliseconds()
                    .total_cmp(&b.end.total_milliseconds())
            }),
            SortCriteria::Duration => self.cues.sort_by(|a, b| {
                a.duration()
                    .total_milliseconds()
                    .total_cmp(&b.duration().total_milliseconds())
            }),
            SortCriteria::Text => self.cues.sort_by(|a, b| a.text.cmp(&b.text)),
            SortCriteria::TextMaxLineLength => self
                .cues
                .sort_by_key(|c| text::max_line_length(&c.text)),
            SortCriteria::TextTotalLength => self.cues.sort_by_key(|c| c.text.len()),
            SortCriteria::TextNumberOfLines => self.cues.sort_by_key(|c| c.number_of_lines()),
            SortCriteria::TextCharsPerSecond => self
                .cues
                .sort_by(|a, b| text::chars_per_second(a).total_cmp(&text::chars_per_second(b))),
            SortCriteria::WordsPerMinute => self
                .cues
                .sort_by(|a, b| a.words_per_minute().total_cmp(&b.words_per_minute())),
            SortCriteria::Style => self.cues.sort_by(|a, b| a.extra.cmp(&b.extra)),
        }
    }

    /// Insert before the first cue starting later; append when none does.
    pub fn insert_in_time_order(&mut self, cue: Cue) -> usize {
        for i in 0..self.cues.len() {
            if cue.start.total_milliseconds() < self.cues[i].start.total_milliseconds() {
                self.cues.insert(i, cue);
                return i;
            }
        }
        self.cues.push(cue);
        self.cues.len() - 1
    }

    /// Reassign numbers to match the current sequence order; ids untouched.
    pub fn renumber(&mut self, start_number: i32) {
        for (i, cue) in self.cues.iter_mut().enumerate() {
            cue.number = start_number + i as i32;
        }
    }

    // ------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------

    /// Drop cues whose text is whitespace/control-only; renumbers from the
    /// first cue's previous number. Returns the number removed.
    pub fn remove_empty_lines(&mut self) -> usize {
        let count = self.cues.len();
        if count == 0 {
            return 0;
        }
        let first_number = self.cues[0].number;
        self.cues
            .retain(|c| !text::is_only_control_or_whitespace(&c.text));
        let removed = count - self.cues.len();
        if removed > 0 {
            self.renumber(first_number);
        }
        removed
    }

    /// Remove by positions; processed in descending order so earlier
    /// indices stay valid. Returns the number removed.
    pub fn remove_by_indices(&mut self, indices: &[usize]) -> usize {
        let mut sorted: Vec<usize> = indices.to_vec();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        sorted.dedup();

        let mut removed = 0;
        for index in sorted {
            if index < self.cues.len() {
                self.cues.remove(index);
                removed += 1;
            }
        }
        removed
    }

    pub fn remove_by_ids(&mut self, ids: &[&str]) -> usize {
        let before = self.cues.len();
        self.cues.retain(|c| !ids.contains(&c.id()));
        before - self.cues.len()
    }

    // ------------------------------------------------------------------
    // Change detection hashes (non-cryptographic)
    // ------------------------------------------------------------------

    /// Order-sensitive concatenation over (start, end, text); cheap equality
    /// probe for "did anything change".
    pub fn fast_hash(&self) -> String {
        let mut out = String::with_capacity(self.cues.len() * 50);
        for cue in &self.cues {
            out.push_str(&cue.start.total_milliseconds().to_bits().to_string());
            out.push_str(&cue.end.total_milliseconds().to_bits().to_string());
            out.push_str(&cue.text);
        }
        out.trim_end().to_string()
    }

    /// Seeded 32-bit hash additionally covering header, number, style, extra
    /// and actor. Wraparound arithmetic throughout.
    pub fn fast_hash_with(&self, pre: Option<&str>) -> u32 {
        let mut hash: u32 = 17;
        if let Some(pre) = pre {
            hash = hash.wrapping_mul(23).wrapping_add(hash_str(pre));
        }
        if let Some(header) = &self.header {
            hash = hash.wrapping_mul(23).wrapping_add(hash_str(header.trim()));
        }
        for cue in &self.cues {
            hash = hash.wrapping_mul(23).wrapping_add(cue.number as u32);
            hash = hash
                .wrapping_mul(23)
                .wrapping_add(hash_f64(cue.start.total_milliseconds()));
            hash = hash
                .wrapping_mul(23)
                .wrapping_add(hash_f64(cue.end.total_milliseconds()));
            hash = hash.wrapping_mul(23).wrapping_add(hash_str(&cue.text));
            if let Some(style) = &cue.style {
                hash = hash.wrapping_mul(23).wrapping_add(hash_str(style));
            }
            if let Some(extra) = &cue.extra {
                hash = hash.wrapping_mul(23).wrapping_add(hash_str(extra));
            }
            if let Some(actor) = &cue.actor {
                hash = hash.wrapping_mul(23).wrapping_add(hash_str(actor));
            }
        }
        hash
    }

    /// All cue texts joined with newlines.
    pub fn all_texts(&self) -> String {
        let mut out = String::with_capacity(self.cues.len() * 40);
        for cue in &self.cues {
            out.push_str(&cue.text);
            out.push('\n');
        }
        out
    }

    fn next_start_ms(&self, index: usize) -> f64 {
        if index + 1 < self.cues.len() {
            self.cues[index + 1].start.total_milliseconds()
        } else {
            f64::MAX
        }
    }
}

fn is_selected(selection: Option<&[usize]>, index: usize) -> bool {
    selection.map_or(true, |s| s.contains(&index))
}

fn hash_str(s: &str) -> u32 {
    // DJB-style rolling hash
    s.bytes()
        .fold(5381u32, |hash, b| hash.wrapping_mul(33) ^ b as u32)
}

fn hash_f64(value: f64) -> u32 {
    let bits = value.to_bits();
    (bits ^ (bits >> 32)) as u32
}
