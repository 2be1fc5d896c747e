/// Milliseconds per second, the base unit of all timing math.
pub const BASE_UNIT: f64 = 1000.0;

/// A scalar time value in milliseconds.
///
/// The millisecond count is the single source of truth; hour/minute/second
/// accessors are computed on demand. A distinguished max-time sentinel marks
/// cues with no real timing (adjustments on it are no-ops).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeCode {
    total_milliseconds: f64,
}

impl TimeCode {
    /// Sentinel for "no meaningful time" (99:59:59.999 in the display form).
    pub const MAX_TIME_TOTAL_MS: f64 = 359_999_999.0;

    pub fn new(total_milliseconds: f64) -> Self {
        Self { total_milliseconds }
    }

    pub fn from_components(hours: i32, minutes: i32, seconds: i32, milliseconds: i32) -> Self {
        let total = hours as f64 * 3_600_000.0
            + minutes as f64 * 60_000.0
            + seconds as f64 * BASE_UNIT
            + milliseconds as f64;
        Self::new(total)
    }

    pub fn from_seconds(seconds: f64) -> Self {
        Self::new(seconds * BASE_UNIT)
    }

    pub fn max_time() -> Self {
        Self::new(Self::MAX_TIME_TOTAL_MS)
    }

    pub fn is_max_time(&self) -> bool {
        (self.total_milliseconds - Self::MAX_TIME_TOTAL_MS).abs() < 0.01
    }

    pub fn total_milliseconds(&self) -> f64 {
        self.total_milliseconds
    }

    pub fn set_total_milliseconds(&mut self, milliseconds: f64) {
        self.total_milliseconds = milliseconds;
    }

    pub fn total_seconds(&self) -> f64 {
        self.total_milliseconds / BASE_UNIT
    }

    pub fn hours(&self) -> i32 {
        (self.rounded_abs_ms() / 3_600_000) as i32
    }

    pub fn minutes(&self) -> i32 {
        (self.rounded_abs_ms() % 3_600_000 / 60_000) as i32
    }

    pub fn seconds(&self) -> i32 {
        (self.rounded_abs_ms() % 60_000 / 1000) as i32
    }

    pub fn milliseconds(&self) -> i32 {
        (self.rounded_abs_ms() % 1000) as i32
    }

    pub fn is_negative(&self) -> bool {
        self.total_milliseconds < 0.0
    }

    /// Shift by the given amount, unless this is the max-time sentinel.
    pub fn add_milliseconds(&mut self, milliseconds: f64) {
        if self.is_max_time() {
            return;
        }
        self.total_milliseconds += milliseconds;
    }

    fn rounded_abs_ms(&self) -> i64 {
        self.total_milliseconds.round().abs() as i64
    }
}

impl std::fmt::Display for TimeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        write!(
            f,
            "{}{:02}:{:02}:{:02},{:03}",
            sign,
            self.hours(),
            self.minutes(),
            self.seconds(),
            self.milliseconds()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components_from_milliseconds() {
        let tc = TimeCode::new(3_661_234.0);
        assert_eq!(tc.hours(), 1);
        assert_eq!(tc.minutes(), 1);
        assert_eq!(tc.seconds(), 1);
        assert_eq!(tc.milliseconds(), 234);
    }

    #[test]
    fn test_from_components() {
        let tc = TimeCode::from_components(1, 2, 3, 4);
        assert_eq!(tc.total_milliseconds(), 3_723_004.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(TimeCode::new(1500.0).to_string(), "00:00:01,500");
        assert_eq!(TimeCode::new(3_723_004.0).to_string(), "01:02:03,004");
    }

    #[test]
    fn test_max_time_sentinel() {
        let mut tc = TimeCode::max_time();
        assert!(tc.is_max_time());
        tc.add_milliseconds(500.0);
        assert!(tc.is_max_time());

        let mut normal = TimeCode::new(1000.0);
        normal.add_milliseconds(500.0);
        assert_eq!(normal.total_milliseconds(), 1500.0);
    }

    #[test]
    fn test_negative_display() {
        assert_eq!(TimeCode::new(-1500.0).to_string(), "-00:00:01,500");
    }
}
