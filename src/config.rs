use crate::error::{Result, SubtrackError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ambient timing defaults.
///
/// The engine never reads these through global state; callers load a
/// `Settings` once and thread the values (frame rate in particular) through
/// the operations that need them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Frame rate used when a frame-based dialect carries no rate of its own.
    pub current_frame_rate: f64,
    /// Gap enforced between cues by display-time recalculation, in ms.
    pub min_milliseconds_between_lines: f64,
    /// Lower bound for reading-speed derived display durations, in ms.
    pub subtitle_minimum_display_ms: f64,
    /// Upper bound for reading-speed derived display durations, in ms.
    pub subtitle_maximum_display_ms: f64,
    /// Reading speed considered comfortable, characters per second.
    pub optimal_chars_per_second: f64,
    /// Reading speed ceiling used by display-time recalculation.
    pub max_chars_per_second: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            current_frame_rate: 23.976,
            min_milliseconds_between_lines: 24.0,
            subtitle_minimum_display_ms: 1000.0,
            subtitle_maximum_display_ms: 8000.0,
            optimal_chars_per_second: 14.7,
            max_chars_per_second: 25.0,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        let mut settings = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                if let Ok(file_settings) = toml::from_str::<Settings>(&contents) {
                    settings = file_settings;
                }
            }
        }

        // Override with environment variables
        if let Ok(rate) = std::env::var("SUBTRACK_FRAME_RATE") {
            if let Ok(r) = rate.parse() {
                settings.current_frame_rate = r;
            }
        }
        if let Ok(cps) = std::env::var("SUBTRACK_MAX_CPS") {
            if let Ok(c) = cps.parse() {
                settings.max_chars_per_second = c;
            }
        }
        if let Ok(gap) = std::env::var("SUBTRACK_MIN_GAP_MS") {
            if let Ok(g) = gap.parse() {
                settings.min_milliseconds_between_lines = g;
            }
        }

        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.current_frame_rate <= 0.0 || self.current_frame_rate >= 500.0 {
            return Err(SubtrackError::Config(format!(
                "Frame rate must be between 0 and 500, got {}",
                self.current_frame_rate
            )));
        }
        if self.max_chars_per_second <= 0.0 {
            return Err(SubtrackError::Config(
                "Maximum characters per second must be greater than 0".to_string(),
            ));
        }
        if self.subtitle_minimum_display_ms > self.subtitle_maximum_display_ms {
            return Err(SubtrackError::Config(
                "Minimum display duration exceeds maximum".to_string(),
            ));
        }
        Ok(())
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("subtrack").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.current_frame_rate, 23.976);
        assert_eq!(settings.min_milliseconds_between_lines, 24.0);
        assert_eq!(settings.max_chars_per_second, 25.0);
    }

    #[test]
    fn test_validate_defaults() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_validate_bad_frame_rate() {
        let mut settings = Settings::default();
        settings.current_frame_rate = 0.0;
        assert!(settings.validate().is_err());

        settings.current_frame_rate = 600.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_display_bounds() {
        let mut settings = Settings::default();
        settings.subtitle_minimum_display_ms = 9000.0;
        assert!(settings.validate().is_err());
    }
}
