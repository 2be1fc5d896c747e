//! Integration tests for subtrack
//!
//! These tests validate the interaction between detection, parsing,
//! rendering and track editing without touching the filesystem except
//! where file round-trips are the point.

use subtrack::config::Settings;
use subtrack::cue::Cue;
use subtrack::envelope::CaptionEnvelope;
use subtrack::error::SubtrackError;
use subtrack::format::{FormatRegistry, ParseContext};
use subtrack::track::history::CursorState;
use subtrack::track::{SortCriteria, Track};

fn lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

const SRT: &str = "1\n00:00:01,000 --> 00:00:03,000\nHello\nworld\n\n2\n00:00:04,000 --> 00:00:06,000\nSecond cue\n";

// ============================================================================
// Detection Integration Tests
// ============================================================================

mod detection_tests {
    use super::*;

    #[test]
    fn test_each_dialect_is_detected() {
        let samples = [
            ("SubRip", SRT.to_string()),
            (
                "WebVTT",
                "WEBVTT\n\n00:00:01.000 --> 00:00:03.000\nHello\n".to_string(),
            ),
            (
                "Advanced Sub Station Alpha",
                "[Script Info]\nTitle: t\n\n[Events]\nFormat: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\nDialogue: 0,0:00:01.00,0:00:03.00,Default,,0,0,0,,Hello\n".to_string(),
            ),
            ("MicroDVD", "{25}{50}Hello\n{75}{100}World".to_string()),
            ("YouTube SBV", "0:00:01.000,0:00:03.000\nHello\n".to_string()),
            ("MPlayer2", "[10][30]Hello\n[45][60]World".to_string()),
            ("TMPlayer", "00:00:01:Hello\n00:00:05:World".to_string()),
        ];

        let registry = FormatRegistry::default();
        for (expected, sample) in samples {
            let detected = registry
                .detect_and_load(&lines(&sample), &ParseContext::new(25.0), None)
                .unwrap_or_else(|e| panic!("{} sample not detected: {}", expected, e));
            assert_eq!(detected.format_name, expected);
            assert!(!detected.track.cues.is_empty());
        }
    }

    #[test]
    fn test_unrecognized_input_is_an_error() {
        let registry = FormatRegistry::default();
        let result = registry.detect_and_load(
            &lines("completely unrelated\nprose text\nwith no timing"),
            &ParseContext::default(),
            None,
        );
        assert!(matches!(result, Err(SubtrackError::UnrecognizedFormat)));
    }

    #[test]
    fn test_partial_degradation_keeps_valid_subset() {
        let registry = FormatRegistry::default();
        let input = lines("1\n00:00:01,000 --> 00:00:03,000\nGood\n\nbroken block\n\n3\n00:00:07,000 --> 00:00:09,000\nAlso good\n");
        let detected = registry
            .detect_and_load(&input, &ParseContext::default(), None)
            .unwrap();
        assert_eq!(detected.track.cues.len(), 2);
        assert_eq!(detected.error_count, 1);
    }
}

// ============================================================================
// Conversion Integration Tests
// ============================================================================

mod conversion_tests {
    use super::*;

    #[test]
    fn test_srt_to_vtt_to_srt_preserves_content() {
        let registry = FormatRegistry::default();
        let original = registry
            .detect_and_load(&lines(SRT), &ParseContext::default(), None)
            .unwrap()
            .track;

        let vtt = registry.find_by_name("WebVTT").unwrap();
        let rendered_vtt = vtt.render(&original, "test", false);
        let reloaded = registry
            .detect_and_load(&lines(&rendered_vtt), &ParseContext::default(), None)
            .unwrap();
        assert_eq!(reloaded.format_name, "WebVTT");

        let srt = registry.find_by_name("SubRip").unwrap();
        let rendered_srt = srt.render(&reloaded.track, "test", false);
        let back = registry
            .detect_and_load(&lines(&rendered_srt), &ParseContext::default(), None)
            .unwrap()
            .track;

        assert_eq!(back.cues.len(), original.cues.len());
        for (a, b) in original.cues.iter().zip(back.cues.iter()) {
            assert_eq!(a.start.total_milliseconds(), b.start.total_milliseconds());
            assert_eq!(a.end.total_milliseconds(), b.end.total_milliseconds());
            assert_eq!(a.text, b.text);
        }
    }

    #[test]
    fn test_frame_based_to_time_based_conversion() {
        let registry = FormatRegistry::default();
        let detected = registry
            .detect_and_load(&lines("{25}{50}Hello\n{75}{100}World"), &ParseContext::new(25.0), None)
            .unwrap();
        assert!(detected.track.was_frame_based());

        let srt = registry.find_by_name("SubRip").unwrap();
        let rendered = srt.render(&detected.track, "test", false);
        assert!(rendered.contains("00:00:01,000 --> 00:00:02,000"));
        assert!(rendered.contains("00:00:03,000 --> 00:00:04,000"));
    }

    #[test]
    fn test_conversion_through_file(){
        let registry = FormatRegistry::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.vtt");

        let track = registry
            .detect_and_load(&lines(SRT), &ParseContext::default(), None)
            .unwrap()
            .track;
        let vtt = registry.find_by_name("WebVTT").unwrap();
        std::fs::write(&path, vtt.render(&track, "test", false)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let reloaded = registry
            .detect_and_load(&lines(&content), &ParseContext::default(), None)
            .unwrap();
        assert_eq!(reloaded.format_name, "WebVTT");
        assert_eq!(reloaded.track.cues.len(), 2);
    }
}

// ============================================================================
// Timing Integration Tests
// ============================================================================

mod timing_tests {
    use super::*;

    #[test]
    fn test_frame_time_inverse_for_common_rates() {
        for rate in [3.0, 23.976, 24.0, 25.0, 29.97, 30.0, 59.94, 60.0, 123.456, 499.0] {
            let mut track = Track::new();
            for i in 0..20 {
                track
                    .cues
                    .push(Cue::from_frames(i * 40, i * 40 + 30, format!("cue {}", i)));
            }
            let frames: Vec<_> = track.cues.iter().map(|c| (c.start_frame, c.end_frame)).collect();

            for cue in &mut track.cues {
                cue.calculate_time_codes_from_frame_numbers(rate);
            }
            track.calculate_frame_numbers_from_time_codes_no_check(rate);

            let back: Vec<_> = track.cues.iter().map(|c| (c.start_frame, c.end_frame)).collect();
            assert_eq!(frames, back, "rate {}", rate);
        }
    }

    #[test]
    fn test_change_frame_rate_scales_times() {
        let registry = FormatRegistry::default();
        let mut track = registry
            .detect_and_load(&lines(SRT), &ParseContext::default(), None)
            .unwrap()
            .track;

        track.change_frame_rate(25.0, 50.0);
        assert_eq!(track.cues[0].start.total_milliseconds(), 500.0);
        assert_eq!(track.cues[0].end.total_milliseconds(), 1500.0);

        track.change_frame_rate(50.0, 25.0);
        assert_eq!(track.cues[0].start.total_milliseconds(), 1000.0);
        assert_eq!(track.cues[0].end.total_milliseconds(), 3000.0);
    }

    #[test]
    fn test_offset_and_sort_pipeline() {
        let registry = FormatRegistry::default();
        let mut track = registry
            .detect_and_load(&lines(SRT), &ParseContext::default(), None)
            .unwrap()
            .track;

        track.add_time_to_all_cues(-500.0);
        assert_eq!(track.cues[0].start.total_milliseconds(), 500.0);

        track.sort(SortCriteria::StartTime);
        assert!(track.cues[0].start.total_milliseconds() <= track.cues[1].start.total_milliseconds());
    }

    #[test]
    fn test_recalculate_display_times_respects_gap() {
        let settings = Settings::default();
        let mut track = Track::new();
        track.cues.push(Cue::from_milliseconds(
            "A rather long line that wants plenty of display time on screen",
            0.0,
            100.0,
        ));
        track.cues.push(Cue::from_milliseconds("Next", 1200.0, 2500.0));

        track.recalculate_display_times(settings.max_chars_per_second, None, &settings);

        let first_end = track.cues[0].end.total_milliseconds();
        let next_start = track.cues[1].start.total_milliseconds();
        assert!(first_end <= next_start - settings.min_milliseconds_between_lines);
        assert!(first_end > 100.0);
    }
}

// ============================================================================
// History Integration Tests
// ============================================================================

mod history_tests {
    use super::*;

    #[test]
    fn test_edit_and_undo_cycle() {
        let registry = FormatRegistry::default();
        let mut track = registry
            .detect_and_load(&lines(SRT), &ParseContext::default(), None)
            .unwrap()
            .track;
        let first_id = track.cues[0].id().to_string();

        track.push_history(
            "before shifting",
            "SubRip (.srt)",
            None,
            None,
            None,
            CursorState::default(),
        );
        track.add_time_to_all_cues(10_000.0);
        track.cues[0].text = "edited".to_string();

        let state = track.undo_to(0).expect("undo state");
        assert_eq!(state.description, "before shifting");
        assert_eq!(track.cues[0].start.total_milliseconds(), 1000.0);
        assert_eq!(track.cues[0].text, "Hello\nworld");
        assert_eq!(track.cues[0].id(), first_id);
    }

    #[test]
    fn test_hash_detects_modification_and_undo_restores_it() {
        let registry = FormatRegistry::default();
        let mut track = registry
            .detect_and_load(&lines(SRT), &ParseContext::default(), None)
            .unwrap()
            .track;

        let clean = track.fast_hash();
        track.push_history("edit", "SubRip (.srt)", None, None, None, CursorState::default());
        track.cues[1].text = "changed".to_string();
        assert_ne!(track.fast_hash(), clean);

        track.undo_to(0).unwrap();
        assert_eq!(track.fast_hash(), clean);
    }
}

// ============================================================================
// Envelope Integration Tests
// ============================================================================

mod envelope_tests {
    use super::*;

    #[test]
    fn test_envelope_carries_rendered_track() {
        let registry = FormatRegistry::default();
        let track = registry
            .detect_and_load(&lines(SRT), &ParseContext::default(), None)
            .unwrap()
            .track;

        let srt = registry.find_by_name("SubRip").unwrap();
        let envelope = CaptionEnvelope::new(srt.name(), srt.render(&track, "test", false));
        let json = envelope.to_json().unwrap();

        let received = CaptionEnvelope::from_json(&json).unwrap();
        let reloaded = registry
            .detect_and_load(
                &lines(&received.content),
                &ParseContext::default(),
                Some(&received.format),
            )
            .unwrap();
        assert_eq!(reloaded.format_name, "SubRip");
        assert_eq!(reloaded.track.cues.len(), 2);
    }
}
