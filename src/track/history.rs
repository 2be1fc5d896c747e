//! Bounded undo log of track snapshots.

use super::Track;
use std::time::SystemTime;
use tracing::debug;

/// Rollback points kept before the oldest entry is evicted.
pub const MAX_HISTORY_ITEMS: usize = 100;

/// Host cursor position captured alongside a snapshot so an undo can also
/// restore where the user was editing.
#[derive(Debug, Clone, Copy, Default)]
pub struct CursorState {
    pub line_number: i32,
    pub line_position: i32,
    pub line_position_alternate: i32,
}

/// One rollback point: an identity-preserving deep copy of the track at
/// capture time, never aliased by later live edits.
#[derive(Debug)]
pub struct HistoryItem {
    pub sequence: usize,
    pub snapshot: Track,
    pub description: String,
    pub file_name: String,
    pub file_modified: Option<SystemTime>,
    pub format_friendly_name: String,
    pub original: Option<Track>,
    pub original_file_name: Option<String>,
    pub cursor: CursorState,
    pub timestamp: SystemTime,
}

/// What an undo hands back to callers that track "diff against original"
/// separately from "diff against previous".
#[derive(Debug)]
pub struct UndoState {
    pub description: String,
    pub format_friendly_name: String,
    pub file_modified: Option<SystemTime>,
    pub original: Option<Track>,
    pub original_file_name: Option<String>,
}

impl Track {
    /// Capture the current cues as a rollback point, evicting the oldest
    /// entry once the log is full.
    #[allow(clippy::too_many_arguments)]
    pub fn push_history(
        &mut self,
        description: &str,
        format_friendly_name: &str,
        file_modified: Option<SystemTime>,
        original: Option<&Track>,
        original_file_name: Option<&str>,
        cursor: CursorState,
    ) {
        let snapshot = self.clone_with_same_identity();
        let original = original.map(Track::clone_with_same_identity);
        let file_name = self.file_name.clone();

        let history = self.history_mut();
        if history.len() >= MAX_HISTORY_ITEMS {
            history.remove(0);
        }
        let sequence = history.len();
        debug!(sequence, description, "pushing history snapshot");
        history.push(HistoryItem {
            sequence,
            snapshot,
            description: description.to_string(),
            file_name,
            file_modified,
            format_friendly_name: format_friendly_name.to_string(),
            original,
            original_file_name: original_file_name.map(str::to_string),
            cursor,
            timestamp: SystemTime::now(),
        });
    }

    pub fn can_undo(&self) -> bool {
        !self.history().is_empty()
    }

    pub fn history_len(&self) -> usize {
        self.history().len()
    }

    /// Replace the live cues with deep copies from the given rollback point.
    /// Ids are preserved, not regenerated: undo must restore exact prior
    /// identity. Returns `None` when the index is out of range.
    pub fn undo_to(&mut self, index: usize) -> Option<UndoState> {
        if index >= self.history().len() {
            return None;
        }

        let (cues, state, file_name) = {
            let item = &self.history()[index];
            let cues: Vec<_> = item
                .snapshot
                .cues
                .iter()
                .map(|c| c.clone_with_same_identity())
                .collect();
            let state = UndoState {
                description: item.description.clone(),
                format_friendly_name: item.format_friendly_name.clone(),
                file_modified: item.file_modified,
                original: item.original.as_ref().map(Track::clone_with_same_identity),
                original_file_name: item.original_file_name.clone(),
            };
            (cues, state, item.file_name.clone())
        };

        self.cues = cues;
        self.file_name = file_name;
        Some(state)
    }
}
