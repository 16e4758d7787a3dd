//! Item lifecycle status and the stage-marker state machine.
//!
//! The external pipeline emits free-text log lines; the only structure we
//! rely on is a fixed literal substring per stage entry point (a *stage
//! marker*). [`StageMap`] holds that closed, ordered table and maps a line
//! to the stage it announces. Everything else about a line is ignored — the
//! mapping is deliberately best-effort and lossy so the core never depends
//! on structured output from the pipeline scripts.
//!
//! Expected stage order for a successful run:
//!
//! ```text
//! Pending → Preparing → Whispering → Correcting → Translating → Exporting → Done
//! ```
//!
//! with `Error` reachable from any non-terminal state. The orchestrator
//! enforces that observed markers never move an item backwards within one
//! run; re-asserting the current stage is an idempotent no-op.

// ---------------------------------------------------------------------------
// ItemStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a queue item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemStatus {
    /// Imported, waiting for a run.
    Pending,
    /// Pipeline invoked; preparation stage running.
    Preparing,
    /// Speech recognition stage running.
    Whispering,
    /// Transcript correction stage running.
    Correcting,
    /// Translation stage running.
    Translating,
    /// Subtitle export stage running.
    Exporting,
    /// Pipeline invocation returned success.
    Done,
    /// Pipeline invocation failed.
    Error,
}

impl ItemStatus {
    /// Position along the fixed stage order.
    ///
    /// `Error` has no rank — it is reachable from anywhere and terminal.
    pub fn rank(&self) -> Option<u8> {
        match self {
            ItemStatus::Pending => Some(0),
            ItemStatus::Preparing => Some(1),
            ItemStatus::Whispering => Some(2),
            ItemStatus::Correcting => Some(3),
            ItemStatus::Translating => Some(4),
            ItemStatus::Exporting => Some(5),
            ItemStatus::Done => Some(6),
            ItemStatus::Error => None,
        }
    }

    /// `true` for the two states no marker can move an item out of.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ItemStatus::Done | ItemStatus::Error)
    }

    /// Short human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Preparing => "preparing",
            ItemStatus::Whispering => "whispering",
            ItemStatus::Correcting => "correcting",
            ItemStatus::Translating => "translating",
            ItemStatus::Exporting => "exporting",
            ItemStatus::Done => "done",
            ItemStatus::Error => "error",
        }
    }
}

impl Default for ItemStatus {
    fn default() -> Self {
        ItemStatus::Pending
    }
}

// ---------------------------------------------------------------------------
// StageMap
// ---------------------------------------------------------------------------

/// The closed five-stage marker table.
///
/// Each entry is the literal substring the pipeline driver prints when it
/// enters that stage. Order matters: the first matching entry wins.
const STAGE_MARKERS: &[(&str, ItemStatus)] = &[
    ("RUNNING: _0_prepare.py", ItemStatus::Preparing),
    ("RUNNING: _1_whisper.py", ItemStatus::Whispering),
    ("RUNNING: _2_correct.py", ItemStatus::Correcting),
    ("RUNNING: _3_translate.py", ItemStatus::Translating),
    ("RUNNING: _4_output.py", ItemStatus::Exporting),
];

/// Maps log lines to the stage they announce.
///
/// The marker table is fixed at compile time and not extensible at runtime;
/// the type exists so the orchestrator never touches marker text directly
/// and the table can be swapped in one place if the pipeline ever emits
/// structured stage events.
#[derive(Debug, Default, Clone)]
pub struct StageMap;

impl StageMap {
    pub fn new() -> Self {
        Self
    }

    /// Return the stage a log line announces, if any.
    ///
    /// Non-matching lines return `None` and must leave status untouched.
    ///
    /// ```
    /// use subtitle_studio::queue::{ItemStatus, StageMap};
    ///
    /// let stages = StageMap::new();
    /// assert_eq!(
    ///     stages.match_line("--- RUNNING: _1_whisper.py ---"),
    ///     Some(ItemStatus::Whispering)
    /// );
    /// assert_eq!(stages.match_line("loading audio…"), None);
    /// ```
    pub fn match_line(&self, line: &str) -> Option<ItemStatus> {
        STAGE_MARKERS
            .iter()
            .find(|(marker, _)| line.contains(marker))
            .map(|(_, status)| *status)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_stage_marker_maps_to_its_stage() {
        let stages = StageMap::new();
        let cases = [
            ("--- RUNNING: _0_prepare.py ---", ItemStatus::Preparing),
            ("--- RUNNING: _1_whisper.py ---", ItemStatus::Whispering),
            ("--- RUNNING: _2_correct.py ---", ItemStatus::Correcting),
            ("--- RUNNING: _3_translate.py ---", ItemStatus::Translating),
            ("--- RUNNING: _4_output.py ---", ItemStatus::Exporting),
        ];
        for (line, expected) in cases {
            assert_eq!(stages.match_line(line), Some(expected), "{line}");
        }
    }

    #[test]
    fn marker_is_matched_as_substring_anywhere_in_the_line() {
        let stages = StageMap::new();
        assert_eq!(
            stages.match_line("[12:00:01] RUNNING: _2_correct.py (pass 2)"),
            Some(ItemStatus::Correcting)
        );
    }

    #[test]
    fn ordinary_pipeline_output_matches_nothing() {
        let stages = StageMap::new();
        for line in [
            "",
            "loading model weights",
            "RUNNING: _5_cleanup.py",
            "progress 42%",
            "ERR: traceback follows",
        ] {
            assert_eq!(stages.match_line(line), None, "{line:?}");
        }
    }

    #[test]
    fn ranks_follow_the_stage_order() {
        let order = [
            ItemStatus::Pending,
            ItemStatus::Preparing,
            ItemStatus::Whispering,
            ItemStatus::Correcting,
            ItemStatus::Translating,
            ItemStatus::Exporting,
            ItemStatus::Done,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].rank() < pair[1].rank(), "{pair:?}");
        }
        assert_eq!(ItemStatus::Error.rank(), None);
    }

    #[test]
    fn terminal_states_are_done_and_error() {
        assert!(ItemStatus::Done.is_terminal());
        assert!(ItemStatus::Error.is_terminal());
        assert!(!ItemStatus::Exporting.is_terminal());
        assert!(!ItemStatus::Pending.is_terminal());
    }

    #[test]
    fn default_status_is_pending() {
        assert_eq!(ItemStatus::default(), ItemStatus::Pending);
    }
}
