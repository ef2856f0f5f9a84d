use crate::models::{DanceCatalog, DanceId};

/// O(1) memory of the immediately preceding selections.
///
/// Tracks just enough to apply the back-to-back penalties: the last two
/// selected dances with their derived attributes, plus how many selections
/// this session has made (for the beginning-of-session window). Positional
/// history beyond that is the history oracle's job.
#[derive(Debug, Clone, Default)]
pub struct RecencyTracker {
    last: Option<SelectionMemo>,
    prior: Option<SelectionMemo>,
    selections_made: u32,
}

/// Attributes of one remembered selection, resolved once at record time
#[derive(Debug, Clone)]
struct SelectionMemo {
    id: DanceId,
    is_fast: bool,
    tags: Vec<String>,
}

impl RecencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed selection, shifting the previous one back a slot
    pub fn record(&mut self, id: &str, catalog: &DanceCatalog) {
        let memo = SelectionMemo {
            id: id.to_string(),
            is_fast: catalog.is_fast(id),
            tags: catalog.tags_of(id),
        };
        self.prior = self.last.take();
        self.last = Some(memo);
        self.selections_made += 1;
    }

    pub fn last_selected(&self) -> Option<&DanceId> {
        self.last.as_ref().map(|m| &m.id)
    }

    pub fn last_was_fast(&self) -> bool {
        self.last.as_ref().is_some_and(|m| m.is_fast)
    }

    /// Tags carried by the last selection; empty before any selection
    pub fn last_tags(&self) -> &[String] {
        self.last.as_ref().map(|m| m.tags.as_slice()).unwrap_or(&[])
    }

    /// Tags carried by the selection before the last one
    pub fn prior_tags(&self) -> &[String] {
        self.prior.as_ref().map(|m| m.tags.as_slice()).unwrap_or(&[])
    }

    pub fn selections_made(&self) -> u32 {
        self.selections_made
    }
}
