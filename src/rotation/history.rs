use std::cell::RefCell;
use std::rc::Rc;

use crate::models::DanceId;

/// Read-only window into the caller-owned play history.
///
/// The engine never stores positional history itself; it asks the caller
/// "what dance was selected `offset` positions back" through this trait.
/// Offset 1 is the most recent entry. `None` means the history does not
/// reach that far back.
#[cfg_attr(test, mockall::automock)]
pub trait HistoryOracle {
    fn lookup(&self, offset: u32) -> Option<DanceId>;
}

/// Vec-backed history shared between the queue owner and the engine.
///
/// The queue side keeps a clone of the same handle and appends to it as
/// items land in the externally-owned queue; the engine only reads.
#[derive(Debug, Clone, Default)]
pub struct RecentHistory {
    entries: Rc<RefCell<Vec<DanceId>>>,
}

impl RecentHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a selection to the history (queue-owner side)
    pub fn push(&self, id: DanceId) {
        self.entries.borrow_mut().push(id);
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl HistoryOracle for RecentHistory {
    fn lookup(&self, offset: u32) -> Option<DanceId> {
        if offset == 0 {
            return None;
        }
        let entries = self.entries.borrow();
        entries
            .len()
            .checked_sub(offset as usize)
            .map(|index| entries[index].clone())
    }
}
