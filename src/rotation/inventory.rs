use anyhow::{Result, bail};

use crate::models::DanceId;

/// How the engine treats the per-dance weights over a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Weights are never exhausted, only down-weighted as categories are used
    Continuous,
    /// Weights are a literal finite supply consumed until every category is empty
    MixBuild,
}

/// One row of the weight table
#[derive(Debug, Clone)]
pub struct DanceWeight {
    pub id: DanceId,
    pub weight: f64,
    pub remaining_supply: Option<u32>, // Populated in mix-build mode only
    pub play_count: u32,               // Advanced by record_play_weight in continuous mode
}

/// Per-dance weight table.
///
/// Entries keep the insertion order of the count list supplied at
/// construction; a dance absent from that list is never eligible.
#[derive(Debug, Clone)]
pub struct DanceInventory {
    entries: Vec<DanceWeight>,
    mode: SelectionMode,
}

impl DanceInventory {
    /// Build the weight table from a snapshot count list.
    ///
    /// Dances with a zero count are dropped up front; an inventory with no
    /// eligible dance at all cannot produce a selection and is rejected.
    pub fn new(counts: Vec<(DanceId, u32)>, mode: SelectionMode) -> Result<Self> {
        let entries: Vec<DanceWeight> = counts
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(id, count)| DanceWeight {
                id,
                weight: f64::from(count),
                remaining_supply: match mode {
                    SelectionMode::Continuous => None,
                    SelectionMode::MixBuild => Some(count),
                },
                play_count: 0,
            })
            .collect();

        if entries.is_empty() {
            bail!("Cannot build a selection inventory without any eligible dances");
        }

        Ok(Self { entries, mode })
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Whether the dance can currently be offered to the sampler
    pub fn is_eligible(&self, id: &str) -> bool {
        self.entry(id).is_some_and(|e| {
            e.weight > 0.0 && e.remaining_supply.is_none_or(|supply| supply > 0)
        })
    }

    /// All currently eligible entries, in insertion order
    pub fn eligible(&self) -> impl Iterator<Item = &DanceWeight> {
        self.entries.iter().filter(|e| {
            e.weight > 0.0 && e.remaining_supply.is_none_or(|supply| supply > 0)
        })
    }

    /// True once no dance remains eligible (mix-build exhaustion)
    pub fn is_exhausted(&self) -> bool {
        self.eligible().next().is_none()
    }

    /// Record a continuous-mode play: the play count advances, the weight
    /// itself is untouched. Unknown ids are a caller bug.
    pub fn record_play_weight(&mut self, id: &str) {
        let Some(entry) = self.entry_mut(id) else {
            debug_assert!(false, "record_play_weight called with unknown dance '{id}'");
            return;
        };
        entry.play_count += 1;
    }

    /// Consume one unit of mix-build supply. At zero the dance becomes
    /// permanently ineligible for the remainder of the session.
    pub fn consume_supply(&mut self, id: &str) {
        let Some(entry) = self.entry_mut(id) else {
            debug_assert!(false, "consume_supply called with unknown dance '{id}'");
            return;
        };
        match entry.remaining_supply.as_mut() {
            Some(supply) => *supply = supply.saturating_sub(1),
            None => debug_assert!(false, "consume_supply called in continuous mode"),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entry(id).is_some()
    }

    fn entry(&self, id: &str) -> Option<&DanceWeight> {
        self.entries.iter().find(|e| e.id == id)
    }

    fn entry_mut(&mut self, id: &str) -> Option<&mut DanceWeight> {
        self.entries.iter_mut().find(|e| e.id == id)
    }
}
