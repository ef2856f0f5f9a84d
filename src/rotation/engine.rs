use anyhow::Result;

use super::config::SelectionProfile;
use super::history::HistoryOracle;
use super::inventory::{DanceInventory, SelectionMode};
use super::recency::RecencyTracker;
use super::sampler::{ScoredCandidate, WeightedSampler};
use super::scoring::SelectionScoring;
use crate::models::{DanceCatalog, DanceId};

/// The automatic dance-selection engine.
///
/// Owns the weight table and recency state for one selection session and
/// draws the next dance category on demand. The caller drives the cycle:
///
/// ```text
/// select(prior_counter)
///   -> record_play_weight(id)   (continuous mode)
///      or consume_supply(id)    (mix-build mode)
///   -> record_last_played(id)
///   -> next select(...)
/// ```
///
/// The engine performs no I/O and never blocks; one call is a single RNG
/// draw plus a linear scan over the eligible candidates.
pub struct SelectionEngine {
    catalog: DanceCatalog,
    profile: SelectionProfile,
    inventory: DanceInventory,
    tracker: RecencyTracker,
    sampler: WeightedSampler,
    oracle: Option<Box<dyn HistoryOracle>>,
}

impl SelectionEngine {
    /// Build a continuous-autoselect engine from a snapshot count list.
    ///
    /// Weights are never exhausted in this mode, only down-weighted as
    /// categories are played. Fails when the profile is invalid or no dance
    /// in the count list is eligible.
    pub fn new(
        catalog: DanceCatalog,
        counts: Vec<(DanceId, u32)>,
        profile: SelectionProfile,
        oracle: Option<Box<dyn HistoryOracle>>,
    ) -> Result<Self> {
        Self::with_mode(catalog, counts, profile, oracle, SelectionMode::Continuous)
    }

    /// Build a mix-build engine: the counts are a literal finite supply
    /// consumed until every category is empty.
    pub fn new_mix_build(
        catalog: DanceCatalog,
        counts: Vec<(DanceId, u32)>,
        profile: SelectionProfile,
        oracle: Option<Box<dyn HistoryOracle>>,
    ) -> Result<Self> {
        Self::with_mode(catalog, counts, profile, oracle, SelectionMode::MixBuild)
    }

    fn with_mode(
        catalog: DanceCatalog,
        counts: Vec<(DanceId, u32)>,
        profile: SelectionProfile,
        oracle: Option<Box<dyn HistoryOracle>>,
        mode: SelectionMode,
    ) -> Result<Self> {
        profile.validate()?;
        let inventory = DanceInventory::new(counts, mode)?;
        Ok(Self {
            catalog,
            profile,
            inventory,
            tracker: RecencyTracker::new(),
            sampler: WeightedSampler::new(),
            oracle,
        })
    }

    /// Replace the sampler RNG with a seeded one for reproducible sessions
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.sampler = WeightedSampler::with_seed(seed);
        self
    }

    pub fn mode(&self) -> SelectionMode {
        self.inventory.mode()
    }

    pub fn selections_made(&self) -> u32 {
        self.tracker.selections_made()
    }

    /// Mix-build terminal state: no eligible candidate remains
    pub fn is_exhausted(&self) -> bool {
        self.inventory.is_exhausted()
    }

    /// Choose the next dance category.
    ///
    /// `prior_counter` is the caller's running count of items appended to
    /// the external history; it bounds how far back the history oracle is
    /// queried. Returns `None` only in the exhausted mix-build state.
    pub fn select(&mut self, prior_counter: u32) -> Option<DanceId> {
        let candidates: Vec<ScoredCandidate> = self
            .inventory
            .eligible()
            .map(|entry| ScoredCandidate {
                id: entry.id.clone(),
                score: SelectionScoring::calculate_score(
                    entry,
                    &self.profile,
                    &self.catalog,
                    &self.tracker,
                    self.oracle.as_deref(),
                    prior_counter,
                ),
            })
            .collect();

        self.sampler.draw(&candidates)
    }

    /// Continuous-mode bookkeeping: advance the play count of a selected
    /// dance so its share of future draws decays
    pub fn record_play_weight(&mut self, id: &str) {
        self.inventory.record_play_weight(id);
    }

    /// Mix-build depletion: consume one unit of the selected dance's supply
    pub fn consume_supply(&mut self, id: &str) {
        self.inventory.consume_supply(id);
    }

    /// Update the adjacency tracker with the selection that actually got
    /// queued. Must be called after every selection in both modes.
    pub fn record_last_played(&mut self, id: &str) {
        if !self.inventory.contains(id) {
            debug_assert!(false, "record_last_played called with unknown dance '{id}'");
            return;
        }
        self.tracker.record(id, &self.catalog);
    }
}
