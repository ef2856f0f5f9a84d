use super::config::{
    AdjacencyWeights, BeginningWindow, RecencyWeights, SelectionProfile, SimilarityBlend,
};
use super::history::HistoryOracle;
use super::inventory::DanceWeight;
use super::recency::RecencyTracker;
use crate::models::{Dance, DanceCatalog};

/// Score calculation for selection candidates
pub struct SelectionScoring;

impl SelectionScoring {
    /// Combine inventory weight, recency, adjacency and beginning-window
    /// factors into a single non-negative score for one candidate.
    ///
    /// All penalty factors are multiplicative, so any hard zero (such as the
    /// beginning-window exclusion) wins regardless of the base weight.
    pub fn calculate_score(
        entry: &DanceWeight,
        profile: &SelectionProfile,
        catalog: &DanceCatalog,
        tracker: &RecencyTracker,
        oracle: Option<&dyn HistoryOracle>,
        prior_counter: u32,
    ) -> f64 {
        let score = Self::base_weight(entry, profile.prior_exponent)
            * Self::recency_penalty(&entry.id, &profile.recency, oracle, prior_counter)
            * Self::adjacency_penalty(&entry.id, &profile.adjacency, catalog, tracker)
            * Self::beginning_penalty(&entry.id, &profile.beginning, catalog, tracker);
        score.max(0.0)
    }

    /// Base score from the weight table.
    ///
    /// Continuous mode divides the exponentiated library weight by the
    /// dance's own play count, so heavily used categories decay and
    /// under-represented ones catch up. Mix-build mode scores the literal
    /// remaining supply instead.
    pub fn base_weight(entry: &DanceWeight, prior_exponent: f64) -> f64 {
        match entry.remaining_supply {
            Some(supply) => f64::from(supply).powf(prior_exponent),
            None => entry.weight.powf(prior_exponent) / (1.0 + f64::from(entry.play_count)),
        }
    }

    /// Multiplicative suppression from recent appearances in the
    /// caller-owned history.
    ///
    /// Each offset `k` at which the candidate appears contributes a factor
    /// of `1 - strength * decay^(k-1)`: an immediate match nearly zeroes the
    /// score, matches further back barely matter. Only offsets the history
    /// can actually answer (bounded by `prior_counter`) are queried.
    pub fn recency_penalty(
        id: &str,
        weights: &RecencyWeights,
        oracle: Option<&dyn HistoryOracle>,
        prior_counter: u32,
    ) -> f64 {
        let Some(oracle) = oracle else {
            return 1.0;
        };

        let mut penalty = 1.0;
        for offset in 1..=weights.lookback.min(prior_counter) {
            if oracle.lookup(offset).as_deref() == Some(id) {
                let suppression = weights.strength * weights.decay.powi(offset as i32 - 1);
                penalty *= (1.0 - suppression).max(0.0);
            }
        }
        penalty
    }

    /// Back-to-back penalties against the last one or two selections
    pub fn adjacency_penalty(
        id: &str,
        weights: &AdjacencyWeights,
        catalog: &DanceCatalog,
        tracker: &RecencyTracker,
    ) -> f64 {
        let Some(last_id) = tracker.last_selected() else {
            return 1.0; // Nothing played yet, nothing to clash with
        };

        let mut penalty = 1.0;

        if catalog.is_fast(id) && tracker.last_was_fast() {
            penalty *= weights.fast_penalty;
        }

        if let Some(candidate) = catalog.get(id) {
            if candidate.shares_tag_with(tracker.last_tags()) {
                penalty *= weights.tag_penalty;
            }
            if candidate.shares_tag_with(tracker.prior_tags()) {
                penalty *= weights.tag_penalty_prior;
            }
            if let Some(last) = catalog.get(last_id) {
                let similarity =
                    Self::blended_similarity(candidate, last, &weights.similarity_blend);
                penalty *= 1.0 - weights.similarity_strength * similarity;
            }
        }

        penalty
    }

    /// Suppress fast dances while the session is still warming up
    pub fn beginning_penalty(
        id: &str,
        window: &BeginningWindow,
        catalog: &DanceCatalog,
        tracker: &RecencyTracker,
    ) -> f64 {
        if catalog.is_fast(id) && tracker.selections_made() < window.window {
            window.fast_penalty
        } else {
            1.0
        }
    }

    /// Weighted similarity between two dances (0.0 to 1.0), blending tag
    /// overlap with rating and level closeness
    pub fn blended_similarity(a: &Dance, b: &Dance, blend: &SimilarityBlend) -> f64 {
        blend.tag_weight * tag_overlap(a, b)
            + blend.rating_weight * attribute_closeness(a.rating, b.rating)
            + blend.level_weight * attribute_closeness(a.level, b.level)
    }
}

/// Jaccard overlap of the two dances' tag sets; 0.0 when neither has tags
fn tag_overlap(a: &Dance, b: &Dance) -> f64 {
    let tags_a = a.get_all_tags();
    let tags_b = b.get_all_tags();
    if tags_a.is_empty() && tags_b.is_empty() {
        return 0.0;
    }

    let shared = tags_a.iter().filter(|t| tags_b.contains(t)).count();
    let union = tags_a.len() + tags_b.len() - shared;
    shared as f64 / union as f64
}

/// Closeness of two 1-10 scale attributes; neutral when either is missing
fn attribute_closeness(a: Option<u32>, b: Option<u32>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => 1.0 - f64::from(a.abs_diff(b)).min(9.0) / 9.0,
        _ => 0.5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotation::history::MockHistoryOracle;
    use crate::rotation::inventory::{DanceInventory, SelectionMode};
    use approx::assert_relative_eq;
    use mockall::predicate::eq;

    fn test_profile() -> SelectionProfile {
        SelectionProfile::default()
    }

    fn catalog() -> DanceCatalog {
        DanceCatalog::new(vec![
            Dance {
                id: "waltz".to_string(),
                name: "Waltz".to_string(),
                tags: vec!["smooth".to_string()],
                rating: Some(8),
                level: Some(3),
                song_count: 40,
                ..Dance::default()
            },
            Dance {
                id: "foxtrot".to_string(),
                name: "Foxtrot".to_string(),
                tags: vec!["smooth".to_string()],
                rating: Some(6),
                level: Some(4),
                song_count: 30,
                ..Dance::default()
            },
            Dance {
                id: "jive".to_string(),
                name: "Jive".to_string(),
                is_fast: true,
                tags: vec!["swing".to_string()],
                rating: Some(7),
                level: Some(5),
                song_count: 25,
                ..Dance::default()
            },
            Dance {
                id: "quickstep".to_string(),
                name: "Quickstep".to_string(),
                is_fast: true,
                tags: vec!["smooth".to_string()],
                rating: Some(5),
                level: Some(6),
                song_count: 20,
                ..Dance::default()
            },
        ])
    }

    fn entry_for(id: &str, weight: u32) -> DanceWeight {
        let inventory =
            DanceInventory::new(vec![(id.to_string(), weight)], SelectionMode::Continuous).unwrap();
        inventory.eligible().next().unwrap().clone()
    }

    #[test]
    fn test_base_weight_rewards_larger_libraries_superlinearly() {
        let small = entry_for("waltz", 2);
        let large = entry_for("foxtrot", 4);

        let ratio = SelectionScoring::base_weight(&large, 1.5)
            / SelectionScoring::base_weight(&small, 1.5);
        assert!(ratio > 2.0, "exponent > 1 should beat the raw 2:1 ratio, got {ratio}");
    }

    #[test]
    fn test_base_weight_decays_with_play_count() {
        let mut entry = entry_for("waltz", 4);
        let fresh = SelectionScoring::base_weight(&entry, 1.1);
        entry.play_count = 3;
        let used = SelectionScoring::base_weight(&entry, 1.1);

        assert_relative_eq!(used, fresh / 4.0, max_relative = 1e-9);
    }

    #[test]
    fn test_base_weight_uses_remaining_supply_in_mix_mode() {
        let inventory =
            DanceInventory::new(vec![("waltz".to_string(), 6)], SelectionMode::MixBuild).unwrap();
        let entry = inventory.eligible().next().unwrap().clone();

        assert_relative_eq!(
            SelectionScoring::base_weight(&entry, 1.0),
            6.0,
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_recency_penalty_without_oracle_is_neutral() {
        let weights = test_profile().recency;
        assert_relative_eq!(
            SelectionScoring::recency_penalty("waltz", &weights, None, 50),
            1.0
        );
    }

    #[test]
    fn test_recency_penalty_immediate_match_dominates_distant_match() {
        let weights = test_profile().recency;

        let mut immediate = MockHistoryOracle::new();
        immediate
            .expect_lookup()
            .returning(|offset| (offset == 1).then(|| "waltz".to_string()));

        let mut distant = MockHistoryOracle::new();
        distant
            .expect_lookup()
            .returning(|offset| (offset == 6).then(|| "waltz".to_string()));

        let near = SelectionScoring::recency_penalty("waltz", &weights, Some(&immediate), 50);
        let far = SelectionScoring::recency_penalty("waltz", &weights, Some(&distant), 50);

        assert_relative_eq!(near, 1.0 - weights.strength, max_relative = 1e-9);
        assert!(far > 0.9, "a match six back should barely matter, got {far}");
        assert!(near < far / 10.0);
    }

    #[test]
    fn test_recency_lookback_is_bounded_by_prior_counter() {
        let weights = test_profile().recency;

        // With only two prior selections the oracle must be asked for
        // offsets 1 and 2 and nothing further.
        let mut oracle = MockHistoryOracle::new();
        oracle
            .expect_lookup()
            .with(eq(1))
            .times(1)
            .returning(|_| Some("tango".to_string()));
        oracle
            .expect_lookup()
            .with(eq(2))
            .times(1)
            .returning(|_| Some("waltz".to_string()));

        let penalty = SelectionScoring::recency_penalty("waltz", &weights, Some(&oracle), 2);
        let expected = 1.0 - weights.strength * weights.decay;
        assert_relative_eq!(penalty, expected, max_relative = 1e-9);
    }

    #[test]
    fn test_fast_after_fast_is_penalized() {
        let profile = test_profile();
        let catalog = catalog();
        let mut tracker = RecencyTracker::new();
        tracker.record("jive", &catalog);

        let fast_penalty =
            SelectionScoring::adjacency_penalty("quickstep", &profile.adjacency, &catalog, &tracker);
        let slow_penalty =
            SelectionScoring::adjacency_penalty("waltz", &profile.adjacency, &catalog, &tracker);

        // Both include the soft similarity discount; only the fast candidate
        // carries the hard fast-adjacency factor.
        assert!(fast_penalty < slow_penalty * profile.adjacency.fast_penalty * 2.0);
        assert!(slow_penalty > 0.5);
    }

    #[test]
    fn test_shared_tag_with_last_selection_is_discouraged() {
        let profile = test_profile();
        let catalog = catalog();
        let mut tracker = RecencyTracker::new();
        tracker.record("waltz", &catalog);

        let smooth = SelectionScoring::adjacency_penalty("foxtrot", &profile.adjacency, &catalog, &tracker);
        let swing = SelectionScoring::adjacency_penalty("jive", &profile.adjacency, &catalog, &tracker);

        assert!(
            smooth < swing,
            "tag-sharing candidate should score below the unrelated one ({smooth} vs {swing})"
        );
        assert!(smooth > 0.0, "tag adjacency is discouraged, not forbidden");
    }

    #[test]
    fn test_tag_penalty_against_prior_selection_is_milder() {
        let profile = test_profile();
        let catalog = catalog();

        let mut last_clash = RecencyTracker::new();
        last_clash.record("jive", &catalog);
        last_clash.record("waltz", &catalog); // last shares "smooth" with foxtrot

        let mut prior_clash = RecencyTracker::new();
        prior_clash.record("waltz", &catalog); // prior shares "smooth" with foxtrot
        prior_clash.record("jive", &catalog);

        let against_last =
            SelectionScoring::adjacency_penalty("foxtrot", &profile.adjacency, &catalog, &last_clash);
        let against_prior =
            SelectionScoring::adjacency_penalty("foxtrot", &profile.adjacency, &catalog, &prior_clash);

        assert!(against_last < against_prior);
    }

    #[test]
    fn test_beginning_window_excludes_fast_dances() {
        let profile = test_profile();
        let catalog = catalog();
        let mut tracker = RecencyTracker::new();

        // Inside the window a fast dance is fully excluded by default
        assert_eq!(
            SelectionScoring::beginning_penalty("jive", &profile.beginning, &catalog, &tracker),
            0.0
        );
        assert_eq!(
            SelectionScoring::beginning_penalty("waltz", &profile.beginning, &catalog, &tracker),
            1.0
        );

        for _ in 0..profile.beginning.window {
            tracker.record("waltz", &catalog);
        }
        assert_eq!(
            SelectionScoring::beginning_penalty("jive", &profile.beginning, &catalog, &tracker),
            1.0
        );
    }

    #[test]
    fn test_blended_similarity_weighs_components() {
        let catalog = catalog();
        let blend = SimilarityBlend {
            tag_weight: 0.5,
            rating_weight: 0.25,
            level_weight: 0.25,
        };

        let waltz = catalog.get("waltz").unwrap();
        let foxtrot = catalog.get("foxtrot").unwrap();

        // Shared "smooth" tag (overlap 1.0), rating 8 vs 6, level 3 vs 4:
        // 0.5*1.0 + 0.25*(1 - 2/9) + 0.25*(1 - 1/9)
        let expected = 0.5 + 0.25 * (7.0 / 9.0) + 0.25 * (8.0 / 9.0);
        assert_relative_eq!(
            SelectionScoring::blended_similarity(waltz, foxtrot, &blend),
            expected,
            max_relative = 1e-9
        );

        // A dance is maximally similar to itself apart from missing data
        let self_similarity = SelectionScoring::blended_similarity(waltz, waltz, &blend);
        assert_relative_eq!(self_similarity, 1.0, max_relative = 1e-9);
    }

    #[test]
    fn test_scores_are_never_negative() {
        let mut profile = test_profile();
        profile.adjacency.similarity_strength = 1.0;
        let catalog = catalog();
        let mut tracker = RecencyTracker::new();
        tracker.record("waltz", &catalog);

        let entry = entry_for("waltz", 40);
        let score =
            SelectionScoring::calculate_score(&entry, &profile, &catalog, &tracker, None, 1);
        assert!(score >= 0.0);
        assert!(score.is_finite());
    }
}
