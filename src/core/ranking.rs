use crate::models::ScoredCandidate;
use serde::Deserialize;
use std::cmp::Ordering;
use std::num::NonZeroUsize;

/// Field a candidate can be ranked on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankKey {
    Similarity,
    Distance,
    Price,
    Rating,
}

impl RankKey {
    #[inline]
    fn value(self, candidate: &ScoredCandidate) -> f64 {
        match self {
            RankKey::Similarity => candidate.similarity,
            RankKey::Distance => candidate.distance,
            RankKey::Price => candidate.price,
            RankKey::Rating => candidate.rating,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc", alias = "ascending")]
    Ascending,
    #[serde(rename = "desc", alias = "descending")]
    Descending,
}

/// One comparison key with its direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RankCriterion {
    pub key: RankKey,
    pub direction: SortDirection,
}

impl RankCriterion {
    pub const fn ascending(key: RankKey) -> Self {
        Self { key, direction: SortDirection::Ascending }
    }

    pub const fn descending(key: RankKey) -> Self {
        Self { key, direction: SortDirection::Descending }
    }

    #[inline]
    fn compare(&self, a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
        let ord = self.key.value(a).total_cmp(&self.key.value(b));
        match self.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }
}

/// Multi-key comparator, keys applied in priority order
///
/// The default is similarity, then distance, then price, all ascending.
/// Ascending similarity puts the least similar products first; that is the
/// established contract and flipping it is a config change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingOrder {
    criteria: Vec<RankCriterion>,
}

impl RankingOrder {
    pub fn new(criteria: Vec<RankCriterion>) -> Self {
        Self { criteria }
    }

    pub fn criteria(&self) -> &[RankCriterion] {
        &self.criteria
    }

    pub fn compare(&self, a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
        self.criteria
            .iter()
            .map(|criterion| criterion.compare(a, b))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }

    /// Sort candidates in place
    ///
    /// The sort is stable: candidates equal on every key keep their filter order.
    pub fn rank(&self, candidates: &mut [ScoredCandidate]) {
        candidates.sort_by(|a, b| self.compare(a, b));
    }
}

impl Default for RankingOrder {
    fn default() -> Self {
        Self::new(vec![
            RankCriterion::ascending(RankKey::Similarity),
            RankCriterion::ascending(RankKey::Distance),
            RankCriterion::ascending(RankKey::Price),
        ])
    }
}

/// Keep the first `top_n` ranked candidates
#[inline]
pub fn select_top_n(mut ranked: Vec<ScoredCandidate>, top_n: NonZeroUsize) -> Vec<ScoredCandidate> {
    ranked.truncate(top_n.get());
    ranked
}
