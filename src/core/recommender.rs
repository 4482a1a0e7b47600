use crate::core::{
    distance::geodesic_distance_km,
    filters::filter_by_interests,
    ranking::{select_top_n, RankingOrder},
    similarity::{score_similarity, ReferenceSelector, TfidfVectorizer},
};
use crate::error::RecommendError;
use crate::models::{ProductId, ProductRecord, ScoredCandidate, UserProfile};
use std::num::NonZeroUsize;

/// Result of the recommendation pipeline
#[derive(Debug, Clone)]
pub struct RecommendationResult {
    pub recommendations: Vec<ScoredCandidate>,
    pub filtered_candidates: usize,
    pub total_candidates: usize,
}

/// Recommendation pipeline orchestrator
///
/// # Pipeline Stages
/// 1. Interest filtering
/// 2. Description similarity against the reference candidate
/// 3. Geodesic distance to the user
/// 4. Multi-key ranking
/// 5. Top-N selection
///
/// Holds configuration only; every call fits its own vector space.
#[derive(Debug, Clone, Default)]
pub struct Recommender {
    vectorizer: TfidfVectorizer,
    reference: ReferenceSelector,
    ranking: RankingOrder,
}

impl Recommender {
    pub fn new(
        vectorizer: TfidfVectorizer,
        reference: ReferenceSelector,
        ranking: RankingOrder,
    ) -> Self {
        Self {
            vectorizer,
            reference,
            ranking,
        }
    }

    pub fn ranking(&self) -> &RankingOrder {
        &self.ranking
    }

    /// Recommend products from `catalog` for `profile`
    ///
    /// # Arguments
    /// * `profile` - The requesting user's interests and location
    /// * `catalog` - The full product catalog
    /// * `top_n` - Maximum number of recommendations to return
    ///
    /// # Errors
    /// [`RecommendError::EmptyCorpus`] when no product matches an interest,
    /// [`RecommendError::InvalidReference`] when the configured reference is
    /// not among the filtered products. Ranking and selection cannot fail.
    pub fn recommend(
        &self,
        profile: &UserProfile,
        catalog: Vec<ProductRecord>,
        top_n: NonZeroUsize,
    ) -> Result<RecommendationResult, RecommendError> {
        let total_candidates = catalog.len();

        // Stage 1: Interest filtering
        let filtered = filter_by_interests(catalog, &profile.interests);
        let filtered_candidates = filtered.len();

        tracing::debug!(
            "{} of {} products match {} interests",
            filtered_candidates,
            total_candidates,
            profile.interests.len()
        );

        // Stage 2: Similarity scoring
        let descriptions: Vec<&str> = filtered.iter().map(|p| p.description.as_str()).collect();
        let ids: Vec<ProductId> = filtered.iter().map(|p| p.id.clone()).collect();
        let similarities = score_similarity(&self.vectorizer, &descriptions, &ids, &self.reference)?;

        // Stage 3: Distance from the user
        let mut scored: Vec<ScoredCandidate> = filtered
            .into_iter()
            .zip(similarities)
            .map(|(product, similarity)| {
                let distance = geodesic_distance_km(profile.location, product.location());
                ScoredCandidate::new(product, similarity, distance)
            })
            .collect();

        // Stage 4 & 5: Rank and bound
        self.ranking.rank(&mut scored);
        let recommendations = select_top_n(scored, top_n);

        Ok(RecommendationResult {
            recommendations,
            filtered_candidates,
            total_candidates,
        })
    }
}
