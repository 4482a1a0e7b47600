use crate::core::{RecommendationResult, Recommender};
use crate::error::{FetchStage, RecommendError};
use crate::services::{BackendClient, CatalogSource, FetchError, ProfileSource};
use std::num::NonZeroUsize;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};

/// Recommendation service backed by the marketplace HTTP API
pub type HttpRecommendationService = RecommendationService<BackendClient, BackendClient>;

/// Runs one recommendation request end to end
///
/// Collaborators are injected at construction. Each call fetches fresh data;
/// nothing is cached or retried.
pub struct RecommendationService<P, C> {
    profiles: P,
    catalog: C,
    recommender: Recommender,
    deadline: Duration,
}

impl<P, C> RecommendationService<P, C>
where
    P: ProfileSource,
    C: CatalogSource,
{
    pub fn new(profiles: P, catalog: C, recommender: Recommender, deadline: Duration) -> Self {
        Self {
            profiles,
            catalog,
            recommender,
            deadline,
        }
    }

    /// Fetch, filter, score, rank and select recommendations for `user_id`
    ///
    /// Both fetches share one deadline. If it expires before scoring begins the
    /// request fails with [`RecommendError::Timeout`]; no partial result is
    /// returned. The catalog is not requested when the profile fetch fails.
    pub async fn recommend(
        &self,
        user_id: &str,
        top_n: NonZeroUsize,
    ) -> Result<RecommendationResult, RecommendError> {
        let deadline = Instant::now() + self.deadline;

        let profile = match timeout_at(deadline, self.profiles.fetch_profile(user_id)).await {
            Ok(Ok(profile)) => profile,
            Ok(Err(e)) => return Err(fetch_failure(FetchStage::Profile, user_id, e)),
            Err(_) => return Err(timed_out(FetchStage::Profile, user_id)),
        };

        let catalog = match timeout_at(deadline, self.catalog.fetch_catalog()).await {
            Ok(Ok(catalog)) => catalog,
            Ok(Err(e)) => return Err(fetch_failure(FetchStage::Catalog, user_id, e)),
            Err(_) => return Err(timed_out(FetchStage::Catalog, user_id)),
        };

        tracing::debug!(
            "Fetched profile ({} interests) and {} products for user {}",
            profile.interests.len(),
            catalog.len(),
            user_id
        );

        self.recommender.recommend(&profile, catalog, top_n)
    }
}

/// Split collaborator failures into fetch errors and malformed data
fn fetch_failure(stage: FetchStage, user_id: &str, err: FetchError) -> RecommendError {
    tracing::warn!("Failed to fetch {} for user {}: {}", stage, user_id, err);

    if err.is_malformed() {
        return RecommendError::Validation {
            stage,
            message: err.to_string(),
        };
    }

    match stage {
        FetchStage::Profile => RecommendError::ProfileFetch {
            user_id: user_id.to_string(),
            source: err,
        },
        FetchStage::Catalog => RecommendError::CatalogFetch { source: err },
    }
}

fn timed_out(stage: FetchStage, user_id: &str) -> RecommendError {
    tracing::warn!("Deadline expired fetching {} for user {}", stage, user_id);
    RecommendError::Timeout { stage }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, ProductId, ProductRecord, UserProfile};
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum FixedProfile {
        Found(UserProfile),
        ServerError,
        Malformed,
    }

    impl ProfileSource for FixedProfile {
        async fn fetch_profile(&self, _user_id: &str) -> Result<UserProfile, FetchError> {
            match self {
                FixedProfile::Found(profile) => Ok(profile.clone()),
                FixedProfile::ServerError => Err(FetchError::ApiError(StatusCode::INTERNAL_SERVER_ERROR)),
                FixedProfile::Malformed => Err(FetchError::InvalidResponse("missing interests".into())),
            }
        }
    }

    #[derive(Default)]
    struct CountingCatalog {
        calls: AtomicUsize,
    }

    impl CatalogSource for CountingCatalog {
        async fn fetch_catalog(&self) -> Result<Vec<ProductRecord>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![ProductRecord {
                id: ProductId::Number(1),
                description: "eco bottle".to_string(),
                latitude: 12.34,
                longitude: 56.78,
                price: 10.0,
                rating: None,
            }])
        }
    }

    fn eco_profile() -> UserProfile {
        UserProfile {
            interests: ["eco".to_string()].into_iter().collect(),
            location: Location::new(12.34, 56.78),
        }
    }

    fn top(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[tokio::test]
    async fn test_recommend_with_injected_sources() {
        let service = RecommendationService::new(
            FixedProfile::Found(eco_profile()),
            CountingCatalog::default(),
            Recommender::default(),
            Duration::from_secs(5),
        );

        let result = service.recommend("1", top(5)).await.unwrap();

        assert_eq!(result.recommendations.len(), 1);
        assert_eq!(result.recommendations[0].distance, 0.0);
    }

    #[tokio::test]
    async fn test_profile_failure_skips_catalog() {
        let service = RecommendationService::new(
            FixedProfile::ServerError,
            CountingCatalog::default(),
            Recommender::default(),
            Duration::from_secs(5),
        );

        let err = service.recommend("1", top(5)).await.unwrap_err();

        assert!(matches!(err, RecommendError::ProfileFetch { .. }));
        assert_eq!(service.catalog.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_profile_is_validation_error() {
        let service = RecommendationService::new(
            FixedProfile::Malformed,
            CountingCatalog::default(),
            Recommender::default(),
            Duration::from_secs(5),
        );

        let err = service.recommend("1", top(5)).await.unwrap_err();

        assert!(matches!(
            err,
            RecommendError::Validation { stage: FetchStage::Profile, .. }
        ));
    }
}
