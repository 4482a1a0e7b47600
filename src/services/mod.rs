// Service exports
pub mod backend;
pub mod recommendation;

pub use backend::{BackendClient, FetchError};
pub use recommendation::{HttpRecommendationService, RecommendationService};

use crate::models::{ProductRecord, UserProfile};
use std::future::Future;

/// Supplies a user's interests and location
pub trait ProfileSource: Send + Sync {
    fn fetch_profile(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<UserProfile, FetchError>> + Send;
}

/// Supplies the full product catalog
pub trait CatalogSource: Send + Sync {
    fn fetch_catalog(&self) -> impl Future<Output = Result<Vec<ProductRecord>, FetchError>> + Send;
}
