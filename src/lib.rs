//! Mercadito Recommender - product recommendations for the MercaditoNica marketplace
//!
//! This library provides the recommendation pipeline: interest filtering,
//! TF-IDF description similarity, geodesic distance and multi-key ranking.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Recommender, RecommendationResult, RankingOrder, ReferenceSelector, geodesic_distance_km};
pub use error::RecommendError;
pub use models::{UserProfile, ProductRecord, ScoredCandidate, RecommendationRequest, RecommendationResponse};
pub use services::{BackendClient, RecommendationService};
