// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Location, ProductId, ProductRecord, ScoredCandidate, UserProfile};
pub use requests::RecommendationRequest;
pub use responses::{ErrorResponse, HealthResponse, RecommendationResponse};
