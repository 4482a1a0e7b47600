// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod ranking;
pub mod recommender;
pub mod similarity;

pub use distance::geodesic_distance_km;
pub use filters::{filter_by_interests, matches_interests};
pub use ranking::{select_top_n, RankCriterion, RankKey, RankingOrder, SortDirection};
pub use recommender::{RecommendationResult, Recommender};
pub use similarity::{
    cosine_similarity, score_similarity, ReferenceSelector, SimilarityError, StopWords,
    TfidfModel, TfidfVectorizer,
};
