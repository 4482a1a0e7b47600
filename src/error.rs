//! Caller-facing failures of a recommendation request.

use crate::core::similarity::SimilarityError;
use crate::services::FetchError;
use std::fmt;
use thiserror::Error;

/// Which collaborator call was in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    Profile,
    Catalog,
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStage::Profile => f.write_str("profile"),
            FetchStage::Catalog => f.write_str("catalog"),
        }
    }
}

/// Errors surfaced by the recommendation pipeline
///
/// Every kind is distinct; none is converted into an empty successful result.
#[derive(Debug, Error)]
pub enum RecommendError {
    /// The profile collaborator was unreachable or answered with a non-success status.
    #[error("failed to fetch profile for user {user_id}")]
    ProfileFetch {
        user_id: String,
        #[source]
        source: FetchError,
    },

    /// The catalog collaborator was unreachable or answered with a non-success status.
    #[error("failed to fetch product catalog")]
    CatalogFetch {
        #[source]
        source: FetchError,
    },

    /// A fetched record was malformed or missing required fields.
    #[error("invalid {stage} data: {message}")]
    Validation { stage: FetchStage, message: String },

    /// No candidate survived interest filtering.
    #[error("no products matched the user's interests, similarity has no reference vector")]
    EmptyCorpus,

    /// The configured similarity reference does not exist in the filtered set.
    #[error("invalid similarity reference: {0}")]
    InvalidReference(String),

    /// The request deadline expired before scoring began.
    #[error("deadline expired while fetching {stage}")]
    Timeout { stage: FetchStage },
}

impl From<SimilarityError> for RecommendError {
    fn from(err: SimilarityError) -> Self {
        match err {
            SimilarityError::EmptyCorpus => RecommendError::EmptyCorpus,
            other => RecommendError::InvalidReference(other.to_string()),
        }
    }
}

impl RecommendError {
    /// Short machine-readable kind, used for logs and error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            RecommendError::ProfileFetch { .. } => "profile_fetch_error",
            RecommendError::CatalogFetch { .. } => "catalog_fetch_error",
            RecommendError::Validation { .. } => "validation_error",
            RecommendError::EmptyCorpus => "empty_corpus_error",
            RecommendError::InvalidReference(_) => "invalid_reference",
            RecommendError::Timeout { .. } => "timeout",
        }
    }
}
