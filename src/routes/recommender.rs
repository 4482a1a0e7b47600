use actix_web::{error, http::StatusCode, web, HttpResponse, Responder};
use validator::Validate;
use crate::error::RecommendError;
use crate::models::{ErrorResponse, HealthResponse, RecommendationRequest, RecommendationResponse};
use crate::services::HttpRecommendationService;
use std::num::{NonZeroU16, NonZeroUsize};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<HttpRecommendationService>,
    pub default_top_n: NonZeroU16,
    pub max_top_n: NonZeroU16,
}

/// Configure all recommender routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/recommender/recommendations", web::post().to(recommend))
        .route("/recommender/recommendations/", web::post().to(recommend));
}

impl error::ResponseError for RecommendError {
    fn status_code(&self) -> StatusCode {
        match self {
            RecommendError::ProfileFetch { .. }
            | RecommendError::CatalogFetch { .. }
            | RecommendError::Validation { .. } => StatusCode::BAD_GATEWAY,
            RecommendError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            RecommendError::EmptyCorpus => StatusCode::UNPROCESSABLE_ENTITY,
            RecommendError::InvalidReference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse {
            error: self.kind().to_string(),
            message: error_chain(self),
            status_code: status.as_u16(),
        })
    }
}

/// Render an error with its sources, outermost first
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Requested size, or the default, capped to prevent oversized responses
fn effective_top_n(requested: Option<u16>, default: NonZeroU16, max: NonZeroU16) -> NonZeroUsize {
    let requested = requested.and_then(NonZeroU16::new).unwrap_or(default);
    NonZeroUsize::from(requested.min(max))
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Recommendations endpoint
///
/// POST /api/v1/recommender/recommendations
///
/// Request body:
/// ```json
/// {
///   "userId": 1,
///   "topN": 5
/// }
/// ```
async fn recommend(
    state: web::Data<AppState>,
    req: web::Json<RecommendationRequest>,
) -> Result<HttpResponse, actix_web::Error> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for recommendation request: {:?}", errors);
        return Ok(HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        }));
    }

    let request_id = uuid::Uuid::new_v4().to_string();
    let user_id = &req.user_id;
    let top_n = effective_top_n(req.top_n, state.default_top_n, state.max_top_n);

    tracing::info!("[{}] Recommending for user: {}, top_n: {}", request_id, user_id, top_n);

    let result = match state.service.recommend(user_id, top_n).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("[{}] Recommendation failed ({}): {}", request_id, e.kind(), e);
            return Err(e.into());
        }
    };

    tracing::info!(
        "[{}] Returning {} recommendations for user {} ({} of {} products matched)",
        request_id,
        result.recommendations.len(),
        user_id,
        result.filtered_candidates,
        result.total_candidates
    );

    Ok(HttpResponse::Ok().json(RecommendationResponse {
        request_id,
        recommendations: result.recommendations,
        filtered_candidates: result.filtered_candidates,
        total_candidates: result.total_candidates,
    }))
}
