use crate::models::{ProductRecord, UserProfile};
use crate::services::{CatalogSource, ProfileSource};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use validator::Validate;

/// Errors that can occur when talking to the marketplace backend
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(StatusCode),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl FetchError {
    /// True when the backend answered but the payload was unusable
    pub fn is_malformed(&self) -> bool {
        matches!(self, FetchError::InvalidResponse(_))
    }
}

/// Marketplace backend API client
///
/// Serves both collaborators of the recommender:
/// - user profiles at `/api/userprofiles/{id}/`
/// - the product catalog at `/api/products/`
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    api_token: Option<String>,
    client: Client,
}

impl BackendClient {
    /// Create a new backend client
    ///
    /// `timeout` bounds every individual HTTP request.
    pub fn new(
        base_url: String,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_token,
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let mut request = self.client.get(url);
        if let Some(token) = &self.api_token {
            request = request.header("Authorization", format!("Token {}", token));
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Backend request to {} failed: {} - {}", url, status, body);
            return Err(FetchError::ApiError(status));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| FetchError::InvalidResponse(format!("Body is not JSON: {}", e)))
    }
}

/// Deserialize and range-check a single record
fn parse_record<T>(value: Value, what: &str) -> Result<T, FetchError>
where
    T: DeserializeOwned + Validate,
{
    let record: T = serde_json::from_value(value)
        .map_err(|e| FetchError::InvalidResponse(format!("Failed to parse {}: {}", what, e)))?;
    record
        .validate()
        .map_err(|e| FetchError::InvalidResponse(format!("Invalid {}: {}", what, e)))?;
    Ok(record)
}

/// Accept either a bare array or a paginated `{"results": [...]}` body
fn catalog_documents(json: Value) -> Result<Vec<Value>, FetchError> {
    match json {
        Value::Array(items) => Ok(items),
        Value::Object(mut obj) => match obj.remove("results") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(FetchError::InvalidResponse("Missing results array".into())),
        },
        _ => Err(FetchError::InvalidResponse("Expected a JSON array of products".into())),
    }
}

impl ProfileSource for BackendClient {
    async fn fetch_profile(&self, user_id: &str) -> Result<UserProfile, FetchError> {
        let url = self.url(&format!("/api/userprofiles/{}/", urlencoding::encode(user_id)));

        tracing::debug!("Fetching profile from: {}", url);

        let json = self.get_json(&url).await?;
        parse_record(json, "profile")
    }
}

impl CatalogSource for BackendClient {
    async fn fetch_catalog(&self) -> Result<Vec<ProductRecord>, FetchError> {
        let url = self.url("/api/products/");

        tracing::debug!("Fetching catalog from: {}", url);

        let json = self.get_json(&url).await?;
        let products = catalog_documents(json)?
            .into_iter()
            .enumerate()
            .map(|(i, doc)| parse_record(doc, &format!("product at index {}", i)))
            .collect::<Result<Vec<ProductRecord>, _>>()?;

        tracing::debug!("Fetched {} products", products.len());

        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_backend_client_creation() {
        let client = BackendClient::new(
            "https://backend.test/".to_string(),
            Some("token".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(client.url("/api/products/"), "https://backend.test/api/products/");
        assert_eq!(client.api_token.as_deref(), Some("token"));
    }

    #[test]
    fn test_catalog_documents_shapes() {
        assert_eq!(catalog_documents(json!([{"id": 1}])).unwrap().len(), 1);
        assert_eq!(catalog_documents(json!({"count": 1, "results": [{"id": 1}]})).unwrap().len(), 1);
        assert!(catalog_documents(json!({"documents": []})).unwrap_err().is_malformed());
        assert!(catalog_documents(json!("nope")).unwrap_err().is_malformed());
    }

    #[test]
    fn test_parse_record_requires_fields() {
        let err = parse_record::<ProductRecord>(json!({"id": 1, "description": "pen"}), "product")
            .unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_fetch_profile_async() {
        // Nothing listens on the discard port: the transport error must not be reported as malformed data
        let client = BackendClient::new(
            "http://127.0.0.1:9".to_string(),
            None,
            Duration::from_millis(200),
        )
        .unwrap();

        let err = tokio_test::block_on(client.fetch_profile("1")).unwrap_err();
        assert!(!err.is_malformed());
    }
}
