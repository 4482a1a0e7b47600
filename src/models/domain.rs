use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use validator::Validate;

/// Geographic coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Location {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// User profile as served by the marketplace backend
///
/// Interests are kept exactly as received (case-sensitive); duplicates collapse.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserProfile {
    pub interests: BTreeSet<String>,
    #[validate(nested)]
    pub location: Location,
}

/// Opaque product identifier, either numeric or textual
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductId::Number(n) => write!(f, "{}", n),
            ProductId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        ProductId::Number(id)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        ProductId::Text(id.to_string())
    }
}

/// Catalog entry as served by the marketplace backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ProductRecord {
    pub id: ProductId,
    pub description: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[serde(default)]
    pub rating: Option<f64>,
}

impl ProductRecord {
    /// Helper to get the rating, defaulting to 0 when the backend omits it
    pub fn rating(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }

    pub fn location(&self) -> Location {
        Location::new(self.latitude, self.longitude)
    }
}

/// Product augmented with the scores computed for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub id: ProductId,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub price: f64,
    pub rating: f64,
    pub similarity: f64,
    /// Geodesic distance to the requesting user in kilometers
    pub distance: f64,
}

impl ScoredCandidate {
    pub fn new(product: ProductRecord, similarity: f64, distance: f64) -> Self {
        let rating = product.rating();
        Self {
            id: product.id,
            description: product.description,
            latitude: product.latitude,
            longitude: product.longitude,
            price: product.price,
            rating,
            similarity,
            distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_accepts_numbers_and_strings() {
        let numeric: ProductId = serde_json::from_str("42").unwrap();
        let text: ProductId = serde_json::from_str("\"sku-42\"").unwrap();

        assert_eq!(numeric, ProductId::from(42_i64));
        assert_eq!(text, ProductId::from("sku-42"));
        assert_eq!(serde_json::to_string(&numeric).unwrap(), "42");
    }

    #[test]
    fn test_missing_rating_defaults_to_zero() {
        let product: ProductRecord = serde_json::from_value(serde_json::json!({
            "id": 1,
            "description": "eco bottle",
            "latitude": 12.34,
            "longitude": 56.78,
            "price": 10.0
        }))
        .unwrap();

        assert_eq!(product.rating(), 0.0);
        assert!(product.validate().is_ok());
    }

    #[test]
    fn test_negative_price_rejected() {
        let product = ProductRecord {
            id: ProductId::Number(1),
            description: "pen".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            price: -1.0,
            rating: None,
        };

        assert!(product.validate().is_err());
    }

    #[test]
    fn test_profile_location_range_checked() {
        let profile = UserProfile {
            interests: BTreeSet::new(),
            location: Location::new(91.0, 0.0),
        };

        assert!(profile.validate().is_err());
    }
}
