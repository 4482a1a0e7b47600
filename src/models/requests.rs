use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Request for product recommendations
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecommendationRequest {
    /// Existing clients send a numeric id; string ids are accepted too
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId", deserialize_with = "user_id_from_number_or_string")]
    pub user_id: String,
    /// Falls back to the configured default when omitted
    #[validate(range(min = 1))]
    #[serde(default)]
    #[serde(alias = "top_n", rename = "topN")]
    pub top_n: Option<u16>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawUserId {
    Number(i64),
    Text(String),
}

fn user_id_from_number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawUserId::deserialize(deserializer)? {
        RawUserId::Number(id) => id.to_string(),
        RawUserId::Text(id) => id,
    })
}
