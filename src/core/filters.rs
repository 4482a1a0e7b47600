use crate::models::ProductRecord;
use std::collections::BTreeSet;

/// Check if a description mentions at least one interest
///
/// Matching is literal, case-sensitive substring containment. With no
/// interests nothing can match.
#[inline]
pub fn matches_interests(description: &str, interests: &BTreeSet<String>) -> bool {
    interests
        .iter()
        .any(|interest| description.contains(interest.as_str()))
}

/// Reduce the catalog to products matching the user's interests
///
/// This is stage 1 of the recommendation pipeline. Catalog order is preserved,
/// which matters downstream: the first survivor is the default similarity
/// reference.
pub fn filter_by_interests(
    catalog: Vec<ProductRecord>,
    interests: &BTreeSet<String>,
) -> Vec<ProductRecord> {
    catalog
        .into_iter()
        .filter(|product| matches_interests(&product.description, interests))
        .collect()
}
