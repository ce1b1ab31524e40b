//! Canned search suggestions.

/// Minimum query length before suggestions are offered.
pub const MIN_QUERY_LEN: usize = 2;

/// Maximum number of suggestions returned for any query.
pub const SUGGESTION_LIMIT: usize = 5;

/// The fixed suggestion pool, in presentation order.
pub const SUGGESTION_POOL: [&str; 18] = [
    "iPhone 13 Pro Max",
    "MacBook Pro M2",
    "Samsung Galaxy S23",
    "Nintendo Switch",
    "PlayStation 5",
    "Tesla Model 3",
    "Honda Civic",
    "Toyota Camry",
    "Apartment for rent",
    "House for sale",
    "Room for rent",
    "Office space",
    "Web developer job",
    "Marketing manager",
    "Graphic designer",
    "Photography services",
    "Cleaning services",
    "Tutoring services",
];

/// Autocomplete candidates for a query.
///
/// Case-insensitive substring match against the pool, truncated to the first
/// [`SUGGESTION_LIMIT`] matches in pool order. Queries shorter than
/// [`MIN_QUERY_LEN`] yield nothing. No ranking, no fuzzy matching.
pub fn suggestions_for(query: &str) -> Vec<&'static str> {
    if query.chars().count() < MIN_QUERY_LEN {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    SUGGESTION_POOL
        .iter()
        .filter(|candidate| candidate.to_lowercase().contains(&needle))
        .take(SUGGESTION_LIMIT)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_queries_yield_nothing() {
        assert!(suggestions_for("").is_empty());
        assert!(suggestions_for("i").is_empty());
    }

    #[test]
    fn matches_preserve_pool_order() {
        assert_eq!(
            suggestions_for("pro"),
            vec!["iPhone 13 Pro Max", "MacBook Pro M2"]
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(suggestions_for("SAMSUNG"), vec!["Samsung Galaxy S23"]);
        assert_eq!(suggestions_for("samsung"), vec!["Samsung Galaxy S23"]);
    }

    #[test]
    fn results_cap_at_the_limit() {
        // Six pool entries contain "er"; only the first five survive.
        let hits = suggestions_for("er");
        assert_eq!(
            hits,
            vec![
                "Web developer job",
                "Marketing manager",
                "Graphic designer",
                "Photography services",
                "Cleaning services",
            ]
        );
        assert_eq!(hits.len(), SUGGESTION_LIMIT);
    }

    #[test]
    fn unmatched_queries_yield_nothing() {
        assert!(suggestions_for("zz").is_empty());
    }
}
