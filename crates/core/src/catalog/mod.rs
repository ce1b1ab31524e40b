//! The static listing catalog: parsing, cached loading, and file watching.

mod loader;
mod watch;

pub use loader::{CatalogLoader, CatalogSource};
pub use watch::{CatalogEvent, CatalogWatch};

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::warn;

use crate::models::{Category, Listing};

/// The listing table compiled into the binary.
const BUILTIN_JSON: &str = include_str!("builtin.json");

/// Errors raised while parsing or validating a catalog table.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The document is not the expected JSON shape.
    #[error("failed to parse catalog JSON")]
    Parse(#[from] serde_json::Error),
    /// Two listings share an id.
    #[error("duplicate listing id {0} in catalog")]
    DuplicateId(u32),
}

/// One category's ordered listings.
#[derive(Debug, Clone)]
pub struct CategoryListings {
    /// The grouping these listings belong to.
    pub category: Category,
    /// Listings in table order.
    pub listings: Vec<Listing>,
}

/// A parsed, validated catalog table.
///
/// Categories always appear in [`Category::ALL`] order; a category absent
/// from the source document is present here with an empty sequence.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    categories: Vec<CategoryListings>,
    loaded_at: DateTime<Utc>,
}

impl CatalogSnapshot {
    /// Parse a catalog document: a JSON object mapping category keys to
    /// listing arrays. Unknown keys are skipped with a warning; duplicate
    /// listing ids are rejected.
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let mut table: HashMap<String, Vec<Listing>> = serde_json::from_str(text)?;

        let mut categories = Vec::with_capacity(Category::ALL.len());
        for category in Category::ALL {
            let listings = table.remove(category.key()).unwrap_or_default();
            categories.push(CategoryListings {
                category,
                listings,
            });
        }
        for key in table.keys() {
            warn!("Skipping unknown catalog category '{key}'");
        }

        let mut seen = HashSet::new();
        for listing in categories.iter().flat_map(|group| &group.listings) {
            if !seen.insert(listing.id) {
                return Err(CatalogError::DuplicateId(listing.id));
            }
        }

        Ok(Self {
            categories,
            loaded_at: Utc::now(),
        })
    }

    /// The table compiled into the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_JSON)
    }

    /// An empty table: every category present, no listings.
    pub fn empty() -> Self {
        Self {
            categories: Category::ALL
                .iter()
                .map(|category| CategoryListings {
                    category: *category,
                    listings: Vec::new(),
                })
                .collect(),
            loaded_at: Utc::now(),
        }
    }

    /// When this snapshot was parsed.
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// All category groups in presentation order.
    pub fn categories(&self) -> &[CategoryListings] {
        &self.categories
    }

    /// The fixed ordered sequence for one category.
    pub fn listings_in(&self, category: Category) -> &[Listing] {
        self.categories
            .iter()
            .find(|group| group.category == category)
            .map(|group| group.listings.as_slice())
            .unwrap_or(&[])
    }

    /// Every listing, concatenated in category order.
    pub fn all(&self) -> impl Iterator<Item = &Listing> {
        self.categories.iter().flat_map(|group| &group.listings)
    }

    /// Case-insensitive substring match on titles across all categories,
    /// preserving catalog order. Callers never invoke this with an empty
    /// query.
    pub fn search_titles(&self, query: &str) -> Vec<&Listing> {
        let needle = query.trim().to_lowercase();
        self.all()
            .filter(|listing| listing.title.to_lowercase().contains(&needle))
            .collect()
    }

    /// Look up one listing by id.
    pub fn listing(&self, id: u32) -> Option<&Listing> {
        self.all().find(|listing| listing.id == id)
    }

    /// Total number of listings.
    pub fn listing_count(&self) -> usize {
        self.categories.iter().map(|group| group.listings.len()).sum()
    }

    /// Number of category groups (fixed at seven).
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_loads() -> Result<(), CatalogError> {
        let snapshot = CatalogSnapshot::builtin()?;
        assert_eq!(snapshot.listing_count(), 19);
        assert_eq!(snapshot.category_count(), 7);
        Ok(())
    }

    #[test]
    fn category_lookup_preserves_table_order() -> Result<(), CatalogError> {
        let snapshot = CatalogSnapshot::builtin()?;
        let jobs: Vec<u32> = snapshot
            .listings_in(Category::Jobs)
            .iter()
            .map(|listing| listing.id)
            .collect();
        assert_eq!(jobs, vec![7, 8, 9]);
        Ok(())
    }

    #[test]
    fn title_search_spans_all_categories() -> Result<(), CatalogError> {
        let snapshot = CatalogSnapshot::builtin()?;
        // "Part-time Retail Associate" (jobs) and "One-time Moving Help"
        // (gigs) both match, in catalog order.
        let hits: Vec<u32> = snapshot
            .search_titles("time")
            .iter()
            .map(|listing| listing.id)
            .collect();
        assert_eq!(hits, vec![9, 17]);

        let rent: Vec<u32> = snapshot
            .search_titles("Rent")
            .iter()
            .map(|listing| listing.id)
            .collect();
        assert_eq!(rent, vec![5]);
        Ok(())
    }

    #[test]
    fn title_search_is_case_insensitive() -> Result<(), CatalogError> {
        let snapshot = CatalogSnapshot::builtin()?;
        let lower = snapshot.search_titles("yoga").len();
        let upper = snapshot.search_titles("YOGA").len();
        assert_eq!(lower, 1);
        assert_eq!(lower, upper);
        Ok(())
    }

    #[test]
    fn unknown_category_keys_are_skipped() -> Result<(), CatalogError> {
        let snapshot = CatalogSnapshot::from_json(
            r#"{
                "jobs": [],
                "antiques": [
                    {
                        "id": 1,
                        "title": "Grandfather clock",
                        "price": "$400",
                        "image": "",
                        "location": "Queens, NY",
                        "distance": "4 mi away",
                        "timePosted": "1 day ago",
                        "seller": {
                            "name": "ClockFan",
                            "rating": 4.1,
                            "verified": false,
                            "joinDate": "2023"
                        }
                    }
                ]
            }"#,
        )?;
        assert_eq!(snapshot.listing_count(), 0);
        assert_eq!(snapshot.category_count(), 7);
        Ok(())
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = CatalogSnapshot::from_json(
            r#"{
                "forums": [
                    {
                        "id": 15,
                        "title": "First",
                        "price": "Free",
                        "image": "",
                        "location": "NYC",
                        "distance": "Local",
                        "timePosted": "4 hours ago",
                        "seller": {"name": "A", "rating": 4.0, "verified": true, "joinDate": "2020"}
                    },
                    {
                        "id": 15,
                        "title": "Second",
                        "price": "Free",
                        "image": "",
                        "location": "NYC",
                        "distance": "Local",
                        "timePosted": "5 hours ago",
                        "seller": {"name": "B", "rating": 4.0, "verified": true, "joinDate": "2021"}
                    }
                ]
            }"#,
        );
        assert!(matches!(result, Err(CatalogError::DuplicateId(15))));
    }

    #[test]
    fn listing_lookup_by_id() -> Result<(), CatalogError> {
        let snapshot = CatalogSnapshot::builtin()?;
        let listing = snapshot.listing(17).expect("listing 17 exists");
        assert_eq!(listing.title, "One-time Moving Help - 3 Hours");
        assert!(snapshot.listing(99).is_none());
        Ok(())
    }
}
