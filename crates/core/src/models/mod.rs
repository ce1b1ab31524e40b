//! Shared domain models.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Label rendered when a listing image carries no usable placeholder text.
pub const NO_IMAGE_LABEL: &str = "No image available";

/// One of the seven fixed groupings partitioning the listing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Professional services offered locally.
    Services,
    /// Apartments, rooms, and houses.
    Housing,
    /// Full-time and part-time positions.
    Jobs,
    /// Classes, clubs, and neighborhood notices.
    Community,
    /// Personal connections and missed encounters.
    Personals,
    /// Open discussion threads.
    Forums,
    /// One-off paid tasks.
    Gigs,
}

impl Category {
    /// Every category in the order the site presents them.
    pub const ALL: [Category; 7] = [
        Category::Services,
        Category::Housing,
        Category::Jobs,
        Category::Community,
        Category::Personals,
        Category::Forums,
        Category::Gigs,
    ];

    /// The lowercase key used in catalog tables.
    pub fn key(&self) -> &'static str {
        match self {
            Category::Services => "services",
            Category::Housing => "housing",
            Category::Jobs => "jobs",
            Category::Community => "community",
            Category::Personals => "personals",
            Category::Forums => "forums",
            Category::Gigs => "gigs",
        }
    }

    /// Human-readable name shown in headers and on category cards.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Services => "Services",
            Category::Housing => "Housing",
            Category::Jobs => "Jobs",
            Category::Community => "Community",
            Category::Personals => "Personals",
            Category::Forums => "Forums",
            Category::Gigs => "Gigs",
        }
    }

    /// Resolve a lowercase key. Unknown keys map to no category.
    pub fn from_key(key: &str) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|category| category.key() == key)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One catalog entry with display metadata and a seller sub-record.
///
/// Listings are immutable and statically enumerated; nothing creates or
/// destroys them at runtime. Field names serialize in camelCase, matching the
/// catalog data format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Identifier, unique within the catalog table.
    pub id: u32,
    /// Headline shown on the card; the only searchable field.
    pub title: String,
    /// Display-formatted price text (e.g. `$80 - $150`), not numeric.
    pub price: String,
    /// Image URL. Placeholder URLs carry a `text` query parameter.
    pub image: String,
    /// Neighborhood or city label.
    pub location: String,
    /// Display-formatted distance text (e.g. `2.5 mi away`).
    pub distance: String,
    /// Display-formatted posting age (e.g. `2 hours ago`).
    pub time_posted: String,
    /// The poster's public profile summary.
    pub seller: Seller,
}

static IMAGE_TEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&]text=([^&#]+)").expect("image text pattern compiles"));

impl Listing {
    /// Placeholder label standing in for the image.
    ///
    /// Terminal cells cannot load the URL, so the `text` query parameter the
    /// placeholder service embeds is decoded instead. `None` means the card
    /// falls back to [`NO_IMAGE_LABEL`].
    pub fn image_label(&self) -> Option<String> {
        let captures = IMAGE_TEXT_RE.captures(&self.image)?;
        let raw = captures.get(1)?.as_str();
        let decoded = raw.replace('+', " ").replace("%20", " ");
        let trimmed = decoded.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// Public profile summary attached to every listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seller {
    /// Display handle.
    pub name: String,
    /// Average review rating out of 5.
    pub rating: f64,
    /// Whether the account passed identity verification.
    pub verified: bool,
    /// Year the account was created, as display text.
    pub join_date: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_listing(image: &str) -> Listing {
        Listing {
            id: 3,
            title: "Pet Sitting & Dog Walking Services".to_string(),
            price: "$25 - $40".to_string(),
            image: image.to_string(),
            location: "Queens, NY".to_string(),
            distance: "3.8 mi away".to_string(),
            time_posted: "6 hours ago".to_string(),
            seller: Seller {
                name: "PetLoverNY".to_string(),
                rating: 4.7,
                verified: true,
                join_date: "2022".to_string(),
            },
        }
    }

    #[test]
    fn image_label_decodes_text_parameter() {
        let listing =
            sample_listing("https://via.placeholder.com/200x150/ffc107/000000?text=Pet+Care");
        assert_eq!(listing.image_label().as_deref(), Some("Pet Care"));
    }

    #[test]
    fn image_label_missing_parameter_is_none() {
        let listing = sample_listing("https://via.placeholder.com/200x150/ffc107/000000");
        assert_eq!(listing.image_label(), None);
    }

    #[test]
    fn image_label_empty_parameter_is_none() {
        let listing = sample_listing("https://via.placeholder.com/200x150?text=");
        assert_eq!(listing.image_label(), None);
    }

    #[test]
    fn category_keys_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_key(category.key()), Some(category));
        }
        assert_eq!(Category::from_key("antiques"), None);
    }

    #[test]
    fn listing_serializes_camel_case() {
        let listing = sample_listing("https://example.com/a.png?text=Cleaning");
        let value = serde_json::to_value(&listing).expect("serialize listing");
        assert!(value.get("timePosted").is_some());
        assert!(value["seller"].get("joinDate").is_some());
    }
}
