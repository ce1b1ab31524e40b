#![warn(clippy::all, missing_docs)]

//! Core domain logic for the Corkboard terminal classifieds demo.
//!
//! This crate hosts the data models, configuration handling, the static
//! listing catalog with its loader and file watcher, and the canned search
//! suggestion provider used by the terminal UI.

pub mod catalog;
pub mod config;
pub mod models;
pub mod search;

pub use catalog::{
    CatalogEvent, CatalogLoader, CatalogSnapshot, CatalogSource, CatalogWatch, CategoryListings,
};
pub use config::AppConfig;
pub use models::{Category, Listing, Seller};
