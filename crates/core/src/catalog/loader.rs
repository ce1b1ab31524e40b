use std::{
    fs,
    path::PathBuf,
    sync::Arc,
};

use anyhow::{Context, Result};
use parking_lot::RwLock;
use tracing::info;

use super::CatalogSnapshot;

/// Where the catalog table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// The table compiled into the binary.
    Builtin,
    /// An operator-supplied JSON file.
    File(PathBuf),
}

impl CatalogSource {
    /// Short human-readable description for the status line.
    pub fn describe(&self) -> String {
        match self {
            CatalogSource::Builtin => "built-in table".to_string(),
            CatalogSource::File(path) => path.display().to_string(),
        }
    }
}

/// Thread-safe catalog loader with a parsed-snapshot cache.
pub struct CatalogLoader {
    inner: Arc<RwLock<Inner>>,
}

struct Inner {
    source: CatalogSource,
    cache: Option<CatalogSnapshot>,
}

impl CatalogLoader {
    /// Build a new loader over the given source.
    pub fn new(source: CatalogSource) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                source,
                cache: None,
            })),
        }
    }

    /// The source this loader reads from.
    pub fn source(&self) -> CatalogSource {
        self.inner.read().source.clone()
    }

    /// Drop the cached snapshot so the next read re-parses the source.
    pub fn refresh(&self) {
        self.inner.write().cache = None;
    }

    /// Return the current snapshot, parsing the source on first use.
    pub fn snapshot(&self) -> Result<CatalogSnapshot> {
        let mut inner = self.inner.write();
        if let Some(snapshot) = &inner.cache {
            return Ok(snapshot.clone());
        }
        let snapshot = load_snapshot(&inner.source)?;
        inner.cache = Some(snapshot.clone());
        Ok(snapshot)
    }
}

fn load_snapshot(source: &CatalogSource) -> Result<CatalogSnapshot> {
    match source {
        CatalogSource::Builtin => {
            CatalogSnapshot::builtin().context("failed to parse built-in catalog")
        }
        CatalogSource::File(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let snapshot = CatalogSnapshot::from_json(&text)
                .with_context(|| format!("failed to parse {}", path.display()))?;
            info!(
                path = %path.display(),
                listings = snapshot.listing_count(),
                "Catalog loaded from file"
            );
            Ok(snapshot)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const MINIMAL: &str = r#"{
        "gigs": [
            {
                "id": 17,
                "title": "One-time Moving Help - 3 Hours",
                "price": "$80",
                "image": "https://via.placeholder.com/200x150/17a2b8/ffffff?text=Moving+Help",
                "location": "Brooklyn, NY",
                "distance": "2.3 mi away",
                "timePosted": "5 hours ago",
                "seller": {
                    "name": "MovingHelperNY",
                    "rating": 4.7,
                    "verified": true,
                    "joinDate": "2022"
                }
            }
        ]
    }"#;

    #[test]
    fn builtin_source_loads_full_table() -> Result<()> {
        let loader = CatalogLoader::new(CatalogSource::Builtin);
        let snapshot = loader.snapshot()?;
        assert_eq!(snapshot.listing_count(), 19);
        Ok(())
    }

    #[test]
    fn file_source_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("catalog.json");
        fs::write(&path, MINIMAL)?;

        let loader = CatalogLoader::new(CatalogSource::File(path.clone()));
        let snapshot = loader.snapshot()?;
        assert_eq!(snapshot.listing_count(), 1);
        let listing = snapshot.listing(17).expect("listing 17 exists");
        assert_eq!(listing.seller.name, "MovingHelperNY");
        assert_eq!(listing.image_label().as_deref(), Some("Moving Help"));
        Ok(())
    }

    #[test]
    fn refresh_rereads_the_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("catalog.json");
        fs::write(&path, MINIMAL)?;

        let loader = CatalogLoader::new(CatalogSource::File(path.clone()));
        assert_eq!(loader.snapshot()?.listing_count(), 1);

        let updated = MINIMAL.replace("\"id\": 17", "\"id\": 18");
        fs::write(&path, updated)?;
        // Cached until refreshed.
        assert!(loader.snapshot()?.listing(17).is_some());
        loader.refresh();
        assert!(loader.snapshot()?.listing(18).is_some());
        Ok(())
    }

    #[test]
    fn missing_file_is_an_error() {
        let loader = CatalogLoader::new(CatalogSource::File(PathBuf::from(
            "/nonexistent/catalog.json",
        )));
        assert!(loader.snapshot().is_err());
    }
}
