use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::debug;

/// Events emitted by the catalog file watcher.
#[derive(Debug)]
pub enum CatalogEvent {
    /// The watched catalog file changed on disk.
    Changed {
        /// The catalog file path.
        path: PathBuf,
    },
    /// The watcher backend reported a failure.
    Error(anyhow::Error),
}

/// Watches an operator-supplied catalog file for edits.
///
/// The parent directory is watched rather than the file itself so that
/// editors which replace files via rename are still observed.
pub struct CatalogWatch {
    path: PathBuf,
}

impl CatalogWatch {
    /// Watch the given catalog file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
        }
    }

    /// Run until the receiving side closes, sending events to the provided
    /// channel.
    pub async fn run(self, sender: mpsc::Sender<CatalogEvent>) -> Result<()> {
        let (raw_tx, mut raw_rx) = mpsc::channel::<notify::Result<Event>>(16);

        // notify delivers callbacks on its own thread; blocking_send bridges
        // them onto the async channel.
        let mut watcher: RecommendedWatcher = notify::recommended_watcher(
            move |result: notify::Result<Event>| {
                let _ = raw_tx.blocking_send(result);
            },
        )
        .context("failed to create catalog watcher")?;

        let watch_root = self
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.path.clone());
        watcher
            .watch(&watch_root, RecursiveMode::NonRecursive)
            .with_context(|| format!("failed to watch {}", watch_root.display()))?;

        while let Some(result) = raw_rx.recv().await {
            match result {
                Ok(event) => {
                    if !event.paths.iter().any(|path| path == &self.path) {
                        continue;
                    }
                    if matches!(
                        event.kind,
                        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                    ) {
                        debug!(path = %self.path.display(), "Catalog file changed");
                        if sender
                            .send(CatalogEvent::Changed {
                                path: self.path.clone(),
                            })
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                }
                Err(err) => {
                    if sender.send(CatalogEvent::Error(err.into())).await.is_err() {
                        break;
                    }
                }
            }
        }

        Ok(())
    }
}
