mod app;
mod banner;

use anyhow::Result;
use std::fs::{self, OpenOptions};

use corkboard_core::{
    catalog::{CatalogLoader, CatalogWatch},
    config::{self, AppConfig},
};
use tokio::sync::mpsc;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;

    let loader = CatalogLoader::new(config.catalog_source());
    let mut app = app::BoardApp::new(loader, &config);

    if let Some(path) = config.catalog_path.clone() {
        let watch = CatalogWatch::new(path);
        let (watch_tx, watch_rx) = mpsc::channel(8);
        tokio::spawn(async move {
            if let Err(err) = watch.run(watch_tx).await {
                tracing::error!("Catalog watch task error: {err}");
            }
        });
        app.attach_catalog_watch(watch_rx);
    }

    app.run().await
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("corkboard.log");

    let env_filter = EnvFilter::from_default_env();

    // Stdout belongs to the terminal UI; everything logs to the file.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
