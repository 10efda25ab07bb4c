mod app;
mod color;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::Result;
use app::CatalogLensApp;
use eframe::egui;
use state::AppState;

/// Used when neither a CLI argument nor `CATALOG_PATH` names a file.
const DEFAULT_DATASET: &str = "netflix_titles.csv";

/// First CLI argument, else `CATALOG_PATH`, else [`DEFAULT_DATASET`].
fn dataset_path() -> PathBuf {
    std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os("CATALOG_PATH"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET))
}

fn main() -> Result<()> {
    env_logger::init();

    // The catalog must load before any window opens.
    let path = dataset_path();
    let catalog = data::loader::load_file(&path).inspect_err(|e| {
        log::error!("Failed to load catalog: {e:#}");
    })?;
    let state = AppState::new(catalog, path);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Catalog Lens – Title Explorer",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(CatalogLensApp::new(state)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("running UI: {e}"))
}
