use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::Choice;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading(RichText::new("Catalog Lens").color(Color32::from_rgb(229, 9, 20)));
    ui.add_space(4.0);
    ui.heading("Filters");
    ui.separator();

    if state.catalog.is_empty() {
        ui.label("No titles survived loading.");
        return;
    }

    // Clone what we need so we can mutate state inside the closures.
    let variants = state.catalog.type_variants.clone();
    let countries = state.catalog.top_countries.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Select Type");
            if let Some(kind) = choice_combo(ui, "type_filter", &state.selection.kind, &variants) {
                state.set_kind(kind);
            }
            ui.add_space(12.0);

            ui.strong("Select Country");
            if let Some(country) =
                choice_combo(ui, "country_filter", &state.selection.country, &countries)
            {
                state.set_country(country);
            }
            ui.add_space(12.0);

            if let Some(bounds) = state.catalog.year_bounds {
                ui.strong("Release Years");
                let mut low = state.selection.years.low;
                let mut high = state.selection.years.high;
                let low_changed = ui
                    .add(egui::Slider::new(&mut low, bounds.low..=bounds.high).text("From"))
                    .changed();
                let high_changed = ui
                    .add(egui::Slider::new(&mut high, bounds.low..=bounds.high).text("To"))
                    .changed();

                // Keep the window ordered by dragging the other end along.
                if low_changed && low > high {
                    high = low;
                }
                if high_changed && high < low {
                    low = high;
                }
                if low_changed || high_changed {
                    state.set_years(low, high);
                }
            }
            ui.add_space(12.0);
            ui.separator();

            if ui.button("Reset filters").clicked() {
                state.reset_filters();
            }
        });
}

/// Dropdown over `options` plus "All". Returns the new choice if the user
/// picked something different.
fn choice_combo(
    ui: &mut Ui,
    id: &str,
    current: &Choice<String>,
    options: &[String],
) -> Option<Choice<String>> {
    let mut picked = None;
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.label())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for opt in options {
                let is_current = matches!(current, Choice::Only(v) if v == opt);
                if ui.selectable_label(is_current, opt).clicked() && !is_current {
                    picked = Some(Choice::Only(opt.clone()));
                }
            }
            let all = *current == Choice::All;
            if ui.selectable_label(all, "All").clicked() && !all {
                picked = Some(Choice::All);
            }
        });
    picked
}

// ---------------------------------------------------------------------------
// Summary cards
// ---------------------------------------------------------------------------

/// Headline numbers for the whole catalog plus the current subset size.
pub fn summary_cards(ui: &mut Ui, state: &AppState) {
    let summary = &state.catalog.summary;
    let cards = [
        ("Titles", summary.total),
        ("Total Movies", summary.movies),
        ("Total Shows", summary.shows),
        ("Countries", summary.countries),
        ("Visible", state.aggregations.subset_len),
    ];

    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (label, value) in cards {
            egui::Frame::group(ui.style())
                .fill(Color32::from_gray(24))
                .inner_margin(10.0)
                .show(ui, |ui: &mut Ui| {
                    ui.set_min_width(110.0);
                    ui.vertical_centered(|ui: &mut Ui| {
                        ui.label(RichText::new(label).color(Color32::LIGHT_GRAY));
                        ui.label(RichText::new(value.to_string()).heading().strong());
                    });
                });
        }
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Export aggregations…").clicked() {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{}: {} titles loaded, {} dropped, {} visible",
            state.source.display(),
            state.catalog.len(),
            state.catalog.dropped,
            state.aggregations.subset_len
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open catalog")
        .add_filter("Supported files", &["csv", "tsv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv", "tsv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(catalog) => state.set_catalog(catalog, path),
            Err(e) => {
                // The previous catalog stays in place.
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

pub fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export aggregations")
        .add_filter("JSON", &["json"])
        .set_file_name("aggregations.json")
        .save_file();

    let Some(path) = file else {
        return;
    };

    let written = state
        .export_json()
        .and_then(|json| std::fs::write(&path, json).map_err(anyhow::Error::from));
    match written {
        Ok(()) => {
            log::info!("Exported aggregations to {}", path.display());
            state.status_message = None;
        }
        Err(e) => {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Export failed: {e:#}"));
        }
    }
}
