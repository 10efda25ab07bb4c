use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::color::ColorMap;
use crate::data::aggregate::{Aggregations, Engine};
use crate::data::filter::{Choice, FilterSelection};
use crate::data::model::{Catalog, Summary, YearRange};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Chart tab shown in the central panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    TypeRating,
    Duration,
    ReleaseCountry,
    Yearly,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::TypeRating, Tab::Duration, Tab::ReleaseCountry, Tab::Yearly];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::TypeRating => "Type & Rating",
            Tab::Duration => "Movie Duration",
            Tab::ReleaseCountry => "Release & Country",
            Tab::Yearly => "Yearly Comparison",
        }
    }
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Cleaned table; replaced wholesale on File → Open, never edited.
    pub catalog: Catalog,

    /// File the catalog was read from.
    pub source: PathBuf,

    /// Current filter selections.
    pub selection: FilterSelection,

    /// Chart data for `selection`, recomputed on every change.
    pub aggregations: Aggregations,

    /// Colour per content type.
    pub colors: ColorMap,

    pub tab: Tab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

/// What File → Export writes.
#[derive(Serialize)]
struct Export<'a> {
    source: &'a Path,
    summary: &'a Summary,
    selection: &'a FilterSelection,
    aggregations: &'a Aggregations,
}

impl AppState {
    pub fn new(catalog: Catalog, source: PathBuf) -> Self {
        let selection = FilterSelection::full(&catalog);
        let aggregations = Engine::new(&catalog).compute(&selection);
        let colors = ColorMap::new(&catalog.type_variants);
        Self {
            catalog,
            source,
            selection,
            aggregations,
            colors,
            tab: Tab::default(),
            status_message: None,
        }
    }

    /// Swap in a newly loaded catalog and reset filters to match it.
    pub fn set_catalog(&mut self, catalog: Catalog, source: PathBuf) {
        let tab = self.tab;
        *self = AppState::new(catalog, source);
        self.tab = tab;
    }

    /// Recompute all aggregations from the full table.
    fn refresh(&mut self) {
        self.aggregations = Engine::new(&self.catalog).compute(&self.selection);
        log::debug!(
            "Selection {:?} matched {} of {} titles",
            self.selection,
            self.aggregations.subset_len,
            self.catalog.len()
        );
    }

    pub fn set_kind(&mut self, kind: Choice<String>) {
        if self.selection.kind != kind {
            self.selection.kind = kind;
            self.refresh();
        }
    }

    pub fn set_country(&mut self, country: Choice<String>) {
        if self.selection.country != country {
            self.selection.country = country;
            self.refresh();
        }
    }

    /// Set the year window, clamped to the observed span.
    pub fn set_years(&mut self, low: i32, high: i32) {
        let years = match self.catalog.year_bounds {
            Some(b) => YearRange::new(low.clamp(b.low, b.high), high.clamp(b.low, b.high)),
            None => YearRange::new(low, high),
        };
        if self.selection.years != years {
            self.selection.years = years;
            self.refresh();
        }
    }

    pub fn reset_filters(&mut self) {
        self.selection = FilterSelection::full(&self.catalog);
        self.refresh();
    }

    /// Current selection and its aggregations as pretty JSON.
    pub fn export_json(&self) -> Result<String> {
        let export = Export {
            source: &self.source,
            summary: &self.catalog.summary,
            selection: &self.selection,
            aggregations: &self.aggregations,
        };
        serde_json::to_string_pretty(&export).context("serialising aggregations")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Record, MOVIE, TV_SHOW};

    fn state() -> AppState {
        let catalog = Catalog::from_records(
            vec![
                Record::new(MOVIE, 2015, "PG", "US", "90 min"),
                Record::new(MOVIE, 2020, "R", "US", "120 min"),
                Record::new(TV_SHOW, 2020, "PG", "IN", "2 Seasons"),
            ],
            0,
        );
        AppState::new(catalog, PathBuf::from("titles.csv"))
    }

    #[test]
    fn starts_unfiltered() {
        let s = state();
        assert_eq!(s.selection.years, YearRange::new(2015, 2020));
        assert_eq!(s.aggregations.subset_len, 3);
    }

    #[test]
    fn each_change_recomputes_from_the_full_table() {
        let mut s = state();
        s.set_kind(Choice::Only(TV_SHOW.to_string()));
        assert_eq!(s.aggregations.subset_len, 1);

        s.set_kind(Choice::All);
        s.set_country(Choice::Only("US".to_string()));
        assert_eq!(s.aggregations.subset_len, 2);
        assert_eq!(s.aggregations.movie_durations, Ok(vec![90, 120]));
    }

    #[test]
    fn years_are_clamped_to_observed_span() {
        let mut s = state();
        s.set_years(1900, 2100);
        assert_eq!(s.selection.years, YearRange::new(2015, 2020));
        s.set_years(2016, 2100);
        assert_eq!(s.aggregations.subset_len, 2);
    }

    #[test]
    fn reset_restores_full_selection() {
        let mut s = state();
        s.set_country(Choice::Only("IN".to_string()));
        s.set_years(2020, 2020);
        s.reset_filters();
        assert_eq!(s.selection, FilterSelection::full(&s.catalog));
        assert_eq!(s.aggregations.subset_len, 3);
    }

    #[test]
    fn export_contains_every_aggregation() {
        let json: serde_json::Value = serde_json::from_str(&state().export_json().unwrap()).unwrap();
        let aggs = &json["aggregations"];
        for key in [
            "type_counts",
            "rating_shares",
            "release_trend",
            "movie_durations",
            "top_countries",
            "type_by_year",
        ] {
            assert!(!aggs[key].is_null(), "missing {key}");
        }
        assert_eq!(aggs["movie_durations"]["Ok"], serde_json::json!([90, 120]));
        assert_eq!(json["summary"]["total"], 3);
    }
}
