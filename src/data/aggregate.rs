use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::duration::{parse_minutes, DurationError};
use super::filter::{filtered_indices, FilterSelection};
use super::model::{Catalog, Record, TOP_COUNTRY_LIMIT};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Number of records in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// A category's count together with its fraction of the subset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub category: String,
    pub count: usize,
    pub fraction: f64,
}

/// Everything the charts need for one filter selection.
///
/// All six fields are computed from the same filtered subset. Only
/// `movie_durations` can fail, and its failure leaves the rest intact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregations {
    pub subset_len: usize,
    /// Records per type, most frequent first.
    pub type_counts: Vec<CategoryCount>,
    /// Records per rating as proportions, most frequent first.
    pub rating_shares: Vec<Share>,
    /// Records per release year, ascending.
    pub release_trend: BTreeMap<i32, usize>,
    /// Running times of films in the subset, in table order.
    pub movie_durations: Result<Vec<u32>, DurationError>,
    /// Up to ten countries, most frequent first, ties by name.
    pub top_countries: Vec<CategoryCount>,
    /// type → year → count, only for observed pairs.
    pub type_by_year: BTreeMap<String, BTreeMap<i32, usize>>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Stateless filter-then-aggregate pipeline over a borrowed catalog.
#[derive(Debug, Clone, Copy)]
pub struct Engine<'a> {
    catalog: &'a Catalog,
}

impl<'a> Engine<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Engine { catalog }
    }

    /// The records passing `selection`, in table order.
    pub fn subset(&self, selection: &FilterSelection) -> Vec<&'a Record> {
        filtered_indices(self.catalog, selection)
            .into_iter()
            .map(|i| &self.catalog.records[i])
            .collect()
    }

    /// Filter once and derive all six aggregations from that subset.
    pub fn compute(&self, selection: &FilterSelection) -> Aggregations {
        let subset = self.subset(selection);

        let movie_durations = movie_durations(&subset);
        if let Err(e) = &movie_durations {
            log::warn!("Movie duration aggregation failed: {e}");
        }

        Aggregations {
            subset_len: subset.len(),
            type_counts: type_counts(&subset),
            rating_shares: rating_shares(&subset),
            release_trend: release_trend(&subset),
            movie_durations,
            top_countries: top_countries(&subset),
            type_by_year: type_by_year(&subset),
        }
    }
}

// ---------------------------------------------------------------------------
// The six aggregations
// ---------------------------------------------------------------------------

/// Count per key, most frequent first; equal counts keep first-appearance order.
fn value_counts<'r>(keys: impl Iterator<Item = &'r str>) -> Vec<CategoryCount> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for k in keys {
        let c = counts.entry(k).or_insert_with(|| {
            order.push(k);
            0
        });
        *c += 1;
    }

    let mut out: Vec<CategoryCount> = order
        .into_iter()
        .map(|k| CategoryCount {
            category: k.to_string(),
            count: counts[k],
        })
        .collect();
    // sort_by is stable, so ties stay in first-appearance order.
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

pub fn type_counts(subset: &[&Record]) -> Vec<CategoryCount> {
    value_counts(subset.iter().map(|r| r.kind.as_str()))
}

pub fn rating_shares(subset: &[&Record]) -> Vec<Share> {
    let total = subset.len() as f64;
    value_counts(subset.iter().map(|r| r.rating.as_str()))
        .into_iter()
        .map(|c| Share {
            fraction: c.count as f64 / total,
            category: c.category,
            count: c.count,
        })
        .collect()
}

pub fn release_trend(subset: &[&Record]) -> BTreeMap<i32, usize> {
    let mut trend = BTreeMap::new();
    for r in subset {
        *trend.entry(r.release_year).or_default() += 1;
    }
    trend
}

/// Minutes for every film in the subset. Series are skipped whatever the
/// type filter says; the first unparsable film duration fails the whole series.
pub fn movie_durations(subset: &[&Record]) -> Result<Vec<u32>, DurationError> {
    subset
        .iter()
        .filter(|r| r.is_movie())
        .map(|r| parse_minutes(&r.duration))
        .collect()
}

pub fn top_countries(subset: &[&Record]) -> Vec<CategoryCount> {
    let mut ranked = value_counts(subset.iter().map(|r| r.country.as_str()));
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
    ranked.truncate(TOP_COUNTRY_LIMIT);
    ranked
}

pub fn type_by_year(subset: &[&Record]) -> BTreeMap<String, BTreeMap<i32, usize>> {
    let mut pivot: BTreeMap<String, BTreeMap<i32, usize>> = BTreeMap::new();
    for r in subset {
        *pivot
            .entry(r.kind.clone())
            .or_default()
            .entry(r.release_year)
            .or_default() += 1;
    }
    pivot
}

// ---------------------------------------------------------------------------
// Helpers for chart consumers
// ---------------------------------------------------------------------------

/// Bucket values into `bin_width`-wide bins keyed by bin start, ascending.
/// Empty bins between occupied ones are not reported.
pub fn histogram(values: &[u32], bin_width: u32) -> BTreeMap<u32, usize> {
    let width = bin_width.max(1);
    let mut bins = BTreeMap::new();
    for v in values {
        *bins.entry(v / width * width).or_default() += 1;
    }
    bins
}

/// Last value covered by the bin starting at `start`, saturating at `u32::MAX`.
pub fn bin_end(start: u32, bin_width: u32) -> u32 {
    start.saturating_add(bin_width.max(1) - 1)
}

/// A series evaluated at every year in `years`, missing years as zero.
pub fn filled_series(
    series: &BTreeMap<i32, usize>,
    years: impl IntoIterator<Item = i32>,
) -> Vec<(i32, usize)> {
    years
        .into_iter()
        .map(|y| (y, series.get(&y).copied().unwrap_or(0)))
        .collect()
}
