use std::collections::{BTreeSet, HashMap};
use std::ops::RangeInclusive;

use serde::Serialize;

/// The `type` value used for films.
pub const MOVIE: &str = "Movie";
/// The `type` value used for series.
pub const TV_SHOW: &str = "TV Show";

/// How many countries the country dropdown offers.
pub const TOP_COUNTRY_LIMIT: usize = 10;

// ---------------------------------------------------------------------------
// Record – one row of the catalog
// ---------------------------------------------------------------------------

/// A single catalog title. Every field is guaranteed present after loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Content type, e.g. `"Movie"` or `"TV Show"`.
    pub kind: String,
    pub release_year: i32,
    /// Content-rating code (`"PG"`, `"TV-MA"`, ...).
    pub rating: String,
    /// Country text exactly as stored; multi-country values are one category.
    pub country: String,
    /// Raw duration text, `"90 min"` or `"2 Seasons"`.
    pub duration: String,
}

impl Record {
    pub fn new(
        kind: impl Into<String>,
        release_year: i32,
        rating: impl Into<String>,
        country: impl Into<String>,
        duration: impl Into<String>,
    ) -> Self {
        Record {
            kind: kind.into(),
            release_year,
            rating: rating.into(),
            country: country.into(),
            duration: duration.into(),
        }
    }

    pub fn is_movie(&self) -> bool {
        self.kind == MOVIE
    }
}

// ---------------------------------------------------------------------------
// YearRange – inclusive release-year bounds
// ---------------------------------------------------------------------------

/// Inclusive `[low, high]` release-year window. `low > high` is an empty window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    pub low: i32,
    pub high: i32,
}

impl YearRange {
    pub fn new(low: i32, high: i32) -> Self {
        YearRange { low, high }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.low <= year && year <= self.high
    }

    /// Every year in the window, ascending.
    pub fn span(&self) -> RangeInclusive<i32> {
        self.low..=self.high
    }
}

// ---------------------------------------------------------------------------
// Summary – headline numbers shown above the charts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub movies: usize,
    pub shows: usize,
    pub countries: usize,
}

impl Summary {
    fn from_records(records: &[Record]) -> Self {
        let countries: BTreeSet<&str> = records.iter().map(|r| r.country.as_str()).collect();
        Summary {
            total: records.len(),
            movies: records.iter().filter(|r| r.kind == MOVIE).count(),
            shows: records.iter().filter(|r| r.kind == TV_SHOW).count(),
            countries: countries.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog – the cleaned, immutable table
// ---------------------------------------------------------------------------

/// The cleaned table plus everything derived from it once at load time.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub records: Vec<Record>,
    pub summary: Summary,
    /// Distinct `kind` values in order of first appearance.
    pub type_variants: Vec<String>,
    /// Most frequent countries over the whole table, used as the filter choices.
    pub top_countries: Vec<String>,
    /// Observed release-year span, `None` when the table is empty.
    pub year_bounds: Option<YearRange>,
    /// Rows discarded during loading because a required field was missing.
    pub dropped: usize,
}

impl Catalog {
    pub fn from_records(records: Vec<Record>, dropped: usize) -> Self {
        let mut type_variants: Vec<String> = Vec::new();
        for r in &records {
            if !type_variants.contains(&r.kind) {
                type_variants.push(r.kind.clone());
            }
        }

        let mut country_counts: HashMap<&str, usize> = HashMap::new();
        for r in &records {
            *country_counts.entry(r.country.as_str()).or_default() += 1;
        }
        let mut ranked: Vec<(&str, usize)> = country_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        let top_countries = ranked
            .into_iter()
            .take(TOP_COUNTRY_LIMIT)
            .map(|(c, _)| c.to_string())
            .collect();

        let year_bounds = records
            .iter()
            .map(|r| r.release_year)
            .fold(None, |acc: Option<YearRange>, y| match acc {
                None => Some(YearRange::new(y, y)),
                Some(b) => Some(YearRange::new(b.low.min(y), b.high.max(y))),
            });

        Catalog {
            summary: Summary::from_records(&records),
            records,
            type_variants,
            top_countries,
            year_bounds,
            dropped,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        Catalog::from_records(
            vec![
                Record::new(MOVIE, 2015, "PG", "United States", "90 min"),
                Record::new(MOVIE, 2020, "R", "United States", "120 min"),
                Record::new(TV_SHOW, 2020, "PG", "India", "2 Seasons"),
            ],
            0,
        )
    }

    #[test]
    fn summary_counts_types_and_countries() {
        let catalog = sample();
        assert_eq!(
            catalog.summary,
            Summary {
                total: 3,
                movies: 2,
                shows: 1,
                countries: 2
            }
        );
    }

    #[test]
    fn year_bounds_cover_observed_span() {
        assert_eq!(sample().year_bounds, Some(YearRange::new(2015, 2020)));
        assert_eq!(Catalog::from_records(Vec::new(), 4).year_bounds, None);
    }

    #[test]
    fn type_variants_keep_first_appearance_order() {
        let catalog = Catalog::from_records(
            vec![
                Record::new(TV_SHOW, 2001, "TV-14", "Japan", "1 Season"),
                Record::new(MOVIE, 2002, "PG", "Japan", "95 min"),
                Record::new(TV_SHOW, 2003, "TV-14", "Japan", "3 Seasons"),
            ],
            0,
        );
        assert_eq!(catalog.type_variants, vec![TV_SHOW, MOVIE]);
    }

    #[test]
    fn top_countries_are_capped_and_tie_broken_by_name() {
        let mut records = Vec::new();
        for (i, country) in ["K", "J", "I", "H", "G", "F", "E", "D", "C", "B", "A"]
            .iter()
            .enumerate()
        {
            records.push(Record::new(MOVIE, 2000 + i as i32, "PG", *country, "90 min"));
        }
        records.push(Record::new(MOVIE, 2010, "PG", "K", "80 min"));

        let catalog = Catalog::from_records(records, 0);
        assert_eq!(catalog.top_countries.len(), TOP_COUNTRY_LIMIT);
        assert_eq!(catalog.top_countries[0], "K");
        assert_eq!(catalog.top_countries[1], "A");
        assert!(!catalog.top_countries.contains(&"J".to_string()));
    }

    #[test]
    fn inverted_year_range_contains_nothing() {
        let range = YearRange::new(2021, 2015);
        assert!(!range.contains(2018));
        assert_eq!(range.span().count(), 0);
    }
}
