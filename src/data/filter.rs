use serde::Serialize;

use super::model::{Catalog, Record, YearRange};

// ---------------------------------------------------------------------------
// Choice – a dimension that is either unfiltered or pinned to one value
// ---------------------------------------------------------------------------

/// `All` means "do not filter on this dimension".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum Choice<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Choice<T> {
    /// Exact equality against the pinned value; `All` matches everything.
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(v) => v == value,
        }
    }
}

impl Choice<String> {
    /// Label for dropdowns.
    pub fn label(&self) -> &str {
        match self {
            Choice::All => "All",
            Choice::Only(v) => v,
        }
    }
}

// ---------------------------------------------------------------------------
// FilterSelection
// ---------------------------------------------------------------------------

/// The user's current constraints on the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    pub kind: Choice<String>,
    pub country: Choice<String>,
    pub years: YearRange,
}

impl FilterSelection {
    /// No type or country constraint, full observed year span.
    pub fn full(catalog: &Catalog) -> Self {
        FilterSelection {
            kind: Choice::All,
            country: Choice::All,
            years: catalog.year_bounds.unwrap_or(YearRange::new(0, 0)),
        }
    }

    /// Whether a single record passes all three constraints.
    pub fn accepts(&self, record: &Record) -> bool {
        self.kind.matches(&record.kind)
            && self.country.matches(&record.country)
            && self.years.contains(record.release_year)
    }
}

/// Return indices of records passing `selection`, in table order.
pub fn filtered_indices(catalog: &Catalog, selection: &FilterSelection) -> Vec<usize> {
    catalog
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| selection.accepts(r))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{MOVIE, TV_SHOW};

    fn catalog() -> Catalog {
        Catalog::from_records(
            vec![
                Record::new(MOVIE, 2015, "PG", "United States", "90 min"),
                Record::new(MOVIE, 2020, "R", "United States, India", "120 min"),
                Record::new(TV_SHOW, 2020, "PG", "India", "2 Seasons"),
            ],
            0,
        )
    }

    #[test]
    fn full_selection_keeps_everything() {
        let c = catalog();
        let sel = FilterSelection::full(&c);
        assert_eq!(sel.years, YearRange::new(2015, 2020));
        assert_eq!(filtered_indices(&c, &sel), vec![0, 1, 2]);
    }

    #[test]
    fn type_filter_is_exact() {
        let c = catalog();
        let sel = FilterSelection {
            kind: Choice::Only(TV_SHOW.to_string()),
            ..FilterSelection::full(&c)
        };
        assert_eq!(filtered_indices(&c, &sel), vec![2]);
    }

    #[test]
    fn country_filter_does_not_split_multi_country_values() {
        let c = catalog();
        let sel = FilterSelection {
            country: Choice::Only("India".to_string()),
            ..FilterSelection::full(&c)
        };
        assert_eq!(filtered_indices(&c, &sel), vec![2]);
    }

    #[test]
    fn year_bounds_are_inclusive() {
        let c = catalog();
        let sel = FilterSelection {
            years: YearRange::new(2015, 2015),
            ..FilterSelection::full(&c)
        };
        assert_eq!(filtered_indices(&c, &sel), vec![0]);
    }

    #[test]
    fn out_of_range_or_inverted_years_give_empty_subset() {
        let c = catalog();
        for years in [YearRange::new(2021, 2025), YearRange::new(2020, 2015)] {
            let sel = FilterSelection {
                years,
                ..FilterSelection::full(&c)
            };
            assert!(filtered_indices(&c, &sel).is_empty());
        }
    }

    #[test]
    fn choice_labels() {
        assert_eq!(Choice::<String>::All.label(), "All");
        assert_eq!(Choice::Only("Movie".to_string()).label(), "Movie");
    }
}
