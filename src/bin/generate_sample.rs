use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `[lo, hi]`.
    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_f64() * (hi - lo + 1) as f64) as i64
    }

    /// Pick from `items` with the given relative weights.
    fn weighted<'a>(&mut self, items: &[(&'a str, f64)]) -> &'a str {
        let total: f64 = items.iter().map(|(_, w)| w).sum();
        let mut r = self.next_f64() * total;
        for (item, w) in items {
            if r < *w {
                return *item;
            }
            r -= w;
        }
        items[items.len() - 1].0
    }
}

/// One generated title; `None` marks a blank cell.
struct Row {
    kind: String,
    title: String,
    country: Option<String>,
    release_year: Option<i64>,
    rating: Option<String>,
    duration: Option<String>,
}

const COUNTRIES: [(&str, f64); 12] = [
    ("United States", 30.0),
    ("India", 10.0),
    ("United Kingdom", 6.0),
    ("Japan", 4.0),
    ("South Korea", 3.5),
    ("Canada", 3.0),
    ("Spain", 2.5),
    ("France", 2.5),
    ("Mexico", 2.0),
    ("Egypt", 1.5),
    ("Nigeria", 1.0),
    ("United States, Canada", 1.0),
];

const MOVIE_RATINGS: [(&str, f64); 6] = [
    ("TV-MA", 3.0),
    ("TV-14", 2.5),
    ("R", 2.0),
    ("PG-13", 1.5),
    ("PG", 1.0),
    ("G", 0.3),
];

const SHOW_RATINGS: [(&str, f64); 4] = [("TV-MA", 3.0), ("TV-14", 2.5), ("TV-PG", 1.0), ("TV-Y7", 0.5)];

fn generate(rng: &mut SimpleRng, n: usize) -> Vec<Row> {
    (0..n)
        .map(|i| {
            let is_movie = rng.next_f64() < 0.7;
            // Skew release years towards the recent end.
            let year = 2021 - (rng.next_f64().powi(3) * 80.0) as i64;
            let (kind, rating, duration) = if is_movie {
                let minutes = (95.0 + (rng.next_f64() - 0.5) * 80.0) as i64;
                ("Movie", rng.weighted(&MOVIE_RATINGS), format!("{minutes} min"))
            } else {
                let seasons = rng.range(1, 6);
                let unit = if seasons == 1 { "Season" } else { "Seasons" };
                ("TV Show", rng.weighted(&SHOW_RATINGS), format!("{seasons} {unit}"))
            };

            // A few blank cells so loaders have something to drop.
            let blank = rng.range(0, 39);
            Row {
                kind: kind.to_string(),
                title: format!("Title {i:04}"),
                country: (blank != 0).then(|| rng.weighted(&COUNTRIES).to_string()),
                release_year: (blank != 1).then_some(year),
                rating: (blank != 2).then(|| rating.to_string()),
                duration: (blank != 3).then_some(duration),
            }
        })
        .collect()
}

fn write_csv(rows: &[Row], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(["show_id", "type", "title", "country", "release_year", "rating", "duration"])?;
    for (i, row) in rows.iter().enumerate() {
        let year = row.release_year.map(|y| y.to_string()).unwrap_or_default();
        writer.write_record([
            format!("s{}", i + 1).as_str(),
            row.kind.as_str(),
            row.title.as_str(),
            row.country.as_deref().unwrap_or(""),
            year.as_str(),
            row.rating.as_deref().unwrap_or(""),
            row.duration.as_deref().unwrap_or(""),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(rows: &[Row], path: &str) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("type", DataType::Utf8, false),
        Field::new("title", DataType::Utf8, false),
        Field::new("country", DataType::Utf8, true),
        Field::new("release_year", DataType::Int64, true),
        Field::new("rating", DataType::Utf8, true),
        Field::new("duration", DataType::Utf8, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.kind.as_str()))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.title.as_str()))),
            Arc::new(StringArray::from_iter(rows.iter().map(|r| r.country.as_deref()))),
            Arc::new(Int64Array::from_iter(rows.iter().map(|r| r.release_year))),
            Arc::new(StringArray::from_iter(rows.iter().map(|r| r.rating.as_deref()))),
            Arc::new(StringArray::from_iter(rows.iter().map(|r| r.duration.as_deref()))),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng, 2000);

    write_csv(&rows, "sample_titles.csv")?;
    write_parquet(&rows, "sample_titles.parquet")?;

    let movies = rows.iter().filter(|r| r.kind == "Movie").count();
    println!(
        "Wrote {} titles ({movies} movies, {} shows) to sample_titles.csv and sample_titles.parquet",
        rows.len(),
        rows.len() - movies
    );
    Ok(())
}
