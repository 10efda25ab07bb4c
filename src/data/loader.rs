use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, ArrayRef, AsArray, Float64Array, Int16Array, Int32Array, Int64Array,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Catalog, Record};

/// Columns every backing file must provide.
pub const REQUIRED_COLUMNS: [&str; 5] = ["type", "release_year", "rating", "country", "duration"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a catalog from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.tsv` – header row, one title per line
/// * `.json`         – `[{ "type": "Movie", "release_year": 2019, ... }, ...]`
/// * `.parquet`      – flat table with the required columns
///
/// Rows missing any required field are dropped; a missing column or an
/// unreadable file is an error.
pub fn load_file(path: &Path) -> Result<Catalog> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let catalog = match ext.as_str() {
        "csv" => load_csv(path, b','),
        "tsv" => load_csv(path, b'\t'),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} titles from {} ({} incomplete rows dropped)",
        catalog.len(),
        path.display(),
        catalog.dropped
    );
    Ok(catalog)
}

// ---------------------------------------------------------------------------
// Row assembly shared by every format
// ---------------------------------------------------------------------------

/// One source row before the completeness check.
#[derive(Debug)]
struct RawRow {
    kind: Option<String>,
    release_year: Option<i32>,
    rating: Option<String>,
    country: Option<String>,
    duration: Option<String>,
}

impl RawRow {
    fn into_record(self) -> Option<Record> {
        Some(Record::new(
            self.kind?,
            self.release_year?,
            self.rating?,
            self.country?,
            self.duration?,
        ))
    }
}

fn finish(rows: Vec<RawRow>) -> Catalog {
    let total = rows.len();
    let records: Vec<Record> = rows.into_iter().filter_map(RawRow::into_record).collect();
    let dropped = total - records.len();
    if dropped > 0 {
        log::warn!("Dropped {dropped} of {total} rows with missing required fields");
    }
    Catalog::from_records(records, dropped)
}

/// Empty and whitespace-only text counts as missing.
fn present(s: &str) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Parse a release year from text. `"2019.0"` is accepted since float
/// exports of integer columns are common.
fn parse_year(s: &str, row: usize) -> Result<Option<i32>> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    if let Ok(y) = s.parse::<i32>() {
        return Ok(Some(y));
    }
    match s.parse::<f64>() {
        Ok(f) => year_from_f64(f, row),
        Err(_) => bail!("Row {row}: release_year '{s}' is not a number"),
    }
}

fn year_from_f64(f: f64, row: usize) -> Result<Option<i32>> {
    if f.is_nan() {
        return Ok(None);
    }
    if f.fract() != 0.0 || f < i32::MIN as f64 || f > i32::MAX as f64 {
        bail!("Row {row}: release_year {f} is not a whole year");
    }
    Ok(Some(f as i32))
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .with_context(|| format!("missing required column '{name}'"))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path, delimiter: u8) -> Result<Catalog> {
    let file = File::open(path).context("opening CSV")?;
    load_csv_reader(file, delimiter)
}

/// Read delimited text with a header row. Columns other than the required
/// five are ignored.
pub fn load_csv_reader<R: Read>(input: R, delimiter: u8) -> Result<Catalog> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(input);
    let headers = reader.headers().context("reading CSV headers")?.clone();

    let [kind_idx, year_idx, rating_idx, country_idx, duration_idx] =
        REQUIRED_COLUMNS.map(|name| column_index(&headers, name));
    let (kind_idx, year_idx, rating_idx, country_idx, duration_idx) =
        (kind_idx?, year_idx?, rating_idx?, country_idx?, duration_idx?);

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        rows.push(RawRow {
            kind: present(cell(kind_idx)),
            release_year: parse_year(cell(year_idx), row_no)?,
            rating: present(cell(rating_idx)),
            country: present(cell(country_idx)),
            duration: present(cell(duration_idx)),
        });
    }

    Ok(finish(rows))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "type": "Movie", "release_year": 2019, "rating": "PG-13",
///     "country": "United States", "duration": "98 min" },
///   ...
/// ]
/// ```
///
/// An empty array loads as an empty catalog; there is no header to check.
fn load_json(path: &Path) -> Result<Catalog> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    // Column presence is judged on the first object, like a DataFrame header.
    if let Some(first) = records.first() {
        let obj = first.as_object().context("Row 0 is not a JSON object")?;
        for name in REQUIRED_COLUMNS {
            if !obj.contains_key(name) {
                bail!("missing required column '{name}'");
            }
        }
    }

    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        rows.push(RawRow {
            kind: json_text(obj.get("type")),
            release_year: json_year(obj.get("release_year"), i)?,
            rating: json_text(obj.get("rating")),
            country: json_text(obj.get("country")),
            duration: json_text(obj.get("duration")),
        });
    }

    Ok(finish(rows))
}

fn json_text(val: Option<&JsonValue>) -> Option<String> {
    match val? {
        JsonValue::String(s) => present(s),
        JsonValue::Null => None,
        other => Some(other.to_string()),
    }
}

fn json_year(val: Option<&JsonValue>, row: usize) -> Result<Option<i32>> {
    match val {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Number(n)) => match n.as_i64() {
            Some(i) => i32::try_from(i)
                .map(Some)
                .with_context(|| format!("Row {row}: release_year {i} out of range")),
            None => year_from_f64(n.as_f64().unwrap_or(f64::NAN), row),
        },
        Some(JsonValue::String(s)) => parse_year(s, row),
        Some(other) => bail!("Row {row}: release_year {other} is not a number"),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding the catalog as flat columns.
///
/// Text columns may be Utf8 or LargeUtf8; `release_year` may be any of
/// Int16/Int32/Int64/Float64 (Pandas writes Float64 when the column has NaN).
fn load_parquet(path: &Path) -> Result<Catalog> {
    let file = File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    // Checked on the file schema so a file with no row groups is still rejected.
    for name in REQUIRED_COLUMNS {
        if builder.schema().index_of(name).is_err() {
            bail!("missing required column '{name}'");
        }
    }
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    let mut offset = 0;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let [kind, year, rating, country, duration] = REQUIRED_COLUMNS.map(|name| {
            schema
                .index_of(name)
                .map(|i| batch.column(i).clone())
                .map_err(|_| anyhow::anyhow!("missing required column '{name}'"))
        });
        let (kind, year, rating, country, duration) = (kind?, year?, rating?, country?, duration?);

        for row in 0..batch.num_rows() {
            let row_no = offset + row;
            rows.push(RawRow {
                kind: text_cell(&kind, row).with_context(|| format!("Row {row_no}: 'type'"))?,
                release_year: year_cell(&year, row, row_no)?,
                rating: text_cell(&rating, row).with_context(|| format!("Row {row_no}: 'rating'"))?,
                country: text_cell(&country, row)
                    .with_context(|| format!("Row {row_no}: 'country'"))?,
                duration: text_cell(&duration, row)
                    .with_context(|| format!("Row {row_no}: 'duration'"))?,
            });
        }
        offset += batch.num_rows();
    }

    Ok(finish(rows))
}

// -- Parquet / Arrow helpers --

fn text_cell(col: &ArrayRef, row: usize) -> Result<Option<String>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let s = match col.data_type() {
        DataType::Utf8 => col.as_string::<i32>().value(row),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row),
        other => bail!("expected a string column, got {other:?}"),
    };
    Ok(present(s))
}

fn year_cell(col: &ArrayRef, row: usize, row_no: usize) -> Result<Option<i32>> {
    if col.is_null(row) {
        return Ok(None);
    }
    match col.data_type() {
        DataType::Int16 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int16Array>()
                .context("expected Int16Array")?;
            Ok(Some(arr.value(row) as i32))
        }
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            Ok(Some(arr.value(row)))
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            let v = arr.value(row);
            i32::try_from(v)
                .map(Some)
                .with_context(|| format!("Row {row_no}: release_year {v} out of range"))
        }
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            year_from_f64(arr.value(row), row_no)
        }
        DataType::Utf8 => parse_year(col.as_string::<i32>().value(row), row_no),
        other => bail!("Row {row_no}: release_year column has unsupported type {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::StringArray;
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;
    use crate::data::model::{MOVIE, TV_SHOW};

    const HEADER: &str = "show_id,type,title,country,release_year,rating,duration";

    fn csv(rows: &[&str]) -> String {
        let mut text = HEADER.to_string();
        for r in rows {
            text.push('\n');
            text.push_str(r);
        }
        text
    }

    #[test]
    fn csv_drops_incomplete_rows() {
        let text = csv(&[
            "s1,Movie,Dick Johnson Is Dead,United States,2020,PG-13,90 min",
            "s2,TV Show,Blood & Water,South Africa,2021,TV-MA,2 Seasons",
            "s3,TV Show,Ganglands,,2021,TV-MA,1 Season",
            "s4,Movie,No Duration,United States,2017,TV-MA,",
            "s5,Movie,No Year,India,,TV-14,120 min",
            "s6,Movie,Blank Rating,India,2019,   ,110 min",
        ]);
        let catalog = load_csv_reader(text.as_bytes(), b',').unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.dropped, 4);
        assert_eq!(
            catalog.records[0],
            Record::new(MOVIE, 2020, "PG-13", "United States", "90 min")
        );
        assert_eq!(catalog.records[1].kind, TV_SHOW);
        assert_eq!(catalog.summary.total, 2);
        assert_eq!(catalog.summary.movies, 1);
        assert_eq!(catalog.summary.shows, 1);
        assert_eq!(catalog.summary.countries, 2);
    }

    #[test]
    fn csv_keeps_quoted_multi_country_values_whole() {
        let text = csv(&["s1,Movie,Sankofa,\"United States, Ghana\",1993,TV-MA,125 min"]);
        let catalog = load_csv_reader(text.as_bytes(), b',').unwrap();
        assert_eq!(catalog.records[0].country, "United States, Ghana");
    }

    #[test]
    fn csv_missing_column_is_fatal() {
        let text = "type,release_year,rating,country\nMovie,2020,PG,US\n";
        let err = load_csv_reader(text.as_bytes(), b',').unwrap_err();
        assert!(format!("{err:#}").contains("duration"));
    }

    #[test]
    fn json_missing_column_is_fatal() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"type": "Movie", "release_year": 2015, "rating": "PG", "duration": "90 min"}}]"#
        )
        .unwrap();

        let err = load_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("country"));
    }

    #[test]
    fn empty_json_array_is_an_empty_catalog() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "[]").unwrap();

        let catalog = load_file(file.path()).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.year_bounds, None);
    }

    #[test]
    fn parquet_missing_column_is_fatal_even_without_rows() {
        let schema = Arc::new(Schema::new(vec![Field::new("type", DataType::Utf8, true)]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![Arc::new(StringArray::from(Vec::<Option<&str>>::new()))],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let err = load_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("missing required column"));
    }

    #[test]
    fn csv_non_numeric_year_is_fatal() {
        let text = csv(&["s1,Movie,Bad,US,twenty,PG,90 min"]);
        let err = load_csv_reader(text.as_bytes(), b',').unwrap_err();
        assert!(format!("{err:#}").contains("release_year"));
    }

    #[test]
    fn float_years_are_accepted_when_whole() {
        assert_eq!(parse_year("2019.0", 0).unwrap(), Some(2019));
        assert!(parse_year("2019.5", 0).is_err());
        assert_eq!(parse_year(" ", 0).unwrap(), None);
    }

    #[test]
    fn tsv_uses_tab_delimiter() {
        let mut file = tempfile::Builder::new().suffix(".tsv").tempfile().unwrap();
        writeln!(file, "type\trelease_year\trating\tcountry\tduration").unwrap();
        writeln!(file, "Movie\t2001\tR\tFrance\t101 min").unwrap();

        let catalog = load_file(file.path()).unwrap();
        assert_eq!(catalog.records, vec![Record::new(MOVIE, 2001, "R", "France", "101 min")]);
    }

    #[test]
    fn json_records_load() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[
                {{"type": "Movie", "release_year": 2015, "rating": "PG", "country": "US", "duration": "90 min"}},
                {{"type": "TV Show", "release_year": 2020.0, "rating": "PG", "country": "IN", "duration": "2 Seasons"}},
                {{"type": "Movie", "release_year": 2018, "rating": null, "country": "US", "duration": "80 min"}}
            ]"#
        )
        .unwrap();

        let catalog = load_file(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.dropped, 1);
        assert_eq!(catalog.records[1].release_year, 2020);
    }

    #[test]
    fn parquet_records_load() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("type", DataType::Utf8, true),
            Field::new("release_year", DataType::Int64, true),
            Field::new("rating", DataType::Utf8, true),
            Field::new("country", DataType::Utf8, true),
            Field::new("duration", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("Movie"), Some("TV Show")])),
                Arc::new(Int64Array::from(vec![Some(2015), None])),
                Arc::new(StringArray::from(vec![Some("PG"), Some("TV-MA")])),
                Arc::new(StringArray::from(vec![Some("US"), Some("IN")])),
                Arc::new(StringArray::from(vec![Some("90 min"), Some("2 Seasons")])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let catalog = load_file(file.path()).unwrap();
        assert_eq!(catalog.records, vec![Record::new(MOVIE, 2015, "PG", "US", "90 min")]);
        assert_eq!(catalog.dropped, 1);
    }

    #[test]
    fn unsupported_extension_and_missing_file_fail() {
        assert!(load_file(Path::new("titles.xlsx")).is_err());
        assert!(load_file(Path::new("/definitely/not/here.csv")).is_err());
    }
}
