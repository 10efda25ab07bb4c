/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file, drop incomplete rows → Catalog
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Catalog   │  Vec<Record>, summary, top countries, year span
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  type / country / year range → subset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ aggregate │  six chart series from one subset
///   └──────────┘
/// ```

pub mod aggregate;
pub mod duration;
pub mod filter;
pub mod loader;
pub mod model;
