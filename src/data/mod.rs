/// Data layer: row schema, workbook ingestion, selection and statistics.
///
/// Architecture:
/// ```text
///  .xlsx / .xls / .ods  (one per upload)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  Jockeys + Trainers + Sires → SourceTable (per file)
///   └──────────┘
///        │  Ingestion { tables, errors }
///        ▼
///   ┌──────────┐
///   │  filter   │  selected file names → UnifiedTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ analysis  │  stats: Pearson r, stacked histograms, KDE
///   └──────────┘
/// ```

pub mod analysis;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
