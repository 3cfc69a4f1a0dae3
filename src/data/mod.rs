/// Data layer: curve type, file loading, and the filter library.
///
/// Architecture:
/// ```text
///  .parquet / .csv / .json / .dat
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → Curve
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Curve   │  wavelength + value, sorted
///   └──────────┘
///
///   ┌──────────┐
///   │  filter  │  directory tree → filter name → file
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
