/// Data layer: core types, loading, and summaries.
///
/// Architecture:
/// ```text
///  .csv / .xlsx upload (name + bytes)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  decode by extension → Table, booleans → text
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  named columns of typed cells
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ summary   │  overview, column info, describe, correlation
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod summary;
