//! Cross-report comparison: date ordering, name reconciliation, trends.
//!
//! Pipeline: reports are stably sorted by resolved date, grouped into date
//! columns by raw date string, and their observations are folded into a
//! canonical test table through a `NameMapping`. Cells are looked up on
//! demand ("first match wins" inside a column) and trends are computed
//! between adjacent columns.

pub mod columns;
pub mod date;
pub mod engine;
pub mod mapping;
pub mod table;
pub mod trend;

pub use columns::{DateColumn, UNDATED_LABEL};
pub use date::parse_report_date;
pub use engine::{collect_raw_names, reconcile, CanonicalTest, ComparisonMatrix};
pub use mapping::NameMapping;
pub use table::{TableCell, TableRow, TableView, ABSENT_MARKER};
pub use trend::{compute_trend, STABLE_THRESHOLD_PERCENT};
