pub mod row;
pub mod filter;
pub mod writer;
pub mod exporter;

pub use exporter::{ExportSummary, IssueExporter, IssueSource};
pub use filter::IssueFilter;
pub use row::{DateFormat, RowProjector, BASE_COLUMNS};
pub use writer::write_csv;
