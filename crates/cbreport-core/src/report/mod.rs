//! Report construction and rendering
//!
//! Reports are built as [`ReportTree`]s (an Overview, an optional per-row
//! Detail and a Summary) and rendered as column-aligned text, or emitted as
//! key-sorted JSON envelopes around the summary and row records.

mod assembler;
mod builder;
mod render;
mod tree;
mod wrap;

pub use assembler::{ReportFormat, Reporter};
pub use builder::{build_tree, DetailWriter, NoDetail};
pub use render::{ColumnWidths, ReportRenderer};
pub use tree::{ReportNode, ReportTree, ReportValue};
pub use wrap::fill;
