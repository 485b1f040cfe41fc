//! cbreport Core - Aggregation and reporting engine for ClusterBuster runs
//!
//! This crate folds the per-instance rows of a completed benchmark run into
//! summary statistics and turns them into a human-readable or JSON report.
//!
//! # Main Components
//!
//! - **Accumulation**: dotted-path timeline and accumulator variables folded
//!   row by row into a nested [`Summary`]
//! - **Finalization**: spans, averages and the overlap error, depending on
//!   whether all clients shared a node
//! - **Reporting**: a generic [`ReportTree`] rendered as column-aligned text,
//!   or key-sorted JSON envelopes
//!
//! # Example
//!
//! ```no_run
//! use cbreport_core::{ReportConfig, ReportFormat, Reporter, Result};
//!
//! fn example(document: serde_json::Value) -> Result<()> {
//!     let reporter = Reporter::new(document, ReportFormat::Text, ReportConfig::default())?;
//!     if let Some(report) = reporter.create_report()? {
//!         print!("{}", report);
//!     }
//!     Ok(())
//! }
//! ```

pub mod accumulator;
pub mod cluster;
pub mod config;
pub mod error;
pub mod finalize;
pub mod metric;
pub mod path;
pub mod projector;
pub mod report;
pub mod summary;

// Re-export main types for convenience
pub use cluster::{ApiObject, ApiObjectIndex, NodeResolver};
pub use config::ReportConfig;
pub use error::{Error, Result};
pub use finalize::{NodeScopedStatistics, RunStatistics, SummaryFinalizer};
pub use metric::Metric;
pub use path::VariablePath;
pub use projector::{RowProjector, RowRecord};
pub use report::{
    build_tree, DetailWriter, NoDetail, ReportFormat, ReportNode, ReportRenderer, ReportTree,
    ReportValue, Reporter,
};
pub use summary::{StatMap, StatNode, Summary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
