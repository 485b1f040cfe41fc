//! Nesting row records into the Detail section

use super::tree::ReportTree;
use crate::error::{Error, Result};
use crate::projector::RowRecord;

/// Fills the innermost Detail section for one row
///
/// The builder creates the nested sections; a writer decides what, if
/// anything, appears inside them. Any `Fn(&mut ReportTree, &RowRecord)` is a
/// writer.
pub trait DetailWriter {
    fn write_row(&self, section: &mut ReportTree, row: &RowRecord);
}

/// Writes nothing, leaving Detail as a skeleton of section headers
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDetail;

impl DetailWriter for NoDetail {
    fn write_row(&self, _section: &mut ReportTree, _row: &RowRecord) {}
}

impl<F> DetailWriter for F
where
    F: Fn(&mut ReportTree, &RowRecord),
{
    fn write_row(&self, section: &mut ReportTree, row: &RowRecord) {
        self(section, row)
    }
}

/// Build the Detail tree
///
/// Rows are visited in `namespace~pod~container~process_id` order. Each row
/// descends one level per header field, stopping before the last field, and
/// the section reached is handed to `writer`.
pub fn build_tree(rows: &[RowRecord], header_path: &[String], writer: &dyn DetailWriter) -> Result<ReportTree> {
    let mut ordered: Vec<(String, &RowRecord)> = rows.iter().map(|row| (row.row_name(), row)).collect();
    ordered.sort_by(|a, b| a.0.cmp(&b.0));

    let levels = header_path.len().saturating_sub(1);
    let mut tree = ReportTree::new();
    for (name, row) in ordered {
        let mut section = &mut tree;
        for field in &header_path[..levels] {
            let key = row
                .field(field)
                .ok_or_else(|| Error::missing(field.as_str(), format!("row {}", name)))?;
            section = section.section_mut(&key);
        }
        writer.write_row(section, row);
    }
    Ok(tree)
}
