//! Folding row values into the summary along dotted paths
//!
//! Both updates walk the variable's parent components through the row (which
//! must already contain them) and through the summary (where groups are
//! created on first reference), then update the statistics at the leaf.
//!
//! - timeline variables track `first_<v>` / `last_<v>`, the minimum and
//!   maximum of the row field `<v>_time_offset_from_base`
//! - accumulator variables track the running sum `<v>` plus `min_<v>` and
//!   `max_<v>`, and copy the row's own value into the condensed row record

use crate::error::{Error, Result};
use crate::metric::Metric;
use crate::path::VariablePath;
use crate::summary::{group_entry, metric_entry, StatMap, StatNode};
use serde_json::{Map, Value};

/// Suffix of the row field holding a timeline variable's offset
pub const TIME_OFFSET_SUFFIX: &str = "_time_offset_from_base";

/// Update the first/last statistics of a timeline variable from one row
pub fn update_timeline(
    path: &VariablePath,
    row: &Map<String, Value>,
    summary: &mut StatMap,
    row_name: &str,
) -> Result<()> {
    let context = row_context(row_name);
    let mut row = row;
    let mut summary = summary;
    for (depth, segment) in path.parents().iter().enumerate() {
        row = sub_row(row, segment, &path.prefix(depth + 1), &context)?;
        summary = group_entry(summary, segment, "summary")?;
    }

    let field = format!("{}{}", path.leaf(), TIME_OFFSET_SUFFIX);
    let value = leaf_value(row, &field, &located(path, &field), &context)?;

    let first = format!("first_{}", path.leaf());
    let last = format!("last_{}", path.leaf());
    let updated_first = match metric_entry(summary, &first, "summary")? {
        Some(current) => current.min(value),
        None => value,
    };
    let updated_last = match metric_entry(summary, &last, "summary")? {
        Some(current) => current.max(value),
        None => value,
    };
    summary.insert(first, StatNode::Metric(updated_first));
    summary.insert(last, StatNode::Metric(updated_last));
    Ok(())
}

/// Add one row's value of an accumulator variable to the summary
///
/// The row's raw value is also written to `row_out` under the same nesting.
pub fn update_accumulator(
    path: &VariablePath,
    row: &Map<String, Value>,
    summary: &mut StatMap,
    row_out: &mut StatMap,
    row_name: &str,
) -> Result<()> {
    let context = row_context(row_name);
    let mut row = row;
    let mut summary = summary;
    let mut row_out = row_out;
    for (depth, segment) in path.parents().iter().enumerate() {
        row = sub_row(row, segment, &path.prefix(depth + 1), &context)?;
        summary = group_entry(summary, segment, "summary")?;
        row_out = group_entry(row_out, segment, &context)?;
    }

    let leaf = path.leaf();
    let value = leaf_value(row, leaf, &path.to_string(), &context)?;

    let sum = metric_entry(summary, leaf, "summary")?.unwrap_or(Metric::ZERO);
    let min_key = format!("min_{}", leaf);
    let max_key = format!("max_{}", leaf);
    let (min, max) = match (
        metric_entry(summary, &min_key, "summary")?,
        metric_entry(summary, &max_key, "summary")?,
    ) {
        (Some(min), Some(max)) => (min.min(value), max.max(value)),
        _ => (value, value),
    };

    summary.insert(leaf.to_string(), StatNode::Metric(sum + value));
    summary.insert(min_key, StatNode::Metric(min));
    summary.insert(max_key, StatNode::Metric(max));
    row_out.insert(leaf.to_string(), StatNode::Metric(value));
    Ok(())
}

fn row_context(row_name: &str) -> String {
    format!("row {}", row_name)
}

fn located(path: &VariablePath, field: &str) -> String {
    if path.parents().is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", path.prefix(path.parents().len()), field)
    }
}

fn sub_row<'a>(
    row: &'a Map<String, Value>,
    segment: &str,
    location: &str,
    context: &str,
) -> Result<&'a Map<String, Value>> {
    match row.get(segment) {
        Some(Value::Object(inner)) => Ok(inner),
        Some(_) => Err(Error::invalid(location, "an object", context)),
        None => Err(Error::missing(location, context)),
    }
}

fn leaf_value(row: &Map<String, Value>, field: &str, location: &str, context: &str) -> Result<Metric> {
    let raw = row.get(field).ok_or_else(|| Error::missing(location, context))?;
    Metric::from_json(raw).ok_or_else(|| Error::invalid(location, "a number", context))
}
