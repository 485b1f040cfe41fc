//! Run summary state
//!
//! The summary is a nested, key-ordered map of statistics. Plain variables
//! live at the top level; a dotted variable `a.b` keeps its statistics in a
//! group named `a`.

use crate::error::{Error, Result};
use crate::metric::Metric;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key of the row counter
pub const TOTAL_INSTANCES: &str = "total_instances";

/// A level of statistics, ordered by key
pub type StatMap = BTreeMap<String, StatNode>;

/// A summary entry: either a nested group or a single statistic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatNode {
    Group(StatMap),
    Metric(Metric),
}

impl StatNode {
    pub fn as_metric(&self) -> Option<Metric> {
        match self {
            StatNode::Metric(metric) => Some(*metric),
            StatNode::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&StatMap> {
        match self {
            StatNode::Group(group) => Some(group),
            StatNode::Metric(_) => None,
        }
    }
}

/// Descend into the group `key`, creating it on first reference
pub(crate) fn group_entry<'a>(map: &'a mut StatMap, key: &str, context: &str) -> Result<&'a mut StatMap> {
    let node = map
        .entry(key.to_string())
        .or_insert_with(|| StatNode::Group(StatMap::new()));
    match node {
        StatNode::Group(group) => Ok(group),
        StatNode::Metric(_) => Err(Error::invalid(key, "a group of statistics", context)),
    }
}

/// Read the statistic `key`, if present
pub(crate) fn metric_entry(map: &StatMap, key: &str, context: &str) -> Result<Option<Metric>> {
    match map.get(key) {
        None => Ok(None),
        Some(StatNode::Metric(metric)) => Ok(Some(*metric)),
        Some(StatNode::Group(_)) => Err(Error::invalid(key, "a statistic", context)),
    }
}

/// Accumulated statistics for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Summary {
    root: StatMap,
}

impl Default for Summary {
    fn default() -> Self {
        Self::new()
    }
}

impl Summary {
    /// An empty summary with a zero instance counter
    pub fn new() -> Self {
        let mut root = StatMap::new();
        root.insert(TOTAL_INSTANCES.to_string(), StatNode::Metric(Metric::ZERO));
        Self { root }
    }

    pub fn total_instances(&self) -> i64 {
        match self.root.get(TOTAL_INSTANCES) {
            Some(StatNode::Metric(Metric::Int(count))) => *count,
            _ => 0,
        }
    }

    pub(crate) fn count_instance(&mut self) {
        let count = self.total_instances() + 1;
        self.set(TOTAL_INSTANCES, Metric::Int(count));
    }

    /// Look up a top-level statistic
    pub fn get(&self, key: &str) -> Option<Metric> {
        self.root.get(key).and_then(StatNode::as_metric)
    }

    /// Look up a top-level statistic that must exist
    pub fn require(&self, key: &str) -> Result<Metric> {
        metric_entry(&self.root, key, "summary")?.ok_or_else(|| Error::missing(key, "summary"))
    }

    /// Look up a statistic by its dotted location, e.g. `net.rx_bytes` or `net.max_rx_bytes`
    pub fn lookup(&self, dotted: &str) -> Option<Metric> {
        let mut segments = dotted.split('.').peekable();
        let mut level = &self.root;
        while let Some(segment) = segments.next() {
            let node = level.get(segment)?;
            if segments.peek().is_none() {
                return node.as_metric();
            }
            level = node.as_group()?;
        }
        None
    }

    pub fn contains(&self, key: &str) -> bool {
        self.root.contains_key(key)
    }

    pub(crate) fn set(&mut self, key: &str, value: Metric) {
        self.root.insert(key.to_string(), StatNode::Metric(value));
    }

    pub fn root(&self) -> &StatMap {
        &self.root
    }

    pub(crate) fn root_mut(&mut self) -> &mut StatMap {
        &mut self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_summary_has_zero_instances() {
        let summary = Summary::new();
        assert_eq!(summary.total_instances(), 0);
        assert_eq!(summary.get(TOTAL_INSTANCES), Some(Metric::Int(0)));
    }

    #[test]
    fn test_count_instance() {
        let mut summary = Summary::new();
        summary.count_instance();
        summary.count_instance();
        assert_eq!(summary.total_instances(), 2);
    }

    #[test]
    fn test_require_missing_key() {
        let summary = Summary::new();
        let err = summary.require("last_data_end").unwrap_err();
        assert!(matches!(err, Error::MissingField { ref path, .. } if path == "last_data_end"));
    }

    #[test]
    fn test_lookup_nested() {
        let mut summary = Summary::new();
        let group = group_entry(summary.root_mut(), "net", "summary").unwrap();
        group.insert("rx".to_string(), StatNode::Metric(Metric::Int(9)));

        assert_eq!(summary.lookup("net.rx"), Some(Metric::Int(9)));
        assert_eq!(summary.lookup("net"), None);
        assert_eq!(summary.lookup("net.tx"), None);
    }

    #[test]
    fn test_group_entry_rejects_statistic() {
        let mut summary = Summary::new();
        summary.set("cpu_time", Metric::Int(1));
        assert!(group_entry(summary.root_mut(), "cpu_time", "summary").is_err());
    }

    #[test]
    fn test_serializes_as_sorted_map() {
        let mut summary = Summary::new();
        summary.set("b", Metric::Float(1.5));
        summary.set("a", Metric::Int(2));
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value, json!({"a": 2, "b": 1.5, "total_instances": 0}));
    }
}
