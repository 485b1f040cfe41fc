//! Generic report tree
//!
//! A report is an insertion-ordered map whose entries are either nested
//! sections or scalar values. The renderer only ever sees this shape, so the
//! same code lays out the Overview, the per-row Detail and the Summary.

use crate::metric::{format_float, Metric};
use crate::summary::{StatMap, StatNode};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// A scalar shown in the report
#[derive(Debug, Clone, PartialEq)]
pub enum ReportValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl ReportValue {
    /// Characters in the integer part, sign included; zero for text
    pub fn integer_width(&self) -> usize {
        match self {
            ReportValue::Integer(v) => v.to_string().len(),
            ReportValue::Float(v) => {
                let whole = v.trunc();
                if whole == 0.0 {
                    1
                } else {
                    format!("{:.0}", whole).len()
                }
            }
            ReportValue::Text(_) => 0,
        }
    }
}

impl fmt::Display for ReportValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportValue::Integer(v) => write!(f, "{}", v),
            ReportValue::Float(v) => write!(f, "{}", format_float(*v)),
            ReportValue::Text(text) => write!(f, "{}", text),
        }
    }
}

impl From<Metric> for ReportValue {
    fn from(metric: Metric) -> Self {
        match metric {
            Metric::Int(v) => ReportValue::Integer(v),
            Metric::Float(v) => ReportValue::Float(v),
        }
    }
}

impl From<i64> for ReportValue {
    fn from(value: i64) -> Self {
        ReportValue::Integer(value)
    }
}

impl From<f64> for ReportValue {
    fn from(value: f64) -> Self {
        ReportValue::Float(value)
    }
}

impl From<String> for ReportValue {
    fn from(value: String) -> Self {
        ReportValue::Text(value)
    }
}

impl From<&str> for ReportValue {
    fn from(value: &str) -> Self {
        ReportValue::Text(value.to_string())
    }
}

/// An entry of a report tree
#[derive(Debug, Clone, PartialEq)]
pub enum ReportNode {
    Section(ReportTree),
    Value(ReportValue),
}

macro_rules! value_node_from {
    ($($source:ty),*) => {
        $(
            impl From<$source> for ReportNode {
                fn from(value: $source) -> Self {
                    ReportNode::Value(value.into())
                }
            }
        )*
    };
}

value_node_from!(ReportValue, Metric, i64, f64, String, &str);

impl From<ReportTree> for ReportNode {
    fn from(tree: ReportTree) -> Self {
        ReportNode::Section(tree)
    }
}

/// An insertion-ordered map of report entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportTree {
    entries: Vec<(String, ReportNode)>,
}

impl ReportTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry; a replaced entry keeps its position
    pub fn insert(&mut self, key: impl Into<String>, node: impl Into<ReportNode>) {
        let key = key.into();
        let node = node.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = node,
            None => self.entries.push((key, node)),
        }
    }

    /// The section `key`, created empty on first reference
    ///
    /// A scalar already stored under `key` is replaced by the section.
    pub fn section_mut(&mut self, key: &str) -> &mut ReportTree {
        let position = match self.entries.iter().position(|(existing, _)| existing == key) {
            Some(position) => {
                if !matches!(self.entries[position].1, ReportNode::Section(_)) {
                    self.entries[position].1 = ReportNode::Section(ReportTree::new());
                }
                position
            }
            None => {
                self.entries
                    .push((key.to_string(), ReportNode::Section(ReportTree::new())));
                self.entries.len() - 1
            }
        };
        match &mut self.entries[position].1 {
            ReportNode::Section(tree) => tree,
            ReportNode::Value(_) => unreachable!("entry was just made a section"),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ReportNode> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, node)| node)
    }

    pub fn section(&self, key: &str) -> Option<&ReportTree> {
        match self.get(key) {
            Some(ReportNode::Section(tree)) => Some(tree),
            _ => None,
        }
    }

    pub fn value(&self, key: &str) -> Option<&ReportValue> {
        match self.get(key) {
            Some(ReportNode::Value(value)) => Some(value),
            _ => None,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReportNode)> {
        self.entries.iter().map(|(key, node)| (key.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A tree mirroring a level of summary statistics, in key order
    pub fn from_stats(stats: &StatMap) -> Self {
        let mut tree = ReportTree::new();
        for (key, node) in stats {
            match node {
                StatNode::Group(group) => tree.insert(key.as_str(), ReportTree::from_stats(group)),
                StatNode::Metric(metric) => tree.insert(key.as_str(), *metric),
            }
        }
        tree
    }
}

impl Serialize for ReportValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ReportValue::Integer(v) => serializer.serialize_i64(*v),
            ReportValue::Float(v) => serializer.serialize_f64(*v),
            ReportValue::Text(text) => serializer.serialize_str(text),
        }
    }
}

impl Serialize for ReportNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ReportNode::Section(tree) => tree.serialize(serializer),
            ReportNode::Value(value) => value.serialize(serializer),
        }
    }
}

impl Serialize for ReportTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, node) in &self.entries {
            map.serialize_entry(key, node)?;
        }
        map.end()
    }
}
