//! Condensing result rows and folding them into the summary

use crate::accumulator::{update_accumulator, update_timeline};
use crate::cluster::NodeResolver;
use crate::config::ReportConfig;
use crate::error::{Error, Result};
use crate::metric::Metric;
use crate::path::VariablePath;
use crate::summary::{StatMap, Summary};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

/// The condensed record of one client instance
///
/// Identity fields plus the row's own value for every accumulator variable,
/// nested the same way the variable path is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowRecord {
    pub namespace: String,
    pub pod: String,
    pub container: String,
    pub node: Option<String>,
    pub process_id: i64,
    #[serde(flatten)]
    pub values: StatMap,
}

impl RowRecord {
    /// Sort key `namespace~pod~container~process_id`, the id zero-padded to 7
    pub fn row_name(&self) -> String {
        row_name(&self.namespace, &self.pod, &self.container, self.process_id)
    }

    /// The value of a field as a report key
    ///
    /// Identity fields are looked up by name; anything else is searched for
    /// among the accumulated values by dotted path.
    pub fn field(&self, name: &str) -> Option<String> {
        match name {
            "namespace" => Some(self.namespace.clone()),
            "pod" => Some(self.pod.clone()),
            "container" => Some(self.container.clone()),
            "node" => self.node.clone(),
            "process_id" => Some(self.process_id.to_string()),
            dotted => self.value(dotted).map(|metric| metric.to_string()),
        }
    }

    /// An accumulated value by dotted path
    pub fn value(&self, dotted: &str) -> Option<Metric> {
        let mut segments = dotted.split('.').peekable();
        let mut level = &self.values;
        while let Some(segment) = segments.next() {
            let node = level.get(segment)?;
            if segments.peek().is_none() {
                return node.as_metric();
            }
            level = node.as_group()?;
        }
        None
    }
}

fn row_name(namespace: &str, pod: &str, container: &str, process_id: i64) -> String {
    format!("{}~{}~{}~{:07}", namespace, pod, container, process_id)
}

/// Folds raw result rows into a [`Summary`] and a list of [`RowRecord`]s
pub struct RowProjector {
    timeline_vars: Vec<VariablePath>,
    accumulator_vars: Vec<VariablePath>,
    resolver: Box<dyn NodeResolver>,
    summary: Summary,
    rows: Vec<RowRecord>,
}

impl RowProjector {
    pub fn new(config: &ReportConfig, resolver: Box<dyn NodeResolver>) -> Self {
        Self {
            timeline_vars: config.timeline_vars.clone(),
            accumulator_vars: config.accumulator_vars.clone(),
            resolver,
            summary: Summary::new(),
            rows: Vec::new(),
        }
    }

    /// Track additional timeline variables; only before the first row
    pub fn add_timeline_vars<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = VariablePath>,
    {
        self.ensure_unstarted("timeline variables")?;
        self.timeline_vars.extend(vars);
        Ok(())
    }

    /// Track additional accumulator variables; only before the first row
    pub fn add_accumulators<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = VariablePath>,
    {
        self.ensure_unstarted("accumulator variables")?;
        self.accumulator_vars.extend(vars);
        Ok(())
    }

    fn ensure_unstarted(&self, what: &str) -> Result<()> {
        if self.rows.is_empty() {
            Ok(())
        } else {
            Err(Error::configuration(format!(
                "cannot add {} after {} row(s) have been processed",
                what,
                self.rows.len()
            )))
        }
    }

    /// Fold one result row, returning the index of its record
    pub fn create_row(&mut self, row: &Value) -> Result<usize> {
        let position = format!("Results[{}]", self.rows.len());
        let fields = row
            .as_object()
            .ok_or_else(|| Error::invalid(position.as_str(), "an object", "run document"))?;

        let namespace = string_field(fields, "namespace", &position)?;
        let pod = string_field(fields, "pod", &position)?;
        let container = string_field(fields, "container", &position)?;
        let process_id = fields
            .get("process_id")
            .ok_or_else(|| Error::missing("process_id", position.as_str()))?
            .as_i64()
            .ok_or_else(|| Error::invalid("process_id", "an integer", position.as_str()))?;
        let name = row_name(&namespace, &pod, &container, process_id);
        let node = self.resolver.node_for_pod(&namespace, &pod);

        self.summary.count_instance();
        for var in &self.timeline_vars {
            update_timeline(var, fields, self.summary.root_mut(), &name)?;
        }
        let mut values = StatMap::new();
        for var in &self.accumulator_vars {
            update_accumulator(var, fields, self.summary.root_mut(), &mut values, &name)?;
        }

        trace!(row = %name, node = ?node, "Folded result row");
        self.rows.push(RowRecord {
            namespace,
            pod,
            container,
            node,
            process_id,
            values,
        });
        Ok(self.rows.len() - 1)
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn rows(&self) -> &[RowRecord] {
        &self.rows
    }

    pub fn clients_share_node(&self) -> bool {
        self.resolver.clients_share_node()
    }

    pub fn into_parts(self) -> (Summary, Vec<RowRecord>) {
        (self.summary, self.rows)
    }
}

fn string_field(fields: &Map<String, Value>, key: &str, position: &str) -> Result<String> {
    match fields.get(key) {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(_) => Err(Error::invalid(key, "a string", position)),
        None => Err(Error::missing(key, position)),
    }
}
