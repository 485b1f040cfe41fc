//! Assembling the final report document

use super::builder::{build_tree, DetailWriter, NoDetail};
use super::render::ReportRenderer;
use super::tree::ReportTree;
use super::wrap::fill;
use crate::cluster::{ApiObjectIndex, NodeResolver};
use crate::config::ReportConfig;
use crate::error::{Error, Result};
use crate::finalize::{RunStatistics, SummaryFinalizer};
use crate::metric::Metric;
use crate::path::VariablePath;
use crate::projector::{RowProjector, RowRecord};
use crate::summary::Summary;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Output modes of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportFormat {
    /// Overview and Summary as aligned text
    #[default]
    Text,
    /// Overview, per-row Detail and Summary as aligned text
    Verbose,
    /// Summary and run metadata as JSON
    JsonSummary,
    /// Summary, run metadata and row records as JSON
    Json,
    /// The whole input document plus the processed results
    JsonVerbose,
}

impl ReportFormat {
    pub const ALL: [ReportFormat; 5] = [
        ReportFormat::Text,
        ReportFormat::Verbose,
        ReportFormat::JsonSummary,
        ReportFormat::Json,
        ReportFormat::JsonVerbose,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReportFormat::Text => "text",
            ReportFormat::Verbose => "verbose",
            ReportFormat::JsonSummary => "json-summary",
            ReportFormat::Json => "json",
            ReportFormat::JsonVerbose => "json-verbose",
        }
    }

    pub fn is_json(self) -> bool {
        matches!(
            self,
            ReportFormat::JsonSummary | ReportFormat::Json | ReportFormat::JsonVerbose
        )
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ReportFormat::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| {
                Error::configuration(format!(
                    "unknown report format '{}' (expected one of: {})",
                    s,
                    ReportFormat::ALL.map(ReportFormat::as_str).join(", ")
                ))
            })
    }
}

/// Turns one run document into a report
///
/// A reporter owns its copy of the document and is consumed by
/// [`Reporter::create_report`]; each report needs a fresh instance.
pub struct Reporter {
    document: Value,
    format: ReportFormat,
    config: ReportConfig,
    projector: RowProjector,
    detail_writer: Box<dyn DetailWriter>,
}

impl Reporter {
    /// A reporter resolving nodes from the document's `api_objects`
    pub fn new(document: Value, format: ReportFormat, config: ReportConfig) -> Result<Self> {
        let index = ApiObjectIndex::from_document(&document)?;
        Ok(Self::with_resolver(document, format, config, Box::new(index)))
    }

    pub fn with_resolver(
        document: Value,
        format: ReportFormat,
        config: ReportConfig,
        resolver: Box<dyn NodeResolver>,
    ) -> Self {
        let projector = RowProjector::new(&config, resolver);
        Self {
            document,
            format,
            config,
            projector,
            detail_writer: Box::new(NoDetail),
        }
    }

    pub fn format(&self) -> ReportFormat {
        self.format
    }

    pub fn add_timeline_vars<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = VariablePath>,
    {
        self.projector.add_timeline_vars(vars)
    }

    pub fn add_accumulators<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = VariablePath>,
    {
        self.projector.add_accumulators(vars)
    }

    /// Fields that nest the Detail section and label its levels
    pub fn set_header_path(&mut self, header_path: Vec<String>) {
        self.config.header_path = header_path;
    }

    /// Content written inside each innermost Detail section
    pub fn set_detail_writer(&mut self, writer: impl DetailWriter + 'static) {
        self.detail_writer = Box::new(writer);
    }

    /// Produce the report
    ///
    /// Returns `None` when the document carries no `Results`.
    pub fn create_report(mut self) -> Result<Option<String>> {
        let Some(results) = self.document.get("Results") else {
            info!("Run document has no Results; nothing to report");
            return Ok(None);
        };
        let results = results
            .as_array()
            .ok_or_else(|| Error::invalid("Results", "a list of rows", "run document"))?;

        for row in results {
            self.projector.create_row(row)?;
        }
        debug!(rows = results.len(), format = %self.format, "Folded result rows");

        let same_node = self.projector.clients_share_node();
        let Reporter {
            document,
            format,
            config,
            projector,
            detail_writer,
        } = self;
        let (mut summary, rows) = projector.into_parts();
        let stats = SummaryFinalizer::new(same_node).finalize(&mut summary)?;

        let report = match format {
            ReportFormat::JsonSummary => {
                let mut envelope = Map::new();
                envelope.insert("summary".into(), serde_json::to_value(&summary)?);
                envelope.insert("metadata".into(), required(&document, &["metadata"])?.clone());
                to_json(&Value::Object(envelope))?
            }
            ReportFormat::Json => {
                let mut envelope = Map::new();
                envelope.insert("summary".into(), serde_json::to_value(&summary)?);
                envelope.insert("metadata".into(), required(&document, &["metadata"])?.clone());
                envelope.insert("rows".into(), serde_json::to_value(&rows)?);
                to_json(&Value::Object(envelope))?
            }
            ReportFormat::JsonVerbose => {
                let mut processed = Map::new();
                processed.insert("summary".into(), serde_json::to_value(&summary)?);
                processed.insert("rows".into(), serde_json::to_value(&rows)?);
                let mut answer = document;
                if let Value::Object(fields) = &mut answer {
                    fields.insert("processed_results".into(), Value::Object(processed));
                }
                to_json(&answer)?
            }
            ReportFormat::Text | ReportFormat::Verbose => {
                let report = TextReport {
                    document: &document,
                    config: &config,
                    summary: &summary,
                    stats: &stats,
                };
                let detail = match format {
                    ReportFormat::Verbose => Some((rows.as_slice(), &*detail_writer)),
                    _ => None,
                };
                report.render(detail)?
            }
        };
        Ok(Some(report))
    }
}

struct TextReport<'a> {
    document: &'a Value,
    config: &'a ReportConfig,
    summary: &'a Summary,
    stats: &'a RunStatistics,
}

impl TextReport<'_> {
    fn render(&self, detail: Option<(&[RowRecord], &dyn DetailWriter)>) -> Result<String> {
        let mut tree = ReportTree::new();
        tree.insert("Overview", self.overview()?);
        if let Some((rows, writer)) = detail {
            tree.insert("Detail", build_tree(rows, &self.config.header_path, writer)?);
        }
        tree.insert("Summary", self.summary_section()?);

        let renderer = ReportRenderer::new(self.config.summary_indent);
        Ok(renderer.render(&tree, &self.config.header_path))
    }

    fn overview(&self) -> Result<ReportTree> {
        let mut overview = ReportTree::new();
        overview.insert("Workload", text(required(self.document, &["metadata", "workload"])?));
        overview.insert("Job UUID", text(required(self.document, &["metadata", "run_uuid"])?));
        overview.insert("Run host", text(required(self.document, &["metadata", "runHost"])?));
        overview.insert(
            "Kubernetes version",
            text(required(
                self.document,
                &["metadata", "kubernetes_version", "serverVersion", "gitVersion"],
            )?),
        );
        let kubernetes_version = required(self.document, &["metadata", "kubernetes_version"])?;
        if let Some(openshift) = kubernetes_version.get("openshiftVersion") {
            overview.insert("OpenShift Version", text(openshift));
        }

        let command_line = required(self.document, &["metadata", "expanded_command_line"])?
            .as_array()
            .ok_or_else(|| Error::invalid("metadata.expanded_command_line", "a list of words", "run document"))?
            .iter()
            .map(text)
            .collect::<Vec<_>>()
            .join(" ");
        overview.insert(
            "Command line",
            fill(&command_line, self.config.command_line_width, self.config.command_line_indent),
        );
        Ok(overview)
    }

    fn summary_section(&self) -> Result<ReportTree> {
        let summary = self.summary;
        let stats = self.stats;
        let mut section = ReportTree::new();
        section.insert("Total Clients", stats.total_instances);
        section.insert("Elapsed Time Average", stats.elapsed_time_average.round(3));
        section.insert("Pod creation span", stats.pod_create_span.round(5));
        section.insert("User CPU seconds", summary.require("user_cpu_time")?.round(3));
        section.insert("System CPU seconds", summary.require("system_cpu_time")?.round(3));
        let cpu_time = summary.require("cpu_time")?;
        section.insert("CPU seconds", cpu_time.round(5));

        if let Some(scoped) = &stats.node_scoped {
            let utilization: Metric = cpu_time
                .ratio(stats.data_run_span)
                .ok_or_else(|| Error::divide_by_zero("CPU utilization (zero run span)"))?;
            section.insert("CPU utilization", utilization.round(5));
            section.insert("First run start", summary.require("first_data_start")?.round(3));
            section.insert("First run end", summary.require("first_data_end")?.round(3));
            section.insert("Last run start", summary.require("last_data_start")?.round(3));
            section.insert("Last run end", summary.require("last_data_end")?.round(3));
            section.insert("Net elapsed time", stats.data_run_span.round(3));
            section.insert("Overlap error", scoped.overlap_error.round(5));
            section.insert("Pod start span", scoped.pod_start_span.round(5));
        }
        Ok(section)
    }
}

/// The value at `path` below the document root
fn required<'a>(document: &'a Value, path: &[&str]) -> Result<&'a Value> {
    let mut current = document;
    for (depth, key) in path.iter().enumerate() {
        current = current
            .get(key)
            .ok_or_else(|| Error::missing(path[..=depth].join("."), "run document"))?;
    }
    Ok(current)
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Key-sorted JSON indented by four spaces
fn to_json(value: &Value) -> Result<String> {
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}
