//! Report command handler

use crate::cli::ReportArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::{redaction, timing::Timer};
use crate::output::OutputWriter;
use cbreport_core::{ReportFormat, ReportTree, Reporter, RowRecord, VariablePath};
use serde_json::Value;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, instrument, trace};

/// Handle the report command
#[instrument(skip_all, fields(input = %args.input.display()))]
pub fn handle_report(args: ReportArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("report_command", &args.input.display().to_string());

    let document = if args.reads_stdin() {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        parse_document(&content, Path::new("-"))?
    } else {
        load_document(&args.input)?
    };

    if let Some(metadata) = document.get("metadata") {
        let mut redacted = metadata.clone();
        redaction::redact_json_value(&mut redacted);
        trace!(metadata = %redacted, "Loaded run document");
    }

    let format = args
        .format
        .map(ReportFormat::from)
        .unwrap_or(config.output.format);
    output.debug(&format!("Report format: {}", format))?;

    let Some(report) = render_report(document, format, &args, config)? else {
        output.info("Run document has no Results; nothing to report")?;
        return Ok(());
    };

    match &args.output_file {
        Some(path) => {
            let mut content = report;
            if !content.ends_with('\n') {
                content.push('\n');
            }
            fs::write(path, content)?;
            output.success(&format!("✓ Report saved to {}", path.display()))?;
        }
        None => output.report(&report)?,
    }

    Ok(())
}

/// Read and parse a run document, YAML when the extension says so
pub fn load_document(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    debug!("Reading run document");
    let content = fs::read_to_string(path)?;
    debug!("Run document read, {} bytes", content.len());
    parse_document(&content, path)
}

fn parse_document(content: &str, path: &Path) -> Result<Value> {
    let is_yaml = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s == "yaml" || s == "yml")
        .unwrap_or(false);

    if is_yaml {
        serde_yaml::from_str(content).map_err(|e| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "YAML".to_string(),
            reason: e.to_string(),
        })
    } else {
        serde_json::from_str(content).map_err(|e| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "JSON".to_string(),
            reason: e.to_string(),
        })
    }
}

/// Run the reporter over a parsed document with command-line overrides applied
pub fn render_report(
    document: Value,
    format: ReportFormat,
    args: &ReportArgs,
    config: &Config,
) -> Result<Option<String>> {
    let mut reporter = Reporter::new(document, format, config.report.clone())?;

    let timeline_vars = parse_paths(&args.timeline_vars)?;
    let accumulators = parse_paths(&args.accumulators)?;
    reporter.add_timeline_vars(timeline_vars)?;
    reporter.add_accumulators(accumulators.iter().cloned())?;

    let header_path = args
        .header
        .clone()
        .unwrap_or_else(|| config.report.header_path.clone());
    reporter.set_header_path(header_path.clone());

    if format == ReportFormat::Verbose && args.detail_metrics {
        let mut metrics: Vec<String> = Vec::new();
        for path in config.report.accumulator_vars.iter().chain(accumulators.iter()) {
            let name = path.to_string();
            if !metrics.contains(&name) {
                metrics.push(name);
            }
        }
        reporter.set_detail_writer(MetricDetail {
            label_field: header_path.last().cloned(),
            metrics,
        });
    }

    let report = reporter.create_report()?;
    info!(produced = report.is_some(), "Report generated");
    Ok(report)
}

fn parse_paths(names: &[String]) -> Result<Vec<VariablePath>> {
    Ok(names
        .iter()
        .map(|name| VariablePath::parse(name))
        .collect::<cbreport_core::Result<Vec<_>>>()?)
}

/// Lists each row's accumulator values under the innermost header field
struct MetricDetail {
    label_field: Option<String>,
    metrics: Vec<String>,
}

impl cbreport_core::DetailWriter for MetricDetail {
    fn write_row(&self, section: &mut ReportTree, row: &RowRecord) {
        let key = self
            .label_field
            .as_deref()
            .and_then(|field| row.field(field))
            .unwrap_or_else(|| row.row_name());
        let entry = section.section_mut(&key);
        for metric in &self.metrics {
            if let Some(value) = row.value(metric) {
                entry.insert(metric.clone(), value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn run_document() -> Value {
        serde_json::json!({
            "api_objects": [
                {"kind": "Pod", "namespace": "cb-0", "name": "client-0", "nodeName": "w1",
                 "labels": {"clusterbuster-client": true}}
            ],
            "metadata": {
                "workload": "cpusoaker",
                "run_uuid": "0000-1111",
                "runHost": "bastion",
                "kubernetes_version": {"serverVersion": {"gitVersion": "v1.28.3"}},
                "expanded_command_line": ["clusterbuster", "--workload=cpusoaker"]
            },
            "Results": [
                {"namespace": "cb-0", "pod": "client-0", "container": "c0", "process_id": 7,
                 "pod_create_time_offset_from_base": 0, "pod_start_time_offset_from_base": 1,
                 "data_start_time_offset_from_base": 2, "data_end_time_offset_from_base": 12,
                 "user_cpu_time": 8, "system_cpu_time": 1, "cpu_time": 9, "data_elapsed_time": 10,
                 "net": {"rx_bytes": 4096}}
            ]
        })
    }

    fn args(format: Option<crate::cli::ReportFormat>) -> ReportArgs {
        ReportArgs {
            input: PathBuf::from("run.json"),
            format,
            output_file: None,
            header: None,
            accumulators: Vec::new(),
            timeline_vars: Vec::new(),
            detail_metrics: false,
        }
    }

    #[test]
    fn test_load_document_missing() {
        let err = load_document(Path::new("/nonexistent/run.json")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_load_document_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.json");
        fs::write(&path, "{\"Results\": [").unwrap();
        let err = load_document(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { ref expected, .. } if expected == "JSON"));
    }

    #[test]
    fn test_load_document_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.yaml");
        fs::write(&path, "metadata:\n  workload: fio\n").unwrap();
        let document = load_document(&path).unwrap();
        assert_eq!(document["metadata"]["workload"], "fio");
    }

    #[test]
    fn test_render_json_summary_with_extra_accumulator() {
        let mut args = args(None);
        args.accumulators.push("net.rx_bytes".to_string());

        let report = render_report(run_document(), ReportFormat::JsonSummary, &args, &Config::default())
            .unwrap()
            .unwrap();
        let value: Value = serde_json::from_str(&report).unwrap();
        assert_eq!(value["summary"]["total_instances"], 1);
        assert_eq!(value["summary"]["net"]["rx_bytes"], 4096);
        assert_eq!(value["summary"]["net"]["max_rx_bytes"], 4096);
    }

    #[test]
    fn test_render_verbose_lists_row_metrics() {
        let mut args = args(Some(crate::cli::ReportFormat::Verbose));
        args.header = Some(vec!["pod".to_string(), "process_id".to_string()]);
        args.detail_metrics = true;

        let report = render_report(run_document(), ReportFormat::Verbose, &args, &Config::default())
            .unwrap()
            .unwrap();
        assert!(report.contains(" Detail:\n    pod: client-0:\n        process_id: 7:\n"));
        assert!(report.contains("            cpu_time:"));
    }

    #[test]
    fn test_render_verbose_detail_is_bare_by_default() {
        let args = args(Some(crate::cli::ReportFormat::Verbose));
        let report = render_report(run_document(), ReportFormat::Verbose, &args, &Config::default())
            .unwrap()
            .unwrap();
        assert!(report.contains(" Detail:\n    namespace: cb-0:\n        pod: client-0:\n            container: c0:\n\n"));
        assert!(!report.contains("            cpu_time:"));
    }

    #[test]
    fn test_render_without_results() {
        let mut document = run_document();
        document.as_object_mut().unwrap().remove("Results");
        let report = render_report(document, ReportFormat::Text, &args(None), &Config::default()).unwrap();
        assert_eq!(report, None);
    }

    #[test]
    fn test_render_rejects_bad_variable() {
        let mut args = args(None);
        args.timeline_vars.push("a..b".to_string());
        let err = render_report(run_document(), ReportFormat::Text, &args, &Config::default()).unwrap_err();
        assert!(matches!(err, Error::Core(_)));
    }
}
