//! Reporter configuration

use crate::path::VariablePath;
use serde::{Deserialize, Serialize};

/// Timeline variables tracked for every run
pub const DEFAULT_TIMELINE_VARS: [&str; 4] = ["data_start", "data_end", "pod_start", "pod_create"];

/// Accumulator variables tracked for every run
pub const DEFAULT_ACCUMULATOR_VARS: [&str; 4] =
    ["user_cpu_time", "system_cpu_time", "cpu_time", "data_elapsed_time"];

/// Row fields that nest the Detail section, outermost first
pub const DEFAULT_HEADER_PATH: [&str; 4] = ["namespace", "pod", "container", "process_id"];

/// Settings that shape aggregation and the text report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Variables tracked as first/last offsets
    pub timeline_vars: Vec<VariablePath>,

    /// Variables tracked as sum/min/max
    pub accumulator_vars: Vec<VariablePath>,

    /// Row fields used to nest the Detail section
    pub header_path: Vec<String>,

    /// Indentation added per nesting level of the text report
    pub summary_indent: usize,

    /// Column at which the command line is reflowed
    pub command_line_width: usize,

    /// Indentation of reflowed command line continuation lines
    pub command_line_indent: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            timeline_vars: parse_defaults(&DEFAULT_TIMELINE_VARS),
            accumulator_vars: parse_defaults(&DEFAULT_ACCUMULATOR_VARS),
            header_path: DEFAULT_HEADER_PATH.iter().map(|s| s.to_string()).collect(),
            summary_indent: 4,
            command_line_width: 72,
            command_line_indent: 16,
        }
    }
}

fn parse_defaults(names: &[&str]) -> Vec<VariablePath> {
    names
        .iter()
        .filter_map(|name| VariablePath::parse(name).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = ReportConfig::default();
        assert_eq!(config.timeline_vars.len(), 4);
        assert_eq!(config.accumulator_vars.len(), 4);
        assert_eq!(config.header_path[0], "namespace");
        assert_eq!(config.summary_indent, 4);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: ReportConfig = serde_json::from_value(json!({
            "accumulator_vars": ["cpu_time", "net.rx_bytes"]
        }))
        .unwrap();
        assert_eq!(config.accumulator_vars.len(), 2);
        assert_eq!(config.accumulator_vars[1].leaf(), "rx_bytes");
        assert_eq!(config.timeline_vars.len(), 4);
        assert_eq!(config.command_line_width, 72);
    }
}
