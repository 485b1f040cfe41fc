//! Run-level statistics derived from the accumulated summary
//!
//! Start and end offsets are only comparable between instances that share a
//! clock, so spans and the overlap error are computed only when every client
//! ran on the same node. Otherwise the average elapsed time stands in for the
//! run span.

use crate::error::{Error, Result};
use crate::metric::Metric;
use crate::summary::Summary;
use serde::Serialize;
use tracing::debug;

/// Statistics only meaningful when all clients share a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodeScopedStatistics {
    pub pod_start_span: Metric,
    pub overlap_error: Metric,
}

/// Derived statistics for a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunStatistics {
    pub total_instances: i64,
    pub elapsed_time_average: Metric,
    pub pod_create_span: Metric,
    pub data_run_span: Metric,
    pub node_scoped: Option<NodeScopedStatistics>,
}

/// Derives run statistics and records them in the summary
#[derive(Debug, Clone, Copy)]
pub struct SummaryFinalizer {
    same_node: bool,
}

impl SummaryFinalizer {
    pub fn new(same_node: bool) -> Self {
        Self { same_node }
    }

    pub fn finalize(&self, summary: &mut Summary) -> Result<RunStatistics> {
        let total_instances = summary.total_instances();
        if total_instances == 0 {
            return Err(Error::divide_by_zero("elapsed_time_average (no instances)"));
        }

        let elapsed_time_average = summary
            .require("data_elapsed_time")?
            .ratio(Metric::Int(total_instances))
            .ok_or_else(|| Error::divide_by_zero("elapsed_time_average"))?;
        let pod_create_span = summary.require("last_pod_create")? - summary.require("first_pod_create")?;

        summary.set("elapsed_time_average", elapsed_time_average);
        summary.set("pod_create_span", pod_create_span);

        let (data_run_span, node_scoped) = if self.same_node {
            let first_data_start = summary.require("first_data_start")?;
            let last_data_start = summary.require("last_data_start")?;
            let first_data_end = summary.require("first_data_end")?;
            let last_data_end = summary.require("last_data_end")?;

            let data_run_span = last_data_end - first_data_start;
            let pod_start_span = summary.require("last_pod_start")? - summary.require("first_pod_start")?;
            let skew = (last_data_start - first_data_start) + (last_data_end - first_data_end);
            let overlap_error = skew
                .ratio(Metric::Int(2))
                .and_then(|half| half.ratio(elapsed_time_average))
                .ok_or_else(|| Error::divide_by_zero("overlap_error (zero average elapsed time)"))?;

            summary.set("data_run_span", data_run_span);
            summary.set("pod_start_span", pod_start_span);
            summary.set("overlap_error", overlap_error);
            (
                data_run_span,
                Some(NodeScopedStatistics {
                    pod_start_span,
                    overlap_error,
                }),
            )
        } else {
            summary.set("data_run_span", elapsed_time_average);
            (elapsed_time_average, None)
        };

        debug!(
            total_instances,
            same_node = self.same_node,
            elapsed_time_average = %elapsed_time_average,
            data_run_span = %data_run_span,
            "Finalized run summary"
        );

        Ok(RunStatistics {
            total_instances,
            elapsed_time_average,
            pod_create_span,
            data_run_span,
            node_scoped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated(instances: i64) -> Summary {
        let mut summary = Summary::new();
        for _ in 0..instances {
            summary.count_instance();
        }
        summary.set("data_elapsed_time", Metric::Int(10 * instances));
        summary.set("first_data_start", Metric::Int(0));
        summary.set("last_data_start", Metric::Int(1));
        summary.set("first_data_end", Metric::Int(10));
        summary.set("last_data_end", Metric::Int(12));
        summary.set("first_pod_start", Metric::Float(0.5));
        summary.set("last_pod_start", Metric::Float(0.75));
        summary.set("first_pod_create", Metric::Float(0.25));
        summary.set("last_pod_create", Metric::Float(1.0));
        summary
    }

    #[test]
    fn test_single_node_overlap_error() {
        let mut summary = populated(2);
        let stats = SummaryFinalizer::new(true).finalize(&mut summary).unwrap();

        assert_eq!(stats.elapsed_time_average, Metric::Float(10.0));
        assert_eq!(stats.data_run_span, Metric::Int(12));
        let scoped = stats.node_scoped.unwrap();
        assert!((scoped.overlap_error.as_f64() - 0.15).abs() < 1e-12);
        assert_eq!(scoped.pod_start_span, Metric::Float(0.25));
        assert_eq!(summary.get("overlap_error"), Some(scoped.overlap_error));
        assert_eq!(summary.get("pod_create_span"), Some(Metric::Float(0.75)));
    }

    #[test]
    fn test_multi_node_falls_back_to_average() {
        let mut summary = populated(4);
        let stats = SummaryFinalizer::new(false).finalize(&mut summary).unwrap();

        assert_eq!(stats.data_run_span, stats.elapsed_time_average);
        assert!(stats.node_scoped.is_none());
        assert!(!summary.contains("overlap_error"));
        assert!(!summary.contains("pod_start_span"));
        assert_eq!(summary.get("data_run_span"), Some(Metric::Float(10.0)));
    }

    #[test]
    fn test_zero_instances() {
        let mut summary = Summary::new();
        let err = SummaryFinalizer::new(true).finalize(&mut summary).unwrap_err();
        assert!(matches!(err, Error::DivideByZero { .. }));
    }

    #[test]
    fn test_zero_elapsed_time_on_single_node() {
        let mut summary = populated(1);
        summary.set("data_elapsed_time", Metric::Int(0));
        let err = SummaryFinalizer::new(true).finalize(&mut summary).unwrap_err();
        assert!(matches!(err, Error::DivideByZero { .. }));
    }

    #[test]
    fn test_missing_timeline_statistic() {
        let mut summary = populated(1);
        summary.root_mut().remove("last_pod_create");
        let err = SummaryFinalizer::new(false).finalize(&mut summary).unwrap_err();
        assert!(matches!(err, Error::MissingField { ref path, .. } if path == "last_pod_create"));
    }
}
