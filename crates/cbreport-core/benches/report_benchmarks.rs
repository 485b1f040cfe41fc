//! Benchmarks for row folding and report rendering

use cbreport_core::{ReportConfig, ReportFormat, Reporter};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};

fn create_run(clients: usize) -> Value {
    let api_objects: Vec<Value> = (0..clients)
        .map(|i| {
            json!({
                "kind": "Pod",
                "namespace": format!("clusterbuster-{}", i % 8),
                "name": format!("client-{}", i),
                "nodeName": "worker-0",
                "labels": {"clusterbuster-client": true}
            })
        })
        .collect();
    let results: Vec<Value> = (0..clients)
        .map(|i| {
            let start = (i % 17) as f64 * 0.01;
            json!({
                "namespace": format!("clusterbuster-{}", i % 8),
                "pod": format!("client-{}", i),
                "container": "c0",
                "process_id": i,
                "pod_create_time_offset_from_base": start / 2.0,
                "pod_start_time_offset_from_base": start,
                "data_start_time_offset_from_base": start + 1.0,
                "data_end_time_offset_from_base": start + 11.0,
                "user_cpu_time": 9.5,
                "system_cpu_time": 0.25,
                "cpu_time": 9.75,
                "data_elapsed_time": 10.0
            })
        })
        .collect();

    json!({
        "api_objects": api_objects,
        "metadata": {
            "workload": "cpusoaker",
            "run_uuid": "bench",
            "runHost": "localhost",
            "kubernetes_version": {"serverVersion": {"gitVersion": "v1.28.0"}},
            "expanded_command_line": ["clusterbuster", "--workload=cpusoaker"]
        },
        "Results": results
    })
}

fn bench_formats(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_report");
    for clients in [10usize, 100, 1000] {
        let run = create_run(clients);
        for format in [ReportFormat::Text, ReportFormat::Verbose, ReportFormat::Json] {
            group.bench_with_input(
                BenchmarkId::new(format.as_str(), clients),
                &run,
                |b, run| {
                    b.iter(|| {
                        let reporter =
                            Reporter::new(black_box(run.clone()), format, ReportConfig::default())
                                .unwrap();
                        black_box(reporter.create_report().unwrap())
                    })
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_formats);
criterion_main!(benches);
