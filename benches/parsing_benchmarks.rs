use criterion::{black_box, criterion_group, criterion_main, Criterion};
use olm_metrics_sampler::parsing::{parse_cpu_millicores, parse_memory_bytes};
use olm_metrics_sampler::{ContainerUsage, PodMetricSample, RunSummary};

fn cpu_parsing_benchmark(c: &mut Criterion) {
    let test_values = ["2345678n", "156712n", "500u", "5m", "1", "0.25"];

    c.bench_function("parse_cpu_millicores", |b| {
        b.iter(|| {
            for value in &test_values {
                black_box(parse_cpu_millicores(black_box(value)));
            }
        })
    });
}

fn memory_parsing_benchmark(c: &mut Criterion) {
    let test_values = ["31Mi", "12Mi", "1Gi", "512Ki", "1G", "4096"];

    c.bench_function("parse_memory_bytes", |b| {
        b.iter(|| {
            for value in &test_values {
                black_box(parse_memory_bytes(black_box(value)));
            }
        })
    });
}

fn summary_benchmark(c: &mut Criterion) {
    let sample = PodMetricSample::new(
        "catalogd-controller-manager-5f4",
        vec![
            ContainerUsage {
                name: "manager".to_string(),
                cpu: "2345678n".to_string(),
                memory: "31Mi".to_string(),
            },
            ContainerUsage {
                name: "kube-rbac-proxy".to_string(),
                cpu: "156712n".to_string(),
                memory: "12Mi".to_string(),
            },
        ],
    );

    c.bench_function("run_summary_record", |b| {
        b.iter(|| {
            let mut summary = RunSummary::new();
            for _ in 0..150 {
                summary.record(black_box(&sample));
            }
            black_box(summary)
        })
    });
}

criterion_group!(benches, cpu_parsing_benchmark, memory_parsing_benchmark, summary_benchmark);
criterion_main!(benches);
