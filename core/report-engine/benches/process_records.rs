//! Grouping and rendering benchmarks
//!
//! Run: `cargo bench --bench process_records`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use engine::Worksheet;
use report_engine::{
    render_template, ColumnFormat, ColumnSpec, GroupField, ReportDefinition, ReportProcessor,
};
use serde_json::{json, Value};

fn generate_records(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "id": i,
                "region": format!("R{}", i % 7),
                "seller": format!("S{}", i % 53),
                "amount": (i % 1000) as f64 * 1.25,
                "qty": i % 13,
            })
        })
        .collect()
}

fn definition() -> ReportDefinition {
    ReportDefinition::new("Bench")
        .with_column(ColumnSpec::new("id", "ID"))
        .with_column(ColumnSpec::new("amount", "Amount").with_format(ColumnFormat::Currency))
        .with_group_by(GroupField::new("region"))
        .with_group_by(GroupField::new("seller"))
        .with_totalizer("amount")
        .with_totalizer("qty")
}

fn template() -> Worksheet {
    let mut sheet = Worksheet::new("Bench");
    sheet.set_value(0, 0, "{{title}}");
    sheet.set_value(1, 0, "{{group_value}}");
    sheet.set_value(2, 0, "{{id}}");
    sheet.set_value(2, 1, "{{amount}}");
    sheet.set_value(3, 0, "Total {{group_value}}");
    sheet.set_value(3, 1, "{{total_amount}}");
    sheet
}

fn bench_process(c: &mut Criterion) {
    let definition = definition();
    let mut group = c.benchmark_group("process");

    for count in [100usize, 1_000, 10_000] {
        let records = generate_records(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &records, |b, records| {
            b.iter(|| {
                let report = ReportProcessor::new(&definition).process(black_box(records));
                black_box(report.grand_totals.len())
            })
        });
    }

    group.finish();
}

fn bench_render_template(c: &mut Criterion) {
    let definition = definition();
    let mut group = c.benchmark_group("render_template");

    for count in [100usize, 1_000] {
        let records = generate_records(count);
        let report = ReportProcessor::new(&definition).process(&records);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(BenchmarkId::from_parameter(count), |b| {
            b.iter(|| {
                let mut sheet = template();
                black_box(render_template(&mut sheet, &definition, &report))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_process, bench_render_template);
criterion_main!(benches);
