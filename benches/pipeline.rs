use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use diagchart::{fields, group_by, scale_data, Record, Reducer, Report, ReportOptions};

/// Minute rows over `namespaces` namespaces, one row per minute and namespace.
fn slow_rows(minutes: usize, namespaces: usize) -> Vec<Record> {
    (0..minutes)
        .flat_map(|m| {
            (0..namespaces).map(move |n| {
                Record::builder()
                    .field("time", (m as i64) * 60_000)
                    .field("ns", format!("db.coll{}", n))
                    .field("count", (m % 7 + n) as i64)
                    .build()
            })
        })
        .collect()
}

/// Benchmark group_by with varying record counts
fn bench_group_by(c: &mut Criterion) {
    let mut group = c.benchmark_group("group_by");

    for minutes in [60usize, 600, 6_000].iter() {
        let records = slow_rows(*minutes, 10);
        group.throughput(Throughput::Elements(records.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(minutes), &records, |b, records| {
            b.iter(|| {
                black_box(group_by(
                    records,
                    |r| fields::tick(r, "time"),
                    |r| fields::group_key(r, "ns"),
                    |r| fields::number(r, "count"),
                    Reducer::Sum,
                ))
            });
        });
    }
    group.finish();
}

/// Benchmark scale_data with varying scales
fn bench_scale_data(c: &mut Criterion) {
    let mut group = c.benchmark_group("scale_data");
    let series: Vec<f64> = (0..100_000).map(|i| (i % 97) as f64).collect();

    for scale in [1usize, 2, 10, 100].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(scale), scale, |b, &scale| {
            b.iter(|| black_box(scale_data(black_box(&series), scale)));
        });
    }
    group.finish();
}

/// Benchmark building the connection rate report end to end
fn bench_report(c: &mut Criterion) {
    let records: Vec<Record> = (0..1_440)
        .map(|m| {
            Record::builder()
                .field("time", (m as i64) * 60_000)
                .field("created", 5)
                .field("ended", 3)
                .field("total", 100 + m as i64)
                .object("byIp", |b| {
                    b.object("10.0.0.1", |ip| ip.field("created", 2).field("ended", 1))
                        .object("10.0.0.2", |ip| ip.field("created", 3).field("ended", 2))
                })
                .build()
        })
        .collect();
    let options = ReportOptions::default();

    c.bench_function("connection_rate_report", |b| {
        b.iter(|| black_box(Report::ConnectionRate.build(&records, &options)));
    });
}

criterion_group!(benches, bench_group_by, bench_scale_data, bench_report);
criterion_main!(benches);
