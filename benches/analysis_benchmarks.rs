use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fitexplore::config::AnalysisConfig;
use fitexplore::heart_rate::HeartRateBucketer;
use fitexplore::intervals::ActiveIntervalBuilder;
use fitexplore::models::{ActivityData, Event, EventType, Record};
use fitexplore::splits::SplitSegmenter;
use fitexplore::Activity;

/// Benchmarks for the analysis passes over activities of increasing length.
///
/// One record per second at ~3 m/s with a 30 s pause every ten minutes.

fn create_activity(seconds: i64) -> ActivityData {
    let records = (0..seconds)
        .map(|t| Record {
            timestamp: Some(t),
            distance: Some(t as f64 * 3.0),
            altitude: Some(100.0 + (t % 600) as f64 * 0.05),
            heart_rate: Some(130 + (t % 40) as u8),
            position_lat: Some(500_000_000 + t as i32),
            position_long: Some(-1_000_000_000 + t as i32),
            ..Default::default()
        })
        .collect();

    let mut events = vec![Event::timer(0, EventType::Start)];
    for pause_start in (600..seconds).step_by(600) {
        events.push(Event::timer(pause_start, EventType::Stop));
        events.push(Event::timer(pause_start + 30, EventType::Start));
    }
    events.push(Event::timer(seconds, EventType::StopAll));

    ActivityData::new(records, events)
}

fn bench_split_segmentation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Split Segmentation");
    let config = AnalysisConfig::default();

    for &seconds in &[1_800, 3_600, 4 * 3_600, 12 * 3_600] {
        let data = create_activity(seconds);
        let paused = ActiveIntervalBuilder::paused_intervals(
            &data.events,
            &data.records,
            config.open_pause,
        );

        group.throughput(Throughput::Elements(seconds as u64));
        group.bench_with_input(BenchmarkId::new("segment", seconds), &data, |b, data| {
            b.iter(|| SplitSegmenter::segment(black_box(&data.records), &paused, &config));
        });
    }

    group.finish();
}

fn bench_heart_rate_runs(c: &mut Criterion) {
    let mut group = c.benchmark_group("Heart Rate Runs");

    for &seconds in &[3_600, 12 * 3_600] {
        let data = create_activity(seconds);
        let paused = ActiveIntervalBuilder::paused_intervals(
            &data.events,
            &data.records,
            Default::default(),
        );

        group.throughput(Throughput::Elements(seconds as u64));
        group.bench_with_input(BenchmarkId::new("runs", seconds), &data, |b, data| {
            b.iter(|| HeartRateBucketer::runs(black_box(&data.records), &paused));
        });
    }

    group.finish();
}

fn bench_full_analysis(c: &mut Criterion) {
    let data = create_activity(4 * 3_600);

    c.bench_function("lazy_accessors", |b| {
        b.iter(|| {
            let activity = Activity::new(data.clone());
            black_box(activity.splits().len());
            black_box(activity.heart_rate_runs().len());
            black_box(activity.coordinates().len());
        });
    });

    c.bench_function("warm_caches_parallel", |b| {
        b.iter(|| {
            let activity = Activity::new(data.clone());
            activity.warm_caches();
            black_box(activity.summary());
        });
    });
}

criterion_group!(
    benches,
    bench_split_segmentation,
    bench_heart_rate_runs,
    bench_full_analysis
);
criterion_main!(benches);
