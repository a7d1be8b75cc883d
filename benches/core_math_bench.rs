use chart_geometry::api::{ChartOptions, SeriesOptions};
use chart_geometry::core::{OhlcSample, RangeRequest, compute_range};
use chart_geometry::extensions::{
    MarkKind, PatternScanConfig, TrendLineKind, calculate_sma, scan_patterns,
};
use chart_geometry::render::{NullRenderer, ThemeRegistry};
use chart_geometry::ChartEngine;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;

fn generated_candles(count: usize) -> Vec<OhlcSample> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            let base = 400.0 + t * 0.03;
            let open = base;
            let close = if i % 2 == 0 { base + 2.0 } else { base - 2.0 };
            let low = open.min(close) - 1.0;
            let high = open.max(close) + 1.0;
            OhlcSample::new(open, high, low, close)
        })
        .collect()
}

fn bench_compute_range(c: &mut Criterion) {
    let request = RangeRequest::new(-1_234.56, 98_765.4321).with_label_count_hint(Some(6));

    c.bench_function("compute_range", |b| {
        b.iter(|| compute_range(black_box(&request)))
    });
}

fn bench_sma_10k(c: &mut Criterion) {
    let values: Vec<f64> = (0..10_000).map(|i| (i as f64 * 0.01).sin() * 100.0).collect();

    c.bench_function("sma_10k_window_20", |b| {
        b.iter(|| calculate_sma(black_box(&values), black_box(20)))
    });
}

fn bench_pattern_scan_2k(c: &mut Criterion) {
    let candles = generated_candles(2_000);
    let config = PatternScanConfig::default();

    c.bench_function("pattern_scan_2k", |b| {
        b.iter(|| scan_patterns(black_box(&candles), black_box(&config)))
    });
}

fn bench_render_frame_500(c: &mut Criterion) {
    let candles = generated_candles(500);
    let closes: Vec<f64> = candles.iter().map(|sample| sample.close).collect();
    let options = ChartOptions::new(1600, 900)
        .with_series(
            SeriesOptions::candlestick("candles-main", candles)
                .with_mark_point(MarkKind::Max)
                .with_mark_line(MarkKind::Average)
                .with_patterns(PatternScanConfig::default()),
        )
        .with_series(
            SeriesOptions::line("close", closes)
                .with_trend_line(TrendLineKind::MovingAverage { window: Some(20) }),
        );
    let engine = ChartEngine::new(
        NullRenderer::default(),
        Arc::new(ThemeRegistry::with_builtins()),
    );

    c.bench_function("render_frame_500", |b| {
        b.iter(|| {
            engine
                .build_render_frame(black_box(&options))
                .expect("frame should build")
        })
    });
}

criterion_group!(
    benches,
    bench_compute_range,
    bench_sma_10k,
    bench_pattern_scan_2k,
    bench_render_frame_500
);
criterion_main!(benches);
