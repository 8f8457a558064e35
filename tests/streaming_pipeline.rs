use gpui_streamdash::pipeline::{
    PROGRESSIVE_TITLE, REGRESSIVE_TITLE, composite_wave, progressive_remap, regressive_remap,
};
use gpui_streamdash::{
    Dimension, PipelineConfig, Point, ProgressiveDashboard, SeriesHandle, Theme,
};

fn feed(handle: &SeriesHandle, batches: impl Iterator<Item = Vec<Point>>, remap: fn(Point) -> Point) {
    for batch in batches {
        let points: Vec<Point> = batch.into_iter().map(remap).collect();
        handle.add_batch(&points).unwrap();
    }
}

fn coordinates(handle: &SeriesHandle, dimension: Dimension) -> Vec<f64> {
    handle.chart().read(|chart| {
        chart
            .series_by_id(handle.id())
            .unwrap()
            .store()
            .points()
            .iter()
            .map(|point| point.coordinate(dimension))
            .collect()
    })
}

#[test]
fn dashboard_holds_exactly_two_series() {
    let pipeline = ProgressiveDashboard::build(&PipelineConfig::default(), Theme::default()).unwrap();
    let charts = pipeline.dashboard().charts();
    assert_eq!(charts.len(), 2);
    let titles: Vec<String> = charts
        .iter()
        .map(|(_, chart)| chart.read(|chart| chart.title().to_string()))
        .collect();
    assert_eq!(titles, [REGRESSIVE_TITLE, PROGRESSIVE_TITLE]);
    let series: usize = charts
        .iter()
        .map(|(_, chart)| chart.read(|chart| chart.series().len()))
        .sum();
    assert_eq!(series, 2);
}

#[test]
fn cleaning_settles_at_minimum_point_count() {
    let config = PipelineConfig::default();
    let pipeline = ProgressiveDashboard::build(&config, Theme::default()).unwrap();

    let batches = 15_000 / config.batch_size;
    feed(
        pipeline.regressive_series(),
        pipeline.regressive_stream().unwrap().batches().take(batches),
        regressive_remap,
    );
    feed(
        pipeline.progressive_series(),
        pipeline.progressive_stream().unwrap().batches().take(batches),
        progressive_remap,
    );

    for series in [pipeline.regressive_series(), pipeline.progressive_series()] {
        assert_eq!(series.len(), config.min_data_point_count);
        assert!(series.pattern_holds());
    }
}

#[test]
fn regressive_series_keeps_decreasing_across_repeats() {
    let pipeline = ProgressiveDashboard::build(&PipelineConfig::default(), Theme::default()).unwrap();
    // One pass is about 420 samples, so this crosses several restarts.
    feed(
        pipeline.regressive_series(),
        pipeline.regressive_stream().unwrap().batches().take(100),
        regressive_remap,
    );
    let ys = coordinates(pipeline.regressive_series(), Dimension::Y);
    assert_eq!(ys.len(), 2_000);
    assert!(ys.windows(2).all(|pair| pair[1] <= pair[0]));

    // Restarts shift t but not the sampled value, so compare the first pass only.
    let xs = coordinates(pipeline.regressive_series(), Dimension::X);
    for (x, y) in xs.iter().zip(&ys).take(400) {
        assert!((x - (-y).sin()).abs() < 1e-9);
    }
}

#[test]
fn progressive_series_is_monotonic_in_y_only() {
    let pipeline = ProgressiveDashboard::build(&PipelineConfig::default(), Theme::default()).unwrap();
    feed(
        pipeline.progressive_series(),
        pipeline.progressive_stream().unwrap().batches().take(100),
        progressive_remap,
    );
    let ys = coordinates(pipeline.progressive_series(), Dimension::Y);
    assert!(ys.windows(2).all(|pair| pair[1] >= pair[0]));

    // The wave itself is not monotonic, so X wanders back and forth.
    let xs = coordinates(pipeline.progressive_series(), Dimension::X);
    assert!(xs.windows(2).any(|pair| pair[1] > pair[0]));
    assert!(xs.windows(2).any(|pair| pair[1] < pair[0]));
    for (x, y) in xs.iter().zip(&ys) {
        assert!((x - composite_wave(*y)).abs() < 1e-9);
    }
}

#[test]
fn started_streams_deliver_every_sample() {
    let config = PipelineConfig {
        regressive_end: 1.5,
        progressive_end: 1.5,
        interval_ms: 1,
        repeat: false,
        ..PipelineConfig::default()
    };
    let pipeline = ProgressiveDashboard::build(&config, Theme::default()).unwrap();
    let handles = pipeline.start().unwrap();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(pipeline.regressive_series().len(), 101);
    assert_eq!(pipeline.progressive_series().len(), 101);
}
