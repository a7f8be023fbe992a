use chartpanes::api::{ChartEngine, ChartEngineConfig};
use chartpanes::core::{Candle, IndicatorSeries, SeriesPoint};
use chartpanes::render::{
    Color, HORIZONTAL_GRID_LINES, LightTheme, NullRenderer, RSI_REFERENCE_LEVELS, Renderer,
    VOLUME_BAR_ALPHA,
};

fn make_candles(count: usize) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let base = 100.0 + (i % 7) as f64;
            let close = if i % 2 == 0 { base + 1.5 } else { base - 1.5 };
            Candle::new(
                i as i64 * 60,
                base,
                base + 2.0,
                base - 2.0,
                close,
                Some(500.0 + (i % 13) as f64 * 100.0),
            )
            .expect("valid candle")
        })
        .collect()
}

fn series(name: &str, value: f64) -> IndicatorSeries {
    IndicatorSeries::new(
        name,
        Color::rgb(0.2, 0.5, 0.9),
        (0..200).map(|i| SeriesPoint::new(i, value)).collect(),
    )
}

fn build_engine() -> ChartEngine<NullRenderer> {
    let config = ChartEngineConfig::new(800.0);
    let mut engine = ChartEngine::new(NullRenderer::default(), config).expect("engine init");
    engine.set_candles(make_candles(200)).expect("load candles");
    engine
}

#[test]
fn empty_engine_builds_a_no_data_scene_without_throwing() {
    let config = ChartEngineConfig::new(800.0);
    let mut engine = ChartEngine::new(NullRenderer::default(), config).expect("engine init");

    let scene = engine.build_scene();
    assert!(scene.no_data);
    assert!(scene.frames.is_empty());

    let mut renderer = NullRenderer::default();
    renderer.render(&scene).expect("no-data scene renders");
    assert!(renderer.last_was_no_data);
}

#[test]
fn price_frame_draws_one_wick_and_body_per_visible_candle() {
    let engine = build_engine();
    let scene = engine.build_scene();
    let price = scene.frame("price").expect("price frame");

    // 100 visible candles + 2 overscan on the left edge (none on the right,
    // the window ends at the array tail).
    let candle_rects = price
        .rects
        .iter()
        .filter(|rect| rect.color.alpha == 1.0 && rect.height >= 1.0 && rect.width > 2.0)
        .count();
    assert!(candle_rects >= 100, "expected candle bodies, got {candle_rects}");
    assert!(
        price.lines.len() >= 100,
        "expected at least one wick per candle"
    );
}

#[test]
fn value_grid_draws_five_lines_with_labels() {
    let engine = build_engine();
    let scene = engine.build_scene();
    let price = scene.frame("price").expect("price frame");

    let label_count = price
        .texts
        .iter()
        .filter(|text| text.text.contains('.'))
        .count();
    assert!(
        label_count >= HORIZONTAL_GRID_LINES,
        "expected >= {HORIZONTAL_GRID_LINES} axis labels, got {label_count}"
    );
}

#[test]
fn rsi_panel_draws_reference_lines_before_series() {
    let mut engine = build_engine();
    engine.set_indicators(&[series("RSI_14", 55.0)]);

    let scene = engine.build_scene();
    let rsi = scene.frame("rsi").expect("rsi frame");

    // grid (5) + time grid + references (3) + series polyline
    let horizontal_full_width = rsi
        .lines
        .iter()
        .filter(|line| line.y1 == line.y2 && (line.x2 - line.x1) >= rsi.plot_rect.width - 1.0)
        .count();
    assert!(
        horizontal_full_width >= HORIZONTAL_GRID_LINES + RSI_REFERENCE_LEVELS.len(),
        "expected grid plus reference lines, got {horizontal_full_width}"
    );
}

#[test]
fn volume_bars_are_translucent_and_leave_headroom() {
    let mut engine = build_engine();
    engine.set_indicators(&[series("Volume_SMA_20", 900.0)]);

    let scene = engine.build_scene();
    let volume = scene.frame("volume").expect("volume frame");

    let bars: Vec<_> = volume
        .rects
        .iter()
        .filter(|rect| (rect.color.alpha - VOLUME_BAR_ALPHA).abs() <= 1e-9)
        .collect();
    assert!(!bars.is_empty(), "volume bars missing");

    let plot = volume.plot_rect;
    for bar in bars {
        assert!(
            bar.height <= plot.height / 1.05,
            "bar reaches into the headroom band"
        );
    }
}

#[test]
fn non_finite_indicator_values_break_the_polyline() {
    let mut engine = build_engine();
    let mut warmup = series("EMA_50", 100.0);
    // first 150 samples are warm-up NaNs
    for point in warmup.points.iter_mut().take(150) {
        point.value = f64::NAN;
    }
    engine.set_indicators(&[warmup]);

    let scene = engine.build_scene();
    let price = scene.frame("price").expect("price frame");
    let indicator_segments = price
        .lines
        .iter()
        .filter(|line| (line.stroke_width - 1.5).abs() <= 1e-9)
        .count();
    // window is 100..=199 (+overscan), NaNs run to 149: only ~49 segments
    assert!(
        (40..=60).contains(&indicator_segments),
        "expected the warm-up gap to suppress segments, got {indicator_segments}"
    );
}

#[test]
fn crosshair_vertical_line_spans_all_panels_value_label_only_in_origin() {
    let mut engine = build_engine();
    engine.set_indicators(&[series("RSI_14", 55.0)]);
    engine.pointer_move(400.0, 100.0).expect("pointer move");

    let scene = engine.build_scene();
    let price = scene.frame("price").expect("price frame");
    let rsi = scene.frame("rsi").expect("rsi frame");

    let vertical_in = |frame: &chartpanes::render::PanelFrame| {
        frame
            .lines
            .iter()
            .filter(|line| line.x1 == line.x2 && (line.x1 - 404.0).abs() <= 1e-9)
            .count()
    };
    assert!(vertical_in(price) >= 1, "crosshair missing in origin panel");
    assert!(vertical_in(rsi) >= 1, "crosshair missing in sibling panel");

    let horizontal_crosshair = |frame: &chartpanes::render::PanelFrame| {
        frame
            .lines
            .iter()
            .filter(|line| {
                line.y1 == line.y2 && (line.y1 - 100.0).abs() <= 1.0 && line.x1 == frame.plot_rect.x
            })
            .count()
    };
    assert!(
        horizontal_crosshair(price) >= 1,
        "horizontal line missing in origin panel"
    );
    assert_eq!(
        horizontal_crosshair(rsi),
        0,
        "horizontal line must not leak into sibling panels"
    );
}

#[test]
fn theme_change_retints_the_next_scene() {
    let mut engine = build_engine();
    let dark_scene = engine.build_scene();
    engine.on_theme_changed(Box::new(LightTheme));
    let light_scene = engine.build_scene();

    let dark_background = dark_scene.frames[0].rects[0].color;
    let light_background = light_scene.frames[0].rects[0].color;
    assert_ne!(dark_background, light_background);
    assert!((light_background.red - 1.0).abs() <= 1e-9);
}

#[test]
fn scene_total_height_matches_layout_formula() {
    let mut engine = build_engine();
    engine.set_indicators(&[series("RSI_14", 55.0), series("Volume_SMA_20", 900.0)]);
    let scene = engine.build_scene();
    // price 400 + 2 * 150 + 2 gaps * 8 + 3 headers * 24
    assert!((scene.total_height_px - 788.0).abs() <= 1e-9);
}
