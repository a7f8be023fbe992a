use chartpanes::api::{ChartEngine, ChartEngineConfig};
use chartpanes::core::Candle;
use chartpanes::render::NullRenderer;

fn make_candles(count: usize) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let base = 10.0 + i as f64 * 0.01;
            Candle::new(i as i64 * 60, base, base + 0.5, base - 0.5, base, None)
                .expect("valid candle")
        })
        .collect()
}

fn build_engine() -> ChartEngine<NullRenderer> {
    let config = ChartEngineConfig::new(800.0).with_resize_min_interval(0.1);
    let mut engine = ChartEngine::new(NullRenderer::default(), config).expect("engine init");
    engine.set_candles(make_candles(500)).expect("load candles");
    engine
}

#[test]
fn tick_draws_once_per_dirty_period() {
    let mut engine = build_engine();

    // Initial load marked the engine dirty.
    assert!(engine.tick(0.0).expect("tick"));
    assert!(!engine.tick(0.016).expect("tick"), "clean engine skips draw");

    // Many mutations within one frame still cost exactly one draw.
    engine.wheel(-120.0, 400.0).expect("zoom");
    engine.wheel(-120.0, 400.0).expect("zoom");
    engine.pointer_move(300.0, 100.0).expect("move");
    assert!(engine.tick(0.033).expect("tick"));
    assert!(!engine.tick(0.049).expect("tick"));
}

#[test]
fn resize_bursts_are_throttled_with_a_trailing_flush() {
    let mut engine = build_engine();
    let _ = engine.tick(0.0).expect("drain initial dirty flag");

    // First resize of the burst applies immediately.
    engine.on_surface_resized(700.0, 0.00).expect("resize");
    assert!((engine.viewport().container_width_px() - 700.0).abs() <= 1e-9);

    // Follow-ups inside the interval are deferred...
    engine.on_surface_resized(650.0, 0.02).expect("resize");
    engine.on_surface_resized(600.0, 0.05).expect("resize");
    assert!((engine.viewport().container_width_px() - 700.0).abs() <= 1e-9);

    // ...and the final width lands on the first tick past the interval.
    let _ = engine.tick(0.06).expect("tick inside interval");
    assert!((engine.viewport().container_width_px() - 700.0).abs() <= 1e-9);

    let drew = engine.tick(0.12).expect("tick past interval");
    assert!(drew, "trailing resize marks the engine dirty");
    assert!((engine.viewport().container_width_px() - 600.0).abs() <= 1e-9);
}

#[test]
fn resize_to_zero_width_renders_no_data_instead_of_throwing() {
    let mut engine = build_engine();
    engine.on_surface_resized(0.0, 0.0).expect("resize to zero");
    assert!(engine.tick(0.1).expect("tick"));
    let scene = engine.build_scene();
    assert!(scene.no_data);
}

#[test]
fn render_is_unconditional_for_expose_events() {
    let mut engine = build_engine();
    let _ = engine.tick(0.0).expect("drain dirty flag");
    engine.render().expect("expose redraw");
    engine.render().expect("second expose redraw");
}
