use chartpanes::core::{SharedViewport, ZoomDirection};

fn build_viewport(total: usize) -> SharedViewport {
    let mut viewport = SharedViewport::new(800.0, 8.0, 0.0).expect("valid viewport");
    viewport.set_total_candles(total);
    viewport.scroll_to_latest();
    viewport
}

#[test]
fn thousand_candles_in_800px_start_at_index_900() {
    let viewport = build_viewport(1000);
    assert_eq!(viewport.visible_count(), 100);
    assert_eq!(viewport.visible_range(), Some((900, 999)));
    assert!((viewport.candle_width_px() - 8.0).abs() <= 1e-12);
}

#[test]
fn window_size_tracks_candle_width() {
    let mut viewport = build_viewport(1000);
    viewport
        .zoom(ZoomDirection::In, 400.0)
        .expect("zoom should work");

    let (start, end) = viewport.visible_range().expect("window");
    let expected = (800.0 / viewport.candle_width_px()).floor() as usize;
    // +-1 at the array boundary
    let actual = end - start + 1;
    assert!(
        actual == expected || actual + 1 == expected,
        "window {actual} vs expected {expected}"
    );
}

#[test]
fn midpoint_zoom_keeps_the_anchored_candle_near_the_midpoint() {
    let mut viewport = build_viewport(1000);
    let mid_x = 400.0;
    let index_under = |viewport: &SharedViewport| -> usize {
        ((mid_x - viewport.padding_left_px() - viewport.pan_offset_px())
            / viewport.candle_width_px())
        .floor() as usize
    };
    let anchor_index = index_under(&viewport);

    let visible_before = viewport.visible_count();
    viewport.zoom(ZoomDirection::In, mid_x).expect("zoom in");
    assert!(
        viewport.visible_count() < visible_before,
        "zooming in must strictly shrink the window"
    );

    let drift = index_under(&viewport).abs_diff(anchor_index);
    assert!(drift <= 1, "anchor candle drifted {drift} indices");
}

#[test]
fn inverse_zoom_restores_pan_and_zoom_within_tolerance() {
    let mut viewport = build_viewport(1000);
    viewport.pan(2400.0).expect("move off the tail clamp");
    let zoom_before = viewport.zoom_factor();
    let pan_before = viewport.pan_offset_px();

    viewport.zoom_by_factor(1.6, 250.0).expect("zoom in");
    viewport.zoom_by_factor(1.0 / 1.6, 250.0).expect("zoom out");

    assert!((viewport.zoom_factor() - zoom_before).abs() <= 1e-9);
    assert!((viewport.pan_offset_px() - pan_before).abs() <= 1e-6);
}

#[test]
fn panning_never_escapes_the_array() {
    let mut viewport = build_viewport(1000);
    for _ in 0..50 {
        viewport.pan(500.0).expect("pan toward oldest");
        let (start, end) = viewport.visible_range().expect("window");
        assert!(start <= end);
        assert!(end < 1000);
    }
    assert_eq!(viewport.start_index(), 0);

    for _ in 0..50 {
        viewport.pan(-500.0).expect("pan toward newest");
    }
    assert_eq!(viewport.end_index(), 999);
}

#[test]
fn reset_restores_zoom_one_and_latest_window() {
    let mut viewport = build_viewport(1000);
    viewport.zoom(ZoomDirection::In, 100.0).expect("zoom");
    viewport.pan(3000.0).expect("pan");

    viewport.reset();
    assert!((viewport.zoom_factor() - 1.0).abs() <= 1e-12);
    assert_eq!(viewport.visible_range(), Some((900, 999)));
}

#[test]
fn resize_reclamps_the_window() {
    let mut viewport = build_viewport(1000);
    viewport.resize_container(400.0).expect("resize");
    assert_eq!(viewport.visible_count(), 50);
    let (start, end) = viewport.visible_range().expect("window");
    assert!(end < 1000);
    assert!(start <= end);

    viewport.resize_container(0.0).expect("zero width allowed");
    assert!(viewport.is_degenerate());
    assert_eq!(viewport.visible_range(), None);
}

#[test]
fn negative_container_width_is_rejected() {
    let mut viewport = build_viewport(10);
    let err = viewport
        .resize_container(-5.0)
        .expect_err("negative width must fail");
    assert!(matches!(
        err,
        chartpanes::ChartError::InvalidContainer { .. }
    ));
}
