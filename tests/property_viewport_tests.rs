use chartpanes::core::{SharedViewport, ZoomDirection};
use proptest::prelude::*;

fn viewport_with(total: usize, width: f64) -> SharedViewport {
    let mut viewport = SharedViewport::new(width, 8.0, 0.0).expect("valid viewport");
    viewport.set_total_candles(total);
    viewport.scroll_to_latest();
    viewport
}

proptest! {
    #[test]
    fn window_invariants_hold_under_arbitrary_gestures(
        total in 1usize..5_000,
        width in 1.0f64..3_000.0,
        gestures in proptest::collection::vec((0u8..3, -1_000.0f64..1_000.0), 0..40)
    ) {
        let mut viewport = viewport_with(total, width);

        for (kind, amount) in gestures {
            match kind {
                0 => { viewport.pan(amount).expect("pan"); }
                1 => {
                    let direction = if amount >= 0.0 { ZoomDirection::In } else { ZoomDirection::Out };
                    viewport.zoom(direction, amount.abs().min(width)).expect("zoom");
                }
                _ => { viewport.resize_container((amount.abs() % 3_000.0).max(1.0)).expect("resize"); }
            }

            if let Some((start, end)) = viewport.visible_range() {
                prop_assert!(start <= end);
                prop_assert!(end < total);

                let expected = (viewport.container_width_px() / viewport.candle_width_px()).floor() as usize;
                let actual = end - start + 1;
                // +-1 at the array boundary
                prop_assert!(actual <= expected.max(1));
                if start > 0 && end + 1 < total {
                    prop_assert!(actual + 1 >= expected, "interior window too small: {actual} vs {expected}");
                }
            }

            prop_assert!(viewport.zoom_factor() >= 0.1 - 1e-12);
            prop_assert!(viewport.zoom_factor() <= 10.0 + 1e-12);
            prop_assert!(viewport.candle_width_px() >= 2.0);
            prop_assert!(viewport.pan_offset_px() <= 0.0);
        }
    }

    #[test]
    fn identical_gesture_sequences_are_deterministic(
        gestures in proptest::collection::vec((0u8..2, -500.0f64..500.0), 0..25)
    ) {
        let mut left = viewport_with(2_000, 800.0);
        let mut right = viewport_with(2_000, 800.0);

        for viewport in [&mut left, &mut right] {
            for &(kind, amount) in &gestures {
                if kind == 0 {
                    viewport.pan(amount).expect("pan");
                } else {
                    let direction = if amount >= 0.0 { ZoomDirection::In } else { ZoomDirection::Out };
                    viewport.zoom(direction, amount.abs()).expect("zoom");
                }
            }
        }

        prop_assert_eq!(left, right);
    }

    #[test]
    fn zoom_round_trip_restores_state_away_from_clamps(
        anchor in 0.0f64..800.0,
        factor in 1.01f64..2.0
    ) {
        let mut viewport = viewport_with(10_000, 800.0);
        // center the window so neither clamp engages
        viewport.pan(4_000.0 * 8.0).expect("pan to the middle");

        let zoom_before = viewport.zoom_factor();
        let pan_before = viewport.pan_offset_px();

        viewport.zoom_by_factor(factor, anchor).expect("zoom in");
        viewport.zoom_by_factor(1.0 / factor, anchor).expect("zoom out");

        prop_assert!((viewport.zoom_factor() - zoom_before).abs() <= 1e-9);
        prop_assert!((viewport.pan_offset_px() - pan_before).abs() <= 1e-5);
    }
}
