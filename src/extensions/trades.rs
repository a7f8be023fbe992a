//! Trade markers anchored to candles on the price panel.
//!
//! Placement is deterministic and pure so rendering and hit-testing share
//! the exact same geometry.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::geometry::{index_to_x, value_to_y};
use crate::core::types::{Trade, TradeSide};
use crate::render::RectPx;

/// Fixed marker hit-box width/height.
pub const TRADE_MARKER_SIZE_PX: f64 = 12.0;
/// Vertical gap between the traded price and the marker edge.
pub const TRADE_MARKER_OFFSET_PX: f64 = 8.0;

/// One placed trade marker in panel-local pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeMarker {
    /// Position of the trade in the host-supplied array.
    pub trade_index: usize,
    pub logical_index: usize,
    pub side: TradeSide,
    pub x: f64,
    pub y: f64,
    pub hit_box: RectPx,
}

/// Places markers for every trade inside the visible index window.
///
/// Sell markers sit above the traded price, buy markers below. Output is
/// ordered by x then array position so draw order is stable under equal
/// anchors.
#[must_use]
pub fn place_trade_markers(
    trades: &[Trade],
    window: (usize, usize),
    start_index: usize,
    candle_width_px: f64,
    plot: RectPx,
    value_min: f64,
    value_max: f64,
) -> Vec<TradeMarker> {
    let mut markers: Vec<TradeMarker> = trades
        .iter()
        .enumerate()
        .filter(|(_, trade)| {
            trade.logical_index >= window.0 && trade.logical_index <= window.1
        })
        .map(|(trade_index, trade)| {
            let x = index_to_x(trade.logical_index, start_index, candle_width_px, plot.x);
            let price_y = value_to_y(trade.price, value_min, value_max, plot.height, plot.y);
            let y = match trade.side {
                TradeSide::Sell => price_y - TRADE_MARKER_OFFSET_PX - TRADE_MARKER_SIZE_PX / 2.0,
                TradeSide::Buy => price_y + TRADE_MARKER_OFFSET_PX + TRADE_MARKER_SIZE_PX / 2.0,
            };
            TradeMarker {
                trade_index,
                logical_index: trade.logical_index,
                side: trade.side,
                x,
                y,
                hit_box: RectPx::new(
                    x - TRADE_MARKER_SIZE_PX / 2.0,
                    y - TRADE_MARKER_SIZE_PX / 2.0,
                    TRADE_MARKER_SIZE_PX,
                    TRADE_MARKER_SIZE_PX,
                ),
            }
        })
        .collect();

    markers.sort_by(|a, b| {
        OrderedFloat(a.x)
            .cmp(&OrderedFloat(b.x))
            .then_with(|| a.trade_index.cmp(&b.trade_index))
    });
    markers
}

/// Reports the hovered trade: the first trade (in host array order) whose
/// marker box contains the pointer.
#[must_use]
pub fn hit_test(markers: &[TradeMarker], pointer_x: f64, pointer_y: f64) -> Option<usize> {
    let hits: SmallVec<[usize; 4]> = markers
        .iter()
        .filter(|marker| marker.hit_box.contains(pointer_x, pointer_y))
        .map(|marker| marker.trade_index)
        .collect();
    hits.into_iter().min()
}
