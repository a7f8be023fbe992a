pub mod trades;

pub use trades::{TRADE_MARKER_OFFSET_PX, TRADE_MARKER_SIZE_PX, TradeMarker, place_trade_markers};
