use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::primitives::{datetime_to_unix_seconds, decimal_to_f64};
use crate::error::{ChartError, ChartResult};
use crate::render::Color;

/// Canonical OHLCV candle. The position in its ascending-time array is the
/// logical index used for all cross-panel referencing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: Option<f64>,
}

impl Candle {
    /// Builds a validated candle from raw floating values.
    ///
    /// Invariants:
    /// - all price values are finite
    /// - `low <= high`
    /// - `open` and `close` are within `[low, high]`
    /// - `volume`, when present, is finite and >= 0
    pub fn new(
        time: i64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: Option<f64>,
    ) -> ChartResult<Self> {
        if !open.is_finite() || !high.is_finite() || !low.is_finite() || !close.is_finite() {
            return Err(ChartError::InvalidData(
                "ohlc values must be finite".to_owned(),
            ));
        }

        if low > high {
            return Err(ChartError::InvalidData(
                "ohlc low must be <= high".to_owned(),
            ));
        }

        if open < low || open > high || close < low || close > high {
            return Err(ChartError::InvalidData(
                "ohlc open/close must be within low/high range".to_owned(),
            ));
        }

        if let Some(volume) = volume {
            if !volume.is_finite() || volume < 0.0 {
                return Err(ChartError::InvalidData(
                    "candle volume must be finite and >= 0".to_owned(),
                ));
            }
        }

        Ok(Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    /// Converts strongly-typed temporal/decimal input into a validated candle.
    pub fn from_decimal_time(
        time: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Option<Decimal>,
    ) -> ChartResult<Self> {
        let volume = match volume {
            Some(value) => Some(decimal_to_f64(value, "volume")?),
            None => None,
        };
        Self::new(
            datetime_to_unix_seconds(time),
            decimal_to_f64(open, "open")?,
            decimal_to_f64(high, "high")?,
            decimal_to_f64(low, "low")?,
            decimal_to_f64(close, "close")?,
            volume,
        )
    }

    /// Returns `true` when close price is greater than or equal to open price.
    #[must_use]
    pub fn is_bullish(self) -> bool {
        self.close >= self.open
    }
}

/// Visual style of an indicator series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum IndicatorKind {
    #[default]
    Line,
    Area,
    Histogram,
}

/// One sample of an indicator, addressed by logical candle index.
///
/// `value` may be non-finite during indicator warm-up. Non-finite samples are
/// excluded from range computation and break the drawn polyline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub index: usize,
    pub value: f64,
}

impl SeriesPoint {
    #[must_use]
    pub const fn new(index: usize, value: f64) -> Self {
        Self { index, value }
    }
}

/// A named indicator series routed onto one panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    pub name: String,
    pub color: Color,
    pub visible: bool,
    pub kind: IndicatorKind,
    pub points: Vec<SeriesPoint>,
}

impl IndicatorSeries {
    #[must_use]
    pub fn new(name: impl Into<String>, color: Color, points: Vec<SeriesPoint>) -> Self {
        Self {
            name: name.into(),
            color,
            visible: true,
            kind: IndicatorKind::Line,
            points,
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: IndicatorKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Looks up the sample value at a logical index.
    #[must_use]
    pub fn value_at(&self, index: usize) -> Option<f64> {
        let slot = self
            .points
            .partition_point(|point| point.index < index);
        self.points
            .get(slot)
            .filter(|point| point.index == index)
            .map(|point| point.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

/// An executed trade anchored to a logical candle index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub logical_index: usize,
    pub price: f64,
    pub side: TradeSide,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub pnl: Option<f64>,
}

impl Trade {
    pub fn new(logical_index: usize, price: f64, side: TradeSide) -> ChartResult<Self> {
        if !price.is_finite() {
            return Err(ChartError::InvalidData(
                "trade price must be finite".to_owned(),
            ));
        }
        Ok(Self {
            logical_index,
            price,
            side,
            reason: None,
            quantity: None,
            value: None,
            pnl: None,
        })
    }

    pub fn from_decimal_price(
        logical_index: usize,
        price: Decimal,
        side: TradeSide,
    ) -> ChartResult<Self> {
        Self::new(logical_index, decimal_to_f64(price, "price")?, side)
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[must_use]
    pub fn with_pnl(mut self, pnl: f64) -> Self {
        self.pnl = Some(pnl);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{Candle, SeriesPoint, Trade, TradeSide};
    use crate::ChartError;

    #[test]
    fn candle_rejects_inverted_low_high() {
        let err = Candle::new(0, 10.0, 9.0, 11.0, 10.0, None).expect_err("low > high must fail");
        assert!(matches!(err, ChartError::InvalidData(_)));
    }

    #[test]
    fn candle_rejects_close_outside_range() {
        let err =
            Candle::new(0, 10.0, 11.0, 9.0, 12.0, None).expect_err("close above high must fail");
        assert!(matches!(err, ChartError::InvalidData(_)));
    }

    #[test]
    fn candle_accepts_missing_volume() {
        let candle = Candle::new(60, 10.0, 11.0, 9.0, 10.5, None).expect("valid candle");
        assert!(candle.is_bullish());
        assert_eq!(candle.volume, None);
    }

    #[test]
    fn indicator_value_lookup_uses_binary_search() {
        let series = super::IndicatorSeries::new(
            "EMA_20",
            crate::render::Color::rgb(0.2, 0.4, 0.9),
            vec![
                SeriesPoint::new(3, 1.0),
                SeriesPoint::new(5, 2.0),
                SeriesPoint::new(9, 3.0),
            ],
        );
        assert_eq!(series.value_at(5), Some(2.0));
        assert_eq!(series.value_at(4), None);
        assert_eq!(series.value_at(10), None);
    }

    #[test]
    fn trade_rejects_non_finite_price() {
        let err = Trade::new(3, f64::NAN, TradeSide::Buy).expect_err("nan price must fail");
        assert!(matches!(err, ChartError::InvalidData(_)));
    }
}
