//! Vertical composition of visible panels.
//!
//! Panels stack top-to-bottom in descriptor order with fixed headers and
//! gaps; plotting heights are split by proportional weights.

use serde::{Deserialize, Serialize};

use crate::core::routing::{PanelDescriptor, PanelKind};
use crate::error::{ChartError, ChartResult};

/// Fixed pixel metrics of the composed chart column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub price_panel_height_px: f64,
    pub secondary_panel_height_px: f64,
    pub panel_gap_px: f64,
    pub header_height_px: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            price_panel_height_px: 400.0,
            secondary_panel_height_px: 150.0,
            panel_gap_px: 8.0,
            header_height_px: 24.0,
        }
    }
}

impl LayoutConfig {
    pub fn validate(self) -> ChartResult<Self> {
        for (value, name) in [
            (self.price_panel_height_px, "price_panel_height_px"),
            (self.secondary_panel_height_px, "secondary_panel_height_px"),
            (self.panel_gap_px, "panel_gap_px"),
            (self.header_height_px, "header_height_px"),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "layout metric `{name}` must be finite and >= 0"
                )));
            }
        }
        Ok(self)
    }
}

/// Pixel extent of one visible panel within the chart column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelRegion {
    pub panel_id: String,
    pub header_top_px: f64,
    pub plot_top_px: f64,
    pub plot_bottom_px: f64,
}

impl PanelRegion {
    #[must_use]
    pub fn plot_height_px(&self) -> f64 {
        (self.plot_bottom_px - self.plot_top_px).max(0.0)
    }
}

/// Computed vertical layout for the visible panel set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartLayout {
    pub total_height_px: f64,
    pub regions: Vec<PanelRegion>,
}

impl ChartLayout {
    #[must_use]
    pub fn region(&self, panel_id: &str) -> Option<&PanelRegion> {
        self.regions
            .iter()
            .find(|region| region.panel_id == panel_id)
    }

    /// Panel whose plot rectangle contains pixel `y`, if any.
    #[must_use]
    pub fn region_at_y(&self, y: f64) -> Option<&PanelRegion> {
        self.regions
            .iter()
            .find(|region| y >= region.plot_top_px && y <= region.plot_bottom_px)
    }
}

/// Stacks the visible panels and splits the plotting space by weight.
///
/// Total height follows the fixed-metric formula (price base height, fixed
/// secondary heights, gaps between panels, one header per panel); individual
/// plot heights then redistribute the net plotting space proportionally to
/// each descriptor's weight.
#[must_use]
pub fn compute_layout(panels: &[PanelDescriptor], config: LayoutConfig) -> ChartLayout {
    let visible: Vec<&PanelDescriptor> = panels.iter().filter(|panel| panel.visible).collect();
    if visible.is_empty() {
        return ChartLayout {
            total_height_px: 0.0,
            regions: Vec::new(),
        };
    }

    let panel_count = visible.len();
    let has_price = visible.iter().any(|panel| panel.kind == PanelKind::Price);
    let secondary_count = panel_count - usize::from(has_price);

    let plot_space = if has_price {
        config.price_panel_height_px
    } else {
        0.0
    } + secondary_count as f64 * config.secondary_panel_height_px;
    let chrome_space = config.panel_gap_px * (panel_count as f64 - 1.0)
        + config.header_height_px * panel_count as f64;
    let total_height_px = plot_space + chrome_space;

    let mut weights: Vec<f64> = visible
        .iter()
        .map(|panel| {
            if panel.proportional_height.is_finite() && panel.proportional_height > 0.0 {
                panel.proportional_height
            } else {
                0.0
            }
        })
        .collect();
    let weight_sum: f64 = weights.iter().sum();
    if !weight_sum.is_finite() || weight_sum <= 0.0 {
        weights.fill(1.0 / panel_count as f64);
    } else {
        for weight in &mut weights {
            *weight /= weight_sum;
        }
    }

    let mut regions = Vec::with_capacity(panel_count);
    let mut cursor = 0.0;
    for (slot, panel) in visible.iter().enumerate() {
        let header_top_px = cursor;
        let plot_top_px = header_top_px + config.header_height_px;
        let plot_height = plot_space * weights[slot];
        let plot_bottom_px = plot_top_px + plot_height;
        regions.push(PanelRegion {
            panel_id: panel.id.clone(),
            header_top_px,
            plot_top_px,
            plot_bottom_px,
        });
        cursor = plot_bottom_px;
        if slot + 1 < panel_count {
            cursor += config.panel_gap_px;
        }
    }

    ChartLayout {
        total_height_px,
        regions,
    }
}

#[cfg(test)]
mod tests {
    use super::{LayoutConfig, compute_layout};
    use crate::core::routing::build_panels;
    use crate::core::types::IndicatorSeries;
    use crate::render::Color;

    fn indicator(name: &str) -> IndicatorSeries {
        IndicatorSeries::new(name, Color::rgb(0.5, 0.5, 0.5), Vec::new())
    }

    #[test]
    fn total_height_follows_fixed_metric_formula() {
        let panels = build_panels(&[indicator("RSI_14"), indicator("Volume")], &[]);
        let layout = compute_layout(&panels, LayoutConfig::default());
        // price 400 + 2 secondaries * 150 + 2 gaps * 8 + 3 headers * 24
        assert!((layout.total_height_px - (400.0 + 300.0 + 16.0 + 72.0)).abs() <= 1e-9);
        assert_eq!(layout.regions.len(), 3);
    }

    #[test]
    fn plot_heights_split_by_proportional_weights() {
        let panels = build_panels(&[indicator("RSI_14")], &[]);
        let layout = compute_layout(&panels, LayoutConfig::default());
        let price = layout.region("price").expect("price region");
        let rsi = layout.region("rsi").expect("rsi region");
        // weights 3:1 over a plot space of 400 + 150
        assert!((price.plot_height_px() - 412.5).abs() <= 1e-9);
        assert!((rsi.plot_height_px() - 137.5).abs() <= 1e-9);
    }

    #[test]
    fn plot_heights_sum_to_plot_space() {
        let panels = build_panels(
            &[indicator("RSI_14"), indicator("MACD_Histogram"), indicator("Volume")],
            &[],
        );
        let layout = compute_layout(&panels, LayoutConfig::default());
        let sum: f64 = layout
            .regions
            .iter()
            .map(super::PanelRegion::plot_height_px)
            .sum();
        assert!((sum - (400.0 + 3.0 * 150.0)).abs() <= 1e-9);
    }

    #[test]
    fn hidden_panels_are_excluded_from_the_stack() {
        let mut panels = build_panels(&[indicator("RSI_14")], &[]);
        crate::core::routing::toggle_indicator_group(&mut panels, "RSI_14");
        let layout = compute_layout(&panels, LayoutConfig::default());
        assert_eq!(layout.regions.len(), 1);
        assert_eq!(layout.regions[0].panel_id, "price");
        // single panel: no gap, one header
        assert!((layout.total_height_px - (400.0 + 24.0)).abs() <= 1e-9);
    }

    #[test]
    fn region_at_y_resolves_the_panel_under_the_pointer() {
        let panels = build_panels(&[indicator("RSI_14")], &[]);
        let layout = compute_layout(&panels, LayoutConfig::default());
        let price = layout.region("price").expect("price region");
        let inside_price = (price.plot_top_px + price.plot_bottom_px) / 2.0;
        assert_eq!(
            layout.region_at_y(inside_price).map(|r| r.panel_id.as_str()),
            Some("price")
        );
        assert!(layout.region_at_y(10.0).is_none(), "header band hits nothing");
    }
}
