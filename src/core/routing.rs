//! Indicator placement and panel assembly.
//!
//! Routing is a pure function of the indicator name so hosts can predict
//! where a series lands without instantiating a chart.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::{IndicatorKind, IndicatorSeries, SeriesPoint};

pub const PRICE_PANEL_ID: &str = "price";
pub const VOLUME_PANEL_ID: &str = "volume";

/// Default stretch weights; price gets three times the room of a secondary panel.
const PRICE_PANEL_WEIGHT: f64 = 3.0;
const SECONDARY_PANEL_WEIGHT: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PanelKind {
    Price,
    Oscillator,
    Volume,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum YAxisPolicy {
    /// Range derived from visible values at render time.
    Auto,
    /// Host- or router-pinned range.
    Fixed { min: f64, max: f64 },
}

/// Known oscillator families with dedicated panels and pinned ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OscillatorFamily {
    Rsi,
    Stochastic,
    Macd,
    Adx,
}

impl OscillatorFamily {
    #[must_use]
    pub const fn panel_id(self) -> &'static str {
        match self {
            Self::Rsi => "rsi",
            Self::Stochastic => "stochastic",
            Self::Macd => "macd",
            Self::Adx => "adx",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Rsi => "RSI",
            Self::Stochastic => "Stochastic",
            Self::Macd => "MACD",
            Self::Adx => "ADX",
        }
    }

    #[must_use]
    pub const fn fixed_range(self) -> (f64, f64) {
        match self {
            Self::Rsi | Self::Stochastic | Self::Adx => (0.0, 100.0),
            Self::Macd => (-5.0, 5.0),
        }
    }
}

/// Placement category an indicator routes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    PriceOverlay,
    Oscillator(OscillatorFamily),
    Volume,
}

/// Routes an indicator name to its placement. First match wins;
/// matching is case-insensitive on substrings.
#[must_use]
pub fn route_placement(name: &str) -> Placement {
    let name = name.to_ascii_lowercase();

    if name.contains("bollinger") || name.contains("macd_line") || name.contains("macd_signal") {
        return Placement::PriceOverlay;
    }
    if (name.contains("ema") || name.contains("sma")) && is_plain_moving_average(&name) {
        return Placement::PriceOverlay;
    }
    if name.contains("rsi") {
        return Placement::Oscillator(OscillatorFamily::Rsi);
    }
    if name.contains("stochastic") {
        return Placement::Oscillator(OscillatorFamily::Stochastic);
    }
    if name.contains("macd_histogram") {
        return Placement::Oscillator(OscillatorFamily::Macd);
    }
    if name.contains("adx") {
        return Placement::Oscillator(OscillatorFamily::Adx);
    }
    if name.contains("volume") {
        return Placement::Volume;
    }
    Placement::PriceOverlay
}

/// A moving-average name only overlays the price panel when it does not also
/// qualify another family (e.g. `Volume_SMA_20` belongs to the volume panel).
fn is_plain_moving_average(lowercase_name: &str) -> bool {
    !(lowercase_name.contains("volume")
        || lowercase_name.contains("rsi")
        || lowercase_name.contains("stochastic")
        || lowercase_name.contains("adx")
        || lowercase_name.contains("macd_histogram"))
}

/// Suffixes stripped when collapsing sibling series into one toggle group.
/// `_line` joins `macd_line` with `macd_signal`; band suffixes join Bollinger
/// members; `_k`/`_d` join stochastic members.
const GROUP_SUFFIXES: [&str; 7] = ["_upper", "_middle", "_lower", "_signal", "_line", "_k", "_d"];

/// Logical toggle-group key for an indicator name.
#[must_use]
pub fn group_key(name: &str) -> String {
    let name = name.to_ascii_lowercase();
    if name.starts_with("volume") {
        return "volume".to_owned();
    }
    for suffix in GROUP_SUFFIXES {
        if let Some(stripped) = name.strip_suffix(suffix) {
            return stripped.to_owned();
        }
    }
    name
}

/// Derives the synthetic `MACD_Histogram` series when both a MACD line and a
/// MACD signal line are present and no histogram was supplied by the host.
///
/// The histogram value is `line - signal` per logical index; a non-finite
/// input on either side yields a non-finite sample (skipped when drawing).
#[must_use]
pub fn derive_macd_histogram(indicators: &[IndicatorSeries]) -> Option<IndicatorSeries> {
    if indicators
        .iter()
        .any(|series| series.name.to_ascii_lowercase().contains("macd_histogram"))
    {
        return None;
    }

    let line = indicators
        .iter()
        .find(|series| series.name.to_ascii_lowercase().contains("macd_line"))?;
    let signal = indicators
        .iter()
        .find(|series| series.name.to_ascii_lowercase().contains("macd_signal"))?;

    let points = line
        .points
        .iter()
        .map(|point| {
            let difference = match signal.value_at(point.index) {
                Some(signal_value) => point.value - signal_value,
                None => f64::NAN,
            };
            SeriesPoint::new(point.index, difference)
        })
        .collect();

    Some(
        IndicatorSeries::new("MACD_Histogram", line.color, points)
            .with_kind(IndicatorKind::Histogram)
            .with_visible(line.visible || signal.visible),
    )
}

/// One panel of the composed chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelDescriptor {
    pub id: String,
    pub kind: PanelKind,
    pub title: String,
    pub proportional_height: f64,
    pub visible: bool,
    pub indicators: Vec<IndicatorSeries>,
    pub y_axis_policy: YAxisPolicy,
}

impl PanelDescriptor {
    fn price() -> Self {
        Self {
            id: PRICE_PANEL_ID.to_owned(),
            kind: PanelKind::Price,
            title: "Price".to_owned(),
            proportional_height: PRICE_PANEL_WEIGHT,
            visible: true,
            indicators: Vec::new(),
            y_axis_policy: YAxisPolicy::Auto,
        }
    }

    fn oscillator(family: OscillatorFamily) -> Self {
        let (min, max) = family.fixed_range();
        Self {
            id: family.panel_id().to_owned(),
            kind: PanelKind::Oscillator,
            title: family.title().to_owned(),
            proportional_height: SECONDARY_PANEL_WEIGHT,
            visible: true,
            indicators: Vec::new(),
            y_axis_policy: YAxisPolicy::Fixed { min, max },
        }
    }

    fn volume() -> Self {
        Self {
            id: VOLUME_PANEL_ID.to_owned(),
            kind: PanelKind::Volume,
            title: "Volume".to_owned(),
            proportional_height: SECONDARY_PANEL_WEIGHT,
            visible: true,
            indicators: Vec::new(),
            y_axis_policy: YAxisPolicy::Auto,
        }
    }

    /// Price panels are always visible; secondary panels only while they hold
    /// at least one visible indicator.
    fn refresh_visibility(&mut self) {
        if self.kind != PanelKind::Price {
            self.visible = self.indicators.iter().any(|series| series.visible);
        }
    }
}

/// Assembles ordered panel descriptors from the indicator inputs.
///
/// The synthetic MACD histogram is derived before routing. Prior visibility
/// flags are preserved by matching on indicator name + panel id, so a rebuild
/// is a merge rather than a replace.
#[must_use]
pub fn build_panels(
    indicators: &[IndicatorSeries],
    previous: &[PanelDescriptor],
) -> Vec<PanelDescriptor> {
    let mut routed: Vec<IndicatorSeries> = indicators.to_vec();
    if let Some(histogram) = derive_macd_histogram(indicators) {
        routed.push(histogram);
    }

    let mut price = PanelDescriptor::price();
    let mut oscillators: IndexMap<&'static str, PanelDescriptor> = IndexMap::new();
    let mut volume: Option<PanelDescriptor> = None;

    for series in routed {
        match route_placement(&series.name) {
            Placement::PriceOverlay => price.indicators.push(series),
            Placement::Oscillator(family) => {
                oscillators
                    .entry(family.panel_id())
                    .or_insert_with(|| PanelDescriptor::oscillator(family))
                    .indicators
                    .push(series);
            }
            Placement::Volume => {
                volume
                    .get_or_insert_with(PanelDescriptor::volume)
                    .indicators
                    .push(series);
            }
        }
    }

    let mut panels = Vec::with_capacity(2 + oscillators.len());
    panels.push(price);
    panels.extend(oscillators.into_values());
    if let Some(volume) = volume {
        panels.push(volume);
    }

    for panel in &mut panels {
        for series in &mut panel.indicators {
            if let Some(prior) = find_prior_visibility(previous, &panel.id, &series.name) {
                series.visible = prior;
            }
        }
        panel.refresh_visibility();
    }

    debug!(panel_count = panels.len(), "panel set rebuilt");
    panels
}

fn find_prior_visibility(previous: &[PanelDescriptor], panel_id: &str, name: &str) -> Option<bool> {
    previous
        .iter()
        .find(|panel| panel.id == panel_id)?
        .indicators
        .iter()
        .find(|series| series.name == name)
        .map(|series| series.visible)
}

/// Toggles the named indicator's whole group within its panel.
///
/// Every member of the group flips to the same new state (hidden when any
/// member was visible, shown otherwise); indicators outside the group are
/// untouched. Returns `false` when the name matches nothing.
pub fn toggle_indicator_group(panels: &mut [PanelDescriptor], indicator_name: &str) -> bool {
    let key = group_key(indicator_name);
    for panel in panels.iter_mut() {
        let owns_indicator = panel
            .indicators
            .iter()
            .any(|series| series.name.eq_ignore_ascii_case(indicator_name));
        if !owns_indicator {
            continue;
        }

        let any_visible = panel
            .indicators
            .iter()
            .filter(|series| group_key(&series.name) == key)
            .any(|series| series.visible);
        for series in &mut panel.indicators {
            if group_key(&series.name) == key {
                series.visible = !any_visible;
            }
        }
        panel.refresh_visibility();
        return true;
    }
    false
}

/// Full indicator-visibility map in panel order, as broadcast to hosts.
#[must_use]
pub fn visibility_map(panels: &[PanelDescriptor]) -> IndexMap<String, bool> {
    let mut map = IndexMap::new();
    for panel in panels {
        for series in &panel.indicators {
            map.insert(series.name.clone(), series.visible);
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::{
        OscillatorFamily, Placement, build_panels, derive_macd_histogram, group_key,
        route_placement, toggle_indicator_group,
    };
    use crate::core::types::{IndicatorSeries, SeriesPoint};
    use crate::render::Color;

    fn series(name: &str, points: Vec<SeriesPoint>) -> IndicatorSeries {
        IndicatorSeries::new(name, Color::rgb(0.5, 0.5, 0.5), points)
    }

    #[test]
    fn routing_is_a_pure_function_of_name() {
        assert_eq!(route_placement("EMA_50"), Placement::PriceOverlay);
        assert_eq!(route_placement("Bollinger_Upper"), Placement::PriceOverlay);
        assert_eq!(route_placement("MACD_Line"), Placement::PriceOverlay);
        assert_eq!(
            route_placement("RSI_14"),
            Placement::Oscillator(OscillatorFamily::Rsi)
        );
        assert_eq!(
            route_placement("Stochastic_K"),
            Placement::Oscillator(OscillatorFamily::Stochastic)
        );
        assert_eq!(
            route_placement("MACD_Histogram"),
            Placement::Oscillator(OscillatorFamily::Macd)
        );
        assert_eq!(
            route_placement("ADX_14"),
            Placement::Oscillator(OscillatorFamily::Adx)
        );
        assert_eq!(route_placement("Volume_SMA_20"), Placement::Volume);
        assert_eq!(route_placement("Volume"), Placement::Volume);
        assert_eq!(route_placement("Unknown_Custom"), Placement::PriceOverlay);
    }

    #[test]
    fn oscillator_ranges_follow_the_routing_table() {
        assert_eq!(OscillatorFamily::Rsi.fixed_range(), (0.0, 100.0));
        assert_eq!(OscillatorFamily::Macd.fixed_range(), (-5.0, 5.0));
    }

    #[test]
    fn group_key_strips_band_and_line_suffixes() {
        assert_eq!(group_key("Bollinger_Upper"), "bollinger");
        assert_eq!(group_key("Bollinger_Lower"), "bollinger");
        assert_eq!(group_key("MACD_Line"), "macd");
        assert_eq!(group_key("MACD_Signal"), "macd");
        assert_eq!(group_key("Stochastic_K"), "stochastic");
        assert_eq!(group_key("Volume_SMA_20"), "volume");
        assert_eq!(group_key("EMA_50"), "ema_50");
    }

    #[test]
    fn macd_histogram_is_derived_from_line_and_signal() {
        let indicators = vec![
            series(
                "MACD_Line",
                vec![SeriesPoint::new(0, 1.5), SeriesPoint::new(1, 2.0)],
            ),
            series(
                "MACD_Signal",
                vec![SeriesPoint::new(0, 1.0), SeriesPoint::new(1, f64::NAN)],
            ),
        ];
        let histogram = derive_macd_histogram(&indicators).expect("derived histogram");
        assert_eq!(histogram.name, "MACD_Histogram");
        assert!((histogram.points[0].value - 0.5).abs() <= 1e-12);
        assert!(histogram.points[1].value.is_nan());
        assert_eq!(
            route_placement(&histogram.name),
            Placement::Oscillator(OscillatorFamily::Macd)
        );
    }

    #[test]
    fn histogram_is_not_rederived_when_supplied() {
        let indicators = vec![
            series("MACD_Line", vec![SeriesPoint::new(0, 1.0)]),
            series("MACD_Signal", vec![SeriesPoint::new(0, 1.0)]),
            series("MACD_Histogram", vec![SeriesPoint::new(0, 0.0)]),
        ];
        assert!(derive_macd_histogram(&indicators).is_none());
    }

    #[test]
    fn build_panels_orders_price_oscillators_volume() {
        let indicators = vec![
            series("Volume_SMA_20", vec![]),
            series("RSI_14", vec![]),
            series("EMA_50", vec![]),
        ];
        let panels = build_panels(&indicators, &[]);
        let ids: Vec<&str> = panels.iter().map(|panel| panel.id.as_str()).collect();
        assert_eq!(ids, vec!["price", "rsi", "volume"]);
        assert_eq!(panels[0].indicators.len(), 1);
    }

    #[test]
    fn rebuild_merges_prior_visibility_by_name_and_panel() {
        let indicators = vec![series("RSI_14", vec![]), series("EMA_50", vec![])];
        let mut panels = build_panels(&indicators, &[]);
        assert!(toggle_indicator_group(&mut panels, "RSI_14"));
        assert!(!panels[1].visible, "rsi panel hides with its indicator");

        let rebuilt = build_panels(&indicators, &panels);
        let rsi = rebuilt
            .iter()
            .find(|panel| panel.id == "rsi")
            .expect("rsi panel");
        assert!(!rsi.indicators[0].visible, "visibility survived rebuild");
        assert!(!rsi.visible);
    }

    #[test]
    fn toggling_a_band_toggles_all_siblings_and_nothing_else() {
        let indicators = vec![
            series("Bollinger_Upper", vec![]),
            series("Bollinger_Middle", vec![]),
            series("Bollinger_Lower", vec![]),
            series("EMA_50", vec![]),
        ];
        let mut panels = build_panels(&indicators, &[]);
        assert!(toggle_indicator_group(&mut panels, "Bollinger_Lower"));

        let price = &panels[0];
        for name in ["Bollinger_Upper", "Bollinger_Middle", "Bollinger_Lower"] {
            let member = price
                .indicators
                .iter()
                .find(|series| series.name == name)
                .expect("band member");
            assert!(!member.visible, "{name} should be hidden");
        }
        let ema = price
            .indicators
            .iter()
            .find(|series| series.name == "EMA_50")
            .expect("ema series");
        assert!(ema.visible, "ungrouped indicator untouched");
    }

    #[test]
    fn toggling_unknown_indicator_reports_false() {
        let mut panels = build_panels(&[series("EMA_50", vec![])], &[]);
        assert!(!toggle_indicator_group(&mut panels, "Nope"));
    }
}
