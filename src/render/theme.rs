//! Live theme lookup.
//!
//! Colors are resolved through [`Theme`] at scene-build time, never cached at
//! panel construction, so a host theme toggle re-tints the next frame
//! without touching the data.

use crate::render::Color;

/// Color roles the scene builders query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeRole {
    Background,
    GridLine,
    AxisLabel,
    PanelTitle,
    CandleUp,
    CandleDown,
    CrosshairLine,
    CrosshairLabel,
    ReferenceLine,
}

/// Host-implementable color source, queried live on every scene build.
pub trait Theme {
    fn color(&self, role: ThemeRole) -> Color;

    fn name(&self) -> &str {
        "custom"
    }
}

/// Built-in dark theme.
#[derive(Debug, Clone, Copy, Default)]
pub struct DarkTheme;

impl Theme for DarkTheme {
    fn color(&self, role: ThemeRole) -> Color {
        match role {
            ThemeRole::Background => Color::rgb(0.07, 0.08, 0.10),
            ThemeRole::GridLine => Color::rgba(1.0, 1.0, 1.0, 0.08),
            ThemeRole::AxisLabel => Color::rgb(0.62, 0.66, 0.72),
            ThemeRole::PanelTitle => Color::rgb(0.82, 0.85, 0.89),
            ThemeRole::CandleUp => Color::rgb(0.15, 0.65, 0.60),
            ThemeRole::CandleDown => Color::rgb(0.94, 0.33, 0.31),
            ThemeRole::CrosshairLine => Color::rgba(1.0, 1.0, 1.0, 0.35),
            ThemeRole::CrosshairLabel => Color::rgb(0.95, 0.96, 0.98),
            ThemeRole::ReferenceLine => Color::rgba(1.0, 1.0, 1.0, 0.20),
        }
    }

    fn name(&self) -> &str {
        "dark"
    }
}

/// Built-in light theme.
#[derive(Debug, Clone, Copy, Default)]
pub struct LightTheme;

impl Theme for LightTheme {
    fn color(&self, role: ThemeRole) -> Color {
        match role {
            ThemeRole::Background => Color::rgb(1.0, 1.0, 1.0),
            ThemeRole::GridLine => Color::rgba(0.0, 0.0, 0.0, 0.08),
            ThemeRole::AxisLabel => Color::rgb(0.38, 0.42, 0.48),
            ThemeRole::PanelTitle => Color::rgb(0.13, 0.15, 0.18),
            ThemeRole::CandleUp => Color::rgb(0.01, 0.59, 0.53),
            ThemeRole::CandleDown => Color::rgb(0.90, 0.22, 0.21),
            ThemeRole::CrosshairLine => Color::rgba(0.0, 0.0, 0.0, 0.40),
            ThemeRole::CrosshairLabel => Color::rgb(0.10, 0.11, 0.13),
            ThemeRole::ReferenceLine => Color::rgba(0.0, 0.0, 0.0, 0.18),
        }
    }

    fn name(&self) -> &str {
        "light"
    }
}
