use indexmap::IndexMap;
use serde::Serialize;

use crate::core::{PanelDescriptor, SharedViewport};
use crate::interaction::PointerState;

/// Serializable view of the full engine state for host debugging and
/// golden tests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineSnapshot {
    pub viewport: SharedViewport,
    pub pointer: PointerState,
    pub panels: Vec<PanelDescriptor>,
    pub visibility: IndexMap<String, bool>,
}
