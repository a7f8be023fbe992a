//! Frame scheduling: a dirty flag consumed once per host tick, and a
//! timestamp-throttle for container resizes.
//!
//! Time is host-provided seconds so the engine stays deterministic and free
//! of clock I/O.

use serde::{Deserialize, Serialize};
use tracing::trace;

/// "Needs redraw" flag: mutations set it, the render tick consumes it, so at
/// most one draw happens per tick regardless of event frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RedrawGate {
    dirty: bool,
}

impl RedrawGate {
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[must_use]
    pub fn is_dirty(self) -> bool {
        self.dirty
    }

    /// Consumes the flag, returning whether a redraw is due.
    pub fn take(&mut self) -> bool {
        let was_dirty = self.dirty;
        self.dirty = false;
        was_dirty
    }
}

/// Rate-limits container resizes to one applied width per interval, with a
/// trailing flush so the final width of a burst always lands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResizeThrottle {
    min_interval_seconds: f64,
    last_applied_at: Option<f64>,
    pending_width_px: Option<f64>,
}

impl ResizeThrottle {
    #[must_use]
    pub fn new(min_interval_seconds: f64) -> Self {
        Self {
            min_interval_seconds: min_interval_seconds.max(0.0),
            last_applied_at: None,
            pending_width_px: None,
        }
    }

    /// Offers a resize event. Returns the width to apply immediately, or
    /// `None` when the event was deferred into the pending slot.
    pub fn offer(&mut self, width_px: f64, now_seconds: f64) -> Option<f64> {
        let elapsed_enough = match self.last_applied_at {
            Some(last) => now_seconds - last >= self.min_interval_seconds,
            None => true,
        };
        if elapsed_enough {
            self.last_applied_at = Some(now_seconds);
            self.pending_width_px = None;
            return Some(width_px);
        }

        trace!(width_px, "resize deferred by throttle");
        self.pending_width_px = Some(width_px);
        None
    }

    /// Trailing flush: returns the deferred width once the interval has
    /// elapsed since the last applied resize.
    pub fn flush(&mut self, now_seconds: f64) -> Option<f64> {
        let pending = self.pending_width_px?;
        let elapsed_enough = match self.last_applied_at {
            Some(last) => now_seconds - last >= self.min_interval_seconds,
            None => true,
        };
        if !elapsed_enough {
            return None;
        }
        self.last_applied_at = Some(now_seconds);
        self.pending_width_px = None;
        Some(pending)
    }

    #[must_use]
    pub fn has_pending(self) -> bool {
        self.pending_width_px.is_some()
    }
}
