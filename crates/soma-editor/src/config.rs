//! Editor tuning knobs.
//!
//! Every field has a default, so a host can pass a partial JSON object
//! (or none at all).

use serde::{Deserialize, Serialize};
use soma_core::geometry::SNAP_THRESHOLD;
use soma_core::view::{MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};
use soma_core::CLONE_OFFSET;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of stored history snapshots.
    pub history_capacity: usize,
    /// Debounce between a gesture ending and its history commit.
    pub settle_delay_ms: u64,
    pub snap_threshold: f64,
    pub nudge_step: f64,
    /// Nudge distance with Shift held.
    pub nudge_step_large: f64,
    /// Offset for duplicate and paste.
    pub clone_offset: f64,
    pub zoom_step: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Fraction of the display used by "fit to screen".
    pub fit_padding: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: 50,
            settle_delay_ms: 100,
            snap_threshold: SNAP_THRESHOLD,
            nudge_step: 1.0,
            nudge_step_large: 10.0,
            clone_offset: CLONE_OFFSET,
            zoom_step: ZOOM_STEP,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            fit_padding: 0.9,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| format!("invalid editor config: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if self.history_capacity == 0 {
            return Err("history_capacity must be at least 1".into());
        }
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(format!(
                "zoom range {}..{} is empty or non-positive",
                self.min_zoom, self.max_zoom
            ));
        }
        if self.zoom_step <= 1.0 {
            return Err("zoom_step must be greater than 1".into());
        }
        Ok(())
    }
}
