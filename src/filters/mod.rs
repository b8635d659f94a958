//! Landmark smoothing filters.
//!
//! The Kalman tracker is the real smoother; the pass-through filter exists so
//! pipelines can switch smoothing off without changing their call pattern.

/// Constant-velocity Kalman tracker for the full landmark set
pub mod kalman;

use crate::{config::TrackerConfig, landmarks::LandmarkSet, Error, Result};

/// Trait for all landmark filters
pub trait LandmarkFilter: Send + Sync {
    /// Process one frame; `None` means no detection was available
    ///
    /// Before the first detection there is nothing to carry forward, so a
    /// missing frame yields [`LandmarkSet::zeros`].
    ///
    /// # Errors
    ///
    /// Implementation specific, see each filter
    fn apply(&mut self, detections: Option<&LandmarkSet>) -> Result<LandmarkSet>;

    /// Reset filter state
    fn reset(&mut self);

    /// Get filter name
    fn name(&self) -> &str;
}

/// Filter that returns raw detections unchanged
///
/// On a frame without detection it repeats the last detection it saw.
#[derive(Debug, Default)]
pub struct PassThrough {
    last: Option<LandmarkSet>,
}

impl PassThrough {
    /// Create a pass-through filter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LandmarkFilter for PassThrough {
    fn apply(&mut self, detections: Option<&LandmarkSet>) -> Result<LandmarkSet> {
        if let Some(detections) = detections {
            self.last = Some(detections.clone());
        }
        Ok(self.last.clone().unwrap_or_else(LandmarkSet::zeros))
    }

    fn reset(&mut self) {
        self.last = None;
    }

    fn name(&self) -> &str {
        "PassThrough"
    }
}

/// Create a landmark filter by kind name
///
/// # Errors
///
/// Returns an error for an unknown kind or an invalid tracker configuration
pub fn create_filter(kind: &str, config: &TrackerConfig) -> Result<Box<dyn LandmarkFilter>> {
    match kind.to_lowercase().as_str() {
        "none" | "passthrough" => Ok(Box::new(PassThrough::new())),
        "kalman" => Ok(Box::new(kalman::LandmarkTracker::new(*config)?)),
        _ => Err(Error::FilterError(format!("Unknown filter type: {kind}"))),
    }
}
