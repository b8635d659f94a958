//! Kalman smoothing for 68-point facial landmark detections.
//!
//! An upstream detector produces a jittery set of 68 landmarks per frame. The
//! [`LandmarkTracker`] keeps a constant-velocity estimate of every landmark
//! (272 state values: 136 positions followed by 136 velocities) and fuses each
//! new detection into it, so downstream consumers get stable points that
//! still follow genuine motion.
//!
//! # Examples
//!
//! ## Smoothing a sequence
//!
//! ```no_run
//! use face_landmark_tracker::{LandmarkSet, LandmarkTracker};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut tracker = LandmarkTracker::with_defaults()?;
//!
//! # let frames: Vec<Vec<(f64, f64)>> = Vec::new();
//! for raw in frames {
//!     let detections = LandmarkSet::from_tuples(&raw)?;
//!     let smoothed = tracker.step(Some(&detections))?;
//!     println!("Nose tip: {:?}", smoothed[30]);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Explicit predict / correct
//!
//! ```no_run
//! use face_landmark_tracker::{LandmarkSet, LandmarkTracker};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut tracker = LandmarkTracker::with_defaults()?;
//! let detections = LandmarkSet::from_tuples(&[(120.0, 80.0); 68])?;
//!
//! let predicted = tracker.predict();
//! tracker.correct(&detections)?;
//! let corrected = tracker.estimate();
//! # let _ = (predicted, corrected);
//!
//! // Occluded frame: advance the motion model only
//! let coasted = tracker.predict();
//! # let _ = coasted;
//! # Ok(())
//! # }
//! ```
//!
//! ## Several faces
//!
//! ```no_run
//! use face_landmark_tracker::{config::Config, tracks::TrackRegistry, LandmarkSet};
//! use std::collections::BTreeMap;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let mut registry = TrackRegistry::new(config.tracker, config.tracks)?;
//!
//! let frame = BTreeMap::from([(1, LandmarkSet::from_tuples(&[(10.0, 10.0); 68])?)]);
//! let smoothed = registry.update(&frame)?;
//! # let _ = smoothed;
//! # Ok(())
//! # }
//! ```

/// Constants used throughout the tracker
pub mod constants;

/// Configuration management
pub mod config;

/// Error types and result handling
pub mod error;

/// Landmark smoothing filters, including the Kalman tracker
pub mod filters;

/// Plain-text landmark frame streams
pub mod frames;

/// The 68-point landmark set
pub mod landmarks;

/// Dense linear algebra helpers
pub mod linalg;

/// Per-face tracker registry
pub mod tracks;

pub use error::{Error, Result};
pub use filters::kalman::{LandmarkTracker, TrackerPhase};
pub use landmarks::{LandmarkRegion, LandmarkSet};
