use super::LandmarkFilter;
use crate::{
    config::{InitPolicy, OutputPolicy, TrackerConfig},
    constants::{MEASUREMENT_DIM, NUM_FACIAL_LANDMARKS, STATE_DIM},
    landmarks::LandmarkSet,
    linalg::{self, Matrix, Vector},
    Error, Result,
};
use log::{debug, trace, warn};
use nalgebra::Vector2;

/// Lifecycle of a [`LandmarkTracker`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerPhase {
    /// No detection fused yet; the state still holds its prior
    Uninitialized,
    /// At least one detection has been fused
    Tracking,
    /// A correction failed numerically; corrections are refused until reset
    Diverged,
}

/// Constant-velocity Kalman tracker for 68 facial landmarks
///
/// The state holds the 136 interleaved positions followed by their 136
/// per-frame velocities, so `state[k + 136]` is the velocity of `state[k]`.
#[derive(Debug, Clone)]
pub struct LandmarkTracker {
    config: TrackerConfig,
    state: Vector,
    error_cov: Matrix,
    // Fixed after construction
    transition: Matrix,
    measurement_matrix: Matrix,
    process_noise: Matrix,
    measurement_noise: Matrix,
    identity: Matrix,
    phase: TrackerPhase,
    frames: u64,
}

impl LandmarkTracker {
    /// Create a tracker with the given noise configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the noise parameters are invalid or
    /// the resulting innovation covariance cannot be inverted
    pub fn new(config: TrackerConfig) -> Result<Self> {
        config.validate()?;

        let tracker = Self {
            config,
            state: Vector::zeros(STATE_DIM),
            error_cov: linalg::scaled_identity(STATE_DIM, config.initial_error_cov),
            transition: linalg::constant_velocity_transition(MEASUREMENT_DIM),
            measurement_matrix: linalg::position_observation(MEASUREMENT_DIM),
            process_noise: linalg::scaled_identity(STATE_DIM, config.process_noise),
            measurement_noise: linalg::scaled_identity(MEASUREMENT_DIM, config.measurement_noise),
            identity: Matrix::identity(STATE_DIM, STATE_DIM),
            phase: TrackerPhase::Uninitialized,
            frames: 0,
        };

        // Surface a degenerate noise setup now rather than on the first frame
        if linalg::invert(&tracker.innovation_cov()).is_none() {
            return Err(Error::ConfigError(
                "Innovation covariance is singular for the configured noise".to_string(),
            ));
        }

        debug!(
            "Created landmark tracker (q={}, r={}, p0={}, init={:?}, output={:?})",
            config.process_noise,
            config.measurement_noise,
            config.initial_error_cov,
            config.initialization,
            config.output
        );

        Ok(tracker)
    }

    /// Create a tracker with the default noise configuration
    ///
    /// # Errors
    ///
    /// Never fails for the built-in defaults; returns `Result` for API consistency
    pub fn with_defaults() -> Result<Self> {
        Self::new(TrackerConfig::default())
    }

    /// Advance the state one frame with the constant-velocity model
    ///
    /// Returns the predicted landmark positions. Each call advances the
    /// model again, so two calls in a row extrapolate two frames.
    pub fn predict(&mut self) -> LandmarkSet {
        self.state = &self.transition * &self.state;
        self.error_cov = &self.transition * &self.error_cov * self.transition.transpose() + &self.process_noise;

        trace!("Predicted frame {}", self.frames + 1);
        self.estimate()
    }

    /// Fuse one frame of detections into the state
    ///
    /// Detections must be finite; they are rejected without touching the
    /// state otherwise. With [`InitPolicy::FirstDetection`] the first
    /// detection seeds the position directly.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if any coordinate is non-finite
    /// - `TrackerDiverged` if an earlier correction failed and the tracker was not reset
    /// - `NumericalError` if the innovation covariance cannot be inverted or the
    ///   corrected estimate is non-finite; the tracker then enters [`TrackerPhase::Diverged`]
    pub fn correct(&mut self, detections: &LandmarkSet) -> Result<()> {
        self.ensure_not_diverged()?;
        Self::check_detections(detections)?;

        let measurement = Vector::from_vec(detections.to_interleaved());

        if self.phase == TrackerPhase::Uninitialized && self.config.initialization == InitPolicy::FirstDetection {
            self.seed(&measurement);
            return Ok(());
        }

        let measurement_t = self.measurement_matrix.transpose();
        // S stays positive definite in exact arithmetic; this catches overflow
        // in the covariance after long coasting on huge coordinates
        let Some(innovation_inv) = linalg::invert(&self.innovation_cov()) else {
            return Err(self.diverge("innovation covariance is singular"));
        };

        let gain = &self.error_cov * &measurement_t * innovation_inv;
        let innovation = measurement - &self.measurement_matrix * &self.state;
        let state = &self.state + &gain * innovation;
        let error_cov = (&self.identity - &gain * &self.measurement_matrix) * &self.error_cov;

        if !linalg::all_finite(state.as_slice()) || !linalg::all_finite(error_cov.as_slice()) {
            return Err(self.diverge("corrected estimate is not finite"));
        }

        self.state = state;
        self.error_cov = error_cov;
        self.phase = TrackerPhase::Tracking;
        self.frames += 1;

        Ok(())
    }

    /// Run one frame: predict, then correct when a detection is available
    ///
    /// A `None` detection is a predict-only frame (occlusion, failed
    /// detector). The returned set follows the configured [`OutputPolicy`];
    /// on the first fused frame the corrected estimate is returned either way
    /// since there is no meaningful prediction yet.
    ///
    /// A failed step leaves the state exactly as it was before the call.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`LandmarkTracker::correct`]; a diverged
    /// tracker refuses predict-only frames too
    pub fn step(&mut self, detections: Option<&LandmarkSet>) -> Result<LandmarkSet> {
        self.ensure_not_diverged()?;
        let Some(detections) = detections else {
            debug!("No detection for frame, continuing on the motion model");
            return Ok(self.predict());
        };
        Self::check_detections(detections)?;

        let was_tracking = self.phase == TrackerPhase::Tracking;
        let prior = (self.state.clone(), self.error_cov.clone());
        let predicted = self.predict();

        if let Err(e) = self.correct(detections) {
            (self.state, self.error_cov) = prior;
            return Err(e);
        }

        Ok(match self.config.output {
            OutputPolicy::Predicted if was_tracking => predicted,
            _ => self.estimate(),
        })
    }

    /// Current position estimate
    #[must_use]
    pub fn estimate(&self) -> LandmarkSet {
        LandmarkSet::from_position_block(&self.state.as_slice()[..MEASUREMENT_DIM])
    }

    /// Estimated per-frame displacement of every landmark
    #[must_use]
    pub fn velocities(&self) -> Vec<Vector2<f64>> {
        self.state.as_slice()[MEASUREMENT_DIM..]
            .chunks_exact(2)
            .map(|v| Vector2::new(v[0], v[1]))
            .collect()
    }

    /// Variance of the x and y position estimate of one landmark
    #[must_use]
    pub fn position_variance(&self, index: usize) -> Option<(f64, f64)> {
        (index < NUM_FACIAL_LANDMARKS)
            .then(|| (self.error_cov[(2 * index, 2 * index)], self.error_cov[(2 * index + 1, 2 * index + 1)]))
    }

    /// Current lifecycle phase
    #[must_use]
    pub fn phase(&self) -> TrackerPhase {
        self.phase
    }

    /// Number of detections fused so far
    #[must_use]
    pub fn frames_processed(&self) -> u64 {
        self.frames
    }

    /// Configuration the tracker was built with
    #[must_use]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Length of the state vector, always 272
    #[must_use]
    pub fn state_dim(&self) -> usize {
        self.state.len()
    }

    /// Length of the measurement vector, always 136
    #[must_use]
    pub fn measurement_dim(&self) -> usize {
        self.measurement_matrix.nrows()
    }

    /// The fixed state transition matrix
    #[must_use]
    pub fn transition_matrix(&self) -> &Matrix {
        &self.transition
    }

    /// The fixed measurement matrix
    #[must_use]
    pub fn measurement_matrix(&self) -> &Matrix {
        &self.measurement_matrix
    }

    /// Discard the estimate and start over with the same configuration
    pub fn reset(&mut self) {
        self.state.fill(0.0);
        self.error_cov = linalg::scaled_identity(STATE_DIM, self.config.initial_error_cov);
        self.phase = TrackerPhase::Uninitialized;
        self.frames = 0;
        debug!("Landmark tracker reset");
    }

    fn innovation_cov(&self) -> Matrix {
        &self.measurement_matrix * &self.error_cov * self.measurement_matrix.transpose() + &self.measurement_noise
    }

    fn seed(&mut self, measurement: &Vector) {
        self.state.rows_mut(0, MEASUREMENT_DIM).copy_from(measurement);
        self.state.rows_mut(MEASUREMENT_DIM, MEASUREMENT_DIM).fill(0.0);
        self.error_cov = linalg::scaled_identity(STATE_DIM, self.config.initial_error_cov);
        self.phase = TrackerPhase::Tracking;
        self.frames += 1;
        debug!("Seeded tracker from first detection");
    }

    fn ensure_not_diverged(&self) -> Result<()> {
        if self.phase == TrackerPhase::Diverged {
            return Err(Error::TrackerDiverged(
                "reset the tracker before supplying new detections".to_string(),
            ));
        }
        Ok(())
    }

    fn check_detections(detections: &LandmarkSet) -> Result<()> {
        match detections.first_non_finite() {
            Some(index) => Err(Error::InvalidInput(format!(
                "Landmark {index} has a non-finite coordinate"
            ))),
            None => Ok(()),
        }
    }

    fn diverge(&mut self, reason: &str) -> Error {
        warn!("Landmark tracker diverged after {} frames: {reason}", self.frames);
        self.phase = TrackerPhase::Diverged;
        Error::NumericalError(reason.to_string())
    }
}

impl LandmarkFilter for LandmarkTracker {
    fn apply(&mut self, detections: Option<&LandmarkSet>) -> Result<LandmarkSet> {
        self.step(detections)
    }

    fn reset(&mut self) {
        Self::reset(self);
    }

    fn name(&self) -> &str {
        "KalmanTracker"
    }
}
