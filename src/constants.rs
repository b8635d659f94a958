//! Constants used throughout the tracker

/// Number of facial landmarks for full face
pub const NUM_FACIAL_LANDMARKS: usize = 68;

/// Coordinates per landmark (x, y)
pub const POINT_DIMS: usize = 2;

/// Length of the measurement vector (68 points × 2 coordinates)
pub const MEASUREMENT_DIM: usize = NUM_FACIAL_LANDMARKS * POINT_DIMS;

/// Length of the state vector (positions followed by velocities)
pub const STATE_DIM: usize = 2 * MEASUREMENT_DIM;

/// Index of the nose tip in the 68-point layout
pub const NOSE_TIP_INDEX: usize = 30;

/// Default process noise variance (trust in the constant-velocity model)
pub const DEFAULT_PROCESS_NOISE: f64 = 1e-5;

/// Default measurement noise variance (trust in raw detections)
pub const DEFAULT_MEASUREMENT_NOISE: f64 = 1e-1;

/// Default prior variance on every state component
pub const DEFAULT_INITIAL_ERROR_COV: f64 = 1.0;

/// Frames a track may go undetected before the registry drops it
pub const DEFAULT_MAX_MISSED_FRAMES: u32 = 5;
