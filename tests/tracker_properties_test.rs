//! Behavioural properties of the landmark tracker


use face_landmark_tracker::{
    config::{InitPolicy, TrackerConfig},
    constants::{MEASUREMENT_DIM, NUM_FACIAL_LANDMARKS, STATE_DIM},
    LandmarkSet, LandmarkTracker,
};
use test_helpers::{face_template, max_abs_diff, noise_source, noisy, translated, uniform};

/// Predictions match a noiseless constant-velocity path once converged
#[test]
fn test_constant_velocity_exactness() {
    let template = face_template();
    let (vx, vy) = (1.5, -0.75);
    let mut tracker = LandmarkTracker::with_defaults().unwrap();

    for t in 0..30 {
        let t = f64::from(t);
        tracker.step(Some(&translated(&template, vx * t, vy * t))).unwrap();
    }

    let predicted = tracker.predict();
    let truth = translated(&template, vx * 30.0, vy * 30.0);
    let error = max_abs_diff(&predicted, &truth);
    assert!(error < 1e-2, "Prediction error {error} after convergence");

    for velocity in tracker.velocities() {
        assert!((velocity.x - vx).abs() < 1e-2);
        assert!((velocity.y - vy).abs() < 1e-2);
    }
}

/// Position variance shrinks monotonically to a steady state below the measurement noise,
/// and the smoothed output is unbiased and far less jittery than the input
#[test]
fn test_convergence_under_noise() {
    let template = face_template();
    let truth = translated(&template, 0.0, 0.0);
    let config = TrackerConfig::default();
    let mut tracker = LandmarkTracker::new(config).unwrap();
    let mut rng = noise_source(17);

    let mut variances = Vec::new();
    let mut errors = Vec::new();
    let mut raw_errors = Vec::new();
    for frame in 0..50 {
        let detections = noisy(&template, 0.0, 0.0, 0.5, &mut rng);
        tracker.step(Some(&detections)).unwrap();

        variances.push(tracker.position_variance(0).unwrap().0);
        if frame >= 20 {
            let estimate = tracker.estimate();
            for i in 0..NUM_FACIAL_LANDMARKS {
                errors.push(estimate[i].x - truth[i].x);
                errors.push(estimate[i].y - truth[i].y);
                raw_errors.push(detections[i].x - truth[i].x);
                raw_errors.push(detections[i].y - truth[i].y);
            }
        }
    }

    for pair in variances.windows(2) {
        assert!(pair[1] <= pair[0] + 1e-12, "Variance grew from {} to {}", pair[0], pair[1]);
    }
    let steady = *variances.last().unwrap();
    assert!(steady <= config.measurement_noise, "Steady-state variance {steady}");
    assert!(steady < 0.02);

    let mean_sq = |values: &[f64]| values.iter().map(|e| e * e).sum::<f64>() / values.len() as f64;
    let bias = errors.iter().sum::<f64>() / errors.len() as f64;
    assert!(bias.abs() < 0.03, "Smoothed output biased by {bias}");
    let (smoothed, raw) = (mean_sq(&errors), mean_sq(&raw_errors));
    assert!(smoothed < raw / 4.0, "Smoothed error {smoothed} not well below raw error {raw}");
}

/// State and measurement dimensions never change
#[test]
fn test_dimensional_invariants() {
    let mut tracker = LandmarkTracker::with_defaults().unwrap();
    assert_eq!(tracker.state_dim(), STATE_DIM);
    assert_eq!(tracker.measurement_dim(), MEASUREMENT_DIM);
    assert_eq!(STATE_DIM, 272);
    assert_eq!(MEASUREMENT_DIM, 136);

    for t in 0..5 {
        tracker.step(Some(&uniform(f64::from(t), 0.0))).unwrap();
        tracker.step(None).unwrap();
    }
    let _ = tracker.predict();
    assert_eq!(tracker.state_dim(), STATE_DIM);
    assert_eq!(tracker.measurement_dim(), MEASUREMENT_DIM);
    assert_eq!(tracker.estimate().len(), NUM_FACIAL_LANDMARKS);

    // Wrong-length detection sets never reach the tracker
    assert!(LandmarkSet::from_tuples(&[(0.0, 0.0); 67]).is_err());
    assert!(LandmarkSet::from_tuples(&[(0.0, 0.0); 69]).is_err());
    assert!(LandmarkSet::from_interleaved(&[0.0; 272]).is_err());
}

#[test]
fn test_fixed_matrix_structure() {
    let tracker = LandmarkTracker::with_defaults().unwrap();

    let transition = tracker.transition_matrix();
    assert_eq!(transition.shape(), (STATE_DIM, STATE_DIM));
    for i in 0..STATE_DIM {
        assert_eq!(transition[(i, i)], 1.0);
    }
    for i in 0..MEASUREMENT_DIM {
        assert_eq!(transition[(i, i + MEASUREMENT_DIM)], 1.0);
    }
    assert_eq!(transition.sum(), (STATE_DIM + MEASUREMENT_DIM) as f64);

    let measurement = tracker.measurement_matrix();
    assert_eq!(measurement.shape(), (MEASUREMENT_DIM, STATE_DIM));
    for i in 0..MEASUREMENT_DIM {
        assert_eq!(measurement[(i, i)], 1.0);
        for j in MEASUREMENT_DIM..STATE_DIM {
            assert_eq!(measurement[(i, j)], 0.0);
        }
    }
    assert_eq!(measurement.sum(), MEASUREMENT_DIM as f64);
}

/// predict() advances the model on every call
#[test]
fn test_predict_is_not_idempotent() {
    let template = face_template();
    let mut tracker = LandmarkTracker::with_defaults().unwrap();
    for t in 0..5 {
        let t = f64::from(t);
        tracker.step(Some(&translated(&template, 2.0 * t, t))).unwrap();
    }

    let first = tracker.predict();
    let second = tracker.predict();
    assert_ne!(first, second);

    let velocities = tracker.velocities();
    for i in 0..NUM_FACIAL_LANDMARKS {
        assert!((second[i].x - first[i].x - velocities[i].x).abs() < 1e-9);
        assert!((second[i].y - first[i].y - velocities[i].y).abs() < 1e-9);
    }

    // Uncertainty grows with every prediction even for a still face
    let mut still = LandmarkTracker::with_defaults().unwrap();
    still.step(Some(&uniform(1.0, 1.0))).unwrap();
    let before = still.position_variance(5).unwrap().0;
    let _ = still.predict();
    let after_one = still.position_variance(5).unwrap().0;
    let _ = still.predict();
    let after_two = still.position_variance(5).unwrap().0;
    assert!(before < after_one && after_one < after_two);
}

/// Output index i always tracks input index i
#[test]
fn test_order_preservation() {
    let template = face_template();
    let mut tracker = LandmarkTracker::with_defaults().unwrap();
    let mut rng = noise_source(5);

    for frame in 0..20 {
        let input = noisy(&template, f64::from(frame) * 0.5, 0.0, 0.5, &mut rng);
        let output = tracker.step(Some(&input)).unwrap();

        for (i, out) in output.iter().enumerate() {
            let own = (*out - input[i]).norm();
            for (j, other) in input.iter().enumerate() {
                if i != j {
                    assert!(own < (*out - *other).norm(), "Frame {frame}: landmark {i} is closer to input {j}");
                }
            }
        }
    }
}

fn scenario_frame(x: f64, y: f64) -> LandmarkSet {
    let mut points = vec![(0.0, 0.0); NUM_FACIAL_LANDMARKS];
    points[0] = (x, y);
    LandmarkSet::from_tuples(&points).unwrap()
}

/// Two detections of a moving landmark produce a prediction that continues the motion
#[test]
fn test_end_to_end_motion_continuation() {
    let mut tracker = LandmarkTracker::with_defaults().unwrap();

    let _ = tracker.predict();
    tracker.correct(&scenario_frame(100.0, 50.0)).unwrap();
    let _ = tracker.predict();
    tracker.correct(&scenario_frame(102.0, 51.0)).unwrap();

    let third = tracker.predict();
    assert!(third[0].x > 102.0 && third[0].x < 104.0, "x = {}", third[0].x);
    assert!(third[0].y > 51.0 && third[0].y < 52.0, "y = {}", third[0].y);

    // Landmarks that never moved stay put
    for point in third.iter().skip(1) {
        assert_eq!((point.x, point.y), (0.0, 0.0));
    }
}

/// Same scenario when the state starts at the origin instead of the first detection
#[test]
fn test_end_to_end_from_zero_state() {
    let config = TrackerConfig {
        initialization: InitPolicy::Zero,
        ..TrackerConfig::default()
    };
    let mut tracker = LandmarkTracker::new(config).unwrap();

    let start = tracker.predict();
    assert_eq!(start, LandmarkSet::zeros());
    tracker.correct(&scenario_frame(100.0, 50.0)).unwrap();
    let _ = tracker.predict();
    tracker.correct(&scenario_frame(102.0, 51.0)).unwrap();

    let third = tracker.predict();
    assert!(third[0].x > 102.0, "x = {}", third[0].x);
    assert!(third[0].y > 51.0, "y = {}", third[0].y);
    // Motion continues along the observed direction
    assert!((third[0].x - 2.0 * third[0].y).abs() < 1e-6);
    assert_eq!((third[1].x, third[1].y), (0.0, 0.0));
}
