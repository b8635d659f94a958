//! The 68-point landmark set exchanged with the upstream detector and the
//! downstream consumers.

use crate::{
    constants::{MEASUREMENT_DIM, NUM_FACIAL_LANDMARKS},
    Error, Result,
};
use nalgebra::Point2;
use std::ops::{Index, Range};

/// Anatomical groups of the iBUG 68-point annotation
///
/// Ref: <https://ibug.doc.ic.ac.uk/resources/facial-point-annotations/>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LandmarkRegion {
    /// Jaw line: 0-16
    Jaw,
    /// Right eyebrow: 17-21
    RightEyebrow,
    /// Left eyebrow: 22-26
    LeftEyebrow,
    /// Nose bridge: 27-30
    NoseBridge,
    /// Lower nose: 31-35
    LowerNose,
    /// Right eye: 36-41
    RightEye,
    /// Left eye: 42-47
    LeftEye,
    /// Outer lip: 48-59
    OuterLip,
    /// Inner lip: 60-67
    InnerLip,
}

impl LandmarkRegion {
    /// Every region, in index order
    pub const ALL: [Self; 9] = [
        Self::Jaw,
        Self::RightEyebrow,
        Self::LeftEyebrow,
        Self::NoseBridge,
        Self::LowerNose,
        Self::RightEye,
        Self::LeftEye,
        Self::OuterLip,
        Self::InnerLip,
    ];

    /// Landmark indices covered by this region
    #[must_use]
    pub const fn range(self) -> Range<usize> {
        match self {
            Self::Jaw => 0..17,
            Self::RightEyebrow => 17..22,
            Self::LeftEyebrow => 22..27,
            Self::NoseBridge => 27..31,
            Self::LowerNose => 31..36,
            Self::RightEye => 36..42,
            Self::LeftEye => 42..48,
            Self::OuterLip => 48..60,
            Self::InnerLip => 60..68,
        }
    }
}

/// Exactly 68 two-dimensional landmark positions in detector order
///
/// Index `i` always names the same anatomical point. The set is never
/// reordered internally.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    points: Vec<Point2<f64>>,
}

impl LandmarkSet {
    /// Create a landmark set from detector points
    ///
    /// # Errors
    ///
    /// Returns an error if the number of points is not 68
    pub fn new(points: Vec<Point2<f64>>) -> Result<Self> {
        if points.len() != NUM_FACIAL_LANDMARKS {
            return Err(Error::InvalidInput(format!(
                "Expected {NUM_FACIAL_LANDMARKS} landmarks, got {}",
                points.len()
            )));
        }
        Ok(Self { points })
    }

    /// Create a landmark set from `(x, y)` tuples
    ///
    /// # Errors
    ///
    /// Returns an error if the number of points is not 68
    pub fn from_tuples(points: &[(f64, f64)]) -> Result<Self> {
        Self::new(points.iter().map(|&(x, y)| Point2::new(x, y)).collect())
    }

    /// Create a landmark set from interleaved coordinates `x0 y0 x1 y1 ...`
    ///
    /// # Errors
    ///
    /// Returns an error if the slice does not hold exactly 136 values
    pub fn from_interleaved(values: &[f64]) -> Result<Self> {
        if values.len() != MEASUREMENT_DIM {
            return Err(Error::InvalidInput(format!(
                "Expected {MEASUREMENT_DIM} coordinates, got {}",
                values.len()
            )));
        }
        Ok(Self::from_position_block(values))
    }

    /// All landmarks at the origin
    #[must_use]
    pub fn zeros() -> Self {
        Self {
            points: vec![Point2::origin(); NUM_FACIAL_LANDMARKS],
        }
    }

    // Callers guarantee `values.len() == MEASUREMENT_DIM`.
    pub(crate) fn from_position_block(values: &[f64]) -> Self {
        debug_assert_eq!(values.len(), MEASUREMENT_DIM);
        Self {
            points: values
                .chunks_exact(2)
                .map(|xy| Point2::new(xy[0], xy[1]))
                .collect(),
        }
    }

    /// Interleave the coordinates as `x0 y0 x1 y1 ...`
    #[must_use]
    pub fn to_interleaved(&self) -> Vec<f64> {
        self.points.iter().flat_map(|p| [p.x, p.y]).collect()
    }

    /// Landmark positions in detector order
    #[must_use]
    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    /// Landmark at `index`, if it exists
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Point2<f64>> {
        self.points.get(index)
    }

    /// Iterate over the landmarks in detector order
    pub fn iter(&self) -> impl Iterator<Item = &Point2<f64>> {
        self.points.iter()
    }

    /// Number of landmarks, always 68
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; a set holds exactly 68 landmarks
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Landmarks of one anatomical region, in detector order
    #[must_use]
    pub fn region(&self, region: LandmarkRegion) -> &[Point2<f64>] {
        &self.points[region.range()]
    }

    /// Mean position of all landmarks
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // 68 is exactly representable
    pub fn centroid(&self) -> Point2<f64> {
        let n = self.points.len() as f64;
        let (sx, sy) = self.points.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point2::new(sx / n, sy / n)
    }

    /// True when every coordinate is finite
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.points.iter().all(|p| p.x.is_finite() && p.y.is_finite())
    }

    /// Index of the first landmark with a non-finite coordinate
    #[must_use]
    pub fn first_non_finite(&self) -> Option<usize> {
        self.points.iter().position(|p| !(p.x.is_finite() && p.y.is_finite()))
    }
}

impl Index<usize> for LandmarkSet {
    type Output = Point2<f64>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl TryFrom<Vec<Point2<f64>>> for LandmarkSet {
    type Error = Error;

    fn try_from(points: Vec<Point2<f64>>) -> Result<Self> {
        Self::new(points)
    }
}
