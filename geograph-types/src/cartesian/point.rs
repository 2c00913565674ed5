use nalgebra::{Scalar, Vector2};
use num_traits::{Bounded, Float, FromPrimitive, Num, ToPrimitive};

use crate::error::GeographTypesError;

pub use nalgebra::Point2;

/// 2d point with `f64` coordinates. This is the coordinate type graph nodes are stored with.
pub type Point2d = Point2<f64>;

/// A point in 2d cartesian coordinate space.
pub trait CartesianPoint2d {
    /// Numeric type of the coordinates.
    type Num: Num + Copy + PartialOrd + Bounded + Scalar + FromPrimitive + ToPrimitive;

    /// X coordinate.
    fn x(&self) -> Self::Num;
    /// Y coordinate.
    fn y(&self) -> Self::Num;

    /// Vector from `other` to `self`.
    fn sub(&self, other: &impl CartesianPoint2d<Num = Self::Num>) -> Vector2<Self::Num> {
        Vector2::new(self.x() - other.x(), self.y() - other.y())
    }

    /// Squared euclidean distance between two points.
    fn distance_sq(&self, other: &impl CartesianPoint2d<Num = Self::Num>) -> Self::Num {
        let v = self.sub(other);
        v.x * v.x + v.y * v.y
    }
}

/// Operations available for points with floating point coordinates.
pub trait CartesianPoint2dFloat<N: Float = f64>: CartesianPoint2d<Num = N> {
    /// Returns false if any of the coordinates is NaN or infinite.
    fn is_finite(&self) -> bool {
        self.x().is_finite() && self.y().is_finite()
    }

    /// Same as [`CartesianPoint2dFloat::is_finite`], but reports the offending coordinate as an error.
    fn ensure_finite(&self) -> Result<(), GeographTypesError> {
        if self.is_finite() {
            Ok(())
        } else {
            Err(GeographTypesError::NonFinite {
                x: self.x().to_f64().unwrap_or(f64::NAN),
                y: self.y().to_f64().unwrap_or(f64::NAN),
            })
        }
    }
}

impl<N: Float, T: CartesianPoint2d<Num = N>> CartesianPoint2dFloat<N> for T {}

impl<N> CartesianPoint2d for Point2<N>
where
    N: Num + Copy + PartialOrd + Bounded + Scalar + FromPrimitive + ToPrimitive,
{
    type Num = N;

    fn x(&self) -> N {
        self.x
    }
    fn y(&self) -> N {
        self.y
    }
}
