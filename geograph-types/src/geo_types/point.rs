use geo_types::CoordNum;
use nalgebra::Scalar;
use num_traits::{Bounded, FromPrimitive};

use crate::cartesian::CartesianPoint2d;

impl<T: CoordNum + Bounded + Scalar + FromPrimitive> CartesianPoint2d for geo_types::Point<T> {
    type Num = T;

    fn x(&self) -> Self::Num {
        self.0.x
    }

    fn y(&self) -> Self::Num {
        self.0.y
    }
}
