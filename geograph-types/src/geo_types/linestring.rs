use geo_types::{CoordNum, LineString};

use crate::contour::Contour;

impl<T: CoordNum> Contour for LineString<T> {
    type Point = geo_types::Coord<T>;

    fn is_closed(&self) -> bool {
        LineString::is_closed(self)
    }

    fn iter_points(&self) -> impl Iterator<Item = &'_ Self::Point> {
        // A closed line string repeats its first point at the end, a contour does not.
        if LineString::is_closed(self) {
            self.0[..(self.0.len().max(1) - 1)].iter()
        } else {
            self.0.iter()
        }
    }
}
