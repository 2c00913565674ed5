//! Contour is a sequence of points. This is what a line graph is built from.
//!
//! Contours can be:
//! * **open** - the first and the last points of the contour are not connected. A road or a pipe segment is an
//!   open contour.
//! * **closed** - the first and the last points of the contour are connected by an implicit closing segment. A
//!   roundabout or a ring main is a closed contour.
//!
//! # Contour vs OGC LineString
//!
//! In the OGC Simple Feature Access standard the corresponding geometry type is a `LineString`, which is considered
//! closed when its first and last points are exactly the same. A `Contour` should not duplicate the first point at
//! the end. Instead, [`Contour::iter_points_closing`] repeats the first point for closed contours, which gives the
//! closing segment.

/// Sequence of points. See module level documentation for details.
pub trait Contour {
    /// Type of the points the contour is consisted of.
    type Point;

    /// Whether the contour is closed.
    fn is_closed(&self) -> bool;

    /// Iterate over the points of the contour.
    ///
    /// The last point is not repeated for closed contours. Use [`Contour::iter_points_closing`] to get the first point
    /// again at the end.
    fn iter_points(&self) -> impl Iterator<Item = &'_ Self::Point>;

    /// Same as [`Contour::iter_points`] but for closed contours repeats the first point again at the end of the iterator.
    fn iter_points_closing(&self) -> impl Iterator<Item = &Self::Point> {
        ContourPointsIterator::new(self.iter_points(), self.is_closed())
    }
}

/// A contour that is always closed.
pub trait ClosedContour {
    /// Type of the points the contour is consisted of.
    type Point;

    /// Iterate over the points of the contour, without repeating the first one.
    fn iter_points(&self) -> impl Iterator<Item = &'_ Self::Point>;
}

impl<P, T: ClosedContour<Point = P>> Contour for T {
    type Point = P;

    fn is_closed(&self) -> bool {
        true
    }

    fn iter_points(&self) -> impl Iterator<Item = &'_ Self::Point> {
        ClosedContour::iter_points(self)
    }
}

/// Iterator of contour points.
#[derive(Debug, Clone)]
pub struct ContourPointsIterator<'a, P, Iter>
where
    Iter: Iterator<Item = &'a P>,
{
    points_iter: Iter,
    is_closed: bool,
    first_point: Option<&'a P>,
    yielded: usize,
}

impl<'a, P: 'a, Iter> ContourPointsIterator<'a, P, Iter>
where
    Iter: Iterator<Item = &'a P>,
{
    fn new(points_iter: Iter, is_closed: bool) -> Self {
        Self {
            points_iter,
            is_closed,
            first_point: None,
            yielded: 0,
        }
    }
}

impl<'a, P, Iter> Iterator for ContourPointsIterator<'a, P, Iter>
where
    Iter: Iterator<Item = &'a P>,
{
    type Item = &'a P;

    fn next(&mut self) -> Option<Self::Item> {
        match self.points_iter.next() {
            Some(point) => {
                if self.is_closed && self.first_point.is_none() {
                    self.first_point = Some(point);
                }
                self.yielded += 1;
                Some(point)
            }
            // A single point contour has no closing segment.
            None if self.yielded > 1 => self.first_point.take(),
            None => None,
        }
    }
}
