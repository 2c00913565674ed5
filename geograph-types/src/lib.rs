//! Geometric primitives used by the `geograph` line graph engine.
//!
//! The engine does not own any geometry representation. Instead it works with anything that implements the traits
//! of this crate:
//!
//! * [`CartesianPoint2d`](cartesian::CartesianPoint2d) for coordinates,
//! * [`Contour`] for line geometries (OGC `LineString`),
//! * [`MultiContour`] for collections of lines.
//!
//! Simple implementations are provided in the [`impls`] module and for [`nalgebra::Point2`]. With the `geo-types`
//! feature (enabled by default) the traits are also implemented for the corresponding `geo-types` structs, so
//! geometries read by the georust ecosystem can be fed into a graph builder directly.

pub mod cartesian;
pub mod contour;
pub mod error;
pub mod impls;
pub mod multi_contour;

#[cfg(feature = "geo-types")]
mod geo_types;

pub use contour::{ClosedContour, Contour};
pub use multi_contour::MultiContour;
