//! Implementations of the geometry traits for the `geo-types` crate.

mod coord;
mod linestring;
mod multi_linestring;
mod point;
