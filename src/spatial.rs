/// Run-length encoded point sets.
pub mod area;
/// Packed 2D integer points.
pub mod point;
