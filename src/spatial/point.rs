/// A 2D integer coordinate packed into one 64-bit key.
///
/// `x` occupies the high 32 bits and `y` the low 32 bits, so packed points order by row-major
/// `(x, y)` and can be used directly as map keys.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point(i64);

impl Point {
    /// Create a point from signed coordinates.
    pub const fn new(x: i32, y: i32) -> Self {
        Self(Self::pack(x, y))
    }

    /// Pack two signed coordinates into one value.
    pub const fn pack(x: i32, y: i32) -> i64 {
        ((x as i64) << 32) | (y as u32 as i64)
    }

    /// Inverse of [`Point::pack`].
    pub const fn unpack(packed: i64) -> (i32, i32) {
        ((packed >> 32) as i32, packed as i32)
    }

    /// Reinterpret an already packed value.
    pub const fn from_packed(packed: i64) -> Self {
        Self(packed)
    }

    /// Packed representation.
    pub const fn packed(self) -> i64 {
        self.0
    }

    /// Horizontal coordinate.
    pub const fn x(self) -> i32 {
        (self.0 >> 32) as i32
    }

    /// Vertical coordinate.
    pub const fn y(self) -> i32 {
        self.0 as i32
    }
}

impl std::fmt::Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Point({}, {})", self.x(), self.y())
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl From<Point> for (i32, i32) {
    fn from(p: Point) -> Self {
        (p.x(), p.y())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/spatial/point.rs"]
mod tests;
