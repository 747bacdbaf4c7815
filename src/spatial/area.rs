use std::collections::HashMap;

use crate::foundation::error::{TextureError, TextureResult};
use crate::spatial::point::Point;

/// A horizontal run of pixels `[start, start + width)` within one row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Segment {
    start: i32,
    width: u32,
}

impl Segment {
    fn end_exclusive(self) -> i64 {
        i64::from(self.start) + i64::from(self.width)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Row {
    y: i32,
    // Sorted by `start`, non-overlapping and non-adjacent after a build pass.
    segments: Vec<Segment>,
}

/// Inclusive bounding box of an [`Area`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AreaBounds {
    /// Smallest x coordinate.
    pub min_x: i32,
    /// Smallest y coordinate.
    pub min_y: i32,
    /// Largest x coordinate.
    pub max_x: i32,
    /// Largest y coordinate.
    pub max_y: i32,
}

/// Immutable, unordered set of points stored as run-length rows.
///
/// Iteration order is unspecified but stable for one instance. Build one with
/// [`Area::rect`], [`AreaBuilder`], or by collecting points.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Area {
    rows: Vec<Row>,
    size: u64,
}

impl Area {
    /// Empty area.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rectangle with its top-left corner at `(x, y)`.
    ///
    /// Fails with a dimension error for negative sizes and with an overflow error when the far
    /// edge would not fit in an `i32`.
    pub fn rect(x: i32, y: i32, width: i32, height: i32) -> TextureResult<Self> {
        if width < 0 || height < 0 {
            return Err(TextureError::dimension(format!(
                "area width and height must be non-negative, got {width}x{height}"
            )));
        }
        if x.checked_add(width).is_none() {
            return Err(TextureError::overflow(format!(
                "area x + width overflows: {x} + {width}"
            )));
        }
        if y.checked_add(height).is_none() {
            return Err(TextureError::overflow(format!(
                "area y + height overflows: {y} + {height}"
            )));
        }
        if width == 0 || height == 0 {
            return Ok(Self::empty());
        }

        let segment = Segment {
            start: x,
            width: width as u32,
        };
        let rows = (y..y + height)
            .map(|row_y| Row {
                y: row_y,
                segments: vec![segment],
            })
            .collect();
        Ok(Self {
            rows,
            size: u64::from(width as u32) * u64::from(height as u32),
        })
    }

    /// Start building an area point by point.
    pub fn builder() -> AreaBuilder {
        AreaBuilder::default()
    }

    /// Number of points.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Return `true` when the area holds no points.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of non-empty rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Return `true` when `(x, y)` belongs to the area.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let Ok(ri) = self.rows.binary_search_by_key(&y, |r| r.y) else {
            return false;
        };
        let segments = &self.rows[ri].segments;
        // Last segment starting at or before x.
        let idx = segments.partition_point(|s| s.start <= x);
        idx > 0 && i64::from(x) < segments[idx - 1].end_exclusive()
    }

    /// Inclusive bounding box, or `None` for an empty area.
    pub fn bounds(&self) -> Option<AreaBounds> {
        let first = self.rows.first()?;
        let last = self.rows.last()?;
        let mut min_x = i32::MAX;
        let mut max_x = i32::MIN;
        for row in &self.rows {
            if let (Some(a), Some(b)) = (row.segments.first(), row.segments.last()) {
                min_x = min_x.min(a.start);
                max_x = max_x.max((b.end_exclusive() - 1) as i32);
            }
        }
        Some(AreaBounds {
            min_x,
            min_y: first.y,
            max_x,
            max_y: last.y,
        })
    }

    /// Iterate every point. Calling `iter` again restarts from the first point.
    pub fn iter(&self) -> AreaIter<'_> {
        AreaIter {
            rows: &self.rows,
            row: 0,
            segment: 0,
            offset: 0,
            remaining: self.size,
        }
    }

    /// Partition the area into pieces of `size_hint` points each (the final piece may be
    /// smaller).
    ///
    /// Rows and segments are walked in a deterministic order and segments longer than the space
    /// left in the current piece are cut, so the result holds exactly
    /// `ceil(size / size_hint)` areas. Every input point appears in exactly one output area.
    pub fn split(&self, size_hint: i32) -> TextureResult<Vec<Area>> {
        if size_hint < 0 {
            return Err(TextureError::dimension(format!(
                "split size hint must be non-negative, got {size_hint}"
            )));
        }
        if size_hint == 0 {
            return Err(TextureError::dimension(
                "split size hint must be greater than zero",
            ));
        }

        let hint = size_hint as u64;
        let mut out = Vec::with_capacity(self.size.div_ceil(hint).min(1 << 16) as usize);
        let mut bucket = SplitBucket::default();

        for row in &self.rows {
            for &segment in &row.segments {
                let mut start = i64::from(segment.start);
                let mut left = u64::from(segment.width);
                while left > 0 {
                    let take = left.min(hint - bucket.size);
                    bucket.push(row.y, start as i32, take as u32);
                    start += take as i64;
                    left -= take;
                    if bucket.size == hint {
                        out.push(std::mem::take(&mut bucket).seal());
                    }
                }
            }
        }
        if bucket.size > 0 {
            out.push(bucket.seal());
        }

        Ok(out)
    }
}

#[derive(Default)]
struct SplitBucket {
    rows: Vec<Row>,
    size: u64,
}

impl SplitBucket {
    fn push(&mut self, y: i32, start: i32, width: u32) {
        let segment = Segment { start, width };
        match self.rows.last_mut() {
            Some(row) if row.y == y => row.segments.push(segment),
            _ => self.rows.push(Row {
                y,
                segments: vec![segment],
            }),
        }
        self.size += u64::from(width);
    }

    fn seal(self) -> Area {
        Area {
            rows: self.rows,
            size: self.size,
        }
    }
}

impl<'a> IntoIterator for &'a Area {
    type Item = Point;
    type IntoIter = AreaIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Point> for Area {
    fn from_iter<T: IntoIterator<Item = Point>>(iter: T) -> Self {
        let mut builder = AreaBuilder::default();
        for p in iter {
            builder.add_point(p);
        }
        builder.build()
    }
}

/// Lazy point iterator over an [`Area`]; expands one segment at a time.
#[derive(Clone, Debug)]
pub struct AreaIter<'a> {
    rows: &'a [Row],
    row: usize,
    segment: usize,
    offset: u32,
    remaining: u64,
}

impl Iterator for AreaIter<'_> {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        loop {
            let row = self.rows.get(self.row)?;
            let Some(segment) = row.segments.get(self.segment) else {
                self.row += 1;
                self.segment = 0;
                self.offset = 0;
                continue;
            };
            if self.offset >= segment.width {
                self.segment += 1;
                self.offset = 0;
                continue;
            }
            let x = (i64::from(segment.start) + i64::from(self.offset)) as i32;
            self.offset += 1;
            self.remaining = self.remaining.saturating_sub(1);
            return Some(Point::new(x, row.y));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (n, Some(n))
    }
}

/// Mutable accumulator for [`Area`]s of arbitrary shape.
///
/// Duplicate points are tolerated and dropped by [`AreaBuilder::build`].
#[derive(Clone, Debug, Default)]
pub struct AreaBuilder {
    rows: HashMap<i32, Vec<i32>>,
}

impl AreaBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one pixel.
    pub fn add_pixel(&mut self, x: i32, y: i32) -> &mut Self {
        self.rows.entry(y).or_default().push(x);
        self
    }

    /// Record one point.
    pub fn add_point(&mut self, p: Point) -> &mut Self {
        self.add_pixel(p.x(), p.y())
    }

    /// Sort each row, merge consecutive x coordinates into segments and freeze the result.
    pub fn build(self) -> Area {
        let mut rows = Vec::with_capacity(self.rows.len());
        let mut size = 0u64;

        for (y, mut xs) in self.rows {
            xs.sort_unstable();
            xs.dedup();

            let mut segments = Vec::<Segment>::new();
            for x in xs {
                match segments.last_mut() {
                    Some(last) if last.end_exclusive() == i64::from(x) => last.width += 1,
                    _ => segments.push(Segment { start: x, width: 1 }),
                }
            }
            size += segments.iter().map(|s| u64::from(s.width)).sum::<u64>();
            rows.push(Row { y, segments });
        }
        rows.sort_unstable_by_key(|r| r.y);

        Area { rows, size }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/spatial/area.rs"]
mod tests;
