use std::ops::{Deref, DerefMut};

use crate::error::AllocError;
use crate::math::Point;

/// A growable, contiguous sequence of points forming one polygon boundary.
///
/// Whether the boundary is open or closed is decided when it is handed to
/// an engine, not stored here. Every growing operation reserves first so
/// allocation failure surfaces as [`AllocError`] instead of aborting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    points: Vec<Point>,
}

impl Path {
    /// Creates an empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a path of `len` points at the origin.
    ///
    /// # Errors
    ///
    /// Returns `AllocError::Exhausted` if the storage cannot be reserved.
    pub fn with_len(len: usize) -> Result<Self, AllocError> {
        let mut path = Self::new();
        path.resize(len)?;
        Ok(path)
    }

    /// Appends a point, growing the storage if needed.
    ///
    /// # Errors
    ///
    /// Returns `AllocError::Exhausted` if the storage cannot grow.
    pub fn try_push(&mut self, point: Point) -> Result<(), AllocError> {
        self.points
            .try_reserve(1)
            .map_err(AllocError::exhausted(1))?;
        self.points.push(point);
        Ok(())
    }

    /// Grows with origin points or truncates to exactly `len` points.
    ///
    /// # Errors
    ///
    /// Returns `AllocError::Exhausted` if the storage cannot grow.
    pub fn resize(&mut self, len: usize) -> Result<(), AllocError> {
        let additional = len.saturating_sub(self.points.len());
        self.points
            .try_reserve(additional)
            .map_err(AllocError::exhausted(additional))?;
        self.points.resize(len, Point::default());
        Ok(())
    }

    /// Base pointer of the current storage. Dangling but non-null when empty.
    pub fn as_mut_ptr(&mut self) -> *mut Point {
        self.points.as_mut_ptr()
    }
}

impl From<Vec<Point>> for Path {
    fn from(points: Vec<Point>) -> Self {
        Self { points }
    }
}

impl Deref for Path {
    type Target = [Point];

    fn deref(&self) -> &[Point] {
        &self.points
    }
}

impl DerefMut for Path {
    fn deref_mut(&mut self) -> &mut [Point] {
        &mut self.points
    }
}

/// Copies `points` without consecutive repeats.
///
/// For closed paths the closing repeat (last equal to first) is dropped too.
#[must_use]
pub fn strip_duplicates(points: &[Point], closed: bool) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        if out.last() != Some(&p) {
            out.push(p);
        }
    }
    if closed {
        while out.len() > 1 && out.first() == out.last() {
            out.pop();
        }
    }
    out
}
