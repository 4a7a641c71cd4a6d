pub mod polygon_2d;

use crate::error::GeometryError;

/// 2D vertex with integer coordinates.
///
/// Laid out as two consecutive `int64_t` values so hosts can read and write
/// path storage directly.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Direction between two points, widened so products never overflow.
pub type Vector = (i128, i128);

/// Largest coordinate magnitude the engines accept.
///
/// Stays below the engine's own `2^62` limit so offset outlines have room
/// to grow.
pub const MAX_COORD: i64 = (1 << 60) - 1;

/// Checks that a point lies inside the supported coordinate range.
///
/// # Errors
///
/// Returns `GeometryError::CoordinateOutOfRange` for any coordinate beyond
/// [`MAX_COORD`].
pub fn check_range(p: Point) -> Result<(), GeometryError> {
    let max = MAX_COORD.unsigned_abs();
    if p.x.unsigned_abs() > max || p.y.unsigned_abs() > max {
        return Err(GeometryError::CoordinateOutOfRange {
            x: p.x,
            y: p.y,
            max: MAX_COORD,
        });
    }
    Ok(())
}

/// Vector from `from` to `to`.
#[must_use]
pub fn vector(from: Point, to: Point) -> Vector {
    (
        i128::from(to.x) - i128::from(from.x),
        i128::from(to.y) - i128::from(from.y),
    )
}

/// Cross product `u x v`.
#[must_use]
pub fn cross_vec(u: Vector, v: Vector) -> i128 {
    u.0 * v.1 - u.1 * v.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_sign_follows_turn_direction() {
        let o = Point::new(0, 0);
        let ccw = cross_vec(vector(o, Point::new(1, 0)), vector(o, Point::new(0, 1)));
        let collinear = cross_vec(vector(o, Point::new(1, 1)), vector(o, Point::new(2, 2)));
        assert!(ccw > 0);
        assert_eq!(collinear, 0);
    }

    #[test]
    fn cross_at_range_limit_does_not_overflow() {
        let o = Point::new(-MAX_COORD, -MAX_COORD);
        let u = vector(o, Point::new(MAX_COORD, -MAX_COORD));
        let v = vector(o, Point::new(MAX_COORD, MAX_COORD));
        assert!(cross_vec(u, v) > 0);
    }

    #[test]
    fn range_check_rejects_large_coordinates() {
        assert!(check_range(Point::new(MAX_COORD, -MAX_COORD)).is_ok());
        assert!(check_range(Point::new(MAX_COORD + 1, 0)).is_err());
        assert!(check_range(Point::new(0, i64::MIN)).is_err());
    }
}
