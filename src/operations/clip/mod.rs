use tracing::debug;

use super::engine;
use crate::error::{ArgumentError, GeometryError, Result};
use crate::geometry::{strip_duplicates, Path, PathCollection};
use crate::math::polygon_2d::rotate_to_canonical_start;
use crate::math::{check_range, Point};

bitflags::bitflags! {
    /// Options fixed when a clip engine is created.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ClipOptions: u32 {
        /// Closed results come out with holes counter-clockwise and outers clockwise.
        const REVERSE_SOLUTION = 0b001;
        /// Requests results that never touch themselves at a vertex.
        /// Recorded only; the engine's flat interface always runs with it off.
        const STRICTLY_SIMPLE = 0b010;
        /// Requests that collinear vertices be kept.
        /// Recorded only; the engine's flat interface always runs with it off.
        const PRESERVE_COLLINEAR = 0b100;
    }
}

impl ClipOptions {
    /// Parses a raw bit set received from a host.
    ///
    /// # Errors
    ///
    /// Returns `ArgumentError::UnknownOptions` naming the unrecognized bits.
    pub fn from_raw(bits: u32) -> std::result::Result<Self, ArgumentError> {
        Self::from_bits(bits).ok_or(ArgumentError::UnknownOptions(
            bits & !Self::all().bits(),
        ))
    }
}

/// Role of a path in a clip operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolyType {
    Subject,
    Clip,
}

/// Boolean set operation applied by [`Clipper::execute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipType {
    Intersection,
    Union,
    Difference,
    Xor,
}

/// Interpretation of winding numbers as inside/outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FillRule {
    EvenOdd,
    NonZero,
    Positive,
    Negative,
}

macro_rules! enum_from_raw {
    ($ty:ident, $name:literal, { $($value:literal => $variant:ident),+ $(,)? }) => {
        impl TryFrom<i32> for $ty {
            type Error = ArgumentError;

            fn try_from(value: i32) -> std::result::Result<Self, ArgumentError> {
                match value {
                    $($value => Ok(Self::$variant),)+
                    _ => Err(ArgumentError::InvalidEnum { kind: $name, value }),
                }
            }
        }
    };
}

enum_from_raw!(PolyType, "poly type", { 0 => Subject, 1 => Clip });
enum_from_raw!(ClipType, "clip type", {
    0 => Intersection,
    1 => Union,
    2 => Difference,
    3 => Xor,
});
enum_from_raw!(FillRule, "fill rule", {
    0 => EvenOdd,
    1 => NonZero,
    2 => Positive,
    3 => Negative,
});

/// A registered input path, copied at registration.
#[derive(Debug, Clone)]
struct ClipInput {
    points: Vec<Point>,
    role: PolyType,
    closed: bool,
}

/// Result of a clip operation, split by open and closed output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipSolution {
    pub open: PathCollection,
    pub closed: PathCollection,
}

/// Boolean clip engine.
///
/// Accumulates subject and clip paths, then computes a set operation over
/// them. Registered geometry is copied, so callers keep ownership of the
/// paths they pass in. Execution does not modify the registrations and can
/// be repeated.
#[derive(Debug, Clone, Default)]
pub struct Clipper {
    options: ClipOptions,
    inputs: Vec<ClipInput>,
}

impl Clipper {
    #[must_use]
    pub fn new(options: ClipOptions) -> Self {
        Self {
            options,
            inputs: Vec::new(),
        }
    }

    #[must_use]
    pub fn options(&self) -> ClipOptions {
        self.options
    }

    /// Registers one path.
    ///
    /// Returns `Ok(false)` when the path is degenerate once repeated
    /// vertices are removed (fewer than three points for a closed path,
    /// fewer than two for an open one) and was skipped.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::OpenClipPath` for an open path in the clip
    /// role and `GeometryError::CoordinateOutOfRange` for coordinates the
    /// engine cannot represent exactly.
    pub fn add_path(&mut self, path: &[Point], role: PolyType, closed: bool) -> Result<bool> {
        validate(path, role, closed)?;
        Ok(self.push_input(path, role, closed))
    }

    /// Registers every path in `paths`, in order.
    ///
    /// Either every path is validated and registered or none is. Returns
    /// `Ok(true)` if at least one path was non-degenerate.
    ///
    /// # Errors
    ///
    /// Same as [`Clipper::add_path`], for the first offending path.
    pub fn add_paths(&mut self, paths: &[Path], role: PolyType, closed: bool) -> Result<bool> {
        for path in paths {
            validate(path, role, closed)?;
        }
        let mut added = false;
        for path in paths {
            added |= self.push_input(path, role, closed);
        }
        Ok(added)
    }

    /// Drops every registration. Options are kept.
    pub fn clear(&mut self) {
        self.inputs.clear();
    }

    fn push_input(&mut self, path: &[Point], role: PolyType, closed: bool) -> bool {
        let points = strip_duplicates(path, closed);
        let min_len = if closed { 3 } else { 2 };
        if points.len() < min_len {
            return false;
        }
        self.inputs.push(ClipInput {
            points,
            role,
            closed,
        });
        true
    }

    /// Computes `op` over the registered paths.
    ///
    /// Closed results come out as the engine nests them: each outer
    /// boundary followed by its holes. Every ring starts at its smallest
    /// vertex (least `x`, then least `y`). With no subject paths the
    /// solution is empty.
    ///
    /// # Errors
    ///
    /// Returns an `EngineError` if the registrations exceed the engine's
    /// index range, or `AllocError` if a result collection cannot grow.
    pub fn execute(
        &self,
        op: ClipType,
        subject_fill: FillRule,
        clip_fill: FillRule,
    ) -> Result<ClipSolution> {
        debug!(
            ?op,
            ?subject_fill,
            ?clip_fill,
            inputs = self.inputs.len(),
            "executing clip"
        );

        if !self.inputs.iter().any(|i| i.role == PolyType::Subject) {
            return Ok(ClipSolution::default());
        }

        // Step 1: Run the engine over every registration
        let inputs = self
            .inputs
            .iter()
            .map(|i| (i.points.as_slice(), i.role, i.closed));
        let paths = engine::clip(inputs, op, subject_fill, clip_fill)?;

        // Step 2: Split open and closed output, normalizing ring starts
        let reverse = self.options.contains(ClipOptions::REVERSE_SOLUTION);
        let mut solution = ClipSolution::default();
        for (points, closed) in paths {
            if !closed {
                solution.open.push(Path::from(points))?;
                continue;
            }
            let mut ring = rotate_to_canonical_start(&points);
            if reverse {
                if let Some(tail) = ring.get_mut(1..) {
                    tail.reverse();
                }
            }
            solution.closed.push(Path::from(ring))?;
        }

        debug!(
            open = solution.open.len(),
            closed = solution.closed.len(),
            "clip finished"
        );
        Ok(solution)
    }
}

fn validate(path: &[Point], role: PolyType, closed: bool) -> Result<()> {
    if !closed && role == PolyType::Clip {
        return Err(GeometryError::OpenClipPath.into());
    }
    for &p in path {
        check_range(p)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ClipperError;
    use crate::math::polygon_2d::signed_area;
    use crate::math::MAX_COORD;

    fn square(x0: i64, y0: i64, size: i64) -> Vec<Point> {
        vec![
            Point::new(x0, y0),
            Point::new(x0 + size, y0),
            Point::new(x0 + size, y0 + size),
            Point::new(x0, y0 + size),
        ]
    }

    fn run(subject: &[Point], clip: &[Point], op: ClipType, options: ClipOptions) -> ClipSolution {
        let mut clipper = Clipper::new(options);
        clipper.add_path(subject, PolyType::Subject, true).unwrap();
        clipper.add_path(clip, PolyType::Clip, true).unwrap();
        clipper
            .execute(op, FillRule::NonZero, FillRule::NonZero)
            .unwrap()
    }

    #[test]
    fn overlapping_squares_intersection() {
        let sol = run(
            &square(0, 0, 10),
            &square(5, 5, 10),
            ClipType::Intersection,
            ClipOptions::empty(),
        );
        assert!(sol.open.is_empty());
        assert_eq!(sol.closed.len(), 1);
        assert_eq!(
            &*sol.closed[0],
            &[
                Point::new(5, 5),
                Point::new(10, 5),
                Point::new(10, 10),
                Point::new(5, 10),
            ]
        );
    }

    #[test]
    fn union_of_identical_squares_is_the_square() {
        let sol = run(
            &square(0, 0, 10),
            &square(0, 0, 10),
            ClipType::Union,
            ClipOptions::empty(),
        );
        assert_eq!(sol.closed.len(), 1);
        assert_eq!(&*sol.closed[0], square(0, 0, 10).as_slice());
    }

    #[test]
    fn disjoint_intersection_is_empty() {
        let sol = run(
            &square(0, 0, 10),
            &square(20, 20, 5),
            ClipType::Intersection,
            ClipOptions::empty(),
        );
        assert!(sol.closed.is_empty());
        assert!(sol.open.is_empty());
    }

    #[test]
    fn union_of_overlapping_squares_area() {
        let sol = run(
            &square(0, 0, 10),
            &square(5, 5, 10),
            ClipType::Union,
            ClipOptions::empty(),
        );
        assert_eq!(sol.closed.len(), 1);
        assert_eq!(sol.closed[0].len(), 8);
        approx::assert_relative_eq!(signed_area(&sol.closed[0]), 175.0);
    }

    #[test]
    fn difference_produces_hole_after_outer() {
        let sol = run(
            &square(0, 0, 10),
            &square(3, 3, 4),
            ClipType::Difference,
            ClipOptions::empty(),
        );
        assert_eq!(sol.closed.len(), 2);
        approx::assert_relative_eq!(signed_area(&sol.closed[0]), 100.0);
        approx::assert_relative_eq!(signed_area(&sol.closed[1]), -16.0);
    }

    #[test]
    fn xor_of_overlapping_squares() {
        let sol = run(
            &square(0, 0, 10),
            &square(5, 5, 10),
            ClipType::Xor,
            ClipOptions::empty(),
        );
        let total: f64 = sol.closed.iter().map(|p| signed_area(p)).sum();
        approx::assert_relative_eq!(total, 150.0);
    }

    #[test]
    fn reverse_solution_flips_orientation() {
        let sol = run(
            &square(0, 0, 10),
            &square(5, 5, 10),
            ClipType::Intersection,
            ClipOptions::REVERSE_SOLUTION,
        );
        approx::assert_relative_eq!(signed_area(&sol.closed[0]), -25.0);
    }

    #[test]
    fn reverse_solution_keeps_canonical_start() {
        let sol = run(
            &square(0, 0, 10),
            &square(5, 5, 10),
            ClipType::Intersection,
            ClipOptions::REVERSE_SOLUTION,
        );
        assert_eq!(
            &*sol.closed[0],
            &[
                Point::new(5, 5),
                Point::new(5, 10),
                Point::new(10, 10),
                Point::new(10, 5),
            ]
        );
    }

    #[test]
    fn execute_is_repeatable() {
        let mut clipper = Clipper::new(ClipOptions::empty());
        clipper
            .add_path(&square(0, 0, 10), PolyType::Subject, true)
            .unwrap();
        clipper
            .add_path(&square(5, 5, 10), PolyType::Clip, true)
            .unwrap();
        let first = clipper
            .execute(ClipType::Union, FillRule::NonZero, FillRule::NonZero)
            .unwrap();
        let second = clipper
            .execute(ClipType::Union, FillRule::NonZero, FillRule::NonZero)
            .unwrap();
        assert_eq!(first, second);

        clipper
            .add_path(
                &[Point::new(-5, 7), Point::new(12, 7), Point::new(12, 20)],
                PolyType::Subject,
                false,
            )
            .unwrap();
        let first = clipper
            .execute(ClipType::Intersection, FillRule::EvenOdd, FillRule::NonZero)
            .unwrap();
        let second = clipper
            .execute(ClipType::Intersection, FillRule::EvenOdd, FillRule::NonZero)
            .unwrap();
        assert!(!first.open.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn even_odd_self_overlap() {
        let mut clipper = Clipper::new(ClipOptions::empty());
        clipper
            .add_path(&square(0, 0, 10), PolyType::Subject, true)
            .unwrap();
        clipper
            .add_path(&square(2, 2, 4), PolyType::Subject, true)
            .unwrap();
        let even_odd = clipper
            .execute(ClipType::Union, FillRule::EvenOdd, FillRule::EvenOdd)
            .unwrap();
        assert_eq!(even_odd.closed.len(), 2);
        let non_zero = clipper
            .execute(ClipType::Union, FillRule::NonZero, FillRule::NonZero)
            .unwrap();
        assert_eq!(non_zero.closed.len(), 1);
    }

    #[test]
    fn open_subject_clipped_to_region() {
        let mut clipper = Clipper::new(ClipOptions::empty());
        clipper
            .add_path(
                &[Point::new(-5, 5), Point::new(15, 5)],
                PolyType::Subject,
                false,
            )
            .unwrap();
        clipper
            .add_path(&square(0, 0, 10), PolyType::Clip, true)
            .unwrap();
        let sol = clipper
            .execute(ClipType::Intersection, FillRule::NonZero, FillRule::NonZero)
            .unwrap();
        assert!(sol.closed.is_empty());
        assert_eq!(sol.open.len(), 1);
        assert_eq!(&*sol.open[0], &[Point::new(0, 5), Point::new(10, 5)]);

        let sol = clipper
            .execute(ClipType::Difference, FillRule::NonZero, FillRule::NonZero)
            .unwrap();
        assert_eq!(sol.open.len(), 2);
    }

    #[test]
    fn no_subject_yields_empty_solution() {
        let mut clipper = Clipper::new(ClipOptions::empty());
        clipper
            .add_path(&square(0, 0, 10), PolyType::Clip, true)
            .unwrap();
        let sol = clipper
            .execute(ClipType::Union, FillRule::NonZero, FillRule::NonZero)
            .unwrap();
        assert_eq!(sol, ClipSolution::default());
    }

    #[test]
    fn open_clip_path_rejected() {
        let mut clipper = Clipper::new(ClipOptions::empty());
        let err = clipper
            .add_path(&square(0, 0, 1), PolyType::Clip, false)
            .unwrap_err();
        assert!(matches!(
            err,
            ClipperError::Geometry(GeometryError::OpenClipPath)
        ));
        assert_eq!(err.code(), 2);
    }

    #[test]
    fn out_of_range_rejects_whole_batch() {
        let mut clipper = Clipper::new(ClipOptions::empty());
        let paths = vec![
            Path::from(square(0, 0, 10)),
            Path::from(vec![
                Point::new(0, 0),
                Point::new(MAX_COORD + 1, 0),
                Point::new(0, 1),
            ]),
        ];
        let err = clipper
            .add_paths(&paths, PolyType::Subject, true)
            .unwrap_err();
        assert_eq!(err.code(), 2);
        let sol = clipper
            .execute(ClipType::Union, FillRule::NonZero, FillRule::NonZero)
            .unwrap();
        assert!(sol.closed.is_empty());
    }

    #[test]
    fn degenerate_path_is_skipped() {
        let mut clipper = Clipper::new(ClipOptions::empty());
        let added = clipper
            .add_path(
                &[Point::new(0, 0), Point::new(1, 1), Point::new(0, 0)],
                PolyType::Subject,
                true,
            )
            .unwrap();
        assert!(!added);
    }

    #[test]
    fn clear_keeps_options() {
        let mut clipper = Clipper::new(ClipOptions::STRICTLY_SIMPLE);
        clipper
            .add_path(&square(0, 0, 10), PolyType::Subject, true)
            .unwrap();
        clipper.clear();
        assert_eq!(clipper.options(), ClipOptions::STRICTLY_SIMPLE);
        let sol = clipper
            .execute(ClipType::Union, FillRule::NonZero, FillRule::NonZero)
            .unwrap();
        assert!(sol.closed.is_empty());
    }

    #[test]
    fn raw_values_parse() {
        assert_eq!(ClipType::try_from(3).unwrap(), ClipType::Xor);
        assert_eq!(FillRule::try_from(2).unwrap(), FillRule::Positive);
        assert!(PolyType::try_from(2).is_err());
        assert_eq!(
            ClipOptions::from_raw(9),
            Err(ArgumentError::UnknownOptions(8))
        );
    }
}
