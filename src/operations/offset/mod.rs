use tracing::debug;

use super::engine;
use crate::error::{ArgumentError, GeometryError, Result};
use crate::geometry::{strip_duplicates, Path, PathCollection};
use crate::math::polygon_2d::rotate_to_canonical_start;
use crate::math::{check_range, Point, MAX_COORD};
use crate::operations::clip::{ClipType, FillRule, PolyType};

/// Corner style between consecutive offset edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinType {
    Square,
    Round,
    Miter,
}

/// How a path is closed or capped when offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndType {
    /// Filled polygon; only the outer side is offset.
    ClosedPolygon,
    /// Closed outline offset on both sides.
    ClosedLine,
    OpenSquare,
    OpenRound,
    OpenButt,
}

impl EndType {
    pub(crate) fn is_closed(self) -> bool {
        matches!(self, Self::ClosedPolygon | Self::ClosedLine)
    }
}

impl TryFrom<i32> for JoinType {
    type Error = ArgumentError;

    fn try_from(value: i32) -> std::result::Result<Self, ArgumentError> {
        match value {
            0 => Ok(Self::Square),
            1 => Ok(Self::Round),
            2 => Ok(Self::Miter),
            _ => Err(ArgumentError::InvalidEnum {
                kind: "join type",
                value,
            }),
        }
    }
}

impl TryFrom<i32> for EndType {
    type Error = ArgumentError;

    fn try_from(value: i32) -> std::result::Result<Self, ArgumentError> {
        match value {
            0 => Ok(Self::ClosedPolygon),
            1 => Ok(Self::ClosedLine),
            2 => Ok(Self::OpenSquare),
            3 => Ok(Self::OpenRound),
            4 => Ok(Self::OpenButt),
            _ => Err(ArgumentError::InvalidEnum {
                kind: "end type",
                value,
            }),
        }
    }
}

/// Tuning parameters for [`ClipperOffset`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetParams {
    miter_limit: f64,
    arc_tolerance: f64,
}

impl OffsetParams {
    pub const DEFAULT_MITER_LIMIT: f64 = 2.0;
    pub const DEFAULT_ARC_TOLERANCE: f64 = 0.25;

    /// Creates offset parameters.
    ///
    /// `miter_limit` is the largest allowed distance of a miter tip from its
    /// vertex, in multiples of the offset; values up to 2 behave like 2.
    /// `arc_tolerance` is the largest deviation of a round join from the
    /// true arc; zero or less selects the default.
    ///
    /// # Errors
    ///
    /// Returns `ArgumentError::InvalidParameter` if either value is not
    /// finite or `miter_limit` is not positive.
    pub fn new(miter_limit: f64, arc_tolerance: f64) -> Result<Self> {
        if !miter_limit.is_finite() || miter_limit <= 0.0 {
            return Err(ArgumentError::InvalidParameter {
                parameter: "miter limit",
                value: miter_limit,
            }
            .into());
        }
        if !arc_tolerance.is_finite() {
            return Err(ArgumentError::InvalidParameter {
                parameter: "arc tolerance",
                value: arc_tolerance,
            }
            .into());
        }
        Ok(Self {
            miter_limit,
            arc_tolerance,
        })
    }

    #[must_use]
    pub fn miter_limit(&self) -> f64 {
        self.miter_limit
    }

    #[must_use]
    pub fn arc_tolerance(&self) -> f64 {
        self.arc_tolerance
    }
}

impl Default for OffsetParams {
    fn default() -> Self {
        Self {
            miter_limit: Self::DEFAULT_MITER_LIMIT,
            arc_tolerance: Self::DEFAULT_ARC_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone)]
struct OffsetInput {
    points: Vec<Point>,
    join: JoinType,
    end: EndType,
}

/// Polygon offset engine.
///
/// Accumulates paths with their join and end styles, then inflates
/// (positive delta) or deflates (negative delta) all of them at once.
/// Registered geometry is copied, and execution leaves it untouched.
#[derive(Debug, Clone, Default)]
pub struct ClipperOffset {
    params: OffsetParams,
    inputs: Vec<OffsetInput>,
}

impl ClipperOffset {
    #[must_use]
    pub fn new(params: OffsetParams) -> Self {
        Self {
            params,
            inputs: Vec::new(),
        }
    }

    #[must_use]
    pub fn params(&self) -> OffsetParams {
        self.params
    }

    /// Registers one path.
    ///
    /// Returns `Ok(false)` if the path was skipped: empty, or a closed
    /// polygon with fewer than three distinct vertices.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::CoordinateOutOfRange` for coordinates the
    /// engine cannot represent exactly.
    pub fn add_path(&mut self, path: &[Point], join: JoinType, end: EndType) -> Result<bool> {
        validate(path)?;
        Ok(self.push_input(path, join, end))
    }

    /// Registers every path in `paths`, in order. All-or-nothing.
    ///
    /// # Errors
    ///
    /// Same as [`ClipperOffset::add_path`], for the first offending path.
    pub fn add_paths(&mut self, paths: &[Path], join: JoinType, end: EndType) -> Result<bool> {
        for path in paths {
            validate(path)?;
        }
        let mut added = false;
        for path in paths {
            added |= self.push_input(path, join, end);
        }
        Ok(added)
    }

    /// Drops every registration. Parameters are kept.
    pub fn clear(&mut self) {
        self.inputs.clear();
    }

    fn push_input(&mut self, path: &[Point], join: JoinType, end: EndType) -> bool {
        let points = strip_duplicates(path, end.is_closed());
        if points.is_empty() || (end == EndType::ClosedPolygon && points.len() < 3) {
            return false;
        }
        self.inputs.push(OffsetInput { points, join, end });
        true
    }

    /// Offsets every registered path by `delta` and unions the outlines.
    ///
    /// Only closed polygons take part in a negative offset. A zero offset
    /// returns the closed polygons normalized by the union. Paths sharing a
    /// join and end style are offset together; when several styles are
    /// registered their outlines are merged with a non-zero union. Every
    /// ring starts at its smallest vertex.
    ///
    /// # Errors
    ///
    /// Returns `ArgumentError::InvalidParameter` for a non-finite `delta`,
    /// `GeometryError::OffsetOutOfRange` when the outlines could leave the
    /// supported coordinate range, or any error of the engine call.
    pub fn execute(&self, delta: f64) -> Result<PathCollection> {
        if !delta.is_finite() {
            return Err(ArgumentError::InvalidParameter {
                parameter: "delta",
                value: delta,
            }
            .into());
        }
        self.check_reach(delta)?;
        debug!(delta, inputs = self.inputs.len(), "executing offset");

        // Step 1: Group paths by style
        let mut groups: Vec<((JoinType, EndType), Vec<&[Point]>)> = Vec::new();
        for input in &self.inputs {
            let style = (input.join, input.end);
            match groups.iter_mut().find(|(s, _)| *s == style) {
                Some((_, paths)) => paths.push(input.points.as_slice()),
                None => groups.push((style, vec![input.points.as_slice()])),
            }
        }

        // Step 2: Offset each group
        let mut outlines = Vec::new();
        let mut filled_groups = 0;
        for ((join, end), paths) in groups {
            let rings = engine::offset_paths(paths, join, end, self.params, delta)?;
            if !rings.is_empty() {
                filled_groups += 1;
                outlines.extend(rings);
            }
        }

        // Step 3: Merge outlines of different styles
        if filled_groups > 1 {
            let subjects = outlines
                .iter()
                .map(|ring| (ring.as_slice(), PolyType::Subject, true));
            let merged = engine::clip(
                subjects,
                ClipType::Union,
                FillRule::NonZero,
                FillRule::NonZero,
            )?;
            outlines = merged
                .into_iter()
                .map(|(ring, _)| ring)
                .collect();
        }

        let mut solution = PathCollection::new();
        for ring in &outlines {
            solution.push(Path::from(rotate_to_canonical_start(ring)))?;
        }
        debug!(outputs = solution.len(), "offset finished");
        Ok(solution)
    }

    /// Rejects a `delta` whose outlines could reach past [`MAX_COORD`].
    ///
    /// No outline point lies further than `|delta|` times the larger of the
    /// miter limit and 2 from its input.
    #[allow(clippy::cast_precision_loss)]
    fn check_reach(&self, delta: f64) -> Result<()> {
        let reach = delta.abs() * self.params.miter_limit.max(2.0);
        let extent = self
            .inputs
            .iter()
            .flat_map(|i| &i.points)
            .map(|p| p.x.unsigned_abs().max(p.y.unsigned_abs()))
            .max();
        match extent {
            Some(extent) if extent as f64 + reach > MAX_COORD as f64 => {
                Err(GeometryError::OffsetOutOfRange { delta }.into())
            }
            _ => Ok(()),
        }
    }
}

fn validate(path: &[Point]) -> Result<()> {
    for &p in path {
        check_range(p)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::error::ClipperError;
    use crate::math::polygon_2d::signed_area;

    fn square(x0: i64, y0: i64, size: i64) -> Vec<Point> {
        vec![
            Point::new(x0, y0),
            Point::new(x0 + size, y0),
            Point::new(x0 + size, y0 + size),
            Point::new(x0, y0 + size),
        ]
    }

    fn offset(path: &[Point], join: JoinType, end: EndType, delta: f64) -> PathCollection {
        let mut engine = ClipperOffset::default();
        engine.add_path(path, join, end).unwrap();
        engine.execute(delta).unwrap()
    }

    fn total_area(paths: &PathCollection) -> f64 {
        paths.iter().map(|p| signed_area(p)).sum()
    }

    #[test]
    fn miter_inflate_square() {
        let out = offset(&square(0, 0, 10), JoinType::Miter, EndType::ClosedPolygon, 1.0);
        assert_eq!(out.len(), 1);
        assert_eq!(&*out[0], square(-1, -1, 12).as_slice());
    }

    #[test]
    fn square_join_chamfers_corners() {
        let out = offset(&square(0, 0, 10), JoinType::Square, EndType::ClosedPolygon, 1.0);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].len(), 8);
        assert_relative_eq!(signed_area(&out[0]), 142.0);
    }

    #[test]
    fn miter_deflate_square() {
        let out = offset(&square(0, 0, 10), JoinType::Miter, EndType::ClosedPolygon, -2.0);
        assert_eq!(out.len(), 1);
        assert_eq!(&*out[0], square(2, 2, 6).as_slice());
    }

    #[test]
    fn clockwise_input_is_normalized() {
        let mut cw = square(0, 0, 10);
        cw.reverse();
        let out = offset(&cw, JoinType::Miter, EndType::ClosedPolygon, 1.0);
        assert_relative_eq!(total_area(&out), 144.0);
    }

    #[test]
    fn hole_shrinks_when_inflating() {
        let mut engine = ClipperOffset::default();
        let mut hole = square(5, 5, 10);
        hole.reverse();
        engine
            .add_paths(
                &[Path::from(square(0, 0, 20)), Path::from(hole)],
                JoinType::Miter,
                EndType::ClosedPolygon,
            )
            .unwrap();
        let out = engine.execute(1.0).unwrap();
        assert_eq!(out.len(), 2);
        assert_relative_eq!(signed_area(&out[0]), 484.0);
        assert_relative_eq!(signed_area(&out[1]), -64.0);
    }

    #[test]
    fn round_point_becomes_circle() {
        let out = offset(&[Point::new(0, 0)], JoinType::Round, EndType::OpenRound, 10.0);
        assert_eq!(out.len(), 1);
        let area = signed_area(&out[0]);
        assert!(area > 290.0 && area < 315.0, "area {area}");
    }

    #[test]
    fn square_point_becomes_square() {
        let out = offset(&[Point::new(5, 5)], JoinType::Square, EndType::OpenSquare, 2.0);
        assert_eq!(&*out[0], square(3, 3, 4).as_slice());
    }

    #[test]
    fn open_line_end_caps() {
        let line = [Point::new(0, 0), Point::new(10, 0)];
        let butt = offset(&line, JoinType::Square, EndType::OpenButt, 1.0);
        assert_relative_eq!(total_area(&butt), 20.0);
        let square_cap = offset(&line, JoinType::Square, EndType::OpenSquare, 1.0);
        assert_relative_eq!(total_area(&square_cap), 24.0);
        let round_cap = offset(&line, JoinType::Round, EndType::OpenRound, 1.0);
        let area = total_area(&round_cap);
        assert!(area > 20.0 && area < 24.0, "area {area}");
    }

    #[test]
    fn closed_line_offsets_both_sides() {
        let out = offset(&square(0, 0, 10), JoinType::Miter, EndType::ClosedLine, 1.0);
        assert_eq!(out.len(), 2);
        assert_relative_eq!(total_area(&out), 80.0);
    }

    #[test]
    fn zero_delta_keeps_closed_polygons_only() {
        let mut engine = ClipperOffset::default();
        engine
            .add_path(&square(0, 0, 10), JoinType::Round, EndType::ClosedPolygon)
            .unwrap();
        engine
            .add_path(
                &[Point::new(20, 0), Point::new(30, 0)],
                JoinType::Round,
                EndType::OpenRound,
            )
            .unwrap();
        let out = engine.execute(0.0).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(&*out[0], square(0, 0, 10).as_slice());
    }

    #[test]
    fn open_paths_ignored_when_deflating() {
        let out = offset(
            &[Point::new(0, 0), Point::new(10, 0)],
            JoinType::Round,
            EndType::OpenRound,
            -1.0,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn deflate_to_nothing() {
        let out = offset(&square(0, 0, 4), JoinType::Miter, EndType::ClosedPolygon, -3.0);
        assert!(out.is_empty());
    }

    #[test]
    fn execute_is_repeatable() {
        let mut engine = ClipperOffset::default();
        engine
            .add_path(&square(0, 0, 10), JoinType::Round, EndType::ClosedLine)
            .unwrap();
        let first = engine.execute(2.0).unwrap();
        let second = engine.execute(2.0).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn non_finite_delta_rejected() {
        let engine = ClipperOffset::default();
        let err = engine.execute(f64::NAN).unwrap_err();
        assert!(matches!(
            err,
            ClipperError::Argument(ArgumentError::InvalidParameter { .. })
        ));
        assert_eq!(err.code(), 1);
    }

    #[test]
    fn huge_delta_rejected_as_geometry_error() {
        let mut engine = ClipperOffset::default();
        engine
            .add_path(&square(0, 0, 10), JoinType::Miter, EndType::ClosedPolygon)
            .unwrap();
        for delta in [-1e30, 1e30] {
            let err = engine.execute(delta).unwrap_err();
            assert!(matches!(
                err,
                ClipperError::Geometry(GeometryError::OffsetOutOfRange { .. })
            ));
            assert_eq!(err.code(), 2);
        }
    }

    #[test]
    fn reach_counts_the_miter_limit() {
        let edge = MAX_COORD - 10_000;
        let near_limit = square(edge - 10, 0, 10);

        let mut engine = ClipperOffset::default();
        engine
            .add_path(&near_limit, JoinType::Miter, EndType::ClosedPolygon)
            .unwrap();
        assert!(engine.execute(2_000.0).is_ok());

        let mut engine = ClipperOffset::new(OffsetParams::new(10.0, 0.25).unwrap());
        engine
            .add_path(&near_limit, JoinType::Miter, EndType::ClosedPolygon)
            .unwrap();
        assert!(engine.execute(2_000.0).is_err());
        assert!(ClipperOffset::default().execute(1e30).unwrap().is_empty());
    }

    #[test]
    fn mixed_styles_are_merged() {
        let mut engine = ClipperOffset::default();
        engine
            .add_path(&square(0, 0, 10), JoinType::Miter, EndType::ClosedPolygon)
            .unwrap();
        engine
            .add_path(&square(5, 0, 10), JoinType::Square, EndType::ClosedPolygon)
            .unwrap();
        let out = engine.execute(1.0).unwrap();
        assert_eq!(out.len(), 1);
        assert!(signed_area(&out[0]) > 0.0);
        assert_eq!(out[0][0], Point::new(-1, -1));
    }

    #[test]
    fn params_validation() {
        assert!(OffsetParams::new(0.0, 0.25).is_err());
        assert!(OffsetParams::new(3.0, f64::INFINITY).is_err());
        let params = OffsetParams::new(1.5, 0.0).unwrap();
        assert_relative_eq!(params.miter_limit(), 1.5);
        assert_relative_eq!(OffsetParams::default().miter_limit(), 2.0);
    }

    #[test]
    fn degenerate_polygon_skipped() {
        let mut engine = ClipperOffset::default();
        let added = engine
            .add_path(
                &[Point::new(0, 0), Point::new(5, 5)],
                JoinType::Miter,
                EndType::ClosedPolygon,
            )
            .unwrap();
        assert!(!added);
        assert!(engine.execute(1.0).unwrap().is_empty());
    }

    #[test]
    fn raw_styles_parse() {
        assert_eq!(JoinType::try_from(2).unwrap(), JoinType::Miter);
        assert_eq!(EndType::try_from(4).unwrap(), EndType::OpenButt);
        assert!(EndType::try_from(5).is_err());
    }
}
