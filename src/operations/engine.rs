//! Marshalling between crate geometry and the polyclipping engine's flat C
//! representation.
//!
//! Inputs are copied into owned vertex buffers that the engine structs
//! point into for the duration of one call. Results are engine-allocated
//! and released when the [`Solution`] guard drops.

use std::ptr;
use std::slice;

use clipper_sys::{
    execute, free_polygons, offset, ClipType as EngineClipType, ClipType_ctDifference,
    ClipType_ctIntersection, ClipType_ctUnion, ClipType_ctXor, EndType as EngineEndType,
    EndType_etClosedLine, EndType_etClosedPolygon, EndType_etOpenButt, EndType_etOpenRound,
    EndType_etOpenSquare, JoinType as EngineJoinType, JoinType_jtMiter, JoinType_jtRound,
    JoinType_jtSquare, Path as EnginePath, PolyFillType, PolyFillType_pftEvenOdd,
    PolyFillType_pftNegative, PolyFillType_pftNonZero, PolyFillType_pftPositive,
    PolyType as EnginePolyType, PolyType_ptClip, PolyType_ptSubject, Polygon as EnginePolygon,
    Polygons, Vertice,
};
use tracing::trace;

use super::clip::{ClipType, FillRule, PolyType};
use super::offset::{EndType, JoinType, OffsetParams};
use crate::error::{EngineError, Result};
use crate::math::Point;

/// A result path and whether the engine reported it closed.
pub(crate) type EnginePathOut = (Vec<Point>, bool);

fn clip_type(op: ClipType) -> EngineClipType {
    match op {
        ClipType::Intersection => ClipType_ctIntersection,
        ClipType::Union => ClipType_ctUnion,
        ClipType::Difference => ClipType_ctDifference,
        ClipType::Xor => ClipType_ctXor,
    }
}

fn fill_type(fill: FillRule) -> PolyFillType {
    match fill {
        FillRule::EvenOdd => PolyFillType_pftEvenOdd,
        FillRule::NonZero => PolyFillType_pftNonZero,
        FillRule::Positive => PolyFillType_pftPositive,
        FillRule::Negative => PolyFillType_pftNegative,
    }
}

fn poly_type(role: PolyType) -> EnginePolyType {
    match role {
        PolyType::Subject => PolyType_ptSubject,
        PolyType::Clip => PolyType_ptClip,
    }
}

fn join_type(join: JoinType) -> EngineJoinType {
    match join {
        JoinType::Square => JoinType_jtSquare,
        JoinType::Round => JoinType_jtRound,
        JoinType::Miter => JoinType_jtMiter,
    }
}

fn end_type(end: EndType) -> EngineEndType {
    match end {
        EndType::ClosedPolygon => EndType_etClosedPolygon,
        EndType::ClosedLine => EndType_etClosedLine,
        EndType::OpenSquare => EndType_etOpenSquare,
        EndType::OpenRound => EndType_etOpenRound,
        EndType::OpenButt => EndType_etOpenButt,
    }
}

fn engine_count<N: TryFrom<usize>>(len: usize) -> Result<N> {
    N::try_from(len).map_err(|_| EngineError::InputTooLarge(len).into())
}

/// Input paths in the engine's layout, one single-path polygon per input.
#[derive(Default)]
struct EngineInput {
    vertices: Vec<Vec<Vertice>>,
    paths: Vec<EnginePath>,
    polygons: Vec<EnginePolygon>,
}

impl EngineInput {
    fn push(&mut self, points: &[Point], role: PolyType, closed: bool) {
        self.vertices.push(points.iter().map(|p| [p.x, p.y]).collect());
        self.paths.push(EnginePath {
            vertices: ptr::null_mut(),
            vertices_count: 0,
            closed: closed.into(),
        });
        self.polygons.push(EnginePolygon {
            paths: ptr::null_mut(),
            paths_count: 0,
            type_: poly_type(role),
        });
    }

    /// Links the engine structs to the owned buffers. The returned value
    /// borrows `self` through raw pointers and must not outlive it.
    fn link(&mut self) -> Result<Polygons> {
        for (path, vertices) in self.paths.iter_mut().zip(self.vertices.iter_mut()) {
            path.vertices = vertices.as_mut_ptr();
            path.vertices_count = engine_count(vertices.len())?;
        }
        for (polygon, path) in self.polygons.iter_mut().zip(self.paths.iter_mut()) {
            polygon.paths = path;
            polygon.paths_count = engine_count(1)?;
        }
        Ok(Polygons {
            polygons: self.polygons.as_mut_ptr(),
            polygons_count: engine_count(self.polygons.len())?,
        })
    }
}

/// Engine-allocated result, freed on drop.
struct Solution(Polygons);

impl Drop for Solution {
    fn drop(&mut self) {
        // SAFETY: the engine allocated these polygons and they are released once.
        unsafe { free_polygons(self.0) };
    }
}

impl Solution {
    /// Every result path in engine order: each outer boundary followed by
    /// its holes.
    fn paths(&self) -> Vec<EnginePathOut> {
        // SAFETY: the engine reports arrays together with their lengths, and
        // they stay alive until `self` drops.
        let polygons =
            unsafe { raw_slice(self.0.polygons.cast_const(), self.0.polygons_count) };
        polygons
            .iter()
            .flat_map(|polygon| unsafe {
                raw_slice(polygon.paths.cast_const(), polygon.paths_count)
            })
            .map(|path| {
                let vertices =
                    unsafe { raw_slice(path.vertices.cast_const(), path.vertices_count) };
                let points = vertices.iter().map(|v| Point::new(v[0], v[1])).collect();
                (points, path.closed != 0)
            })
            .collect()
    }
}

/// Views an engine array, treating null or empty arrays as empty slices.
///
/// # Safety
///
/// When `data` is non-null it must point to `len` initialized elements that
/// outlive `'a`.
unsafe fn raw_slice<'a, T, N>(data: *const T, len: N) -> &'a [T]
where
    usize: TryFrom<N>,
{
    match usize::try_from(len) {
        Ok(len) if len > 0 && !data.is_null() => slice::from_raw_parts(data, len),
        _ => &[],
    }
}

/// Runs a boolean operation over `inputs`.
///
/// Callers must have rejected open clip paths and out-of-range coordinates
/// first; the engine cannot report those back through its C interface.
pub(crate) fn clip<'a>(
    inputs: impl IntoIterator<Item = (&'a [Point], PolyType, bool)>,
    op: ClipType,
    subject_fill: FillRule,
    clip_fill: FillRule,
) -> Result<Vec<EnginePathOut>> {
    let mut input = EngineInput::default();
    for (points, role, closed) in inputs {
        input.push(points, role, closed);
    }
    let polygons = input.link()?;
    trace!(paths = input.paths.len(), ?op, "calling clip engine");
    // SAFETY: `polygons` points into `input`, which outlives the call.
    let solution = Solution(unsafe {
        execute(
            clip_type(op),
            polygons,
            fill_type(subject_fill),
            fill_type(clip_fill),
        )
    });
    Ok(solution.paths())
}

/// Offsets `paths`, all sharing one join and end style, by `delta`.
pub(crate) fn offset_paths<'a>(
    paths: impl IntoIterator<Item = &'a [Point]>,
    join: JoinType,
    end: EndType,
    params: OffsetParams,
    delta: f64,
) -> Result<Vec<Vec<Point>>> {
    let mut input = EngineInput::default();
    for points in paths {
        input.push(points, PolyType::Subject, end.is_closed());
    }
    let polygons = input.link()?;
    trace!(paths = input.paths.len(), ?join, ?end, delta, "calling offset engine");
    // SAFETY: `polygons` points into `input`, which outlives the call.
    let solution = Solution(unsafe {
        offset(
            params.miter_limit(),
            params.arc_tolerance(),
            join_type(join),
            end_type(end),
            polygons,
            delta,
        )
    });
    Ok(solution.paths().into_iter().map(|(points, _)| points).collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn square(x0: i64, y0: i64, size: i64) -> Vec<Point> {
        vec![
            Point::new(x0, y0),
            Point::new(x0 + size, y0),
            Point::new(x0 + size, y0 + size),
            Point::new(x0, y0 + size),
        ]
    }

    #[test]
    fn null_arrays_read_as_empty() {
        let empty = unsafe { raw_slice::<Vertice, usize>(ptr::null(), 3) };
        assert!(empty.is_empty());
    }

    #[test]
    fn closed_flag_survives_the_engine() {
        let line = [Point::new(-5, 5), Point::new(15, 5)];
        let region = square(0, 0, 10);
        let inputs = [
            (line.as_slice(), PolyType::Subject, false),
            (region.as_slice(), PolyType::Clip, true),
        ];
        let paths = clip(
            inputs,
            ClipType::Intersection,
            FillRule::NonZero,
            FillRule::NonZero,
        )
        .unwrap();
        assert_eq!(paths.len(), 1);
        assert!(!paths[0].1);
        assert_eq!(paths[0].0.len(), 2);
    }

    #[test]
    fn outer_comes_before_its_hole() {
        let outer = square(0, 0, 10);
        let mut hole = square(3, 3, 4);
        hole.reverse();
        let inputs = [
            (outer.as_slice(), PolyType::Subject, true),
            (hole.as_slice(), PolyType::Subject, true),
        ];
        let paths = clip(inputs, ClipType::Union, FillRule::NonZero, FillRule::NonZero).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|(_, closed)| *closed));
        assert_eq!(paths[0].0.len(), 4);
        assert!(paths[0].0.contains(&Point::new(0, 0)));
        assert!(paths[1].0.contains(&Point::new(3, 3)));
    }

    #[test]
    fn offset_group_uses_the_engine() {
        let region = square(0, 0, 10);
        let rings = offset_paths(
            [region.as_slice()],
            JoinType::Miter,
            EndType::ClosedPolygon,
            OffsetParams::default(),
            1.0,
        )
        .unwrap();
        assert_eq!(rings.len(), 1);
        assert!(rings[0].contains(&Point::new(-1, -1)));
        assert!(rings[0].contains(&Point::new(11, 11)));
    }
}
