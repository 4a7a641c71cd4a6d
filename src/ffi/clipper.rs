use tracing::debug;

use super::status::guard;
use super::{export, flag, import, out_param, with_state, ClipperStatus};
use crate::error::{HandleKind, Result};
use crate::operations::{ClipOptions, ClipSolution, ClipType, FillRule, PolyType};
use crate::store::{ClipperId, PathId, PathsId};

/// Allocates a clip engine.
///
/// `options` is a bitset of `1` (reverse solution), `2` (strictly simple)
/// and `4` (preserve collinear).
///
/// ## Specific Error Codes
/// * 1 = `out_handle` is null, or `options` has unknown bits set.
///
/// # Safety
///
/// `out_handle` must be null or valid for a write.
#[no_mangle]
#[must_use]
pub unsafe extern "C" fn clipper_new(options: u32, out_handle: *mut u64) -> ClipperStatus {
    guard("clipper_new", || {
        let out_handle = out_param(out_handle, "out_handle")?;
        let options = ClipOptions::from_raw(options)?;
        let id = with_state(|state| Ok(state.store.new_clipper(options)))?;
        out_handle.as_ptr().write(export(id));
        Ok(())
    })
}

/// Registers a copy of a path with a clip engine.
///
/// `poly_type` is `0` for subject and `1` for clip; a nonzero `closed`
/// marks a closed path. Degenerate paths are accepted and ignored.
///
/// ## Specific Error Codes
/// * 1 = either handle is stale, the path was consumed, or `poly_type` is
///   out of range.
/// * 2 = an open clip path, or coordinates beyond the supported range.
#[no_mangle]
#[must_use]
pub extern "C" fn clipper_add_path(
    handle: u64,
    path: u64,
    poly_type: i32,
    closed: i32,
) -> ClipperStatus {
    guard("clipper_add_path", || {
        let id: ClipperId = import(handle, HandleKind::Clipper)?;
        let path_id: PathId = import(path, HandleKind::Path)?;
        let role = PolyType::try_from(poly_type)?;
        let added = with_state(|state| {
            state
                .store
                .clipper_add_path(id, path_id, role, flag(closed))
        })?;
        if !added {
            debug!(handle, path, "degenerate path skipped");
        }
        Ok(())
    })
}

/// Registers a copy of every path in a collection with a clip engine.
///
/// Either all paths are registered or, on failure, none.
///
/// ## Specific Error Codes
/// * 1 = either handle is stale, or `poly_type` is out of range.
/// * 2 = an open clip path, or coordinates beyond the supported range.
#[no_mangle]
#[must_use]
pub extern "C" fn clipper_add_paths(
    handle: u64,
    paths: u64,
    poly_type: i32,
    closed: i32,
) -> ClipperStatus {
    guard("clipper_add_paths", || {
        let id: ClipperId = import(handle, HandleKind::Clipper)?;
        let paths_id: PathsId = import(paths, HandleKind::PathCollection)?;
        let role = PolyType::try_from(poly_type)?;
        let added = with_state(|state| {
            state
                .store
                .clipper_add_paths(id, paths_id, role, flag(closed))
        })?;
        if !added {
            debug!(handle, paths, "collection had no usable path");
        }
        Ok(())
    })
}

/// Drops every registration of a clip engine. Options are kept.
///
/// ## Specific Error Codes
/// * 1 = the handle is stale.
#[no_mangle]
#[must_use]
pub extern "C" fn clipper_clear(handle: u64) -> ClipperStatus {
    guard("clipper_clear", || {
        let id: ClipperId = import(handle, HandleKind::Clipper)?;
        with_state(|state| {
            state.store.clipper_mut(id)?.clear();
            Ok(())
        })
    })
}

/// Runs the engine on a snapshot taken under the lock, so the table stays
/// available to other threads during the computation.
fn execute(
    handle: u64,
    clip_type: i32,
    subject_fill: i32,
    clip_fill: i32,
) -> Result<ClipSolution> {
    let id: ClipperId = import(handle, HandleKind::Clipper)?;
    let op = ClipType::try_from(clip_type)?;
    let subject_fill = FillRule::try_from(subject_fill)?;
    let clip_fill = FillRule::try_from(clip_fill)?;
    let clipper = with_state(|state| Ok(state.store.clipper(id)?.clone()))?;
    clipper.execute(op, subject_fill, clip_fill)
}

/// Computes a boolean operation and returns open and closed results as two
/// new collections owned by the caller.
///
/// `clip_type` is `0` intersection, `1` union, `2` difference, `3` xor.
/// Fill rules are `0` even-odd, `1` non-zero, `2` positive, `3` negative.
/// Closed results are ordered depth-first: each outer boundary is followed
/// by its holes.
///
/// ## Specific Error Codes
/// * 1 = an out-parameter is null, the handle is stale, an enum value is out
///   of range, or the engine failed internally.
///
/// # Safety
///
/// `out_open` and `out_closed` must each be null or valid for a write.
#[no_mangle]
#[must_use]
pub unsafe extern "C" fn clipper_execute_open_closed(
    handle: u64,
    clip_type: i32,
    subject_fill: i32,
    clip_fill: i32,
    out_open: *mut u64,
    out_closed: *mut u64,
) -> ClipperStatus {
    guard("clipper_execute_open_closed", || {
        let out_open = out_param(out_open, "out_open")?;
        let out_closed = out_param(out_closed, "out_closed")?;
        let solution = execute(handle, clip_type, subject_fill, clip_fill)?;
        let (open, closed) = with_state(|state| {
            Ok((
                state.store.insert_paths(solution.open),
                state.store.insert_paths(solution.closed),
            ))
        })?;
        out_open.as_ptr().write(export(open));
        out_closed.as_ptr().write(export(closed));
        Ok(())
    })
}

/// Same as [`clipper_execute_open_closed`], discarding open results.
///
/// ## Specific Error Codes
/// * 1 = `out_closed` is null, the handle is stale, an enum value is out of
///   range, or the engine failed internally.
///
/// # Safety
///
/// `out_closed` must be null or valid for a write.
#[no_mangle]
#[must_use]
pub unsafe extern "C" fn clipper_execute_closed(
    handle: u64,
    clip_type: i32,
    subject_fill: i32,
    clip_fill: i32,
    out_closed: *mut u64,
) -> ClipperStatus {
    guard("clipper_execute_closed", || {
        let out_closed = out_param(out_closed, "out_closed")?;
        let solution = execute(handle, clip_type, subject_fill, clip_fill)?;
        let closed = with_state(|state| Ok(state.store.insert_paths(solution.closed)))?;
        out_closed.as_ptr().write(export(closed));
        Ok(())
    })
}

/// Releases a clip engine. Paths registered with it are unaffected.
///
/// ## Specific Error Codes
/// * 1 = the handle is stale.
#[no_mangle]
#[must_use]
pub extern "C" fn clipper_delete(handle: u64) -> ClipperStatus {
    guard("clipper_delete", || {
        let id: ClipperId = import(handle, HandleKind::Clipper)?;
        with_state(|state| state.store.remove_clipper(id))
    })
}
