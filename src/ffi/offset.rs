use tracing::debug;

use super::status::guard;
use super::{export, import, out_param, with_state, ClipperStatus};
use crate::error::HandleKind;
use crate::operations::{EndType, JoinType, OffsetParams};
use crate::store::{OffsetId, PathId, PathsId};

/// Allocates an offset engine with a miter limit of 2 and an arc tolerance
/// of a quarter unit.
///
/// ## Specific Error Codes
/// * 1 = `out_handle` is null.
///
/// # Safety
///
/// `out_handle` must be null or valid for a write.
#[no_mangle]
#[must_use]
pub unsafe extern "C" fn clipper_offset_new(out_handle: *mut u64) -> ClipperStatus {
    guard("clipper_offset_new", || {
        let out_handle = out_param(out_handle, "out_handle")?;
        let id = with_state(|state| Ok(state.store.new_offset(OffsetParams::default())))?;
        out_handle.as_ptr().write(export(id));
        Ok(())
    })
}

/// Allocates an offset engine with explicit parameters.
///
/// Miter limits of 2 or less behave like 2. An arc tolerance of zero or
/// less selects the default.
///
/// ## Specific Error Codes
/// * 1 = `out_handle` is null, a parameter is not finite, or `miter_limit`
///   is not positive.
///
/// # Safety
///
/// `out_handle` must be null or valid for a write.
#[no_mangle]
#[must_use]
pub unsafe extern "C" fn clipper_offset_new_with(
    miter_limit: f64,
    arc_tolerance: f64,
    out_handle: *mut u64,
) -> ClipperStatus {
    guard("clipper_offset_new_with", || {
        let out_handle = out_param(out_handle, "out_handle")?;
        let params = OffsetParams::new(miter_limit, arc_tolerance)?;
        let id = with_state(|state| Ok(state.store.new_offset(params)))?;
        out_handle.as_ptr().write(export(id));
        Ok(())
    })
}

/// Registers a copy of a path with an offset engine.
///
/// `join` is `0` square, `1` round, `2` miter. `end` is `0` closed polygon,
/// `1` closed line, `2` open square, `3` open round, `4` open butt.
///
/// ## Specific Error Codes
/// * 1 = either handle is stale, the path was consumed, or an enum value is
///   out of range.
/// * 2 = coordinates beyond the supported range.
#[no_mangle]
#[must_use]
pub extern "C" fn clipper_offset_add_path(
    handle: u64,
    path: u64,
    join: i32,
    end: i32,
) -> ClipperStatus {
    guard("clipper_offset_add_path", || {
        let id: OffsetId = import(handle, HandleKind::Offset)?;
        let path_id: PathId = import(path, HandleKind::Path)?;
        let join = JoinType::try_from(join)?;
        let end = EndType::try_from(end)?;
        let added = with_state(|state| state.store.offset_add_path(id, path_id, join, end))?;
        if !added {
            debug!(handle, path, "degenerate path skipped");
        }
        Ok(())
    })
}

/// Registers a copy of every path in a collection with an offset engine.
///
/// ## Specific Error Codes
/// * 1 = either handle is stale, or an enum value is out of range.
/// * 2 = coordinates beyond the supported range.
#[no_mangle]
#[must_use]
pub extern "C" fn clipper_offset_add_paths(
    handle: u64,
    paths: u64,
    join: i32,
    end: i32,
) -> ClipperStatus {
    guard("clipper_offset_add_paths", || {
        let id: OffsetId = import(handle, HandleKind::Offset)?;
        let paths_id: PathsId = import(paths, HandleKind::PathCollection)?;
        let join = JoinType::try_from(join)?;
        let end = EndType::try_from(end)?;
        let added = with_state(|state| state.store.offset_add_paths(id, paths_id, join, end))?;
        if !added {
            debug!(handle, paths, "collection had no usable path");
        }
        Ok(())
    })
}

/// Drops every registration of an offset engine.
///
/// ## Specific Error Codes
/// * 1 = the handle is stale.
#[no_mangle]
#[must_use]
pub extern "C" fn clipper_offset_clear(handle: u64) -> ClipperStatus {
    guard("clipper_offset_clear", || {
        let id: OffsetId = import(handle, HandleKind::Offset)?;
        with_state(|state| {
            state.store.offset_mut(id)?.clear();
            Ok(())
        })
    })
}

/// Offsets every registered path by `delta` and returns the closed outlines
/// as a new collection owned by the caller.
///
/// ## Specific Error Codes
/// * 1 = `out_paths` is null, the handle is stale, `delta` is not finite,
///   or the engine failed internally.
/// * 2 = `delta` would push the outlines beyond the supported range.
///
/// # Safety
///
/// `out_paths` must be null or valid for a write.
#[no_mangle]
#[must_use]
pub unsafe extern "C" fn clipper_offset_execute(
    handle: u64,
    delta: f64,
    out_paths: *mut u64,
) -> ClipperStatus {
    guard("clipper_offset_execute", || {
        let out_paths = out_param(out_paths, "out_paths")?;
        let id: OffsetId = import(handle, HandleKind::Offset)?;
        let offset = with_state(|state| Ok(state.store.offset(id)?.clone()))?;
        let result = offset.execute(delta)?;
        let paths = with_state(|state| Ok(state.store.insert_paths(result)))?;
        out_paths.as_ptr().write(export(paths));
        Ok(())
    })
}

/// Releases an offset engine. Paths registered with it are unaffected.
///
/// ## Specific Error Codes
/// * 1 = the handle is stale.
#[no_mangle]
#[must_use]
pub extern "C" fn clipper_offset_delete(handle: u64) -> ClipperStatus {
    guard("clipper_offset_delete", || {
        let id: OffsetId = import(handle, HandleKind::Offset)?;
        with_state(|state| state.store.remove_offset(id))
    })
}
