use tracing::trace;

use super::status::guard;
use super::{export, import, out_param, with_state, ClipperStatus, PathView};
use crate::error::HandleKind;
use crate::math::Point;
use crate::store::PathId;

/// Allocates an empty path.
///
/// On success writes the new handle and a view of length 0.
///
/// ## Specific Error Codes
/// * 1 = `out_handle` or `out_view` is null.
///
/// # Safety
///
/// `out_handle` and `out_view` must each be null or valid for a write.
#[no_mangle]
#[must_use]
pub unsafe extern "C" fn clipper_path_new(
    out_handle: *mut u64,
    out_view: *mut PathView,
) -> ClipperStatus {
    guard("clipper_path_new", || {
        let out_handle = out_param(out_handle, "out_handle")?;
        let out_view = out_param(out_view, "out_view")?;
        let (id, view) = with_state(|state| {
            let id = state.store.new_path();
            Ok((id, PathView::of(state.store.path_mut(id)?)))
        })?;
        out_handle.as_ptr().write(export(id));
        out_view.as_ptr().write(view);
        Ok(())
    })
}

/// Allocates a path of `len` points at the origin.
///
/// The returned view may be written through to fill the path in place.
///
/// ## Specific Error Codes
/// * 1 = an out-parameter is null, or the storage could not be allocated.
///
/// # Safety
///
/// `out_handle` and `out_view` must each be null or valid for a write.
#[no_mangle]
#[must_use]
pub unsafe extern "C" fn clipper_path_new_sized(
    len: usize,
    out_handle: *mut u64,
    out_view: *mut PathView,
) -> ClipperStatus {
    guard("clipper_path_new_sized", || {
        let out_handle = out_param(out_handle, "out_handle")?;
        let out_view = out_param(out_view, "out_view")?;
        let (id, view) = with_state(|state| {
            let id = state.store.new_path_sized(len)?;
            Ok((id, PathView::of(state.store.path_mut(id)?)))
        })?;
        out_handle.as_ptr().write(export(id));
        out_view.as_ptr().write(view);
        Ok(())
    })
}

/// Writes the current view of a path.
///
/// ## Specific Error Codes
/// * 1 = `out_view` is null, the handle is stale, or the path was moved into
///   a collection.
///
/// # Safety
///
/// `out_view` must be null or valid for a write.
#[no_mangle]
#[must_use]
pub unsafe extern "C" fn clipper_path_data(handle: u64, out_view: *mut PathView) -> ClipperStatus {
    guard("clipper_path_data", || {
        let out_view = out_param(out_view, "out_view")?;
        let id: PathId = import(handle, HandleKind::Path)?;
        let view = with_state(|state| Ok(PathView::of(state.store.path_mut(id)?)))?;
        out_view.as_ptr().write(view);
        Ok(())
    })
}

/// Appends `point` and writes the refreshed view.
///
/// Any view obtained earlier for this path is invalidated.
///
/// ## Specific Error Codes
/// * 1 = `out_view` is null, the handle is stale or consumed, or the storage
///   could not grow.
///
/// # Safety
///
/// `out_view` must be null or valid for a write.
#[no_mangle]
#[must_use]
pub unsafe extern "C" fn clipper_path_push_back(
    handle: u64,
    point: Point,
    out_view: *mut PathView,
) -> ClipperStatus {
    guard("clipper_path_push_back", || {
        let out_view = out_param(out_view, "out_view")?;
        let id: PathId = import(handle, HandleKind::Path)?;
        let view = with_state(|state| Ok(PathView::of(state.store.push_point(id, point)?)))?;
        out_view.as_ptr().write(view);
        Ok(())
    })
}

/// Grows the path with origin points or truncates it to `len`, then writes
/// the refreshed view.
///
/// ## Specific Error Codes
/// * 1 = `out_view` is null, the handle is stale or consumed, or the storage
///   could not grow.
///
/// # Safety
///
/// `out_view` must be null or valid for a write.
#[no_mangle]
#[must_use]
pub unsafe extern "C" fn clipper_path_resize(
    handle: u64,
    len: usize,
    out_view: *mut PathView,
) -> ClipperStatus {
    guard("clipper_path_resize", || {
        let out_view = out_param(out_view, "out_view")?;
        let id: PathId = import(handle, HandleKind::Path)?;
        let view = with_state(|state| Ok(PathView::of(state.store.resize_path(id, len)?)))?;
        out_view.as_ptr().write(view);
        Ok(())
    })
}

/// Releases a path.
///
/// ## Specific Error Codes
/// * 1 = the handle is stale, or the path was moved into a collection. The
///   handle is unusable afterwards in both cases.
#[no_mangle]
#[must_use]
pub extern "C" fn clipper_path_delete(handle: u64) -> ClipperStatus {
    guard("clipper_path_delete", || {
        let id: PathId = import(handle, HandleKind::Path)?;
        with_state(|state| state.store.remove_path(id))?;
        trace!(handle, "path handle released");
        Ok(())
    })
}
