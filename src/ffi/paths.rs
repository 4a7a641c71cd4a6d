use super::status::guard;
use super::{
    export, import, out_param, with_state, BoundaryState, ClipperStatus, PathView, PathsView,
};
use crate::error::{HandleError, HandleKind, Result};
use crate::math::Point;
use crate::store::{PathId, PathsId};

impl BoundaryState {
    /// Refreshes and returns the element view table of a collection.
    fn paths_view(&mut self, id: PathsId) -> Result<PathsView> {
        let paths = self.store.paths_mut(id)?;
        let table = self
            .element_views
            .entry(id)
            .ok_or(HandleError::Invalid {
                kind: HandleKind::PathCollection,
            })?
            .or_default();
        PathsView::refresh(paths, table)
    }

    fn element_view(&mut self, id: PathsId, index: usize) -> Result<PathView> {
        let paths = self.store.paths_mut(id)?;
        Ok(PathView::of(paths.get_mut(index)?))
    }
}

/// Allocates an empty path collection.
///
/// ## Specific Error Codes
/// * 1 = `out_handle` or `out_view` is null.
///
/// # Safety
///
/// `out_handle` and `out_view` must each be null or valid for a write.
#[no_mangle]
#[must_use]
pub unsafe extern "C" fn clipper_paths_new(
    out_handle: *mut u64,
    out_view: *mut PathsView,
) -> ClipperStatus {
    guard("clipper_paths_new", || {
        let out_handle = out_param(out_handle, "out_handle")?;
        let out_view = out_param(out_view, "out_view")?;
        let (id, view) = with_state(|state| {
            let id = state.store.new_paths();
            Ok((id, state.paths_view(id)?))
        })?;
        out_handle.as_ptr().write(export(id));
        out_view.as_ptr().write(view);
        Ok(())
    })
}

/// Allocates a collection of `len` empty paths.
///
/// Elements are filled with [`clipper_paths_path_resize`] or
/// [`clipper_paths_path_push_back`].
///
/// ## Specific Error Codes
/// * 1 = an out-parameter is null, or the storage could not be allocated.
///
/// # Safety
///
/// `out_handle` and `out_view` must each be null or valid for a write.
#[no_mangle]
#[must_use]
pub unsafe extern "C" fn clipper_paths_new_sized(
    len: usize,
    out_handle: *mut u64,
    out_view: *mut PathsView,
) -> ClipperStatus {
    guard("clipper_paths_new_sized", || {
        let out_handle = out_param(out_handle, "out_handle")?;
        let out_view = out_param(out_view, "out_view")?;
        let (id, view) = with_state(|state| {
            let id = state.store.new_paths_sized(len)?;
            Ok((id, state.paths_view(id)?))
        })?;
        out_handle.as_ptr().write(export(id));
        out_view.as_ptr().write(view);
        Ok(())
    })
}

/// Writes the current view of a collection.
///
/// Repeated calls on an unchanged collection write the same table pointer.
///
/// ## Specific Error Codes
/// * 1 = `out_view` is null or the handle is stale.
///
/// # Safety
///
/// `out_view` must be null or valid for a write.
#[no_mangle]
#[must_use]
pub unsafe extern "C" fn clipper_paths_data(
    handle: u64,
    out_view: *mut PathsView,
) -> ClipperStatus {
    guard("clipper_paths_data", || {
        let out_view = out_param(out_view, "out_view")?;
        let id: PathsId = import(handle, HandleKind::PathCollection)?;
        let view = with_state(|state| state.paths_view(id))?;
        out_view.as_ptr().write(view);
        Ok(())
    })
}

/// Moves a path into a collection and writes the refreshed collection view.
///
/// The path's storage is transferred, not copied. On success the path
/// handle is consumed: every later call with it, including
/// [`super::clipper_path_delete`], fails. On failure nothing changes.
///
/// ## Specific Error Codes
/// * 1 = `out_view` is null, either handle is stale, the path was already
///   consumed, or the collection could not grow.
///
/// # Safety
///
/// `out_view` must be null or valid for a write.
#[no_mangle]
#[must_use]
pub unsafe extern "C" fn clipper_paths_push_back_move(
    handle: u64,
    path: u64,
    out_view: *mut PathsView,
) -> ClipperStatus {
    guard("clipper_paths_push_back_move", || {
        let out_view = out_param(out_view, "out_view")?;
        let id: PathsId = import(handle, HandleKind::PathCollection)?;
        let path_id: PathId = import(path, HandleKind::Path)?;
        let view = with_state(|state| {
            state.store.move_path_into(id, path_id)?;
            state.paths_view(id)
        })?;
        out_view.as_ptr().write(view);
        Ok(())
    })
}

/// Writes the view of element `index`.
///
/// ## Specific Error Codes
/// * 1 = `out_view` is null, the handle is stale, or `index` is out of range.
///
/// # Safety
///
/// `out_view` must be null or valid for a write.
#[no_mangle]
#[must_use]
pub unsafe extern "C" fn clipper_paths_path_data(
    handle: u64,
    index: usize,
    out_view: *mut PathView,
) -> ClipperStatus {
    guard("clipper_paths_path_data", || {
        let out_view = out_param(out_view, "out_view")?;
        let id: PathsId = import(handle, HandleKind::PathCollection)?;
        let view = with_state(|state| state.element_view(id, index))?;
        out_view.as_ptr().write(view);
        Ok(())
    })
}

/// Appends `point` to element `index` and writes its refreshed view.
///
/// Invalidates earlier views of that element and of the collection table.
///
/// ## Specific Error Codes
/// * 1 = `out_view` is null, the handle is stale, `index` is out of range,
///   or the storage could not grow.
///
/// # Safety
///
/// `out_view` must be null or valid for a write.
#[no_mangle]
#[must_use]
pub unsafe extern "C" fn clipper_paths_path_push_back(
    handle: u64,
    index: usize,
    point: Point,
    out_view: *mut PathView,
) -> ClipperStatus {
    guard("clipper_paths_path_push_back", || {
        let out_view = out_param(out_view, "out_view")?;
        let id: PathsId = import(handle, HandleKind::PathCollection)?;
        let view = with_state(|state| {
            let path = state.store.paths_mut(id)?.get_mut(index)?;
            path.try_push(point)?;
            Ok(PathView::of(path))
        })?;
        out_view.as_ptr().write(view);
        Ok(())
    })
}

/// Resizes element `index` to `len` points and writes its refreshed view.
///
/// ## Specific Error Codes
/// * 1 = `out_view` is null, the handle is stale, `index` is out of range,
///   or the storage could not grow.
///
/// # Safety
///
/// `out_view` must be null or valid for a write.
#[no_mangle]
#[must_use]
pub unsafe extern "C" fn clipper_paths_path_resize(
    handle: u64,
    index: usize,
    len: usize,
    out_view: *mut PathView,
) -> ClipperStatus {
    guard("clipper_paths_path_resize", || {
        let out_view = out_param(out_view, "out_view")?;
        let id: PathsId = import(handle, HandleKind::PathCollection)?;
        let view = with_state(|state| {
            let path = state.store.paths_mut(id)?.get_mut(index)?;
            path.resize(len)?;
            Ok(PathView::of(path))
        })?;
        out_view.as_ptr().write(view);
        Ok(())
    })
}

/// Releases a collection and every path it owns.
///
/// ## Specific Error Codes
/// * 1 = the handle is stale.
#[no_mangle]
#[must_use]
pub extern "C" fn clipper_paths_delete(handle: u64) -> ClipperStatus {
    guard("clipper_paths_delete", || {
        let id: PathsId = import(handle, HandleKind::PathCollection)?;
        with_state(|state| {
            state.store.remove_paths(id)?;
            state.element_views.remove(id);
            Ok(())
        })
    })
}
