use crate::error::{AllocError, Result};
use crate::geometry::{Path, PathCollection};
use crate::math::Point;

/// Zero-copy view of one path: base pointer and point count.
///
/// `data` may be written through in place for indices below `len`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathView {
    pub data: *mut Point,
    pub len: usize,
}

impl PathView {
    pub(crate) fn of(path: &mut Path) -> Self {
        Self {
            data: path.as_mut_ptr(),
            len: path.len(),
        }
    }
}

/// Zero-copy view of a collection: one [`PathView`] per element.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathsView {
    pub data: *const PathView,
    pub len: usize,
}

impl PathsView {
    /// Rebuilds `table` in place from `paths` and views it.
    ///
    /// The table keeps its allocation, so an unchanged collection yields
    /// the same pointer on every call.
    pub(crate) fn refresh(
        paths: &mut PathCollection,
        table: &mut Vec<PathView>,
    ) -> Result<Self> {
        table.clear();
        table
            .try_reserve(paths.len())
            .map_err(AllocError::exhausted(paths.len()))?;
        table.extend(paths.iter_mut().map(PathView::of));
        Ok(Self {
            data: table.as_ptr(),
            len: table.len(),
        })
    }
}
