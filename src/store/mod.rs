use slotmap::SlotMap;
use tracing::trace;

use crate::error::{HandleError, HandleKind, Result};
use crate::geometry::{Path, PathCollection};
use crate::math::Point;
use crate::operations::{
    ClipOptions, Clipper, ClipperOffset, EndType, JoinType, OffsetParams, PolyType,
};

slotmap::new_key_type! {
    /// Identifier of a path buffer.
    pub struct PathId;
    /// Identifier of a path collection.
    pub struct PathsId;
    /// Identifier of a clip engine.
    pub struct ClipperId;
    /// Identifier of an offset engine.
    pub struct OffsetId;
}

/// A path slot. Moving a path into a collection leaves a tombstone so later
/// use of the old identifier is reported as consumed rather than unknown.
#[derive(Debug)]
enum PathSlot {
    Live(Path),
    Consumed,
}

/// Arena owning every object reachable through a handle.
///
/// Objects reference each other only through typed generational keys, so
/// stale identifiers are detected instead of aliasing reused slots.
#[derive(Debug, Default)]
pub struct HandleStore {
    paths: SlotMap<PathId, PathSlot>,
    collections: SlotMap<PathsId, PathCollection>,
    clippers: SlotMap<ClipperId, Clipper>,
    offsets: SlotMap<OffsetId, ClipperOffset>,
}

impl HandleStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Path operations ---

    /// Allocates an empty path.
    pub fn new_path(&mut self) -> PathId {
        self.insert_path(Path::new())
    }

    /// Allocates a path of `len` origin points.
    ///
    /// # Errors
    ///
    /// Returns `AllocError::Exhausted` if the storage cannot be reserved.
    pub fn new_path_sized(&mut self, len: usize) -> Result<PathId> {
        Ok(self.insert_path(Path::with_len(len)?))
    }

    fn insert_path(&mut self, path: Path) -> PathId {
        let id = self.paths.insert(PathSlot::Live(path));
        trace!(?id, "path allocated");
        id
    }

    /// Returns the path behind `id`.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::Invalid` for an unknown identifier and
    /// `HandleError::Consumed` for a path moved into a collection.
    pub fn path(&self, id: PathId) -> Result<&Path> {
        match self.paths.get(id) {
            Some(PathSlot::Live(path)) => Ok(path),
            Some(PathSlot::Consumed) => Err(consumed()),
            None => Err(invalid(HandleKind::Path)),
        }
    }

    /// Returns the path behind `id` for in-place mutation.
    ///
    /// # Errors
    ///
    /// Same as [`HandleStore::path`].
    pub fn path_mut(&mut self, id: PathId) -> Result<&mut Path> {
        match self.paths.get_mut(id) {
            Some(PathSlot::Live(path)) => Ok(path),
            Some(PathSlot::Consumed) => Err(consumed()),
            None => Err(invalid(HandleKind::Path)),
        }
    }

    /// Appends a point and returns the updated path.
    ///
    /// # Errors
    ///
    /// Same as [`HandleStore::path`], or `AllocError::Exhausted`.
    pub fn push_point(&mut self, id: PathId, point: Point) -> Result<&mut Path> {
        let path = self.path_mut(id)?;
        path.try_push(point)?;
        Ok(path)
    }

    /// Resizes a path and returns it.
    ///
    /// # Errors
    ///
    /// Same as [`HandleStore::push_point`].
    pub fn resize_path(&mut self, id: PathId, len: usize) -> Result<&mut Path> {
        let path = self.path_mut(id)?;
        path.resize(len)?;
        Ok(path)
    }

    /// Releases a path.
    ///
    /// Releasing a consumed path frees its tombstone but still reports
    /// `HandleError::Consumed`.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::Invalid` or `HandleError::Consumed`.
    pub fn remove_path(&mut self, id: PathId) -> Result<()> {
        match self.paths.remove(id) {
            Some(PathSlot::Live(_)) => {
                trace!(?id, "path released");
                Ok(())
            }
            Some(PathSlot::Consumed) => {
                trace!(?id, "consumed path tombstone released");
                Err(consumed())
            }
            None => Err(invalid(HandleKind::Path)),
        }
    }

    // --- Path collection operations ---

    /// Allocates an empty collection.
    pub fn new_paths(&mut self) -> PathsId {
        self.insert_paths(PathCollection::new())
    }

    /// Allocates a collection of `len` empty paths.
    ///
    /// # Errors
    ///
    /// Returns `AllocError::Exhausted` if the storage cannot be reserved.
    pub fn new_paths_sized(&mut self, len: usize) -> Result<PathsId> {
        Ok(self.insert_paths(PathCollection::with_len(len)?))
    }

    /// Takes ownership of an existing collection, such as an engine result.
    pub fn insert_paths(&mut self, paths: PathCollection) -> PathsId {
        let id = self.collections.insert(paths);
        trace!(?id, "path collection allocated");
        id
    }

    /// Returns the collection behind `id`.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::Invalid` for an unknown identifier.
    pub fn paths(&self, id: PathsId) -> Result<&PathCollection> {
        self.collections
            .get(id)
            .ok_or_else(|| invalid(HandleKind::PathCollection))
    }

    /// Returns the collection behind `id` for mutation.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::Invalid` for an unknown identifier.
    pub fn paths_mut(&mut self, id: PathsId) -> Result<&mut PathCollection> {
        self.collections
            .get_mut(id)
            .ok_or_else(|| invalid(HandleKind::PathCollection))
    }

    /// Moves a path into a collection, consuming the path identifier.
    ///
    /// Nothing changes unless the move succeeds: the collection is checked
    /// and grown before the path is taken.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::Invalid` or `HandleError::Consumed` for either
    /// identifier, or `AllocError::Exhausted`.
    pub fn move_path_into(
        &mut self,
        paths_id: PathsId,
        path_id: PathId,
    ) -> Result<&mut PathCollection> {
        let collection = self
            .collections
            .get_mut(paths_id)
            .ok_or_else(|| invalid(HandleKind::PathCollection))?;
        collection.reserve(1)?;

        let slot = self
            .paths
            .get_mut(path_id)
            .ok_or_else(|| invalid(HandleKind::Path))?;
        let PathSlot::Live(path) = std::mem::replace(slot, PathSlot::Consumed) else {
            return Err(consumed());
        };
        collection.push(path)?;
        trace!(?path_id, ?paths_id, "path moved into collection");
        Ok(collection)
    }

    /// Releases a collection and every path it owns.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::Invalid` for an unknown identifier.
    pub fn remove_paths(&mut self, id: PathsId) -> Result<()> {
        self.collections
            .remove(id)
            .ok_or_else(|| invalid(HandleKind::PathCollection))?;
        trace!(?id, "path collection released");
        Ok(())
    }

    // --- Clip engine operations ---

    /// Allocates a clip engine.
    pub fn new_clipper(&mut self, options: ClipOptions) -> ClipperId {
        let id = self.clippers.insert(Clipper::new(options));
        trace!(?id, ?options, "clipper allocated");
        id
    }

    /// Returns the clip engine behind `id`.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::Invalid` for an unknown identifier.
    pub fn clipper(&self, id: ClipperId) -> Result<&Clipper> {
        self.clippers
            .get(id)
            .ok_or_else(|| invalid(HandleKind::Clipper))
    }

    /// Returns the clip engine behind `id` for mutation.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::Invalid` for an unknown identifier.
    pub fn clipper_mut(&mut self, id: ClipperId) -> Result<&mut Clipper> {
        self.clippers
            .get_mut(id)
            .ok_or_else(|| invalid(HandleKind::Clipper))
    }

    /// Registers a stored path with a clip engine.
    ///
    /// # Errors
    ///
    /// Handle errors for either identifier, or the engine's registration
    /// errors.
    pub fn clipper_add_path(
        &mut self,
        id: ClipperId,
        path_id: PathId,
        role: PolyType,
        closed: bool,
    ) -> Result<bool> {
        let path = match self.paths.get(path_id) {
            Some(PathSlot::Live(path)) => path,
            Some(PathSlot::Consumed) => return Err(consumed()),
            None => return Err(invalid(HandleKind::Path)),
        };
        let clipper = self
            .clippers
            .get_mut(id)
            .ok_or_else(|| invalid(HandleKind::Clipper))?;
        clipper.add_path(path, role, closed)
    }

    /// Registers every path of a stored collection with a clip engine.
    ///
    /// # Errors
    ///
    /// Handle errors for either identifier, or the engine's registration
    /// errors.
    pub fn clipper_add_paths(
        &mut self,
        id: ClipperId,
        paths_id: PathsId,
        role: PolyType,
        closed: bool,
    ) -> Result<bool> {
        let paths = self
            .collections
            .get(paths_id)
            .ok_or_else(|| invalid(HandleKind::PathCollection))?;
        let clipper = self
            .clippers
            .get_mut(id)
            .ok_or_else(|| invalid(HandleKind::Clipper))?;
        clipper.add_paths(paths, role, closed)
    }

    /// Releases a clip engine.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::Invalid` for an unknown identifier.
    pub fn remove_clipper(&mut self, id: ClipperId) -> Result<()> {
        self.clippers
            .remove(id)
            .ok_or_else(|| invalid(HandleKind::Clipper))?;
        trace!(?id, "clipper released");
        Ok(())
    }

    // --- Offset engine operations ---

    /// Allocates an offset engine.
    pub fn new_offset(&mut self, params: OffsetParams) -> OffsetId {
        let id = self.offsets.insert(ClipperOffset::new(params));
        trace!(?id, ?params, "clipper offset allocated");
        id
    }

    /// Returns the offset engine behind `id`.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::Invalid` for an unknown identifier.
    pub fn offset(&self, id: OffsetId) -> Result<&ClipperOffset> {
        self.offsets
            .get(id)
            .ok_or_else(|| invalid(HandleKind::Offset))
    }

    /// Returns the offset engine behind `id` for mutation.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::Invalid` for an unknown identifier.
    pub fn offset_mut(&mut self, id: OffsetId) -> Result<&mut ClipperOffset> {
        self.offsets
            .get_mut(id)
            .ok_or_else(|| invalid(HandleKind::Offset))
    }

    /// Registers a stored path with an offset engine.
    ///
    /// # Errors
    ///
    /// Handle errors for either identifier, or the engine's registration
    /// errors.
    pub fn offset_add_path(
        &mut self,
        id: OffsetId,
        path_id: PathId,
        join: JoinType,
        end: EndType,
    ) -> Result<bool> {
        let path = match self.paths.get(path_id) {
            Some(PathSlot::Live(path)) => path,
            Some(PathSlot::Consumed) => return Err(consumed()),
            None => return Err(invalid(HandleKind::Path)),
        };
        let offset = self
            .offsets
            .get_mut(id)
            .ok_or_else(|| invalid(HandleKind::Offset))?;
        offset.add_path(path, join, end)
    }

    /// Registers every path of a stored collection with an offset engine.
    ///
    /// # Errors
    ///
    /// Handle errors for either identifier, or the engine's registration
    /// errors.
    pub fn offset_add_paths(
        &mut self,
        id: OffsetId,
        paths_id: PathsId,
        join: JoinType,
        end: EndType,
    ) -> Result<bool> {
        let paths = self
            .collections
            .get(paths_id)
            .ok_or_else(|| invalid(HandleKind::PathCollection))?;
        let offset = self
            .offsets
            .get_mut(id)
            .ok_or_else(|| invalid(HandleKind::Offset))?;
        offset.add_paths(paths, join, end)
    }

    /// Releases an offset engine.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::Invalid` for an unknown identifier.
    pub fn remove_offset(&mut self, id: OffsetId) -> Result<()> {
        self.offsets
            .remove(id)
            .ok_or_else(|| invalid(HandleKind::Offset))?;
        trace!(?id, "clipper offset released");
        Ok(())
    }
}

fn invalid(kind: HandleKind) -> crate::error::ClipperError {
    HandleError::Invalid { kind }.into()
}

fn consumed() -> crate::error::ClipperError {
    HandleError::Consumed {
        kind: HandleKind::Path,
    }
    .into()
}
