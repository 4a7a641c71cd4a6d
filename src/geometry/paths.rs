use std::ops::Deref;

use crate::error::{AllocError, HandleError};

use super::Path;

/// An ordered set of paths owned by value.
///
/// Paths are moved in, never copied point by point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathCollection {
    paths: Vec<Path>,
}

impl PathCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection of `len` empty paths.
    ///
    /// # Errors
    ///
    /// Returns `AllocError::Exhausted` if the storage cannot be reserved.
    pub fn with_len(len: usize) -> Result<Self, AllocError> {
        let mut paths = Vec::new();
        paths
            .try_reserve_exact(len)
            .map_err(AllocError::exhausted(len))?;
        paths.resize_with(len, Path::new);
        Ok(Self { paths })
    }

    /// Reserves room for `additional` more paths.
    ///
    /// # Errors
    ///
    /// Returns `AllocError::Exhausted` if the storage cannot grow.
    pub fn reserve(&mut self, additional: usize) -> Result<(), AllocError> {
        self.paths
            .try_reserve(additional)
            .map_err(AllocError::exhausted(additional))
    }

    /// Moves `path` to the end of the collection.
    ///
    /// # Errors
    ///
    /// Returns `AllocError::Exhausted` if the storage cannot grow.
    pub fn push(&mut self, path: Path) -> Result<(), AllocError> {
        self.reserve(1)?;
        self.paths.push(path);
        Ok(())
    }

    /// Returns the path at `index`.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::IndexOutOfRange` past the end.
    pub fn get(&self, index: usize) -> Result<&Path, HandleError> {
        let len = self.paths.len();
        self.paths
            .get(index)
            .ok_or(HandleError::IndexOutOfRange { index, len })
    }

    /// Returns the path at `index` for in-place mutation.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::IndexOutOfRange` past the end.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut Path, HandleError> {
        let len = self.paths.len();
        self.paths
            .get_mut(index)
            .ok_or(HandleError::IndexOutOfRange { index, len })
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Path> {
        self.paths.iter_mut()
    }
}

impl Deref for PathCollection {
    type Target = [Path];

    fn deref(&self) -> &[Path] {
        &self.paths
    }
}

impl From<Vec<Path>> for PathCollection {
    fn from(paths: Vec<Path>) -> Self {
        Self { paths }
    }
}

impl FromIterator<Path> for PathCollection {
    fn from_iter<I: IntoIterator<Item = Path>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}
