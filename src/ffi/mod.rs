//! Flat C interface over the handle store.
//!
//! Every object is reached through a `u64` handle. Every fallible call
//! returns a [`ClipperStatus`]; out-parameters are written only when the
//! status code is zero.
//!
//! Views returned by the `*_data` calls point into library-owned storage
//! and stay valid until the next call that mutates or releases the same
//! object (or the collection owning it).

mod clipper;
mod offset;
mod path;
mod paths;
mod status;
mod view;

use std::ptr::NonNull;
use std::sync::{Mutex, OnceLock, PoisonError};

use slotmap::{Key, KeyData, SecondaryMap};
use tracing::warn;

use crate::error::{ArgumentError, HandleError, HandleKind, Result};
use crate::store::{HandleStore, PathsId};

pub use clipper::{
    clipper_add_path, clipper_add_paths, clipper_clear, clipper_delete,
    clipper_execute_closed, clipper_execute_open_closed, clipper_new,
};
pub use offset::{
    clipper_offset_add_path, clipper_offset_add_paths, clipper_offset_clear,
    clipper_offset_delete, clipper_offset_execute, clipper_offset_new, clipper_offset_new_with,
};
pub use path::{
    clipper_path_data, clipper_path_delete, clipper_path_new, clipper_path_new_sized,
    clipper_path_push_back, clipper_path_resize,
};
pub use paths::{
    clipper_paths_data, clipper_paths_delete, clipper_paths_new, clipper_paths_new_sized,
    clipper_paths_path_data, clipper_paths_path_push_back, clipper_paths_path_resize,
    clipper_paths_push_back_move,
};
pub use status::ClipperStatus;
pub use view::{PathView, PathsView};

/// Everything the C interface keeps alive between calls.
#[derive(Default)]
struct BoundaryState {
    store: HandleStore,
    /// Per-element view tables handed out for collections.
    element_views: SecondaryMap<PathsId, Vec<PathView>>,
}

// SAFETY: the raw pointers inside `element_views` point into buffers owned
// by `store`. They are only handed to the host and never dereferenced here.
unsafe impl Send for BoundaryState {}

/// The one piece of state shared by every handle. Bare `u64` handles must
/// resolve from any call, so the arena lives here; engines share nothing
/// else.
static STATE: OnceLock<Mutex<BoundaryState>> = OnceLock::new();

/// Runs `f` with exclusive access to the process-wide state.
fn with_state<T>(f: impl FnOnce(&mut BoundaryState) -> Result<T>) -> Result<T> {
    let mutex = STATE.get_or_init(|| Mutex::new(BoundaryState::default()));
    let mut state = mutex.lock().unwrap_or_else(|poisoned| {
        warn!("recovering handle table after a panic");
        PoisonError::into_inner(poisoned)
    });
    f(&mut state)
}

fn export<K: Key>(key: K) -> u64 {
    key.data().as_ffi()
}

/// Decodes a handle, rejecting values no live key can have.
fn import<K: Key>(raw: u64, kind: HandleKind) -> Result<K> {
    // Occupied slots always carry an odd version.
    if (raw >> 32) & 1 == 0 {
        return Err(HandleError::Invalid { kind }.into());
    }
    Ok(KeyData::from_ffi(raw).into())
}

fn out_param<T>(ptr: *mut T, name: &'static str) -> Result<NonNull<T>> {
    NonNull::new(ptr).ok_or_else(|| ArgumentError::NullPointer(name).into())
}

fn flag(value: i32) -> bool {
    value != 0
}
