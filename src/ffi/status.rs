use std::any::Any;
use std::cell::RefCell;
use std::ffi::{c_char, CString};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;

use tracing::warn;

use crate::error::{ClipperError, EngineError, Result};

/// Outcome of a boundary call.
///
/// `code` is `0` on success, `1` for a generic failure and `2` for geometry
/// the engine cannot handle. On failure `message` points to a NUL-terminated
/// description owned by the library, valid until the next failing call on
/// the same thread. On success it is null.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipperStatus {
    pub code: i32,
    pub message: *const c_char,
}

impl ClipperStatus {
    pub const OK: Self = Self {
        code: 0,
        message: ptr::null(),
    };

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}

thread_local! {
    static LAST_MESSAGE: RefCell<CString> = RefCell::new(CString::default());
}

/// Runs a boundary call, converting errors and panics into a status.
pub(super) fn guard(call: &'static str, f: impl FnOnce() -> Result<()>) -> ClipperStatus {
    let result = panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        Err(EngineError::Panicked {
            call,
            message: panic_message(payload.as_ref()),
        }
        .into())
    });
    match result {
        Ok(()) => ClipperStatus::OK,
        Err(err) => {
            warn!(call, code = err.code(), error = %err, "boundary call failed");
            failure(&err)
        }
    }
}

fn failure(err: &ClipperError) -> ClipperStatus {
    let text = CString::new(err.to_string().replace('\0', " ")).unwrap_or_default();
    LAST_MESSAGE.with(|slot| {
        let mut slot = slot.borrow_mut();
        *slot = text;
        ClipperStatus {
            code: err.code(),
            message: slot.as_ptr(),
        }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}
