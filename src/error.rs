use std::collections::TryReserveError;
use std::fmt;

use thiserror::Error;

/// Top-level error type for the clipping boundary.
#[derive(Debug, Error)]
pub enum ClipperError {
    #[error(transparent)]
    Handle(#[from] HandleError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Alloc(#[from] AllocError),

    #[error(transparent)]
    Argument(#[from] ArgumentError),
}

impl ClipperError {
    /// Status code reported across the C boundary.
    ///
    /// `2` marks geometry the engine cannot resolve, `1` every other failure.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::Geometry(_) => 2,
            Self::Handle(_) | Self::Engine(_) | Self::Alloc(_) | Self::Argument(_) => 1,
        }
    }
}

/// Kind of object a handle refers to, used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Path,
    PathCollection,
    Clipper,
    Offset,
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Path => "path",
            Self::PathCollection => "path collection",
            Self::Clipper => "clipper",
            Self::Offset => "clipper offset",
        };
        f.write_str(name)
    }
}

/// Errors raised by the handle table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HandleError {
    #[error("stale or unknown {kind} handle")]
    Invalid { kind: HandleKind },

    #[error("{kind} handle was consumed by a move into a collection")]
    Consumed { kind: HandleKind },

    #[error("index {index} is out of range for a collection of {len} paths")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Errors for input geometry the engines cannot resolve.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("coordinate ({x}, {y}) is outside the supported range of +/-{max}")]
    CoordinateOutOfRange { x: i64, y: i64, max: i64 },

    #[error("open paths can only be registered as subject paths")]
    OpenClipPath,

    #[error("offsetting by {delta} would leave the supported coordinate range")]
    OffsetOutOfRange { delta: f64 },
}

/// Internal engine faults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("{0} elements exceed the engine's index range")]
    InputTooLarge(usize),

    #[error("panic in {call}: {message}")]
    Panicked { call: &'static str, message: String },
}

/// Out-of-memory conditions while growing a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocError {
    #[error("allocation of {requested} additional elements failed")]
    Exhausted { requested: usize },
}

impl AllocError {
    pub(crate) fn exhausted(requested: usize) -> impl FnOnce(TryReserveError) -> Self {
        move |_| Self::Exhausted { requested }
    }
}

/// Errors for malformed arguments received at the boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArgumentError {
    #[error("null pointer passed for `{0}`")]
    NullPointer(&'static str),

    #[error("{value} is not a valid {kind}")]
    InvalidEnum { kind: &'static str, value: i32 },

    #[error("unknown clip option bits {0:#x}")]
    UnknownOptions(u32),

    #[error("invalid {parameter}: {value}")]
    InvalidParameter { parameter: &'static str, value: f64 },
}

/// Convenience type alias for results using [`ClipperError`].
pub type Result<T> = std::result::Result<T, ClipperError>;
