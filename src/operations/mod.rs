pub mod clip;
mod engine;
pub mod offset;

pub use clip::{ClipOptions, ClipSolution, ClipType, Clipper, FillRule, PolyType};
pub use offset::{ClipperOffset, EndType, JoinType, OffsetParams};
