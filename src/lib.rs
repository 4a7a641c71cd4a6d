pub mod error;
pub mod ffi;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod store;

pub use error::{ClipperError, Result};
pub use math::Point;
