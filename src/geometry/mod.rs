pub mod path;
pub mod paths;

pub use path::{strip_duplicates, Path};
pub use paths::PathCollection;
