//! PATH-based resolution

mod path;

pub use path::{PathResolution, PathResolver};
