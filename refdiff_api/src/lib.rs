//! Shared refdiff data models consumed by the core engine and presentation layers.

pub mod diff;
pub mod mapping;
pub mod refs;
pub mod tree;

pub use diff::*;
pub use mapping::*;
pub use refs::*;
pub use tree::*;
