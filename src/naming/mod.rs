//! Card-name to filename handling.
//!
//! - `sanitize`: turns a printed card name into a filesystem-safe base name
//! - `allocator`: hands out unique base names per set, tracking duplicates

pub mod allocator;
pub mod sanitize;

pub use allocator::{Allocation, NameAllocator};
pub use sanitize::{sanitize, FACE_SEPARATOR};
