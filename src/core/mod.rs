//! In-memory dive index, its shared handle, and query helpers.

/// Time-ordered dive index.
pub mod log;
/// Date filters and pagination over the index.
pub mod query;
/// Lock-guarded shared handle to the index.
pub mod shared;
