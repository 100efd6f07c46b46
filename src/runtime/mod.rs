//! Background persistence worker and the owning log handle.

/// Event stream types emitted by the persistence worker.
pub mod events;
/// Worker loop, handles, and startup.
pub mod handle;
