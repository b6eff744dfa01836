//! Pure sampling primitives shared by timelines and idle loops.

/// Easing curves.
pub mod ease;
/// Procedural scalars and deterministic hashing.
pub mod proc;
