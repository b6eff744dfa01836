/// Ids, viewport and animatable properties.
pub mod core;
/// Error taxonomy.
pub mod error;
