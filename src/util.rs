//! Shared helpers: edit distances, model persistence, filesystem.

pub mod edit_distance;
pub mod fs;
pub mod persist;
