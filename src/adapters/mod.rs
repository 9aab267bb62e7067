//! Adapters between flat numeric buffers and the typed tables.

pub mod flat;

pub use flat::{entries_from_rows, hits_to_rows, points_from_flat, segments_from_rows};
