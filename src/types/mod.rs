//! Core data types: index tables, hits, configuration and errors.

pub mod error;
pub mod hits;
pub mod index;
pub mod params;

// Re-export commonly used items
pub use error::{IndexError, SearchError};
pub use hits::{CapacityReached, Hit, HitSet};
pub use index::{Database, Entry, Segment, SegmentDatabase};
pub use params::{
    SearchLimits, SearchParams, DEFAULT_EPS, DEFAULT_MAX_FRAGMENT_LEN, DEFAULT_MAX_HITS,
    DEFAULT_MAX_JUNCTIONS,
};
