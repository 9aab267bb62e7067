//! Error types for loop searches and index construction.

use super::hits::Hit;
use thiserror::Error;

/// Errors that end a loop search.
///
/// Infeasible candidate windows and degenerate candidates are not errors;
/// they are skipped silently and only show up as missing hits.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error("degenerate query fragment: covariance determinant {det:e} for {len} points")]
    DegenerateQuery { len: usize, det: f64 },

    #[error("query fragment of {len} points exceeds working buffer of {max}")]
    FragmentTooLong { len: usize, max: usize },

    #[error("hit capacity reached after {} hits; results are truncated", .hits.len())]
    HitCapacityExceeded { hits: Vec<Hit> },
}

impl SearchError {
    /// Hits gathered before the search stopped, if any were kept.
    pub fn partial_hits(&self) -> Option<&[Hit]> {
        match self {
            SearchError::HitCapacityExceeded { hits } => Some(hits),
            _ => None,
        }
    }

    pub fn into_partial_hits(self) -> Option<Vec<Hit>> {
        match self {
            SearchError::HitCapacityExceeded { hits } => Some(hits),
            _ => None,
        }
    }
}

/// Errors raised while building or checking index tables and flat buffers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("segment {segment} covers points {offset}..{offset}+{length}, database has {points}")]
    SegmentOutOfRange {
        segment: usize,
        offset: usize,
        length: usize,
        points: usize,
    },

    #[error("entry {entry} covers segments {segment_offset}..{segment_offset}+{segment_count}, table has {segments}")]
    EntryOutOfRange {
        entry: usize,
        segment_offset: usize,
        segment_count: usize,
        segments: usize,
    },

    #[error("{points} points but {residues} residue numbers")]
    LengthMismatch { points: usize, residues: usize },

    #[error("flat coordinate buffer of length {0} is not a multiple of 3")]
    RaggedCoordinates(usize),

    #[error("row {row}: field `{field}` has invalid value {value}")]
    InvalidField {
        row: usize,
        field: &'static str,
        value: i64,
    },
}
