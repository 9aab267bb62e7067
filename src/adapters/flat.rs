//! Conversion between flat numeric buffers and the typed index tables.
//!
//! Coordinate databases usually arrive as `(N, 3)` float arrays and the
//! index tables as `(N, 3)` / `(N, 2)` integer arrays:
//! - segment rows: `(point offset, first residue number, length)`
//! - entry rows: `(segment offset, segment count)`
//! - hit rows: `(entry row, segment row, offset)` plus `(score, rigidity)`

use crate::types::error::IndexError;
use crate::types::hits::Hit;
use crate::types::index::{Entry, Segment};
use glam::DVec3;

/// Interpret a flat `x0, y0, z0, x1, ...` buffer as points.
pub fn points_from_flat(flat: &[f64]) -> Result<Vec<DVec3>, IndexError> {
    if flat.len() % 3 != 0 {
        return Err(IndexError::RaggedCoordinates(flat.len()));
    }
    Ok(flat
        .chunks_exact(3)
        .map(|c| DVec3::new(c[0], c[1], c[2]))
        .collect())
}

fn non_negative(row: usize, field: &'static str, value: i64) -> Result<usize, IndexError> {
    usize::try_from(value).map_err(|_| IndexError::InvalidField { row, field, value })
}

pub fn segments_from_rows(rows: &[[i64; 3]]) -> Result<Vec<Segment>, IndexError> {
    rows.iter()
        .enumerate()
        .map(|(row, &[offset, first_residue, length])| {
            let first_residue =
                i32::try_from(first_residue).map_err(|_| IndexError::InvalidField {
                    row,
                    field: "first_residue",
                    value: first_residue,
                })?;
            Ok(Segment::new(
                non_negative(row, "offset", offset)?,
                first_residue,
                non_negative(row, "length", length)?,
            ))
        })
        .collect()
}

pub fn entries_from_rows(rows: &[[i64; 2]]) -> Result<Vec<Entry>, IndexError> {
    rows.iter()
        .enumerate()
        .map(|(row, &[segment_offset, segment_count])| {
            Ok(Entry::new(
                non_negative(row, "segment_offset", segment_offset)?,
                non_negative(row, "segment_count", segment_count)?,
            ))
        })
        .collect()
}

/// Split hits into index rows and `(score, rigidity)` rows.
pub fn hits_to_rows(hits: &[Hit]) -> (Vec<[i64; 3]>, Vec<[f64; 2]>) {
    hits.iter()
        .map(|h| {
            (
                [h.entry as i64, h.segment as i64, h.offset as i64],
                [h.score, h.rigidity],
            )
        })
        .unzip()
}
