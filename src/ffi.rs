//! C ABI for the loop search.
//!
//! Buffers are passed as raw pointers plus explicit lengths. Hits are written
//! into caller-owned arrays of at least `max_hits` rows.

use glam::DVec3;
use std::slice;
use tracing::warn;

use crate::adapters::flat::{entries_from_rows, segments_from_rows};
use crate::ops::search::search;
use crate::types::{Database, Hit, SearchError, SearchLimits, SearchParams};

/// Degenerate or oversized query.
pub const BC_ERR_QUERY: i32 = -1;
/// Null pointer, negative argument or inconsistent index tables.
pub const BC_ERR_ARGS: i32 = -2;

unsafe fn slice_or_empty<'a, T>(ptr: *const T, len: usize) -> Option<&'a [T]> {
    if len == 0 {
        return Some(&[]);
    }
    if ptr.is_null() {
        return None;
    }
    Some(slice::from_raw_parts(ptr, len))
}

fn to_points(rows: &[[f64; 3]]) -> Vec<DVec3> {
    rows.iter().map(|&p| DVec3::from_array(p)).collect()
}

/// Copy hits into the caller's buffers. Returns `None` if a row index or
/// the hit count does not fit in an `i32`.
fn write_hits(
    hits: &[Hit],
    out_hits: &mut [[i32; 3]],
    out_stats: &mut [[f32; 2]],
) -> Option<i32> {
    for ((hit, row), stat) in hits.iter().zip(out_hits.iter_mut()).zip(out_stats.iter_mut()) {
        *row = [
            i32::try_from(hit.entry).ok()?,
            i32::try_from(hit.segment).ok()?,
            i32::try_from(hit.offset).ok()?,
        ];
        *stat = [hit.score as f32, hit.rigidity as f32];
    }
    i32::try_from(hits.len()).ok()
}

/// Run a loop search over caller-provided buffers.
///
/// Returns the number of hits written, [`BC_ERR_QUERY`] or [`BC_ERR_ARGS`].
/// When the hit capacity is reached the return value equals `max_hits` and
/// the scan was cut short. Scores and rigidities are filtered in single
/// precision against `min_bc` and `max_r`, matching the `f32` statistics
/// written to `hitstats`.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub extern "C" fn bc_loop_search(
    atoms1: *const [f64; 3],
    nr_atoms1: usize,
    atoms2: *const [f64; 3],
    nr_atoms2: usize,
    loop_length: i32,
    min_loop_match: i32,
    max_loop_gap: i32,
    mirror: i32,
    min_bc: f32,
    max_r: f32,
    dbca: *const [f64; 3],
    nr_dbca: usize,
    seg_index: *const [i32; 3],
    nr_seg_index: usize,
    pdb_index: *const [i32; 2],
    nr_pdb_index: usize,
    hits: *mut [i32; 3],
    hitstats: *mut [f32; 2],
    max_hits: usize,
) -> i32 {
    let (Ok(loop_length), Ok(min_loop_match), Ok(max_loop_gap)) = (
        usize::try_from(loop_length),
        usize::try_from(min_loop_match),
        usize::try_from(max_loop_gap),
    ) else {
        warn!("negative loop parameter");
        return BC_ERR_ARGS;
    };
    if max_hits > 0 && (hits.is_null() || hitstats.is_null()) {
        return BC_ERR_ARGS;
    }

    let inputs = unsafe {
        (
            slice_or_empty(atoms1, nr_atoms1),
            slice_or_empty(atoms2, nr_atoms2),
            slice_or_empty(dbca, nr_dbca),
            slice_or_empty(seg_index, nr_seg_index),
            slice_or_empty(pdb_index, nr_pdb_index),
        )
    };
    let (Some(atoms1), Some(atoms2), Some(dbca), Some(seg_index), Some(pdb_index)) = inputs else {
        warn!("null input buffer");
        return BC_ERR_ARGS;
    };

    let seg_rows: Vec<[i64; 3]> = seg_index.iter().map(|r| r.map(i64::from)).collect();
    let pdb_rows: Vec<[i64; 2]> = pdb_index.iter().map(|r| r.map(i64::from)).collect();
    let tables = segments_from_rows(&seg_rows).and_then(|s| Ok((s, entries_from_rows(&pdb_rows)?)));
    let (segments, entries) = match tables {
        Ok(tables) => tables,
        Err(e) => {
            warn!(error = %e, "invalid index tables");
            return BC_ERR_ARGS;
        }
    };

    let flank1 = to_points(atoms1);
    let flank2 = to_points(atoms2);
    let points = to_points(dbca);
    let db = Database::new(&points, &segments, &entries);
    if let Err(e) = db.validate() {
        warn!(error = %e, "inconsistent index tables");
        return BC_ERR_ARGS;
    }

    let params = SearchParams::new(loop_length)
        .with_min_loop_match(min_loop_match)
        .with_max_loop_gap(max_loop_gap)
        .with_mirror(mirror != 0)
        .with_min_score(min_bc as f64)
        .with_max_rigidity(max_r as f64)
        .with_single_precision(true);
    let limits = SearchLimits::default().with_max_hits(max_hits);

    let found = match search(&flank1, &flank2, &params, &limits, &db) {
        Ok(found) => found,
        Err(SearchError::HitCapacityExceeded { hits }) => hits,
        Err(_) => return BC_ERR_QUERY,
    };
    if found.is_empty() {
        return 0;
    }

    let (out_hits, out_stats) = unsafe {
        (
            slice::from_raw_parts_mut(hits, max_hits),
            slice::from_raw_parts_mut(hitstats, max_hits),
        )
    };
    match write_hits(&found, out_hits, out_stats) {
        Some(n) => n,
        None => {
            warn!(hits = found.len(), "hit index does not fit the output table");
            BC_ERR_ARGS
        }
    }
}
