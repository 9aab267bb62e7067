//! Binet-Cauchy loop search.
//!
//! Given two flanks and a loop length, scans every entry, segment and offset
//! of a segmented database for windows whose flanks have the same shape as
//! the query flanks. Each candidate must pass the score filter and then the
//! rigidity filter. Hits come back in scan order.

use super::geometry::center_in_place;
use super::score::{covariance_determinant, normalized_score, rigidity};
use super::stitch::{Candidates, WindowShape};
use crate::types::error::SearchError;
use crate::types::hits::{Hit, HitSet};
use crate::types::index::Database;
use crate::types::params::{SearchLimits, SearchParams};
use glam::DVec3;
use std::ops::Range;
use tracing::{debug, trace, warn};

/// Concatenated, centered query flanks with their cached self-determinant.
#[derive(Debug, Clone)]
pub struct QueryFragment {
    points: Vec<DVec3>,
    len1: usize,
    len2: usize,
    sqrt_det: f64,
}

impl QueryFragment {
    /// Center `flank1 ++ flank2` and compute `sqrt(det(X, X))`.
    pub fn new(
        flank1: &[DVec3],
        flank2: &[DVec3],
        limits: &SearchLimits,
    ) -> Result<Self, SearchError> {
        let len = flank1.len() + flank2.len();
        if len > limits.max_fragment_len {
            return Err(SearchError::FragmentTooLong {
                len,
                max: limits.max_fragment_len,
            });
        }

        let mut points = Vec::with_capacity(len);
        points.extend_from_slice(flank1);
        points.extend_from_slice(flank2);
        center_in_place(&mut points);

        let det = covariance_determinant(&points, &points);
        if det.is_nan() || det < limits.eps {
            warn!(len, det, "null determinant for query fragment");
            return Err(SearchError::DegenerateQuery { len, det });
        }

        Ok(Self {
            points,
            len1: flank1.len(),
            len2: flank2.len(),
            sqrt_det: det.sqrt(),
        })
    }

    /// Centered query points.
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn sqrt_det(&self) -> f64 {
        self.sqrt_det
    }
}

/// Search the whole database for loops bridging `flank1` and `flank2`.
///
/// Returns `SearchError::HitCapacityExceeded` with the hits gathered so far
/// as soon as `limits.max_hits` hits have been recorded.
pub fn search(
    flank1: &[DVec3],
    flank2: &[DVec3],
    params: &SearchParams,
    limits: &SearchLimits,
    db: &Database,
) -> Result<Vec<Hit>, SearchError> {
    let query = QueryFragment::new(flank1, flank2, limits)?;
    let mut considered = 0;
    let hits = scan(&query, params, limits, db, 0..db.entries.len(), &mut considered)?;
    debug!(
        entries = db.entries.len(),
        considered,
        hits = hits.len(),
        "loop search finished"
    );
    Ok(hits)
}

/// Scan a range of entry rows with a prepared query.
///
/// One candidate buffer is allocated up front and reused for every window.
pub fn search_entries(
    query: &QueryFragment,
    params: &SearchParams,
    limits: &SearchLimits,
    db: &Database,
    entries: Range<usize>,
) -> Result<Vec<Hit>, SearchError> {
    let mut considered = 0;
    scan(query, params, limits, db, entries, &mut considered)
}

/// Entry scan shared by the drivers. `considered` is incremented by the
/// number of windows stitched, whether or not the scan ran to the end.
fn scan(
    query: &QueryFragment,
    params: &SearchParams,
    limits: &SearchLimits,
    db: &Database,
    entries: Range<usize>,
    considered: &mut usize,
) -> Result<Vec<Hit>, SearchError> {
    let shape = WindowShape::new(query.len1, query.len2, params, limits);
    let x = query.points();
    let mut y = vec![DVec3::ZERO; query.len()];
    let mut hits = HitSet::with_capacity(limits.max_hits);

    let mut candidates = Candidates::over_entries(*db, shape, entries.clone());
    while let Some(window) = candidates.next() {
        y[..query.len1].copy_from_slice(&db.points[window.flank1(&shape)]);
        y[query.len1..].copy_from_slice(&db.points[window.flank2(&shape)]);

        let Some(score) = normalized_score(x, &y, query.sqrt_det, limits.eps) else {
            continue;
        };
        if !params.accepts_score(score) {
            continue;
        }
        let rigid = rigidity(x, &y);
        if !params.accepts_rigidity(rigid) {
            continue;
        }

        let hit = Hit {
            entry: window.entry,
            segment: window.segment,
            offset: window.offset,
            score,
            rigidity: rigid,
        };
        if hits.record(hit).is_err() {
            *considered += candidates.considered();
            warn!(max_hits = limits.max_hits, "hit capacity reached, search truncated");
            return Err(SearchError::HitCapacityExceeded {
                hits: hits.into_vec(),
            });
        }
    }

    *considered += candidates.considered();
    trace!(
        ?entries,
        considered = candidates.considered(),
        hits = hits.len(),
        "entry scan finished"
    );
    Ok(hits.into_vec())
}

/// Entry rows handed to one worker at a time by [`search_parallel`].
#[cfg(feature = "parallel")]
const ENTRIES_PER_CHUNK: usize = 64;

/// Same result as [`search`], with entries scanned in parallel.
///
/// Entries are cut into consecutive chunks and searched one wave of chunks
/// at a time, one chunk per worker thread. Each chunk gets the capacity left
/// at the start of its wave. Chunk results are appended in entry order and
/// the merge stops exactly where the sequential scan would have stopped, so
/// at most one wave of chunk results is held beyond the merged list.
#[cfg(feature = "parallel")]
pub fn search_parallel(
    flank1: &[DVec3],
    flank2: &[DVec3],
    params: &SearchParams,
    limits: &SearchLimits,
    db: &Database,
) -> Result<Vec<Hit>, SearchError> {
    use rayon::prelude::*;

    let query = QueryFragment::new(flank1, flank2, limits)?;
    let n_entries = db.entries.len();
    let wave_len = ENTRIES_PER_CHUNK * rayon::current_num_threads().max(1);

    let mut hits: Vec<Hit> = Vec::new();
    let mut considered = 0;
    let mut wave_start = 0;
    while wave_start < n_entries {
        let wave_end = (wave_start + wave_len).min(n_entries);
        let chunks: Vec<Range<usize>> = (wave_start..wave_end)
            .step_by(ENTRIES_PER_CHUNK)
            .map(|start| start..(start + ENTRIES_PER_CHUNK).min(wave_end))
            .collect();
        let wave_limits = SearchLimits {
            max_hits: limits.max_hits - hits.len(),
            ..*limits
        };

        let results: Vec<(Result<Vec<Hit>, SearchError>, usize)> = chunks
            .into_par_iter()
            .map(|entries| {
                let mut chunk_considered = 0;
                let result = scan(&query, params, &wave_limits, db, entries, &mut chunk_considered);
                (result, chunk_considered)
            })
            .collect();

        for (result, chunk_considered) in results {
            considered += chunk_considered;
            let (chunk_hits, capped) = match result {
                Ok(chunk_hits) => (chunk_hits, false),
                Err(SearchError::HitCapacityExceeded { hits }) => (hits, true),
                Err(e) => return Err(e),
            };
            let room = limits.max_hits - hits.len();
            if capped || (room > 0 && chunk_hits.len() >= room) {
                hits.extend(chunk_hits.into_iter().take(room));
                debug!(considered, hits = hits.len(), "parallel loop search truncated");
                return Err(SearchError::HitCapacityExceeded { hits });
            }
            hits.extend(chunk_hits);
        }
        wave_start = wave_end;
    }

    debug!(
        entries = n_entries,
        considered,
        hits = hits.len(),
        "parallel loop search finished"
    );
    Ok(hits)
}
