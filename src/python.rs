//! Python bindings for the loop search.

use glam::DVec3;
use ndarray::{Array2, ArrayView2};
use numpy::{IntoPyArray, PyArray2, PyReadonlyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::adapters::flat::{entries_from_rows, hits_to_rows, segments_from_rows};
use crate::types::{Database, SearchError, SearchLimits, SearchParams, DEFAULT_MAX_HITS};

#[cfg(feature = "parallel")]
use crate::ops::search::search_parallel as run_search;
#[cfg(not(feature = "parallel"))]
use crate::ops::search::search as run_search;

fn value_error(e: impl std::fmt::Display) -> PyErr {
    PyErr::new::<PyValueError, _>(e.to_string())
}

fn points_from_array(name: &str, view: ArrayView2<f64>) -> PyResult<Vec<DVec3>> {
    if view.ncols() != 3 {
        return Err(value_error(format!("{name} must have shape (N, 3)")));
    }
    Ok(view
        .rows()
        .into_iter()
        .map(|r| DVec3::new(r[0], r[1], r[2]))
        .collect())
}

fn index_rows<const N: usize>(name: &str, view: ArrayView2<i64>) -> PyResult<Vec<[i64; N]>> {
    if view.ncols() != N {
        return Err(value_error(format!("{name} must have shape (N, {N})")));
    }
    Ok(view
        .rows()
        .into_iter()
        .map(|r| std::array::from_fn(|i| r[i]))
        .collect())
}

/// Search a segmented CA database for loops bridging two flanks.
///
/// Returns `(hits, hitstats, truncated)`: `hits` rows are
/// `(entry, segment, offset)`, `hitstats` rows are `(score, rigidity)`.
#[pyfunction]
#[pyo3(signature = (
    flank1, flank2, loop_length, dbca, seg_index, pdb_index, *,
    min_loop_match=None, max_loop_gap=0, mirror=false,
    min_score=0.9, max_rigidity=9999.0, max_hits=DEFAULT_MAX_HITS
))]
#[allow(clippy::too_many_arguments)]
pub fn bc_loop_search<'py>(
    py: Python<'py>,
    flank1: PyReadonlyArray2<'py, f64>,
    flank2: PyReadonlyArray2<'py, f64>,
    loop_length: usize,
    dbca: PyReadonlyArray2<'py, f64>,
    seg_index: PyReadonlyArray2<'py, i64>,
    pdb_index: PyReadonlyArray2<'py, i64>,
    min_loop_match: Option<usize>,
    max_loop_gap: usize,
    mirror: bool,
    min_score: f64,
    max_rigidity: f64,
    max_hits: usize,
) -> PyResult<(Bound<'py, PyArray2<i64>>, Bound<'py, PyArray2<f64>>, bool)> {
    let flank1 = points_from_array("flank1", flank1.as_array())?;
    let flank2 = points_from_array("flank2", flank2.as_array())?;
    let points = points_from_array("dbca", dbca.as_array())?;
    let segments = segments_from_rows(&index_rows::<3>("seg_index", seg_index.as_array())?)
        .map_err(value_error)?;
    let entries = entries_from_rows(&index_rows::<2>("pdb_index", pdb_index.as_array())?)
        .map_err(value_error)?;

    let db = Database::new(&points, &segments, &entries);
    db.validate().map_err(value_error)?;

    let params = SearchParams::new(loop_length)
        .with_min_loop_match(min_loop_match.unwrap_or(loop_length))
        .with_max_loop_gap(max_loop_gap)
        .with_mirror(mirror)
        .with_min_score(min_score)
        .with_max_rigidity(max_rigidity);
    let limits = SearchLimits::default().with_max_hits(max_hits);

    let (hits, truncated) = match run_search(&flank1, &flank2, &params, &limits, &db) {
        Ok(hits) => (hits, false),
        Err(SearchError::HitCapacityExceeded { hits }) => (hits, true),
        Err(e) => return Err(value_error(e)),
    };

    let n = hits.len();
    let (rows, stats) = hits_to_rows(&hits);
    let rows = Array2::from_shape_vec((n, 3), rows.into_iter().flatten().collect())
        .map_err(value_error)?;
    let stats = Array2::from_shape_vec((n, 2), stats.into_iter().flatten().collect())
        .map_err(value_error)?;

    Ok((rows.into_pyarray(py), stats.into_pyarray(py), truncated))
}

/// Standalone Binet-Cauchy score between two equally long fragments.
#[pyfunction]
pub fn bc_score(x: PyReadonlyArray2<'_, f64>, y: PyReadonlyArray2<'_, f64>) -> PyResult<f64> {
    let x = points_from_array("x", x.as_array())?;
    let y = points_from_array("y", y.as_array())?;
    crate::ops::score::bc_score(&x, &y, crate::types::DEFAULT_EPS)
        .ok_or_else(|| value_error("fragments differ in length or are degenerate"))
}
