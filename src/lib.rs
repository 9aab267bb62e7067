//! Binet-Cauchy loop search over segmented fragment databases.
//!
//! Given two flanking fragments and a loop length, [`search`] finds database
//! windows whose flanks have the same shape (Binet-Cauchy score) and similar
//! internal distances (rigidity), bridging up to two segment junctions where
//! residues are missing.

pub mod adapters;
pub mod ffi;
pub mod ops;
pub mod types;

#[cfg(feature = "python")]
pub mod python;

pub use ops::{bc_score, normalized_score, rigidity, search};
#[cfg(feature = "parallel")]
pub use ops::search_parallel;
pub use types::{
    Database, Entry, Hit, IndexError, SearchError, SearchLimits, SearchParams, Segment,
    SegmentDatabase,
};

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule(name = "bc_loopsearch")]
fn bc_loopsearch(_py: Python, m: &Bound<PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(python::bc_loop_search, m)?)?;
    m.add_function(wrap_pyfunction!(python::bc_score, m)?)?;
    Ok(())
}
