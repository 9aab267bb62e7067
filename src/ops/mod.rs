//! Geometry, scoring and the loop search itself.

pub mod geometry;
pub mod score;
pub mod search;
pub mod stitch;

// Re-export commonly used items
pub use geometry::{center_in_place, centroid, determinant3x3, distance};
pub use score::{
    bc_score, centered_covariance_determinant, covariance_determinant, normalized_score, rigidity,
};
#[cfg(feature = "parallel")]
pub use search::search_parallel;
pub use search::{search, search_entries, QueryFragment};
pub use stitch::{stitch, CandidateWindow, Candidates, Skip, WindowShape};
