//! Search configuration.
//!
//! Thresholds and tolerances are passed into every search call so that
//! searches with different settings can run side by side.

/// Determinants below this are treated as zero.
pub const DEFAULT_EPS: f64 = 1e-8;
/// Maximum number of points in a query fragment (flank1 + flank2).
pub const DEFAULT_MAX_FRAGMENT_LEN: usize = 5000;
/// Maximum number of hits collected before a search stops.
pub const DEFAULT_MAX_HITS: usize = 100_000;
/// Maximum number of segment junctions a loop may bridge.
pub const DEFAULT_MAX_JUNCTIONS: usize = 2;

/// What to search for and how strict to be about it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParams {
    /// Number of residues between the two flanks
    pub loop_length: usize,
    /// Minimum number of loop residues that must be modeled in the database
    pub min_loop_match: usize,
    /// Largest tolerated run of unmodeled residues at a segment junction
    pub max_loop_gap: usize,
    /// Look for mirror images (strongly negative scores) instead
    pub mirror: bool,
    /// Score threshold; in mirror mode scores must be below `-min_score`
    pub min_score: f64,
    /// Largest accepted rigidity deviation
    pub max_rigidity: f64,
    /// Round scores, rigidities and both thresholds to `f32` before
    /// filtering, as single-precision callers see them
    pub single_precision: bool,
}

impl SearchParams {
    /// Strict defaults: the whole loop must be modeled and contiguous.
    pub fn new(loop_length: usize) -> Self {
        Self {
            loop_length,
            min_loop_match: loop_length,
            max_loop_gap: 0,
            mirror: false,
            min_score: 0.9,
            max_rigidity: 9999.0,
            single_precision: false,
        }
    }

    pub fn with_min_loop_match(mut self, min_loop_match: usize) -> Self {
        self.min_loop_match = min_loop_match;
        self
    }

    pub fn with_max_loop_gap(mut self, max_loop_gap: usize) -> Self {
        self.max_loop_gap = max_loop_gap;
        self
    }

    pub fn with_mirror(mut self, mirror: bool) -> Self {
        self.mirror = mirror;
        self
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn with_max_rigidity(mut self, max_rigidity: f64) -> Self {
        self.max_rigidity = max_rigidity;
        self
    }

    pub fn with_single_precision(mut self, single_precision: bool) -> Self {
        self.single_precision = single_precision;
        self
    }

    fn filtered(&self, value: f64) -> f64 {
        if self.single_precision {
            value as f32 as f64
        } else {
            value
        }
    }

    /// Whether a score passes the similarity filter for this search mode.
    pub fn accepts_score(&self, score: f64) -> bool {
        let (score, min_score) = (self.filtered(score), self.filtered(self.min_score));
        if self.mirror {
            score <= -min_score
        } else {
            score >= min_score
        }
    }

    pub fn accepts_rigidity(&self, rigidity: f64) -> bool {
        self.filtered(rigidity) <= self.filtered(self.max_rigidity)
    }
}

/// Numerical tolerance and resource bounds for one search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchLimits {
    pub eps: f64,
    pub max_fragment_len: usize,
    pub max_hits: usize,
    pub max_junctions: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            eps: DEFAULT_EPS,
            max_fragment_len: DEFAULT_MAX_FRAGMENT_LEN,
            max_hits: DEFAULT_MAX_HITS,
            max_junctions: DEFAULT_MAX_JUNCTIONS,
        }
    }
}

impl SearchLimits {
    pub fn with_max_hits(mut self, max_hits: usize) -> Self {
        self.max_hits = max_hits;
        self
    }

    pub fn with_max_junctions(mut self, max_junctions: usize) -> Self {
        self.max_junctions = max_junctions;
        self
    }

    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_filter_modes_are_exclusive() {
        let normal = SearchParams::new(5).with_min_score(0.8);
        let mirror = normal.with_mirror(true);

        assert!(normal.accepts_score(0.9));
        assert!(!mirror.accepts_score(0.9));

        assert!(!normal.accepts_score(-0.9));
        assert!(mirror.accepts_score(-0.9));
    }

    #[test]
    fn test_score_threshold_is_inclusive() {
        let params = SearchParams::new(5).with_min_score(0.5);
        assert!(params.accepts_score(0.5));
        assert!(params.with_mirror(true).accepts_score(-0.5));
    }

    #[test]
    fn test_single_precision_filters() {
        // Lies between the f64 value of 0.9f32 and the f32 below it, closer
        // to 0.9f32
        let score = 0.899_999_96;
        let double = SearchParams::new(5).with_min_score(0.9f32 as f64);
        let single = double.with_single_precision(true);
        assert!(!double.accepts_score(score));
        assert!(single.accepts_score(score));
        assert!(!single.with_mirror(true).accepts_score(score));
        assert!(single.with_mirror(true).accepts_score(-score));

        let double = SearchParams::new(5).with_max_rigidity(0.5);
        let single = double.with_single_precision(true);
        assert!(!double.accepts_rigidity(0.500_000_01));
        assert!(single.accepts_rigidity(0.500_000_01));
        assert!(!single.accepts_rigidity(0.500_001));
    }

    #[test]
    fn test_defaults() {
        let params = SearchParams::new(7);
        assert_eq!(params.min_loop_match, 7);
        assert_eq!(params.max_loop_gap, 0);
        assert!(!params.mirror);
        assert!(!params.single_precision);
        let limits = SearchLimits::default();
        assert_eq!(limits.max_junctions, 2);
        assert_eq!(limits.max_hits, 100_000);
        assert_eq!(limits.max_fragment_len, 5000);
    }
}
