//! Hit records and the bounded hit collector.

/// One accepted candidate: where it starts and how well it matched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Row in the entry table
    pub entry: usize,
    /// Row in the segment table holding flank1
    pub segment: usize,
    /// Offset of flank1 within that segment
    pub offset: usize,
    pub score: f64,
    pub rigidity: f64,
}

/// Returned by [`HitSet::record`] once the set is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityReached;

/// Append-only hit list with a hard capacity.
///
/// Hits stay in the order they were recorded. Reaching the capacity is
/// terminal for the search that owns the set.
#[derive(Debug, Clone)]
pub struct HitSet {
    hits: Vec<Hit>,
    capacity: usize,
}

impl HitSet {
    /// Empty set that stops accepting hits at `capacity`. Nothing is
    /// reserved until the first hit arrives.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            hits: Vec::new(),
            capacity,
        }
    }

    /// Append a hit. Returns `Err(CapacityReached)` when the set is full
    /// after (or, for a zero capacity, instead of) storing it.
    pub fn record(&mut self, hit: Hit) -> Result<(), CapacityReached> {
        if self.is_full() {
            return Err(CapacityReached);
        }
        self.hits.push(hit);
        if self.is_full() {
            Err(CapacityReached)
        } else {
            Ok(())
        }
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.hits.len() >= self.capacity
    }

    pub fn as_slice(&self) -> &[Hit] {
        &self.hits
    }

    pub fn into_vec(self) -> Vec<Hit> {
        self.hits
    }
}
