//! Candidate window stitching.
//!
//! A candidate window is flank1 taken from some segment at some offset,
//! followed (after `loop_length` residues) by flank2. When the loop runs off
//! the end of the segment, flank2 is looked up in the following segments of
//! the same entry, counting the unmodeled residues at each junction.
//!
//! Infeasible positions are reported as [`Skip`] values, never as errors.

use crate::types::index::Database;
use crate::types::params::{SearchLimits, SearchParams};
use std::ops::Range;

/// Reasons a (entry, segment, offset) position yields no candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    /// flank1 does not leave any room in its segment
    Flank1Overruns,
    /// The segment ends inside flank2
    Flank2StraddlesSegmentEnd,
    /// The loop runs past the last segment of the entry
    LastSegment,
    /// Too many unmodeled residues at a junction
    JunctionGapTooLarge,
    /// flank2 would start among unmodeled residues
    Flank2InsideJunction,
    /// More junctions would be needed than allowed
    BridgeLimit,
    /// flank2 runs past the end of the segment it starts in
    Flank2Overruns,
    /// Too few loop residues are modeled
    InsufficientLoopMatch,
}

/// Lengths and tolerances that fix the shape of every candidate window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowShape {
    pub len1: usize,
    pub len2: usize,
    pub loop_length: usize,
    pub min_loop_match: usize,
    pub max_loop_gap: usize,
    pub max_junctions: usize,
}

impl WindowShape {
    pub fn new(len1: usize, len2: usize, params: &SearchParams, limits: &SearchLimits) -> Self {
        Self {
            len1,
            len2,
            loop_length: params.loop_length,
            min_loop_match: params.min_loop_match,
            max_loop_gap: params.max_loop_gap,
            max_junctions: limits.max_junctions,
        }
    }
}

/// A feasible candidate, with absolute point indices into the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateWindow {
    pub entry: usize,
    /// Segment holding flank1
    pub segment: usize,
    /// Offset of flank1 within `segment`
    pub offset: usize,
    pub flank1_start: usize,
    pub flank2_start: usize,
    /// Loop residues falling into unmodeled junction gaps
    pub unmatched: i64,
    /// Number of segment junctions crossed
    pub junctions: usize,
}

impl CandidateWindow {
    pub fn flank1(&self, shape: &WindowShape) -> Range<usize> {
        self.flank1_start..self.flank1_start + shape.len1
    }

    pub fn flank2(&self, shape: &WindowShape) -> Range<usize> {
        self.flank2_start..self.flank2_start + shape.len2
    }
}

/// Build the candidate window whose flank1 starts at `offset` in `segment`.
///
/// `segment` is a row of the segment table and must belong to `entry`.
pub fn stitch(
    db: &Database,
    entry: usize,
    segment: usize,
    offset: usize,
    shape: &WindowShape,
) -> Result<CandidateWindow, Skip> {
    let entry_end = db.entries[entry].segments().end;
    let first = db.segments[segment];

    let len1 = shape.len1 as i64;
    let len2 = shape.len2 as i64;
    let loop_length = shape.loop_length as i64;
    let max_gap = shape.max_loop_gap as i64;

    // Points left in the segment after flank1
    let tail = first.length as i64 - offset as i64 - len1;
    if tail <= 0 {
        return Err(Skip::Flank1Overruns);
    }

    let flank1_start = first.offset + offset;
    if tail >= loop_length + len2 {
        return Ok(CandidateWindow {
            entry,
            segment,
            offset,
            flank1_start,
            flank2_start: flank1_start + shape.len1 + shape.loop_length,
            unmatched: 0,
            junctions: 0,
        });
    }
    if tail >= loop_length {
        return Err(Skip::Flank2StraddlesSegmentEnd);
    }

    // Loop residues still to be placed once the current segment is used up
    let mut rest = loop_length - tail;
    let mut unmatched = 0i64;
    let mut junctions = 0usize;
    let mut current = segment;
    loop {
        if junctions == shape.max_junctions {
            return Err(Skip::BridgeLimit);
        }
        let next = current + 1;
        if next >= entry_end {
            return Err(Skip::LastSegment);
        }
        let gap =
            db.segments[next].first_residue as i64 - db.segments[current].last_residue() - 1;
        if gap > max_gap {
            return Err(Skip::JunctionGapTooLarge);
        }
        unmatched += gap;
        rest -= gap;
        if rest < 0 {
            return Err(Skip::Flank2InsideJunction);
        }
        junctions += 1;
        current = next;

        let len = db.segments[current].length as i64;
        if len >= rest {
            break;
        }
        rest -= len;
    }

    let last = db.segments[current];
    if rest + len2 > last.length as i64 {
        return Err(Skip::Flank2Overruns);
    }
    if loop_length - unmatched < shape.min_loop_match as i64 {
        return Err(Skip::InsufficientLoopMatch);
    }

    Ok(CandidateWindow {
        entry,
        segment,
        offset,
        flank1_start,
        flank2_start: last.offset + rest as usize,
        unmatched,
        junctions,
    })
}

/// Lazy scan over every feasible candidate window, in entry, segment,
/// offset order.
pub struct Candidates<'a> {
    db: Database<'a>,
    shape: WindowShape,
    entry: usize,
    entry_end: usize,
    segment: usize,
    offset: usize,
    started: bool,
    considered: usize,
}

impl<'a> Candidates<'a> {
    pub fn new(db: Database<'a>, shape: WindowShape) -> Self {
        let n = db.entries.len();
        Self::over_entries(db, shape, 0..n)
    }

    /// Restrict the scan to a range of entry rows.
    pub fn over_entries(db: Database<'a>, shape: WindowShape, entries: Range<usize>) -> Self {
        Self {
            db,
            shape,
            entry: entries.start,
            entry_end: entries.end,
            segment: 0,
            offset: 0,
            started: false,
            considered: 0,
        }
    }

    /// Number of flank1 positions examined so far.
    pub fn considered(&self) -> usize {
        self.considered
    }

    fn next_position(&mut self) -> Option<(usize, usize, usize)> {
        while self.entry < self.entry_end {
            let segments = self.db.entries[self.entry].segments();
            if !self.started {
                self.segment = segments.start;
                self.offset = 0;
                self.started = true;
            }
            while self.segment < segments.end {
                let limit = self.db.segments[self.segment]
                    .length
                    .saturating_sub(self.shape.len1);
                if self.offset < limit {
                    let position = (self.entry, self.segment, self.offset);
                    self.offset += 1;
                    return Some(position);
                }
                self.segment += 1;
                self.offset = 0;
            }
            self.entry += 1;
            self.started = false;
        }
        None
    }
}

impl Iterator for Candidates<'_> {
    type Item = CandidateWindow;

    fn next(&mut self) -> Option<CandidateWindow> {
        while let Some((entry, segment, offset)) = self.next_position() {
            self.considered += 1;
            if let Ok(window) = stitch(&self.db, entry, segment, offset, &self.shape) {
                return Some(window);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::index::{Entry, Segment};
    use glam::DVec3;

    fn shape(len1: usize, len2: usize, loop_length: usize) -> WindowShape {
        WindowShape {
            len1,
            len2,
            loop_length,
            min_loop_match: 0,
            max_loop_gap: 10,
            max_junctions: 2,
        }
    }

    fn points(n: usize) -> Vec<DVec3> {
        (0..n).map(|i| DVec3::splat(i as f64)).collect()
    }

    #[test]
    fn test_contained_window() {
        let pts = points(20);
        let segs = [Segment::new(0, 1, 20)];
        let ents = [Entry::new(0, 1)];
        let db = Database::new(&pts, &segs, &ents);
        let s = shape(3, 3, 4);

        let w = stitch(&db, 0, 0, 2, &s).unwrap();
        assert_eq!(w.flank1(&s), 2..5);
        assert_eq!(w.flank2(&s), 9..12);
        assert_eq!(w.junctions, 0);

        // 10 + 3 + 4 + 3 == 20: last contained offset
        assert!(stitch(&db, 0, 0, 10, &s).is_ok());
        assert_eq!(
            stitch(&db, 0, 0, 11, &s),
            Err(Skip::Flank2StraddlesSegmentEnd)
        );
        // tail of 4 == loop_length: flank2 would start exactly at the end
        assert_eq!(
            stitch(&db, 0, 0, 13, &s),
            Err(Skip::Flank2StraddlesSegmentEnd)
        );
        // Loop runs off the only segment
        assert_eq!(stitch(&db, 0, 0, 14, &s), Err(Skip::LastSegment));
        assert_eq!(stitch(&db, 0, 0, 17, &s), Err(Skip::Flank1Overruns));
    }

    #[test]
    fn test_bridge_one_junction() {
        // Segment 0: residues 1..=10, segment 1: residues 13..=22 (2 missing)
        let pts = points(20);
        let segs = [Segment::new(0, 1, 10), Segment::new(10, 13, 10)];
        let ents = [Entry::new(0, 2)];
        let db = Database::new(&pts, &segs, &ents);
        let s = shape(3, 3, 5);

        // flank1 at 5..8, tail = 2, rest = 3, gap 2 -> flank2 at offset 1
        let w = stitch(&db, 0, 0, 5, &s).unwrap();
        assert_eq!(w.unmatched, 2);
        assert_eq!(w.junctions, 1);
        assert_eq!(w.flank2_start, 11);

        let strict = WindowShape {
            max_loop_gap: 1,
            ..s
        };
        assert_eq!(stitch(&db, 0, 0, 5, &strict), Err(Skip::JunctionGapTooLarge));

        let full_match = WindowShape {
            min_loop_match: 5,
            ..s
        };
        assert_eq!(
            stitch(&db, 0, 0, 5, &full_match),
            Err(Skip::InsufficientLoopMatch)
        );
        let partial = WindowShape {
            min_loop_match: 3,
            ..s
        };
        assert!(stitch(&db, 0, 0, 5, &partial).is_ok());
    }

    #[test]
    fn test_flank2_inside_junction() {
        let pts = points(20);
        let segs = [Segment::new(0, 1, 10), Segment::new(10, 20, 10)];
        let ents = [Entry::new(0, 2)];
        let db = Database::new(&pts, &segs, &ents);
        // tail = 1, rest = 2, gap = 9
        assert_eq!(
            stitch(&db, 0, 0, 6, &shape(3, 3, 3)),
            Err(Skip::Flank2InsideJunction)
        );
    }

    #[test]
    fn test_bridge_two_junctions_and_limit() {
        // Segment 1 is too short to hold the rest of the loop.
        let pts = points(30);
        let segs = [
            Segment::new(0, 1, 10),
            Segment::new(10, 12, 2),
            Segment::new(12, 15, 10),
            Segment::new(22, 26, 8),
        ];
        let ents = [Entry::new(0, 4)];
        let db = Database::new(&pts, &segs, &ents);
        let s = shape(3, 3, 6);

        // offset 6: tail 1, rest 5; gap 1 -> rest 4 > len 2 -> rest 2;
        // gap 1 -> rest 1 -> flank2 at segment 2 offset 1
        let w = stitch(&db, 0, 0, 6, &s).unwrap();
        assert_eq!(w.junctions, 2);
        assert_eq!(w.unmatched, 2);
        assert_eq!(w.flank2_start, 13);

        let one = WindowShape {
            max_junctions: 1,
            ..s
        };
        assert_eq!(stitch(&db, 0, 0, 6, &one), Err(Skip::BridgeLimit));

        // A loop long enough to need a third junction is given up.
        let long = shape(3, 3, 16);
        assert_eq!(stitch(&db, 0, 0, 6, &long), Err(Skip::BridgeLimit));
        let three = WindowShape {
            max_junctions: 3,
            ..long
        };
        assert!(stitch(&db, 0, 0, 6, &three).is_ok());
    }

    /// Residues 1..=10, 12..=13, 18..=27: one missing residue before the
    /// short middle segment, four after it.
    fn second_junction_segments() -> [Segment; 3] {
        [
            Segment::new(0, 1, 10),
            Segment::new(10, 12, 2),
            Segment::new(12, 18, 10),
        ]
    }

    #[test]
    fn test_second_junction_gap_limit() {
        let pts = points(22);
        let segs = second_junction_segments();
        let ents = [Entry::new(0, 3)];
        let db = Database::new(&pts, &segs, &ents);

        // offset 6: tail 1, rest 8; gap 1 -> rest 7 > len 2 -> rest 5; gap 4
        let tight = WindowShape {
            max_loop_gap: 2,
            ..shape(3, 3, 9)
        };
        assert_eq!(stitch(&db, 0, 0, 6, &tight), Err(Skip::JunctionGapTooLarge));

        let covering = WindowShape {
            max_loop_gap: 4,
            ..tight
        };
        let w = stitch(&db, 0, 0, 6, &covering).unwrap();
        assert_eq!(w.junctions, 2);
        assert_eq!(w.unmatched, 5);
        assert_eq!(w.flank2_start, 13);
    }

    #[test]
    fn test_flank2_inside_second_junction() {
        let pts = points(22);
        let segs = second_junction_segments();
        let ents = [Entry::new(0, 3)];
        let db = Database::new(&pts, &segs, &ents);
        // offset 6: tail 1, rest 5; gap 1 -> rest 4 > len 2 -> rest 2; gap 4
        assert_eq!(
            stitch(&db, 0, 0, 6, &shape(3, 3, 6)),
            Err(Skip::Flank2InsideJunction)
        );
    }

    #[test]
    fn test_short_middle_segment_ends_entry() {
        let pts = points(22);
        let segs = second_junction_segments();
        let ents = [Entry::new(0, 2), Entry::new(2, 1)];
        let db = Database::new(&pts, &segs, &ents);
        // Same walk as above, but segment 2 belongs to the next entry
        assert_eq!(
            stitch(&db, 0, 0, 6, &shape(3, 3, 6)),
            Err(Skip::LastSegment)
        );
    }

    #[test]
    fn test_flank2_overruns_final_segment() {
        let pts = points(14);
        let segs = [Segment::new(0, 1, 10), Segment::new(10, 11, 4)];
        let ents = [Entry::new(0, 2)];
        let db = Database::new(&pts, &segs, &ents);
        // offset 5: tail 2, rest 2, gap 0 -> flank2 needs 2..5 of a 4-long segment
        assert_eq!(
            stitch(&db, 0, 0, 5, &shape(3, 3, 4)),
            Err(Skip::Flank2Overruns)
        );
        // offset 4: tail 3, rest 1 -> flank2 at 1..4
        let w = stitch(&db, 0, 0, 4, &shape(3, 3, 4)).unwrap();
        assert_eq!(w.flank2_start, 11);
    }

    #[test]
    fn test_bridging_stops_at_entry_boundary() {
        let pts = points(20);
        let segs = [Segment::new(0, 1, 10), Segment::new(10, 11, 10)];
        let ents = [Entry::new(0, 1), Entry::new(1, 1)];
        let db = Database::new(&pts, &segs, &ents);
        assert_eq!(
            stitch(&db, 0, 0, 5, &shape(3, 3, 4)),
            Err(Skip::LastSegment)
        );
    }

    #[test]
    fn test_candidates_scan_order() {
        let pts = points(16);
        let segs = [
            Segment::new(0, 1, 6),
            Segment::new(6, 7, 4),
            Segment::new(10, 1, 6),
        ];
        let ents = [Entry::new(0, 2), Entry::new(2, 1)];
        let db = Database::new(&pts, &segs, &ents);
        let s = WindowShape {
            len1: 2,
            len2: 2,
            loop_length: 2,
            min_loop_match: 1,
            max_loop_gap: 0,
            max_junctions: 2,
        };
        let mut candidates = Candidates::new(db, s);
        let found: Vec<(usize, usize, usize)> = candidates
            .by_ref()
            .map(|w| (w.entry, w.segment, w.offset))
            .collect();
        assert_eq!(
            found,
            // Offsets 1 and 2 end inside flank2; segment 1 and the tail of
            // segment 2 have nothing to bridge into.
            vec![(0, 0, 0), (0, 0, 3), (1, 2, 0)]
        );
        // Offsets per segment: 4 + 2 + 4
        assert_eq!(candidates.considered(), 10);
    }
}
