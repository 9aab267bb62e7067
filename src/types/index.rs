//! Segment index model: flat, read-only tables describing how a coordinate
//! database is cut into segments and how segments group into entries.
//!
//! Tables are plain arrays indexed by position. A segment is a run of
//! consecutively numbered residues; residue numbering may jump between two
//! segments of the same entry (unmodeled residues).

use super::error::IndexError;
use glam::DVec3;
use std::ops::Range;

/// A contiguous run of points within the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Index of the first point in the database
    pub offset: usize,
    /// Residue number of the first point
    pub first_residue: i32,
    /// Number of points
    pub length: usize,
}

impl Segment {
    pub fn new(offset: usize, first_residue: i32, length: usize) -> Self {
        Self {
            offset,
            first_residue,
            length,
        }
    }

    /// Residue number of the last point.
    pub fn last_residue(&self) -> i64 {
        self.first_residue as i64 + self.length as i64 - 1
    }

    /// Point range of this segment within the database.
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.length
    }
}

/// A group of consecutive segments forming one database unit (one structure).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    /// Index of the first segment in the segment table
    pub segment_offset: usize,
    /// Number of segments
    pub segment_count: usize,
}

impl Entry {
    pub fn new(segment_offset: usize, segment_count: usize) -> Self {
        Self {
            segment_offset,
            segment_count,
        }
    }

    /// Segment-table range covered by this entry.
    pub fn segments(&self) -> Range<usize> {
        self.segment_offset..self.segment_offset + self.segment_count
    }
}

/// Borrowed read-only view of a segmented fragment database.
///
/// The search never mutates any of these tables, so one view can be shared
/// by any number of concurrent searches.
#[derive(Debug, Clone, Copy)]
pub struct Database<'a> {
    pub points: &'a [DVec3],
    pub segments: &'a [Segment],
    pub entries: &'a [Entry],
}

impl<'a> Database<'a> {
    pub fn new(points: &'a [DVec3], segments: &'a [Segment], entries: &'a [Entry]) -> Self {
        Self {
            points,
            segments,
            entries,
        }
    }

    /// Segments belonging to an entry.
    pub fn entry_segments(&self, entry: usize) -> &'a [Segment] {
        &self.segments[self.entries[entry].segments()]
    }

    /// Check that every entry's segment range lies inside the segment table
    /// and every segment's point range lies inside the database.
    ///
    /// The search assumes these invariants without checking them.
    pub fn validate(&self) -> Result<(), IndexError> {
        for (i, seg) in self.segments.iter().enumerate() {
            let end = seg.offset.checked_add(seg.length);
            if end.map_or(true, |e| e > self.points.len()) {
                return Err(IndexError::SegmentOutOfRange {
                    segment: i,
                    offset: seg.offset,
                    length: seg.length,
                    points: self.points.len(),
                });
            }
        }
        for (i, entry) in self.entries.iter().enumerate() {
            let end = entry.segment_offset.checked_add(entry.segment_count);
            if end.map_or(true, |e| e > self.segments.len()) {
                return Err(IndexError::EntryOutOfRange {
                    entry: i,
                    segment_offset: entry.segment_offset,
                    segment_count: entry.segment_count,
                    segments: self.segments.len(),
                });
            }
        }
        Ok(())
    }
}

/// Owned segmented database, built entry by entry.
#[derive(Debug, Clone, Default)]
pub struct SegmentDatabase {
    pub points: Vec<DVec3>,
    pub segments: Vec<Segment>,
    pub entries: Vec<Entry>,
}

impl SegmentDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry from a residue-numbered trace (typically CA atoms).
    ///
    /// A new segment starts wherever the residue number does not advance by
    /// exactly one. Returns the index of the new entry.
    pub fn push_entry(
        &mut self,
        points: &[DVec3],
        residue_numbers: &[i32],
    ) -> Result<usize, IndexError> {
        if points.len() != residue_numbers.len() {
            return Err(IndexError::LengthMismatch {
                points: points.len(),
                residues: residue_numbers.len(),
            });
        }

        let segment_offset = self.segments.len();
        let base = self.points.len();
        let mut start = 0usize;
        for i in 1..=points.len() {
            let is_break = i == points.len()
                || residue_numbers[i] as i64 != residue_numbers[i - 1] as i64 + 1;
            if is_break {
                self.segments.push(Segment::new(
                    base + start,
                    residue_numbers[start],
                    i - start,
                ));
                start = i;
            }
        }
        self.points.extend_from_slice(points);

        let entry = Entry::new(segment_offset, self.segments.len() - segment_offset);
        self.entries.push(entry);
        Ok(self.entries.len() - 1)
    }

    pub fn view(&self) -> Database<'_> {
        Database::new(&self.points, &self.segments, &self.entries)
    }
}
