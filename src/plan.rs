//! Splitting a file into contiguous byte ranges.
use crate::error::{ErrorRepr, Result};

use std::ops::Deref;

/// One contiguous byte range of the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartRange {
    /// Position of this range in the plan, starting from 0.
    pub index: usize,
    /// Offset of the first byte of the range in the source file.
    pub offset: u64,
    /// Number of bytes in the range.
    pub len: u64,
}

impl PartRange {
    /// The offset one past the last byte of this range.
    pub fn end(&self) -> u64 {
        self.offset + self.len
    }
}

/// The ranges a file of a given size is uploaded as.
///
/// Every range but the last has the same length, `size / parts`.  The last
/// range also takes the remainder of the division, so the ranges together
/// cover each byte of the file exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionPlan {
    size: u64,
    standard_len: u64,
    ranges: Vec<PartRange>,
}

impl PartitionPlan {
    /// Compute the plan for `size` bytes split into `parts` ranges.
    ///
    /// Fails if `parts` is zero or larger than `limit`, the most sources the
    /// store accepts in one compose request.
    pub fn new(size: u64, parts: usize, limit: usize) -> Result<Self> {
        if parts == 0 {
            return Err(ErrorRepr::NoParts.into());
        }
        if parts > limit {
            return Err(ErrorRepr::TooManyParts {
                requested: parts,
                limit,
            }
            .into());
        }

        let count = parts as u64;
        let base = size / count;
        let remainder = size % count;
        let ranges = (0..parts)
            .map(|index| {
                let offset = index as u64 * base;
                let len = if index == parts - 1 {
                    base + remainder
                } else {
                    base
                };
                PartRange { index, offset, len }
            })
            .collect();

        Ok(Self {
            size,
            standard_len: base,
            ranges,
        })
    }

    /// Total number of bytes covered by the plan.
    pub fn total_size(&self) -> u64 {
        self.size
    }

    /// Length of every range except the last.
    pub fn standard_len(&self) -> u64 {
        self.standard_len
    }

    /// Length of the last range.
    pub fn final_len(&self) -> u64 {
        self.ranges.last().map_or(0, |r| r.len)
    }

    /// Returns true if `range` is the last one of this plan.
    pub fn is_final(&self, range: &PartRange) -> bool {
        range.index + 1 == self.ranges.len()
    }

    /// The ranges in order of offset.
    pub fn ranges(&self) -> &[PartRange] {
        &self.ranges
    }
}

impl Deref for PartitionPlan {
    type Target = [PartRange];

    fn deref(&self) -> &Self::Target {
        &self.ranges
    }
}

impl<'a> IntoIterator for &'a PartitionPlan {
    type Item = &'a PartRange;
    type IntoIter = std::slice::Iter<'a, PartRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn assert_covers(plan: &PartitionPlan, size: u64) {
        let mut next = 0;
        for (i, r) in plan.iter().enumerate() {
            assert_eq!(r.index, i);
            assert_eq!(r.offset, next, "range {i} is not contiguous");
            next = r.end();
        }
        assert_eq!(next, size);
        assert_eq!(plan.iter().map(|r| r.len).sum::<u64>(), size);
    }

    #[test]
    fn remainder_goes_to_last_range() {
        let plan = PartitionPlan::new(23, 5, 32).unwrap();
        let lens: Vec<u64> = plan.iter().map(|r| r.len).collect();
        let offsets: Vec<u64> = plan.iter().map(|r| r.offset).collect();
        assert_eq!(lens, [4, 4, 4, 4, 7]);
        assert_eq!(offsets, [0, 4, 8, 12, 16]);
        assert_eq!(plan.standard_len(), 4);
        assert_eq!(plan.final_len(), 7);
    }

    #[test]
    fn even_split() {
        let plan = PartitionPlan::new(9, 3, 32).unwrap();
        let lens: Vec<u64> = plan.iter().map(|r| r.len).collect();
        assert_eq!(lens, [3, 3, 3]);
    }

    #[test]
    fn covers_every_byte_once() {
        for size in [0u64, 1, 2, 7, 31, 32, 33, 1000, 4097, 1 << 33] {
            for parts in 1..=32 {
                let plan = PartitionPlan::new(size, parts, 32).unwrap();
                assert_eq!(plan.len(), parts);
                assert_covers(&plan, size);
            }
        }
    }

    #[test]
    fn empty_file_has_empty_ranges() {
        let plan = PartitionPlan::new(0, 4, 32).unwrap();
        assert_eq!(plan.len(), 4);
        assert!(plan.iter().all(|r| r.len == 0));
    }

    #[test]
    fn more_parts_than_bytes() {
        let plan = PartitionPlan::new(3, 5, 32).unwrap();
        let lens: Vec<u64> = plan.iter().map(|r| r.len).collect();
        assert_eq!(lens, [0, 0, 0, 0, 3]);
    }

    #[test]
    fn zero_parts_rejected() {
        let err = PartitionPlan::new(10, 0, 32).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Plan);
    }

    #[test]
    fn parts_over_limit_rejected() {
        let err = PartitionPlan::new(10, 33, 32).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Plan);
        assert!(PartitionPlan::new(10, 32, 32).is_ok());
    }
}
