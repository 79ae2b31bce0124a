// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Splits the pixel grid into contiguous, disjoint runs, one per
//! worker.  Because a run of pixel indices is also a run of raster
//! bytes, each worker can be handed exclusive `&mut` slices of both the
//! grid and the raster and no locking is needed anywhere.

use std::ops::Range;

use crate::error::{RenderError, Result};

/// How leftover pixels are handled when the pixel count does not
/// divide evenly among the workers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PartitionScheme {
    /// Refuse: the pixel count must be a multiple of the worker count.
    Strict,
    /// Spread the remainder over the first partitions, one pixel each.
    Flexible,
}

impl Default for PartitionScheme {
    fn default() -> Self {
        PartitionScheme::Flexible
    }
}

/// One worker's share of the grid: the half-open pixel range
/// `[start, start + len)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    /// Position of this partition in the plan; also its progress slot.
    pub id: usize,
    /// First pixel index.
    pub start: usize,
    /// Number of pixels.
    pub len: usize,
}

impl Partition {
    /// The pixel indices this partition owns.
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }
}

/// The full assignment of pixels to partitions.  Every pixel index in
/// `[0, total)` belongs to exactly one partition, and partitions are
/// in ascending order.
#[derive(Clone, Debug, PartialEq)]
pub struct PartitionPlan {
    total: usize,
    partitions: Vec<Partition>,
}

impl PartitionPlan {
    /// Plan the split of `total` pixels among `workers` workers.
    pub fn new(total: usize, workers: usize, scheme: PartitionScheme) -> Result<Self> {
        if workers == 0 {
            return Err(RenderError::InvalidConfiguration(
                "worker count must be positive".to_string(),
            ));
        }
        if total == 0 {
            return Err(RenderError::InvalidConfiguration(
                "there are no pixels to partition".to_string(),
            ));
        }
        if scheme == PartitionScheme::Strict && total % workers != 0 {
            return Err(RenderError::InvalidConfiguration(format!(
                "pixel count {} is not divisible by {} workers",
                total, workers
            )));
        }

        let count = workers.min(total);
        let base = total / count;
        let remainder = total % count;
        let mut partitions = Vec::with_capacity(count);
        let mut start = 0;
        for id in 0..count {
            let len = base + if id < remainder { 1 } else { 0 };
            partitions.push(Partition { id, start, len });
            start += len;
        }
        debug!(
            "planned {} partitions of {}..={} pixels for {} pixels",
            count,
            base,
            base + if remainder > 0 { 1 } else { 0 },
            total
        );
        Ok(PartitionPlan { total, partitions })
    }

    /// The number of pixels covered.
    pub fn total(&self) -> usize {
        self.total
    }

    /// The number of partitions.
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    /// A plan always has at least one partition.
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    /// The partitions in ascending pixel order.
    pub fn iter(&self) -> std::slice::Iter<'_, Partition> {
        self.partitions.iter()
    }

    /// Carve `data`, which holds `unit` items per pixel, into one
    /// exclusive sub-slice per partition.  `data` must be exactly
    /// `total * unit` long.
    pub fn split_mut<'a, T>(&self, data: &'a mut [T], unit: usize) -> Vec<&'a mut [T]> {
        assert_eq!(
            data.len(),
            self.total * unit,
            "buffer does not match the planned pixel count"
        );
        let mut rest = data;
        let mut slices = Vec::with_capacity(self.partitions.len());
        for partition in &self.partitions {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(partition.len * unit);
            slices.push(head);
            rest = tail;
        }
        slices
    }
}

impl<'a> IntoIterator for &'a PartitionPlan {
    type Item = &'a Partition;
    type IntoIter = std::slice::Iter<'a, Partition>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_covers_exactly_once(plan: &PartitionPlan) {
        let mut seen = vec![0u8; plan.total()];
        for partition in plan {
            assert!(partition.len > 0, "empty partition {:?}", partition);
            for i in partition.range() {
                seen[i] += 1;
            }
        }
        assert!(seen.iter().all(|&n| n == 1));
    }

    #[test]
    fn partitions_cover_every_pixel_once() {
        for total in 1..60 {
            for workers in 1..12 {
                let plan = PartitionPlan::new(total, workers, PartitionScheme::Flexible).unwrap();
                assert_covers_exactly_once(&plan);
                assert_eq!(plan.len(), workers.min(total));
                if total % workers == 0 {
                    let strict = PartitionPlan::new(total, workers, PartitionScheme::Strict);
                    assert_eq!(strict.as_ref(), Ok(&plan));
                }
            }
        }
    }

    #[test]
    fn strict_scheme_rejects_uneven_split() {
        let plan = PartitionPlan::new(6, 4, PartitionScheme::Strict);
        match plan {
            Err(RenderError::InvalidConfiguration(msg)) => assert!(msg.contains("divisible")),
            other => panic!("expected InvalidConfiguration, got {:?}", other),
        }
    }

    #[test]
    fn flexible_scheme_spreads_the_remainder() {
        let plan = PartitionPlan::new(10, 4, PartitionScheme::Flexible).unwrap();
        let lens: Vec<usize> = plan.iter().map(|p| p.len).collect();
        assert_eq!(lens, vec![3, 3, 2, 2]);
        let starts: Vec<usize> = plan.iter().map(|p| p.start).collect();
        assert_eq!(starts, vec![0, 3, 6, 8]);
    }

    #[test]
    fn more_workers_than_pixels() {
        let plan = PartitionPlan::new(3, 8, PartitionScheme::Flexible).unwrap();
        assert_eq!(plan.len(), 3);
        assert!(plan.iter().all(|p| p.len == 1));
    }

    #[test]
    fn zero_workers_or_pixels_is_invalid() {
        assert!(PartitionPlan::new(10, 0, PartitionScheme::Flexible).is_err());
        assert!(PartitionPlan::new(0, 2, PartitionScheme::Flexible).is_err());
        assert!(PartitionPlan::new(0, 2, PartitionScheme::Strict).is_err());
    }

    #[test]
    fn split_mut_follows_the_plan() {
        let plan = PartitionPlan::new(5, 2, PartitionScheme::Flexible).unwrap();
        let mut bytes: Vec<u8> = (0..20).collect();
        let slices = plan.split_mut(&mut bytes, 4);
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].len(), 12);
        assert_eq!(slices[1].len(), 8);
        assert_eq!(slices[1][0], 12);
    }
}
