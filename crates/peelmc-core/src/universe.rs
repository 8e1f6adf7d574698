use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::{Error, HopSet, Result};

/// Index of the always-known anchor element.
pub const SENTINEL: usize = 0;

/// The indexed element space: sentinel at 0, hops at `1..=hop_num`, and
/// unused padding up to `capacity`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Universe {
    hop_num: usize,
    capacity: usize,
}

impl Universe {
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new(hop_num: usize, capacity: usize) -> Result<Self> {
        if hop_num >= capacity {
            return Err(Error::CapacityTooSmall { capacity, hop_num });
        }
        Ok(Self { hop_num, capacity })
    }

    /// Universe at the default capacity, widened when `hop_num` needs more room.
    pub fn with_default_capacity(hop_num: usize) -> Self {
        Self {
            hop_num,
            capacity: Self::DEFAULT_CAPACITY.max(hop_num + 1),
        }
    }

    pub fn hop_num(&self) -> usize {
        self.hop_num
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn hops(&self) -> RangeInclusive<usize> {
        1..=self.hop_num
    }

    /// Undecided-bit count at which a trial resolving `path_length` hops stops.
    ///
    /// The sentinel is known from the start, so `capacity - 1` bits begin
    /// undecided and each resolved hop removes one.
    pub fn target_undecided(&self, path_length: usize) -> Result<usize> {
        if path_length > self.hop_num {
            return Err(Error::PathLengthOutOfRange {
                path_length,
                hop_num: self.hop_num,
            });
        }
        Ok(self.capacity - 1 - path_length)
    }

    /// Decoded-hop count implied by an undecided set.
    pub fn decoded_count(&self, undecided: &HopSet) -> usize {
        self.capacity - 1 - undecided.count()
    }

    /// Initial undecided set: everything but the sentinel.
    pub fn initial_undecided(&self) -> HopSet {
        let mut undecided = HopSet::full(self.capacity);
        undecided.remove(SENTINEL);
        undecided
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_capacity_without_room_for_sentinel() {
        assert_eq!(
            Universe::new(8, 8),
            Err(Error::CapacityTooSmall { capacity: 8, hop_num: 8 })
        );
        assert!(Universe::new(7, 8).is_ok());
    }

    #[test]
    fn default_capacity_grows_with_hop_count() {
        assert_eq!(Universe::with_default_capacity(10).capacity(), 256);
        assert_eq!(Universe::with_default_capacity(300).capacity(), 301);
    }

    #[test]
    fn target_counts_down_from_capacity_minus_sentinel() {
        let universe = Universe::new(5, 64).unwrap();
        assert_eq!(universe.target_undecided(5), Ok(58));
        assert_eq!(universe.target_undecided(0), Ok(63));
        assert!(universe.target_undecided(6).is_err());
    }

    #[test]
    fn initial_state_has_nothing_decoded() {
        let universe = Universe::new(3, 16).unwrap();
        let undecided = universe.initial_undecided();
        assert!(!undecided.contains(SENTINEL));
        assert_eq!(undecided.count(), 15);
        assert_eq!(universe.decoded_count(&undecided), 0);
    }
}
