use crate::HopSet;

/// Per-trial record of decoded-hop counts reached by resolution events.
///
/// Bit `k` is set once a resolution brings the number of decoded hops to `k`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MilestoneVector(HopSet);

impl MilestoneVector {
    pub fn new(capacity: usize) -> Self {
        MilestoneVector(HopSet::new(capacity))
    }

    pub fn record(&mut self, decoded: usize) {
        self.0.insert(decoded);
    }

    pub fn count(&self) -> usize {
        self.0.count()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Reached counts in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter()
    }
}
